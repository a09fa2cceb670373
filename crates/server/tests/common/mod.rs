use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use protocol::packets::{ClientMessage, GameSnapshot, ServerMessage};
use server::{AppState, Config, build_app};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const READ_TIMEOUT: Duration = Duration::from_secs(3);

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a server whose tick loops effectively never fire, so every
    /// frame a client sees was caused by the test itself.
    pub async fn new() -> Self {
        Self::from_config(quiet_config()).await
    }

    pub async fn from_config(config: Config) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config);

        let handle = tokio::spawn(async move {
            server::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            _handle: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Poll until the live session count reaches `expected`.
    pub async fn wait_for_players(&self, expected: usize) {
        let wait = async {
            while self.state.live_session_count().await != expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(READ_TIMEOUT, wait)
            .await
            .unwrap_or_else(|_| panic!("Timed out waiting for {expected} players"));
    }
}

pub fn quiet_config() -> Config {
    let mut config = Config::default();
    config.game.tick_interval_ms = 3_600_000;
    config.game.round_interval_ms = 3_600_000;
    config.server.web_root = scratch_dir("unused");
    config
}

/// A fresh directory under the system temp dir.
pub fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "paintgrid-{label}-{}-{}",
        std::process::id(),
        rand::random::<u64>()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub async fn ws_connect(url: &str) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

/// Connect and consume the handshake. Returns the stream, the assigned player
/// id and the first state update.
pub async fn ws_join(server: &TestServer) -> (WsStream, String, GameSnapshot) {
    let mut stream = ws_connect(&server.ws_url()).await;
    let player_id = match ws_read(&mut stream).await {
        ServerMessage::CurrentPlayer { player_id } => player_id,
        other => panic!("Expected currentPlayer, got: {other:?}"),
    };
    let snapshot = ws_read_update_where(&mut stream, |s| s.players.contains_key(&player_id)).await;
    (stream, player_id, snapshot)
}

pub async fn ws_send(stream: &mut WsStream, msg: &ClientMessage) {
    ws_send_text(stream, &msg.encode().unwrap()).await;
}

pub async fn ws_send_text(stream: &mut WsStream, text: &str) {
    stream.send(Message::Text(text.to_string().into())).await.unwrap();
}

/// Read the next server message, skipping control frames.
pub async fn ws_read(stream: &mut WsStream) -> ServerMessage {
    loop {
        let msg = tokio::time::timeout(READ_TIMEOUT, stream.next())
            .await
            .expect("Timed out waiting for a server message")
            .expect("Stream ended")
            .expect("WebSocket error");
        match msg {
            Message::Text(text) => return ServerMessage::decode(text.as_str()).unwrap(),
            Message::Close(frame) => panic!("Connection closed: {frame:?}"),
            _ => continue,
        }
    }
}

/// Read until a message matches `pred`, discarding the others.
pub async fn ws_read_until<F>(stream: &mut WsStream, mut pred: F) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    loop {
        let msg = ws_read(stream).await;
        if pred(&msg) {
            return msg;
        }
    }
}

pub async fn ws_read_update_where<F>(stream: &mut WsStream, mut pred: F) -> GameSnapshot
where
    F: FnMut(&GameSnapshot) -> bool,
{
    let msg = ws_read_until(stream, |m| match m {
        ServerMessage::Update { game_state } => pred(game_state),
        _ => false,
    })
    .await;
    match msg {
        ServerMessage::Update { game_state } => game_state,
        _ => unreachable!(),
    }
}
