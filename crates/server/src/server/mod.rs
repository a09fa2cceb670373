//! Game server implementation.

use crate::config::Config;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

pub mod fanout;
pub mod game;
pub mod gateway;
pub mod grid;
pub mod round;
pub mod session;

pub use fanout::{Fanout, Frame};
pub use game::{GameState, SharedGame, spawn_game_loops};
pub use grid::Grid;
pub use session::{Session, SessionId, SessionRegistry};

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub game: SharedGame,
    pub fanout: Fanout,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let fanout = Fanout::new(config.server.broadcast_capacity);
        let game = Arc::new(RwLock::new(GameState::new(&config.game, fanout.clone())));
        Self {
            game,
            fanout,
            config: Arc::new(config),
        }
    }

    pub async fn live_session_count(&self) -> usize {
        self.game.read().await.live_session_count()
    }
}

/// Build the router and application state, and start the game loops.
///
/// Must be called from within a tokio runtime.
pub fn build_app(config: Config) -> (Router, AppState) {
    let web_root = config.server.web_root.clone();
    let state = AppState::new(config);
    spawn_game_loops(Arc::clone(&state.game), &state.config.game);

    let static_files =
        ServeDir::new(&web_root).fallback(ServeFile::new(web_root.join("index.html")));

    let app = Router::new()
        .route("/ws", get(gateway::ws_handler))
        .route("/api/players", get(live_players).post(live_players))
        .fallback_service(static_files)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state.clone());

    (app, state)
}

/// Current live-player count as a bare JSON integer.
async fn live_players(State(state): State<AppState>) -> Json<usize> {
    Json(state.live_session_count().await)
}

/// Serve `app` on `listener` until the process stops.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    info!("Game WebSocket endpoint: ws://{}/ws", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Bind the configured address and run the server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let (app, _state) = build_app(config);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    serve(listener, app).await
}
