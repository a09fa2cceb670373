//! Game state, message dispatch and the two periodic loops.

use crate::config::GameConfig;
use protocol::packets::{ChatEntry, ClientMessage, GameSnapshot, ServerMessage};
use protocol::{Direction, ProtocolError, sound_for_index};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::fanout::Fanout;
use super::grid::{Grid, score_for};
use super::round;
use super::session::{SessionId, SessionRegistry};

/// The single shared game state. Every mutation takes the write lock.
pub type SharedGame = Arc<RwLock<GameState>>;

/// Main game state.
pub struct GameState {
    pub config: GameConfig,
    pub sessions: SessionRegistry,
    pub grid: Grid,
    /// Round countdown; reaching 0 ends the round.
    pub timer: u32,
    pub chat: Vec<ChatEntry>,
    pub tick_count: u64,
    pub rounds_played: u64,
    /// Average movement tick duration in milliseconds (exponential moving average).
    pub update_time_avg: f64,
    fanout: Fanout,
    rng: StdRng,
}

impl GameState {
    pub fn new(config: &GameConfig, fanout: Fanout) -> Self {
        Self::with_rng(config, fanout, StdRng::from_os_rng())
    }

    /// Create a game state with a caller-supplied id/color generator.
    pub fn with_rng(config: &GameConfig, fanout: Fanout, rng: StdRng) -> Self {
        Self {
            config: config.clone(),
            sessions: SessionRegistry::new(),
            grid: Grid::new(),
            timer: round_start(config),
            chat: Vec::new(),
            tick_count: 0,
            rounds_played: 0,
            update_time_avg: 0.0,
            fanout,
            rng,
        }
    }

    /// Fold one movement tick duration into the running average and return it.
    pub fn record_tick_time(&mut self, tick_ms: f64) -> f64 {
        self.update_time_avg = self.update_time_avg * 0.5 + tick_ms * 0.5;
        self.update_time_avg
    }

    pub fn live_session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Register a new connection and broadcast the state that includes it.
    pub fn connect(&mut self, addr: SocketAddr) -> SessionId {
        let session = self.sessions.create(addr, &mut self.rng);
        let id = session.id.clone();
        info!("Session {} ({}) connected from {}", id, session.color, addr);
        self.broadcast_state();
        id
    }

    /// Remove a session and free its territory. Returns false if it was
    /// already gone.
    pub fn disconnect(&mut self, id: &SessionId) -> bool {
        let Some(session) = self.sessions.remove(id) else {
            return false;
        };
        let freed = self.grid.clear_color(session.color);
        info!(
            "Session {} ({}) disconnected after {:?}, freed {} cells",
            id,
            session.addr,
            session.connected_at.elapsed(),
            freed
        );
        self.broadcast_state();
        true
    }

    /// Handle one inbound text frame from `id`. Failures are logged and
    /// otherwise ignored.
    pub fn handle_message(&mut self, id: &SessionId, text: &str) {
        let message = match ClientMessage::parse(text) {
            Ok(message) => message,
            Err(ProtocolError::UnknownType(tag)) => {
                warn!("Session {} sent unknown message type {:?}", id, tag);
                return;
            }
            Err(e) => {
                warn!("Bad message from session {}: {}", id, e);
                return;
            }
        };

        if self.sessions.get(id).is_none() {
            debug!("Dropping {:?} from departed session {}", message.message_type(), id);
            return;
        }

        match message {
            ClientMessage::Chat { message } => self.handle_chat(id, message),
            ClientMessage::Sound { sound_index } => self.handle_sound(id, sound_index),
            ClientMessage::ChangeDirection { direction } => {
                self.handle_change_direction(id, direction)
            }
        }
    }

    fn handle_chat(&mut self, id: &SessionId, message: String) {
        if message.is_empty() {
            return;
        }
        let Some(session) = self.sessions.get(id) else {
            return;
        };
        info!("[Chat] {}: {}", session.color, message);
        self.chat.push(ChatEntry {
            author_color: Some(session.color),
            message,
        });
        self.broadcast_chat();
    }

    fn handle_sound(&mut self, id: &SessionId, sound_index: i64) {
        match sound_for_index(sound_index) {
            Some(sound) => {
                debug!("Session {} played {}", id, sound);
                self.broadcast_sound(sound);
            }
            None => debug!("Session {} asked for unknown sound {}", id, sound_index),
        }
    }

    fn handle_change_direction(&mut self, id: &SessionId, direction: Direction) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.direction = direction.clamped();
        }
    }

    /// Run one movement tick: move and paint every session in join order,
    /// then recompute every score from the resulting grid.
    pub fn tick_movement(&mut self) {
        self.tick_count += 1;
        for session in self.sessions.iter_mut() {
            session.step();
            self.grid.paint(session.x, session.y, session.color);
        }
        self.refresh_scores();
        self.broadcast_state();
    }

    fn refresh_scores(&mut self) {
        let counts = self.grid.color_counts();
        for session in self.sessions.iter_mut() {
            session.score = score_for(counts.get(&session.color).copied().unwrap_or(0));
        }
    }

    /// Run one round tick. Returns true if the round ended on this tick.
    pub fn tick_round(&mut self) -> bool {
        self.timer = self.timer.saturating_sub(1);
        let ended = self.timer == 0;
        if ended {
            self.end_round();
        }
        self.broadcast_state();
        ended
    }

    fn end_round(&mut self) {
        let ranking = round::rank(self.sessions.iter());
        let summary = round::summary_message(&ranking, self.config.podium_size);
        self.rounds_played += 1;
        info!(
            "Round {} over with {} players, winner: {:?}",
            self.rounds_played,
            ranking.len(),
            ranking.first()
        );
        self.chat.push(ChatEntry {
            author_color: None,
            message: summary,
        });
        self.broadcast_chat();
        self.reset_round();
    }

    /// Zero every score, clear the grid and the chat, restart the countdown.
    pub fn reset_round(&mut self) {
        for session in self.sessions.iter_mut() {
            session.score = 0;
        }
        self.grid.reset_all();
        self.chat.clear();
        self.timer = round_start(&self.config);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self
                .sessions
                .iter()
                .map(|s| (s.id.to_string(), s.snapshot()))
                .collect(),
            grid: self.grid.rows(),
            timer: self.timer,
            chat: self.chat.clone(),
        }
    }

    pub fn broadcast_state(&self) {
        self.fanout.send(&ServerMessage::Update {
            game_state: self.snapshot(),
        });
    }

    pub fn broadcast_chat(&self) {
        self.fanout.send(&ServerMessage::Chat {
            chat: self.chat.clone(),
        });
    }

    pub fn broadcast_sound(&self, sound: &str) {
        self.fanout.send(&ServerMessage::Sound {
            sound: sound.to_string(),
        });
    }
}

fn round_start(config: &GameConfig) -> u32 {
    config.round_seconds.max(1)
}

/// Start the movement and round loops. Call once per server.
pub fn spawn_game_loops(state: SharedGame, config: &GameConfig) -> [JoinHandle<()>; 2] {
    let movement = tokio::spawn(run_movement_loop(Arc::clone(&state), config.tick_interval_ms));
    let rounds = tokio::spawn(run_round_loop(state, config.round_interval_ms));
    [movement, rounds]
}

/// Advance movement, painting and scoring every `tick_interval_ms`.
pub async fn run_movement_loop(state: SharedGame, tick_interval_ms: u64) {
    let period = Duration::from_millis(tick_interval_ms.max(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut game = state.write().await;
        let tick_start = std::time::Instant::now();
        game.tick_movement();
        let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;
        let avg_ms = game.record_tick_time(tick_ms);

        let tick_budget = tick_interval_ms as f64 * 0.9;
        if tick_ms > tick_budget {
            warn!(
                "Slow tick #{}: {:.3}ms (avg: {:.3}ms, budget: {:.1}ms) - {} players",
                game.tick_count,
                tick_ms,
                avg_ms,
                tick_budget,
                game.live_session_count()
            );
        }
    }
}

/// Count the round down every `round_interval_ms`, ending and resetting it at 0.
pub async fn run_round_loop(state: SharedGame, round_interval_ms: u64) {
    let period = Duration::from_millis(round_interval_ms.max(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        state.write().await.tick_round();
    }
}
