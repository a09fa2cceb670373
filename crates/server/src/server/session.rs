//! Player sessions and the registry that owns them.

use protocol::packets::PlayerSnapshot;
use protocol::{Color, Direction, GRID_SIZE};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

/// Length of generated session ids.
const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque per-connection player id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A connected player.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    /// Remote address.
    pub addr: SocketAddr,
    pub x: usize,
    pub y: usize,
    pub color: Color,
    /// Percentage of the grid owned, `0..=100`.
    pub score: u32,
    pub direction: Direction,
    pub connected_at: Instant,
}

impl Session {
    /// Spawn position on both axes.
    pub const SPAWN: usize = GRID_SIZE / 2;

    /// Create a session at the grid center, heading right.
    pub fn new(id: SessionId, addr: SocketAddr, color: Color) -> Self {
        Self {
            id,
            addr,
            x: Self::SPAWN,
            y: Self::SPAWN,
            color,
            score: 0,
            direction: Direction::new(1, 0),
            connected_at: Instant::now(),
        }
    }

    /// Advance one step along `direction`. Each axis is clamped to the grid
    /// independently; the direction itself is kept.
    pub fn step(&mut self) {
        self.x = step_axis(self.x, self.direction.dx);
        self.y = step_axis(self.y, self.direction.dy);
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            player_id: self.id.to_string(),
            x: self.x,
            y: self.y,
            color: self.color,
            score: self.score,
            direction: self.direction,
        }
    }
}

fn step_axis(pos: usize, delta: i32) -> usize {
    let max = GRID_SIZE as i64 - 1;
    (pos as i64 + delta as i64).clamp(0, max) as usize
}

/// Live sessions, iterated in join order.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<u64, Session>,
    index: HashMap<SessionId, u64>,
    next_seq: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and insert a session with a fresh id and a random color.
    ///
    /// Colors are not deduplicated. Ids are re-drawn until they differ from
    /// every live session's id.
    pub fn create<R: Rng + ?Sized>(&mut self, addr: SocketAddr, rng: &mut R) -> &Session {
        let mut id = SessionId::random(rng);
        while self.index.contains_key(&id) {
            id = SessionId::random(rng);
        }
        let color = Color::random(rng);
        self.insert(Session::new(id, addr, color))
    }

    /// Insert a prepared session. A session with the same id is replaced.
    pub fn insert(&mut self, session: Session) -> &Session {
        self.remove(&session.id);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(session.id.clone(), seq);
        self.sessions.entry(seq).or_insert(session)
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.index.get(id).and_then(|seq| self.sessions.get(seq))
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        let seq = self.index.get(id)?;
        self.sessions.get_mut(seq)
    }

    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        let seq = self.index.remove(id)?;
        self.sessions.remove(&seq)
    }

    /// Sessions in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
