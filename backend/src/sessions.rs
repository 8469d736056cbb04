//! Session registry: which connections are attached to which game
//!
//! Pure bookkeeping. The registry never sends anything; callers take a
//! snapshot with [`SessionRegistry::members_of`] and deliver outside the
//! lock, so a slow socket cannot stall attach/detach for other games.

use std::collections::HashMap;

use parking_lot::Mutex;
use shared::{GameId, ServerMessage};
use tokio::sync::mpsc::{error::TrySendError, Sender};
use tracing::debug;

use crate::types::{ConnectionId, Identity, Role};

/// Messages a connection may have queued before it counts as stalled
pub const OUTBOUND_CAPACITY: usize = 256;

/// Outbound side of one connection
///
/// Sending only enqueues onto the connection's writer task. A `false` return
/// means the socket is gone or its queue is full; either way the connection
/// is treated as dead.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: Sender<ServerMessage>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, tx: Sender<ServerMessage>) -> Self {
        ConnectionHandle { id, tx }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn send(&self, message: ServerMessage) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("[SESSIONS] Outbound queue of {} is full", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// One connection's attachment to a game
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub role: Role,
    pub handle: ConnectionHandle,
}

#[derive(Default)]
struct RegistryInner {
    games: HashMap<GameId, HashMap<ConnectionId, Session>>,
    attached: HashMap<ConnectionId, GameId>,
}

impl RegistryInner {
    fn remove(&mut self, game_id: GameId, conn: ConnectionId) -> Option<Session> {
        let members = self.games.get_mut(&game_id)?;
        let session = members.remove(&conn)?;
        if members.is_empty() {
            self.games.remove(&game_id);
        }
        if self.attached.get(&conn) == Some(&game_id) {
            self.attached.remove(&conn);
        }
        Some(session)
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<RegistryInner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection to `game_id`, replacing any earlier attachment.
    ///
    /// A connection belongs to at most one game, so attaching elsewhere moves
    /// it; the game it was moved out of is returned.
    pub fn attach(&self, game_id: GameId, session: Session) -> Option<GameId> {
        let conn = session.handle.id();
        let mut inner = self.inner.lock();
        let previous = inner.attached.get(&conn).copied();
        if let Some(old) = previous {
            inner.remove(old, conn);
        }
        inner.games.entry(game_id).or_default().insert(conn, session);
        inner.attached.insert(conn, game_id);
        debug!("[SESSIONS] {} attached to game {}", conn, game_id);
        previous.filter(|old| *old != game_id)
    }

    /// Idempotent
    pub fn detach(&self, game_id: GameId, conn: ConnectionId) -> Option<Session> {
        let session = self.inner.lock().remove(game_id, conn);
        if session.is_some() {
            debug!("[SESSIONS] {} detached from game {}", conn, game_id);
        }
        session
    }

    /// Drop a connection from every game it is attached to
    pub fn detach_all(&self, conn: ConnectionId) -> Vec<(GameId, Session)> {
        let mut inner = self.inner.lock();
        let game_ids: Vec<GameId> = inner
            .games
            .iter()
            .filter(|(_, members)| members.contains_key(&conn))
            .map(|(id, _)| *id)
            .collect();
        game_ids
            .into_iter()
            .filter_map(|id| inner.remove(id, conn).map(|s| (id, s)))
            .collect()
    }

    /// Snapshot of the game's members, safe to iterate without the lock
    pub fn members_of(&self, game_id: GameId) -> Vec<Session> {
        self.inner
            .lock()
            .games
            .get(&game_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// The session `conn` holds in `game_id`, if attached there
    pub fn session(&self, game_id: GameId, conn: ConnectionId) -> Option<Session> {
        self.inner
            .lock()
            .games
            .get(&game_id)
            .and_then(|members| members.get(&conn).cloned())
    }

    pub fn game_of(&self, conn: ConnectionId) -> Option<GameId> {
        self.inner.lock().attached.get(&conn).copied()
    }

    pub fn is_attached(&self, game_id: GameId, conn: ConnectionId) -> bool {
        self.game_of(conn) == Some(game_id)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.games.clear();
        inner.attached.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::Color;
    use tokio::sync::mpsc::{channel, Receiver};

    fn session(name: &str, role: Role) -> (Session, Receiver<ServerMessage>) {
        let (tx, rx) = channel(OUTBOUND_CAPACITY);
        let session = Session {
            identity: Identity::new(name),
            role,
            handle: ConnectionHandle::new(ConnectionId::new(), tx),
        };
        (session, rx)
    }

    #[test]
    fn test_attach_and_members() {
        let registry = SessionRegistry::new();
        let (white, _w) = session("alice", Role::Player(Color::White));
        let (watcher, _o) = session("carol", Role::Observer);

        assert_eq!(registry.attach(1, white.clone()), None);
        registry.attach(1, watcher.clone());

        assert_eq!(registry.members_of(1).len(), 2);
        assert!(registry.members_of(2).is_empty());
        assert!(registry.is_attached(1, white.handle.id()));
        assert_eq!(
            registry.session(1, watcher.handle.id()).map(|s| s.role),
            Some(Role::Observer)
        );
        assert!(registry.session(2, watcher.handle.id()).is_none());
    }

    #[test]
    fn test_attach_moves_connection_between_games() {
        let registry = SessionRegistry::new();
        let (s, _rx) = session("alice", Role::Observer);
        let conn = s.handle.id();

        registry.attach(1, s.clone());
        assert_eq!(registry.attach(2, s.clone()), Some(1));
        assert!(registry.members_of(1).is_empty());
        assert_eq!(registry.game_of(conn), Some(2));
        assert_eq!(registry.attach(2, s), None, "Re-attaching to the same game");
    }

    #[test]
    fn test_detach_is_idempotent() {
        let registry = SessionRegistry::new();
        let (s, _rx) = session("alice", Role::Observer);
        let conn = s.handle.id();
        registry.attach(1, s);

        assert!(registry.detach(1, conn).is_some());
        assert!(registry.detach(1, conn).is_none());
        assert!(registry.detach(9, conn).is_none());
        assert_eq!(registry.game_of(conn), None);
    }

    #[test]
    fn test_detach_all() {
        let registry = SessionRegistry::new();
        let (s, _rx) = session("alice", Role::Player(Color::Black));
        let (other, _orx) = session("bob", Role::Observer);
        let conn = s.handle.id();
        registry.attach(3, s);
        registry.attach(3, other);

        let removed = registry.detach_all(conn);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].0, 3);
        assert_eq!(removed[0].1.identity, Identity::new("alice"));
        assert_eq!(registry.members_of(3).len(), 1);
        assert!(registry.detach_all(conn).is_empty());
    }

    #[test]
    fn test_send_fails_after_receiver_dropped() {
        let (s, rx) = session("alice", Role::Observer);
        assert!(s.handle.send(ServerMessage::notification("hi")));
        drop(rx);
        assert!(!s.handle.send(ServerMessage::notification("hi")));
    }

    #[test]
    fn test_send_fails_when_queue_full() {
        let (tx, mut rx) = channel(1);
        let handle = ConnectionHandle::new(ConnectionId::new(), tx);

        assert!(handle.send(ServerMessage::notification("one")));
        assert!(!handle.send(ServerMessage::notification("two")));
        assert!(rx.try_recv().is_ok());
        assert!(handle.send(ServerMessage::notification("three")));
    }
}
