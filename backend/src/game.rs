//! Session coordinator
//!
//! Turns client commands into aggregate calls and fans the results out to
//! every connection attached to the game.
//!
//! # Locking
//!
//! Each game lives in its own `Arc<tokio::sync::Mutex<GameAggregate>>`, so
//! two moves on the same game are applied one at a time while different
//! games never contend. A join that moves a connection out of another game
//! holds both locks, taken in game id order. A command works on a clone of the aggregate, persists
//! it, and only then commits it back under the lock; a storage failure
//! therefore leaves the in-memory game untouched. Fan-out only enqueues onto
//! per-connection channels and never happens under the registry lock.

use std::collections::HashMap;
use std::sync::Arc;

use chess_engine::{Color, GameStatus, Move};
use parking_lot::RwLock;
use shared::{ClientCommand, GameId, GameSnapshot, GameSummary, ServerMessage};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::aggregate::GameAggregate;
use crate::error::{GameError, GameResult};
use crate::sessions::{ConnectionHandle, Session, SessionRegistry};
use crate::store::GameStore;
use crate::types::{ConnectionId, Identity, Role};

type SharedGame = Arc<Mutex<GameAggregate>>;
type PreviousGame = (GameId, Option<SharedGame>);

pub struct GameCoordinator {
    store: Arc<dyn GameStore>,
    sessions: SessionRegistry,
    games: RwLock<HashMap<GameId, SharedGame>>,
}

impl GameCoordinator {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        GameCoordinator {
            store,
            sessions: SessionRegistry::new(),
            games: RwLock::new(HashMap::new()),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    // ========================================================================
    // Lobby operations
    // ========================================================================

    pub async fn create_game(&self, game_name: &str) -> GameResult<GameId> {
        let record = self.store.create(game_name).await?;
        info!("[GAME] Created game {} ({})", record.game_id, game_name);
        Ok(record.game_id)
    }

    pub async fn list_games(&self) -> GameResult<Vec<GameSummary>> {
        Ok(self.store.list().await?)
    }

    pub async fn snapshot(&self, game_id: GameId) -> GameResult<GameSnapshot> {
        let game = self.aggregate(game_id).await?;
        let current = game.lock().await;
        Ok(current.snapshot())
    }

    /// Seat claim from the HTTP lobby: same rules as `JOIN_PLAYER`, but no
    /// connection is attached and nobody is notified.
    pub async fn claim_seat(
        &self,
        game_id: GameId,
        identity: &Identity,
        color: Color,
    ) -> GameResult<()> {
        let game = self.aggregate(game_id).await?;
        let mut current = game.lock().await;
        let mut next = current.clone();
        next.join_as_player(identity, color)?;
        self.commit(&mut current, next).await?;
        info!("[GAME] {} claimed {} in game {}", identity, color, game_id);
        Ok(())
    }

    /// Drop every game, cached or stored, and forget all attachments.
    /// Live games are abandoned first so attached clients see them end.
    pub async fn clear(&self) -> GameResult<()> {
        self.store.clear().await?;
        let cached: Vec<(GameId, SharedGame)> = self.games.write().drain().collect();
        for (game_id, game) in cached {
            let mut current = game.lock().await;
            if current.status().is_terminal() {
                continue;
            }
            current.abandon()?;
            self.broadcast(
                game_id,
                ServerMessage::LoadGame {
                    game: current.snapshot(),
                },
                None,
            );
            self.broadcast(
                game_id,
                ServerMessage::notification(format!("game {} was closed", game_id)),
                None,
            );
        }
        self.sessions.clear();
        warn!("[GAME] All games cleared");
        Ok(())
    }

    // ========================================================================
    // Socket commands
    // ========================================================================

    /// Run one command from an already-authenticated connection. Failures are
    /// reported to that connection only.
    pub async fn dispatch(
        &self,
        handle: &ConnectionHandle,
        identity: &Identity,
        command: ClientCommand,
    ) {
        let kind = command.kind();
        let game_id = command.game_id();
        debug!("[GAME] {} from {} for game {}", kind, identity, game_id);

        let result = match command {
            ClientCommand::JoinPlayer { player_color, .. } => {
                self.join_player(handle, identity, game_id, player_color).await
            }
            ClientCommand::JoinObserver { .. } => {
                self.join_observer(handle, identity, game_id).await
            }
            ClientCommand::MakeMove { mv, .. } => {
                self.make_move(handle, identity, game_id, mv).await
            }
            ClientCommand::Leave { .. } => self.leave(handle, identity, game_id).await,
            ClientCommand::Resign { .. } => self.resign(handle, identity, game_id).await,
        };

        if let Err(err) = result {
            warn!("[GAME] {} from {} rejected: {}", kind, identity, err);
            self.reject(handle, &err);
        }
    }

    /// Report a failure to one connection
    pub fn reject(&self, handle: &ConnectionHandle, err: &GameError) {
        if !handle.send(err.to_message()) {
            debug!("[GAME] {} went away before its error was sent", handle.id());
        }
    }

    pub async fn join_player(
        &self,
        handle: &ConnectionHandle,
        identity: &Identity,
        game_id: GameId,
        color: Color,
    ) -> GameResult<()> {
        let game = self.aggregate(game_id).await?;
        let previous = self.previous_game(handle, game_id);
        let (mut current, prior) = lock_pair(game_id, &game, previous.as_ref()).await;

        let mut next = current.clone();
        next.join_as_player(identity, color)?;
        if let Some(old) = self.seat_to_release(game_id, handle.id()) {
            if old != color {
                next.vacate(identity, old);
            }
        }
        self.commit(&mut current, next).await?;

        self.move_out(handle, &previous, prior).await;
        self.sessions.attach(
            game_id,
            Session {
                identity: identity.clone(),
                role: Role::Player(color),
                handle: handle.clone(),
            },
        );
        info!("[GAME] {} joined game {} as {}", identity, game_id, color);

        handle.send(ServerMessage::LoadGame {
            game: current.snapshot(),
        });
        self.broadcast(
            game_id,
            ServerMessage::notification(format!("{} joined as {}", identity, color)),
            Some(handle.id()),
        );
        Ok(())
    }

    pub async fn join_observer(
        &self,
        handle: &ConnectionHandle,
        identity: &Identity,
        game_id: GameId,
    ) -> GameResult<()> {
        let game = self.aggregate(game_id).await?;
        let previous = self.previous_game(handle, game_id);
        let (mut current, prior) = lock_pair(game_id, &game, previous.as_ref()).await;

        current.join_as_observer(identity)?;
        if let Some(old) = self.seat_to_release(game_id, handle.id()) {
            let mut next = current.clone();
            if next.vacate(identity, old) {
                self.commit(&mut current, next).await?;
            }
        }

        self.move_out(handle, &previous, prior).await;
        self.sessions.attach(
            game_id,
            Session {
                identity: identity.clone(),
                role: Role::Observer,
                handle: handle.clone(),
            },
        );
        info!("[GAME] {} observing game {}", identity, game_id);

        handle.send(ServerMessage::LoadGame {
            game: current.snapshot(),
        });
        self.broadcast(
            game_id,
            ServerMessage::notification(format!("{} is observing", identity)),
            Some(handle.id()),
        );
        Ok(())
    }

    pub async fn make_move(
        &self,
        handle: &ConnectionHandle,
        identity: &Identity,
        game_id: GameId,
        mv: Move,
    ) -> GameResult<()> {
        let game = self.aggregate(game_id).await?;
        let mut current = game.lock().await;
        let mut next = current.clone();
        let status = next.make_move(identity, mv)?;
        self.commit_in_progress(&mut current, next).await?;
        info!("[GAME] Game {}: {} played {} -> {}", game_id, identity, mv, status);

        let load = ServerMessage::LoadGame {
            game: current.snapshot(),
        };
        if !self.sessions.is_attached(game_id, handle.id()) {
            handle.send(load.clone());
        }
        self.broadcast(game_id, load, None);
        self.broadcast(
            game_id,
            ServerMessage::notification(describe_move(identity, mv, &current)),
            Some(handle.id()),
        );
        Ok(())
    }

    pub async fn leave(
        &self,
        handle: &ConnectionHandle,
        identity: &Identity,
        game_id: GameId,
    ) -> GameResult<()> {
        if self.sessions.session(game_id, handle.id()).is_none() {
            return Err(GameError::NotAParticipant(identity.to_string()));
        }
        let game = self.aggregate(game_id).await?;
        let mut current = game.lock().await;
        if let Some(color) = self.seat_to_release(game_id, handle.id()) {
            let mut next = current.clone();
            if next.vacate(identity, color) {
                self.commit(&mut current, next).await?;
            }
        }
        self.sessions.detach(game_id, handle.id());
        info!("[GAME] {} left game {}", identity, game_id);

        self.broadcast(
            game_id,
            ServerMessage::notification(format!("{} left the game", identity)),
            None,
        );
        Ok(())
    }

    pub async fn resign(
        &self,
        handle: &ConnectionHandle,
        identity: &Identity,
        game_id: GameId,
    ) -> GameResult<()> {
        let game = self.aggregate(game_id).await?;
        let mut current = game.lock().await;
        let mut next = current.clone();
        let status = next.resign(identity)?;
        self.commit_in_progress(&mut current, next).await?;
        self.sessions.detach(game_id, handle.id());
        info!("[GAME] {} resigned game {} ({})", identity, game_id, status);

        self.broadcast(
            game_id,
            ServerMessage::notification(format!("{} resigned", identity)),
            None,
        );
        Ok(())
    }

    /// Transport lost: detach everywhere and free the seat this connection
    /// held, without resigning. The game stays in progress and the seat can
    /// be re-claimed.
    pub async fn disconnect(&self, conn: ConnectionId) {
        for (game_id, session) in self.sessions.detach_all(conn) {
            let identity = &session.identity;
            info!("[GAME] {} disconnected from game {}", identity, game_id);

            let cached = self.games.read().get(&game_id).cloned();
            if let (Some(game), Some(color)) = (cached, self.releasable(game_id, &session)) {
                let mut current = game.lock().await;
                let mut next = current.clone();
                if next.vacate(identity, color) {
                    if let Err(err) = self.commit(&mut current, next).await {
                        error!("[GAME] Could not free seat of {}: {}", identity, err);
                    }
                }
            }

            self.broadcast(
                game_id,
                ServerMessage::notification(format!("{} disconnected", identity)),
                None,
            );
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Cached aggregate for `game_id`, loading it from the store on first use
    async fn aggregate(&self, game_id: GameId) -> GameResult<SharedGame> {
        let cached = self.games.read().get(&game_id).cloned();
        if let Some(game) = cached {
            return Ok(game);
        }
        let record = self
            .store
            .fetch(game_id)
            .await?
            .ok_or(GameError::UnknownGame(game_id))?;
        let mut games = self.games.write();
        let game = games
            .entry(game_id)
            .or_insert_with(|| Arc::new(Mutex::new(GameAggregate::from_record(record))));
        Ok(Arc::clone(game))
    }

    /// Persist `next`, then make it the current state
    async fn commit(&self, current: &mut GameAggregate, next: GameAggregate) -> GameResult<()> {
        self.store.replace(&next.to_record()).await?;
        *current = next;
        Ok(())
    }

    /// Like [`commit`](Self::commit), but refuses to overwrite a stored game
    /// that has already finished
    async fn commit_in_progress(
        &self,
        current: &mut GameAggregate,
        next: GameAggregate,
    ) -> GameResult<()> {
        if !self.store.replace_if_in_progress(&next.to_record()).await? {
            return Err(GameError::GameAlreadyOver);
        }
        *current = next;
        Ok(())
    }

    /// Game the connection is attached to other than `game_id`, with its
    /// aggregate when cached
    fn previous_game(&self, handle: &ConnectionHandle, game_id: GameId) -> Option<PreviousGame> {
        let previous = self
            .sessions
            .game_of(handle.id())
            .filter(|id| *id != game_id)?;
        let game = self.games.read().get(&previous).cloned();
        Some((previous, game))
    }

    /// Seat the connection's current session in `game_id` holds, if leaving
    /// it should free the seat
    fn seat_to_release(&self, game_id: GameId, conn: ConnectionId) -> Option<Color> {
        let session = self.sessions.session(game_id, conn)?;
        self.releasable(game_id, &session)
    }

    /// A player session frees its color unless another live connection of
    /// the same identity is seated on it
    fn releasable(&self, game_id: GameId, session: &Session) -> Option<Color> {
        let color = match session.role {
            Role::Player(color) => color,
            Role::Observer => return None,
        };
        let conn = session.handle.id();
        let still_seated = self.sessions.members_of(game_id).iter().any(|member| {
            member.handle.id() != conn
                && member.identity == session.identity
                && member.role == session.role
        });
        (!still_seated).then_some(color)
    }

    /// Leave the previous game once a join elsewhere has been committed.
    /// `prior` is that game's lock, already held by the caller.
    async fn move_out(
        &self,
        handle: &ConnectionHandle,
        previous: &Option<PreviousGame>,
        prior: Option<MutexGuard<'_, GameAggregate>>,
    ) {
        let previous_id = match previous {
            Some((id, _)) => *id,
            None => return,
        };
        let seat = self.seat_to_release(previous_id, handle.id());
        let session = match self.sessions.detach(previous_id, handle.id()) {
            Some(session) => session,
            None => return,
        };
        let identity = &session.identity;

        if let (Some(mut current), Some(color)) = (prior, seat) {
            let mut next = current.clone();
            if next.vacate(identity, color) {
                if let Err(err) = self.commit(&mut current, next).await {
                    error!("[GAME] Could not free seat of {}: {}", identity, err);
                }
            }
        }
        info!("[GAME] {} left game {}", identity, previous_id);

        self.broadcast(
            previous_id,
            ServerMessage::notification(format!("{} left the game", identity)),
            None,
        );
    }

    /// Deliver to every member except `except`; dead connections are
    /// detached and skipped
    fn broadcast(&self, game_id: GameId, message: ServerMessage, except: Option<ConnectionId>) {
        for member in self.sessions.members_of(game_id) {
            let conn = member.handle.id();
            if Some(conn) == except {
                continue;
            }
            if !member.handle.send(message.clone()) {
                debug!("[GAME] Dropping dead connection {} from game {}", conn, game_id);
                self.sessions.detach(game_id, conn);
            }
        }
    }
}

fn describe_move(identity: &Identity, mv: Move, game: &GameAggregate) -> String {
    let engine = game.engine();
    let base = format!("{} moved {}", identity, mv);
    match engine.status() {
        GameStatus::Checkmate { winner } => format!("{}. Checkmate, {} wins", base, winner),
        GameStatus::Stalemate => format!("{}. Stalemate", base),
        _ if engine.is_in_check(engine.side_to_move()) => {
            format!("{}. {} is in check", base, engine.side_to_move())
        }
        _ => base,
    }
}

/// Lock `game` and, when present, the game being left, lowest id first
async fn lock_pair<'a>(
    game_id: GameId,
    game: &'a SharedGame,
    previous: Option<&'a PreviousGame>,
) -> (
    MutexGuard<'a, GameAggregate>,
    Option<MutexGuard<'a, GameAggregate>>,
) {
    match previous {
        Some((previous_id, Some(other))) if *previous_id < game_id => {
            let prior = other.lock().await;
            (game.lock().await, Some(prior))
        }
        Some((_, Some(other))) => {
            let current = game.lock().await;
            (current, Some(other.lock().await))
        }
        _ => (game.lock().await, None),
    }
}
