//! One game's authoritative state: seats plus the rules engine.
//!
//! The aggregate is plain data with synchronous methods; the coordinator owns
//! one per game behind a `tokio::sync::Mutex` and is the only caller.

use chess_engine::{Color, GameStatus, Move, RulesEngine};
use shared::{GameId, GameSnapshot, GameSummary};

use crate::error::{GameError, GameResult};
use crate::store::GameRecord;
use crate::types::Identity;

#[derive(Debug, Clone, PartialEq)]
pub struct GameAggregate {
    game_id: GameId,
    game_name: String,
    white: Option<Identity>,
    black: Option<Identity>,
    engine: RulesEngine,
}

impl GameAggregate {
    pub fn new(game_id: GameId, game_name: &str) -> Self {
        Self::from_record(GameRecord::new(game_id, game_name))
    }

    pub fn from_record(record: GameRecord) -> Self {
        GameAggregate {
            game_id: record.game_id,
            game_name: record.game_name,
            white: record.white.map(Identity::new),
            black: record.black.map(Identity::new),
            engine: record.engine,
        }
    }

    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            game_id: self.game_id,
            game_name: self.game_name.clone(),
            white: self.white.as_ref().map(|i| i.as_str().to_string()),
            black: self.black.as_ref().map(|i| i.as_str().to_string()),
            engine: self.engine.clone(),
        }
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn engine(&self) -> &RulesEngine {
        &self.engine
    }

    pub fn status(&self) -> GameStatus {
        self.engine.status()
    }

    /// Identity seated on `color`, if any
    pub fn player(&self, color: Color) -> Option<&Identity> {
        match color {
            Color::White => self.white.as_ref(),
            Color::Black => self.black.as_ref(),
        }
    }

    fn seat_mut(&mut self, color: Color) -> &mut Option<Identity> {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Colors held by `identity`. Nothing stops one account from taking
    /// both seats.
    pub fn seats_of(&self, identity: &Identity) -> Vec<Color> {
        Color::ALL
            .into_iter()
            .filter(|c| self.player(*c) == Some(identity))
            .collect()
    }

    /// Claim a seat. Re-claiming a seat already held by `identity` succeeds.
    pub fn join_as_player(&mut self, identity: &Identity, color: Color) -> GameResult<()> {
        if self.status().is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        if let Some(holder) = self.player(color) {
            if holder != identity {
                return Err(GameError::SeatTaken {
                    color,
                    holder: holder.to_string(),
                });
            }
        }
        *self.seat_mut(color) = Some(identity.clone());
        Ok(())
    }

    /// Observers are not recorded on the aggregate; anyone may watch a game
    /// that exists, finished or not.
    pub fn join_as_observer(&self, _identity: &Identity) -> GameResult<()> {
        Ok(())
    }

    /// Free `color` if `identity` holds it. Status is left untouched.
    pub fn vacate(&mut self, identity: &Identity, color: Color) -> bool {
        let seat = self.seat_mut(color);
        if seat.as_ref() != Some(identity) {
            return false;
        }
        *seat = None;
        true
    }

    /// Play `mv` on behalf of `identity`
    ///
    /// The caller must hold the seat of the side to move: an unseated caller
    /// gets `NotAParticipant`, a seated one moving out of turn gets
    /// `IllegalMove`.
    pub fn make_move(&mut self, identity: &Identity, mv: Move) -> GameResult<GameStatus> {
        let seats = self.seats_of(identity);
        if seats.is_empty() {
            return Err(GameError::NotAParticipant(identity.to_string()));
        }
        let to_move = self.engine.side_to_move();
        if !seats.contains(&to_move) {
            return Err(GameError::IllegalMove(format!(
                "{} (it is {}'s turn)",
                mv, to_move
            )));
        }
        Ok(self.engine.apply_move(mv)?)
    }

    /// Resign the seat `identity` holds, preferring the side to move when
    /// the same account sits on both sides.
    pub fn resign(&mut self, identity: &Identity) -> GameResult<GameStatus> {
        let seats = self.seats_of(identity);
        let to_move = self.engine.side_to_move();
        let color = if seats.contains(&to_move) {
            to_move
        } else {
            *seats
                .first()
                .ok_or_else(|| GameError::NotAParticipant(identity.to_string()))?
        };
        Ok(self.engine.resign(color)?)
    }

    /// Close an unfinished game without a result
    pub fn abandon(&mut self) -> GameResult<GameStatus> {
        Ok(self.engine.abandon()?)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(
            self.game_id,
            &self.game_name,
            &self.engine,
            self.white.as_ref().map(Identity::as_str),
            self.black.as_ref().map(Identity::as_str),
        )
    }

    pub fn summary(&self) -> GameSummary {
        self.to_record().summary()
    }
}
