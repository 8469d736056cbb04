//! Error types for the game server
//!
//! [`GameError`] is what a WebSocket command can fail with; it is always
//! reported to the originating connection only. [`ApiError`] is the HTTP
//! lobby's error and renders as a JSON response. [`StoreError`] comes out of
//! the persistence layer and is folded into both.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chess_engine::{ChessEngineError, Color};
use serde_json::json;
use shared::{GameId, ServerMessage};
use thiserror::Error;

/// Coordinator command failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("game is already over")]
    GameAlreadyOver,

    #[error("{color} is already taken by {holder}")]
    SeatTaken { color: Color, holder: String },

    #[error("{0} is not a player in this game")]
    NotAParticipant(String),

    #[error("game {0} does not exist")]
    UnknownGame(GameId),

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("storage failure: {0}")]
    Storage(String),
}

impl GameError {
    /// Stable code carried in `ERROR` messages
    pub fn code(&self) -> &'static str {
        match self {
            GameError::IllegalMove(_) => "ILLEGAL_MOVE",
            GameError::GameAlreadyOver => "GAME_ALREADY_OVER",
            GameError::SeatTaken { .. } => "SEAT_TAKEN",
            GameError::NotAParticipant(_) => "NOT_A_PARTICIPANT",
            GameError::UnknownGame(_) => "UNKNOWN_GAME",
            GameError::MalformedCommand(_) => "MALFORMED_COMMAND",
            GameError::Unauthorized => "UNAUTHORIZED",
            GameError::Storage(_) => "STORAGE",
        }
    }

    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::error(self.code(), format!("Error: {}", self))
    }
}

impl From<ChessEngineError> for GameError {
    fn from(err: ChessEngineError) -> Self {
        match err {
            ChessEngineError::IllegalMove { mv } => GameError::IllegalMove(mv.to_string()),
            ChessEngineError::GameAlreadyOver => GameError::GameAlreadyOver,
            other => GameError::MalformedCommand(other.to_string()),
        }
    }
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        GameError::Storage(err.to_string())
    }
}

pub type GameResult<T> = Result<T, GameError>;

/// Persistence failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not encode game state: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("game {0} does not exist")]
    NotFound(GameId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// HTTP lobby failures, rendered as `{"message": ...}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("already taken: {0}")]
    AlreadyTaken(String),

    #[error("game {0} not found")]
    NotFound(GameId),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::AlreadyTaken(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "message": format!("Error: {}", self) }));
        (self.status(), body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::SeatTaken { .. } => ApiError::AlreadyTaken(err.to_string()),
            GameError::UnknownGame(id) => ApiError::NotFound(id),
            GameError::Unauthorized => ApiError::Unauthorized,
            GameError::Storage(message) => ApiError::Internal(message),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::Move;

    #[test]
    fn test_engine_errors_map_to_codes() {
        let mv: Move = "e2-e5".parse().unwrap();
        assert_eq!(
            GameError::from(ChessEngineError::IllegalMove { mv }).code(),
            "ILLEGAL_MOVE"
        );
        assert_eq!(
            GameError::from(ChessEngineError::GameAlreadyOver).code(),
            "GAME_ALREADY_OVER"
        );
        assert_eq!(
            GameError::from(ChessEngineError::InvalidSquare { row: 9, col: 1 }).code(),
            "MALFORMED_COMMAND"
        );
    }

    #[test]
    fn test_error_message_is_point_to_point_shape() {
        let msg = GameError::UnknownGame(42).to_message();
        match msg {
            ServerMessage::Error {
                code,
                error_message,
            } => {
                assert_eq!(code, "UNKNOWN_GAME");
                assert!(error_message.contains("42"));
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_api_status_codes() {
        let taken = GameError::SeatTaken {
            color: Color::White,
            holder: "alice".to_string(),
        };
        assert_eq!(ApiError::from(taken).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::from(GameError::UnknownGame(3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(GameError::GameAlreadyOver).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
