use chess_engine::{Board, Color, GameStatus, Move, RulesEngine};
use serde::{Deserialize, Serialize};

/// Lobby-assigned game identifier, starting at 1
pub type GameId = i64;

/// Commands sent by a client over the game socket
///
/// Every command carries the client's auth token; the server resolves it to
/// an identity per command rather than trusting a username field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(
    tag = "commandType",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientCommand {
    JoinPlayer {
        auth_token: String,
        game_id: GameId,
        player_color: Color,
    },
    JoinObserver {
        auth_token: String,
        game_id: GameId,
    },
    MakeMove {
        auth_token: String,
        game_id: GameId,
        #[serde(rename = "move")]
        mv: Move,
    },
    Leave {
        auth_token: String,
        game_id: GameId,
    },
    Resign {
        auth_token: String,
        game_id: GameId,
    },
}

impl ClientCommand {
    /// Decode one text frame
    pub fn decode(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn auth_token(&self) -> &str {
        match self {
            ClientCommand::JoinPlayer { auth_token, .. }
            | ClientCommand::JoinObserver { auth_token, .. }
            | ClientCommand::MakeMove { auth_token, .. }
            | ClientCommand::Leave { auth_token, .. }
            | ClientCommand::Resign { auth_token, .. } => auth_token,
        }
    }

    pub fn game_id(&self) -> GameId {
        match self {
            ClientCommand::JoinPlayer { game_id, .. }
            | ClientCommand::JoinObserver { game_id, .. }
            | ClientCommand::MakeMove { game_id, .. }
            | ClientCommand::Leave { game_id, .. }
            | ClientCommand::Resign { game_id, .. } => *game_id,
        }
    }

    /// Wire name of the command, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ClientCommand::JoinPlayer { .. } => "JOIN_PLAYER",
            ClientCommand::JoinObserver { .. } => "JOIN_OBSERVER",
            ClientCommand::MakeMove { .. } => "MAKE_MOVE",
            ClientCommand::Leave { .. } => "LEAVE",
            ClientCommand::Resign { .. } => "RESIGN",
        }
    }
}

/// Messages pushed from the server to a connected client
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(
    tag = "serverMessageType",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Full game state
    LoadGame { game: GameSnapshot },
    /// Human-readable notice ("alice joined as white")
    Notification { message: String },
    /// Sent only to the connection whose command failed
    Error { code: String, error_message: String },
}

impl ServerMessage {
    pub fn notification(message: impl Into<String>) -> Self {
        ServerMessage::Notification {
            message: message.into(),
        }
    }

    pub fn error(code: &str, error_message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            error_message: error_message.into(),
        }
    }

    pub fn decode(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Everything a client needs to redraw a game
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub game_name: String,
    pub board: Board,
    pub side_to_move: Color,
    pub status: GameStatus,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
}

impl GameSnapshot {
    pub fn new(
        game_id: GameId,
        game_name: &str,
        engine: &RulesEngine,
        white_username: Option<&str>,
        black_username: Option<&str>,
    ) -> Self {
        GameSnapshot {
            game_id,
            game_name: game_name.to_string(),
            board: engine.board().clone(),
            side_to_move: engine.side_to_move(),
            status: engine.status(),
            white_username: white_username.map(str::to_string),
            black_username: black_username.map(str::to_string),
        }
    }
}

/// Lobby listing row; never exposes the board
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub game_id: GameId,
    pub game_name: String,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::{PieceKind, Position};
    use serde_json::{json, Value};

    #[test]
    fn test_make_move_command_decodes() {
        let text = json!({
            "commandType": "MAKE_MOVE",
            "authToken": "abc",
            "gameId": 7,
            "move": {
                "from": {"row": 7, "col": 1},
                "to": {"row": 8, "col": 1},
                "promotion": "QUEEN"
            }
        })
        .to_string();

        let command = ClientCommand::decode(&text).expect("Should decode");
        assert_eq!(command.game_id(), 7);
        assert_eq!(command.auth_token(), "abc");
        assert_eq!(command.kind(), "MAKE_MOVE");
        match command {
            ClientCommand::MakeMove { mv, .. } => {
                assert_eq!(mv.from, Position::new(7, 1).unwrap());
                assert_eq!(mv.promotion, Some(PieceKind::Queen));
            }
            _ => panic!("Wrong command type"),
        }
    }

    #[test]
    fn test_promotion_field_is_optional() {
        let text = r#"{"commandType":"MAKE_MOVE","authToken":"t","gameId":1,
            "move":{"from":{"row":2,"col":5},"to":{"row":4,"col":5}}}"#;
        let command = ClientCommand::decode(text).expect("Should decode");
        assert!(matches!(
            command,
            ClientCommand::MakeMove { mv, .. } if mv.to_string() == "e2-e4"
        ));
    }

    #[test]
    fn test_join_player_command_decodes() {
        let text = r#"{"commandType":"JOIN_PLAYER","authToken":"t","gameId":3,"playerColor":"BLACK"}"#;
        assert_eq!(
            ClientCommand::decode(text).expect("Should decode"),
            ClientCommand::JoinPlayer {
                auth_token: "t".to_string(),
                game_id: 3,
                player_color: Color::Black,
            }
        );
    }

    #[test]
    fn test_out_of_range_square_rejected() {
        let text = r#"{"commandType":"MAKE_MOVE","authToken":"t","gameId":1,
            "move":{"from":{"row":0,"col":5},"to":{"row":9,"col":5}}}"#;
        assert!(ClientCommand::decode(text).is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        assert!(ClientCommand::decode(r#"{"commandType":"LEAVE","authToken":"t"}"#).is_err());
        assert!(ClientCommand::decode(r#"{"commandType":"DANCE","authToken":"t","gameId":1}"#).is_err());
        assert!(ClientCommand::decode("not json").is_err());
    }

    #[test]
    fn test_error_message_shape() {
        let msg = ServerMessage::error("SEAT_TAKEN", "white is taken");
        let value: Value = serde_json::from_str(&msg.encode().unwrap()).unwrap();

        assert_eq!(value["serverMessageType"], "ERROR");
        assert_eq!(value["code"], "SEAT_TAKEN");
        assert_eq!(value["errorMessage"], "white is taken");
    }

    #[test]
    fn test_load_game_snapshot() {
        let engine = RulesEngine::new();
        let msg = ServerMessage::LoadGame {
            game: GameSnapshot::new(1, "friday", &engine, Some("alice"), None),
        };
        let text = msg.encode().unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["serverMessageType"], "LOAD_GAME");
        assert_eq!(value["game"]["side_to_move"], "WHITE");
        assert_eq!(value["game"]["status"]["state"], "IN_PROGRESS");
        assert_eq!(value["game"]["white_username"], "alice");
        assert!(value["game"]["black_username"].is_null());
        assert_eq!(ServerMessage::decode(&text).unwrap(), msg);
    }
}
