use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Router,
};
use chess_engine::Color;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{GameId, GameSummary};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::auth::{self, AuthService};
use crate::error::{ApiError, ApiResult};
use crate::game::GameCoordinator;
use crate::store::GameStore;
use crate::ws;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub coordinator: Arc<GameCoordinator>,
}

impl AppState {
    /// Accounts go to `db`; games go to `store`
    pub async fn new(
        db: Pool<Sqlite>,
        store: Arc<dyn GameStore>,
        jwt_secret: &str,
        token_ttl_hours: i64,
    ) -> Result<Self, sqlx::Error> {
        Ok(AppState {
            auth: Arc::new(AuthService::new(db, jwt_secret, token_ttl_hours).await?),
            coordinator: Arc::new(GameCoordinator::new(store)),
        })
    }
}

#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub game_name: String,
}

#[derive(Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub game_id: GameId,
}

#[derive(Serialize, Deserialize)]
pub struct ListGamesResponse {
    pub games: Vec<GameSummary>,
}

/// Seat claim; without a color the caller only wants to watch
#[derive(Deserialize)]
pub struct JoinGameRequest {
    #[serde(default)]
    pub player_color: Option<Color>,
    pub game_id: GameId,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/user", post(auth::register))
        .route("/session", post(auth::login).delete(auth::logout))
        .route("/game", get(list_games).post(create_game).put(join_game))
        .route("/db", delete(clear_db))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}

async fn list_games(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ListGamesResponse>> {
    auth::caller(&state, &headers)?;
    let games = state.coordinator.list_games().await?;
    Ok(Json(ListGamesResponse { games }))
}

async fn create_game(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateGameRequest>,
) -> ApiResult<Json<CreateGameResponse>> {
    let identity = auth::caller(&state, &headers)?;
    let name = payload.game_name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("game_name is required".to_string()));
    }
    let game_id = state.coordinator.create_game(name).await?;
    info!("[LOBBY] {} created game {}", identity, game_id);
    Ok(Json(CreateGameResponse { game_id }))
}

async fn join_game(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<JoinGameRequest>,
) -> ApiResult<Json<Value>> {
    let identity = auth::caller(&state, &headers)?;
    match payload.player_color {
        Some(color) => {
            state
                .coordinator
                .claim_seat(payload.game_id, &identity, color)
                .await?
        }
        None => {
            state.coordinator.snapshot(payload.game_id).await?;
        }
    }
    Ok(Json(json!({})))
}

async fn clear_db(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.coordinator.clear().await?;
    state.auth.clear().await?;
    Ok(Json(json!({})))
}
