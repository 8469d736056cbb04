//! Accounts and auth tokens
//!
//! Users live in SQLite with argon2 password hashes. A successful register or
//! login issues a JWT whose subject is the username. Tokens can be revoked
//! (logout), and an administrative clear bumps a generation counter so every
//! token issued before it stops resolving.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Json, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row, Sqlite};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::AppState;
use crate::error::{ApiError, ApiResult, GameError, GameResult};
use crate::types::Identity;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub username: String,
    pub auth_token: String,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    jti: String,
    generation: u64,
}

pub struct AuthService {
    db: Pool<Sqlite>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    /// Revoked `jti`s with their expiry; expired ones are pruned on insert
    revoked: Mutex<HashMap<String, usize>>,
    generation: AtomicU64,
}

impl AuthService {
    /// Wrap a pool and make sure the users table exists
    pub async fn new(db: Pool<Sqlite>, secret: &str, ttl_hours: i64) -> Result<Self, sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                email TEXT,
                password_hash TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .execute(&db)
        .await?;

        Ok(AuthService {
            db,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
            revoked: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        })
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> ApiResult<String> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::BadRequest(
                "username and password are required".to_string(),
            ));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?;

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3)",
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => {
                info!("[LOBBY] Registered {}", username);
                self.issue(username)
            }
            Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
                Err(ApiError::AlreadyTaken(format!("username {}", username)))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        let user = sqlx::query("SELECT password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        let stored: String = user.try_get("password_hash")?;
        let parsed = PasswordHash::new(&stored)
            .map_err(|e| ApiError::Internal(format!("stored hash unreadable: {}", e)))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            warn!("[LOBBY] Failed login for {}", username);
            return Err(ApiError::Unauthorized);
        }

        info!("[LOBBY] {} logged in", username);
        self.issue(username)
    }

    /// Revoke a token. Unknown or already revoked tokens are unauthorized.
    pub fn logout(&self, token: &str) -> ApiResult<()> {
        let claims = self.claims(token).map_err(|_| ApiError::Unauthorized)?;
        let now = Utc::now().timestamp().max(0) as usize;
        let mut revoked = self.revoked.lock();
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti, claims.exp);
        drop(revoked);
        info!("[LOBBY] {} logged out", claims.sub);
        Ok(())
    }

    /// Map a token to the identity it was issued for
    pub fn resolve_identity(&self, token: &str) -> GameResult<Identity> {
        self.claims(token).map(|claims| Identity::new(claims.sub))
    }

    /// Delete every account and invalidate every outstanding token
    pub async fn clear(&self) -> ApiResult<()> {
        sqlx::query("DELETE FROM users").execute(&self.db).await?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.revoked.lock().clear();
        warn!("[LOBBY] All accounts cleared");
        Ok(())
    }

    fn issue(&self, username: &str) -> ApiResult<String> {
        let expiration = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ApiError::Internal("token expiry out of range".to_string()))?
            .timestamp();

        let claims = Claims {
            sub: username.to_string(),
            exp: expiration as usize,
            jti: Uuid::new_v4().to_string(),
            generation: self.generation.load(Ordering::SeqCst),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token generation failed: {}", e)))
    }

    fn claims(&self, token: &str) -> GameResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| GameError::Unauthorized)?
            .claims;
        if claims.generation != self.generation.load(Ordering::SeqCst)
            || self.revoked.lock().contains_key(&claims.jti)
        {
            return Err(GameError::Unauthorized);
        }
        Ok(claims)
    }
}

/// Raw token from the `Authorization` header, with or without `Bearer `
pub fn token_from_headers(headers: &HeaderMap) -> ApiResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    Ok(value.strip_prefix("Bearer ").unwrap_or(value).trim())
}

/// Resolve the caller of an HTTP request
pub fn caller(state: &AppState, headers: &HeaderMap) -> ApiResult<Identity> {
    let token = token_from_headers(headers)?;
    Ok(state.auth.resolve_identity(token)?)
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth_token = state
        .auth
        .register(&payload.username, &payload.password, payload.email.as_deref())
        .await?;
    Ok(Json(AuthResponse {
        username: payload.username,
        auth_token,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth_token = state.auth.login(&payload.username, &payload.password).await?;
    Ok(Json(AuthResponse {
        username: payload.username,
        auth_token,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    state.auth.logout(token_from_headers(&headers)?)?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn service() -> AuthService {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        AuthService::new(db, "test-secret", 1).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_then_resolve() {
        let auth = service().await;
        let token = auth.register("alice", "pw", None).await.unwrap();
        assert_eq!(auth.resolve_identity(&token), Ok(Identity::new("alice")));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let auth = service().await;
        assert!(matches!(
            auth.register("", "pw", None).await,
            Err(ApiError::BadRequest(_))
        ));
        auth.register("alice", "pw", Some("a@example.com")).await.unwrap();
        assert!(matches!(
            auth.register("alice", "other", None).await,
            Err(ApiError::AlreadyTaken(_))
        ));
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let auth = service().await;
        auth.register("alice", "pw", None).await.unwrap();

        assert!(auth.login("alice", "pw").await.is_ok());
        assert!(matches!(
            auth.login("alice", "wrong").await,
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            auth.login("nobody", "pw").await,
            Err(ApiError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_logout_revokes_only_that_token() {
        let auth = service().await;
        let first = auth.register("alice", "pw", None).await.unwrap();
        let second = auth.login("alice", "pw").await.unwrap();

        auth.logout(&first).unwrap();
        assert_eq!(auth.resolve_identity(&first), Err(GameError::Unauthorized));
        assert!(auth.resolve_identity(&second).is_ok());
        assert!(auth.logout(&first).is_err());
    }

    #[tokio::test]
    async fn test_logout_prunes_expired_revocations() {
        let auth = service().await;
        auth.revoked.lock().insert("long-gone".to_string(), 1);
        let token = auth.register("alice", "pw", None).await.unwrap();

        auth.logout(&token).unwrap();

        let revoked = auth.revoked.lock();
        assert!(!revoked.contains_key("long-gone"));
        assert_eq!(revoked.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_invalidates_tokens() {
        let auth = service().await;
        let token = auth.register("alice", "pw", None).await.unwrap();

        auth.clear().await.unwrap();
        assert_eq!(auth.resolve_identity(&token), Err(GameError::Unauthorized));
        assert!(auth.register("alice", "pw", None).await.is_ok());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(token_from_headers(&headers), Err(ApiError::Unauthorized)));
    }
}
