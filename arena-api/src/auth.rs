use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;

use arena_core::credentials::{hash_password, verify_password};
use arena_core::repository::NewUser;
use arena_shared::models::{Booking, Role};

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub consent: bool,
    pub phone: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MyDataResponse {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub locale: Option<String>,
    pub bookings: Vec<Booking>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError(
            "username, email and password are required".into(),
        ));
    }
    if !req.consent {
        return Err(AppError::ValidationError("consent is required (DSGVO)".into()));
    }

    if state.users.identity_taken(&req.username, &req.email).await? {
        return Err(AppError::ConflictError("username or email already registered".into()));
    }

    let user = state
        .users
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash: hash_password(&req.password),
            role: Role::Citizen,
            phone: req.phone,
            locale: req.locale,
        })
        .await?;

    if let Err(e) = state.audit.append("user.registered", &format!("user {} registered", user.id)).await {
        tracing::error!("audit append failed: {}", e);
    }

    Ok((StatusCode::CREATED, Json(json!({ "message": "Registered" }))))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("invalid credentials".into()))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(AppError::AuthenticationError("invalid credentials".into()));
    }

    let claims = Claims {
        sub: user.id,
        role: user.role,
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Anyhow(anyhow::anyhow!("token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}

/// GET /mydata
pub async fn my_data(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<MyDataResponse>, AppError> {
    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFoundError("user not found".into()))?;
    let bookings = state.bookings.list_for_user(claims.sub).await?;

    Ok(Json(MyDataResponse {
        username: user.username,
        email: user.email,
        phone: user.phone,
        locale: user.locale,
        bookings,
    }))
}

/// DELETE /mydata — right to erasure. Removes the user and cascades to
/// their bookings and reviews; no grace period.
pub async fn delete_my_data(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.users.delete_user_data(claims.sub).await?;
    if !deleted {
        return Err(AppError::NotFoundError("user not found".into()));
    }

    if let Err(e) = state
        .audit
        .append("user.erased", &format!("user {} erased own data", claims.sub))
        .await
    {
        tracing::error!("audit append failed: {}", e);
    }
    // Drop the stale per-user suggestion cache with the account.
    if let Err(e) = state.redis.cache_del(&format!("recommendations:{}", claims.sub)).await {
        tracing::warn!("recommendation cache cleanup failed: {}", e);
    }

    Ok(Json(json!({ "message": "Data deleted (DSGVO)" })))
}
