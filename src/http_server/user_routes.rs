//! User HTTP Routes
//!
//! Registration, login and the token-protected profile endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::storage::{StorageError, UserPublic};

use super::errors::ApiError;
use super::state::AppState;

/// User routes, mounted under /api
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user_handler))
        .route("/users/me", get(current_user_handler))
        .route("/login", post(login_handler))
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: u64,
    pub email: String,
    pub token: String,
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::AuthenticationRequired)
}

// ==================
// Handlers
// ==================

async fn create_user_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserPublic>), ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state
        .with_store(move |store| store.create_user(&request.email, &request.password))
        .await?;
    state.metrics.increment_users_created();

    Ok((StatusCode::CREATED, Json(user)))
}

async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let requested_ttl = request.expires_in_seconds;

    let result = state
        .with_store(move |store| store.authenticate_user(&request.email, &request.password))
        .await;

    let user = match result {
        Ok(user) => user,
        Err(ApiError::Storage(StorageError::NotFound(_) | StorageError::Unauthorized)) => {
            state.metrics.increment_logins_failed();
            return Err(ApiError::InvalidLogin);
        }
        Err(e) => return Err(e),
    };

    let token = state.tokens.issue(user.id, requested_ttl)?;
    state.metrics.increment_logins_succeeded();

    Ok(Json(LoginResponse {
        id: user.id,
        email: user.email,
        token,
    }))
}

async fn current_user_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserPublic>, ApiError> {
    let token = bearer_token(&headers)?;
    let user_id = state.tokens.validate(token)?;

    let user = state.with_store(move |store| store.get_user(user_id)).await?;
    Ok(Json(user))
}
