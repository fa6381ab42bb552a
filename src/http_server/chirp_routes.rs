//! Chirp HTTP Routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::storage::{Chirp, MAX_CHIRP_LENGTH};

use super::errors::ApiError;
use super::profanity::clean_body;
use super::state::AppState;

/// Chirp routes, mounted under /api
pub fn chirp_routes() -> Router<AppState> {
    Router::new()
        .route("/chirps", get(list_chirps_handler).post(create_chirp_handler))
        .route("/chirps/:chirp_id", get(get_chirp_handler))
}

#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

/// Reject bodies longer than [`MAX_CHIRP_LENGTH`] characters
///
/// This is the only place chirp length is enforced; the store accepts
/// whatever it is given.
pub fn validate_chirp_body(body: &str) -> Result<(), ApiError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::bad_request("Chirp is too long"));
    }
    Ok(())
}

async fn create_chirp_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateChirpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Chirp>), ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    validate_chirp_body(&request.body)?;

    let body = clean_body(&request.body);
    let chirp = state.with_store(move |store| store.create_chirp(&body)).await?;
    state.metrics.increment_chirps_created();

    Ok((StatusCode::CREATED, Json(chirp)))
}

async fn list_chirps_handler(State(state): State<AppState>) -> Result<Json<Vec<Chirp>>, ApiError> {
    let chirps = state.with_store(|store| store.list_chirps()).await?;
    Ok(Json(chirps))
}

async fn get_chirp_handler(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<Json<Chirp>, ApiError> {
    let id: u64 = chirp_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid chirp ID"))?;

    let chirp = state.with_store(move |store| store.get_chirp(id)).await?;
    Ok(Json(chirp))
}
