use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use volt_store::memory::ProfilePatch;

use crate::error::store_error_response;
use crate::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.user(user_id) {
        Ok(user) => Json(user).into_response(),
        Err(error) => store_error_response(error),
    }
}

/// Update the mutable parts of a profile: vehicle, theme, tour flag.
/// Loyalty points are only ever changed by completed sessions.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ProfilePatch>,
) -> impl IntoResponse {
    match state.store.update_profile(user_id, payload) {
        Ok(user) => Json(user).into_response(),
        Err(error) => store_error_response(error),
    }
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Path((user_id, station_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    match state.store.add_favorite(user_id, station_id) {
        Ok(user) => Json(user).into_response(),
        Err(error) => store_error_response(error),
    }
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((user_id, station_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    match state.store.remove_favorite(user_id, station_id) {
        Ok(user) => Json(user).into_response(),
        Err(error) => store_error_response(error),
    }
}
