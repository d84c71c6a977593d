use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use volt_core::{ActiveSession, Booking};

use crate::error::store_error_response;
use crate::AppState;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub station_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session: ActiveSession,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking: Booking,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueRequest {
    pub user_id: Uuid,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    /// 1-based position in the waiting queue.
    pub position: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// Start a charging session: takes one slot on the station atomically.
/// Full stations answer 409; callers should offer the queue instead.
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<StartSessionRequest>,
) -> impl IntoResponse {
    match state.bookings.start_session(payload.station_id, payload.user_id) {
        Ok(session) => (StatusCode::OK, Json(SessionResponse { session })).into_response(),
        Err(error) => store_error_response(error),
    }
}

/// Stop a charging session. Billing is derived at this instant; the freed
/// slot, loyalty award, and booking record commit together.
pub async fn stop_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.bookings.stop_session(session_id) {
        Ok(booking) => (StatusCode::OK, Json(BookingResponse { booking })).into_response(),
        Err(error) => store_error_response(error),
    }
}

/// Active sessions belonging to a user.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    match state.store.sessions_for_user(query.user_id) {
        Ok(sessions) => Json(sessions).into_response(),
        Err(error) => store_error_response(error),
    }
}

/// Join a station's waiting queue (no slot is reserved).
pub async fn join_queue(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
    Json(payload): Json<JoinQueueRequest>,
) -> impl IntoResponse {
    match state.bookings.join_queue(station_id, payload.user_id) {
        Ok(position) => (StatusCode::OK, Json(QueueResponse { position })).into_response(),
        Err(error) => store_error_response(error),
    }
}

/// A user's booking history, most recent first.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> impl IntoResponse {
    match state.store.bookings_for_user(query.user_id) {
        Ok(bookings) => Json(bookings).into_response(),
        Err(error) => store_error_response(error),
    }
}
