use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::store_error_response;
use crate::AppState;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReviewRequest {
    pub user_id: Uuid,
    pub username: String,
    pub rating: u8,
    pub text: String,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.reviews_for_station(station_id) {
        Ok(reviews) => Json(reviews).into_response(),
        Err(error) => store_error_response(error),
    }
}

pub async fn create_review(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
    Json(payload): Json<NewReviewRequest>,
) -> impl IntoResponse {
    match state.store.create_review(
        station_id,
        payload.user_id,
        &payload.username,
        payload.rating,
        &payload.text,
    ) {
        Ok(review) => (StatusCode::CREATED, Json(review)).into_response(),
        Err(error) => store_error_response(error),
    }
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.delete_review(review_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => store_error_response(error),
    }
}
