use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use volt_store::auth::IdentityProvider;

use crate::error::auth_error_response;
use crate::AppState;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> impl IntoResponse {
    match state.identity.sign_up(&payload.email, &payload.password) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(error) => auth_error_response(error),
    }
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> impl IntoResponse {
    match state.identity.sign_in(&payload.email, &payload.password) {
        Ok(user) => Json(user).into_response(),
        Err(error) => auth_error_response(error),
    }
}

pub async fn sign_out(State(state): State<AppState>) -> impl IntoResponse {
    state.identity.sign_out();
    StatusCode::NO_CONTENT
}
