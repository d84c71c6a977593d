use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};

use volt_core::EngineError;
use volt_store::auth::AuthError;
use volt_store::StoreError;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
}

fn engine_status(error: &EngineError) -> StatusCode {
    match error {
        EngineError::StationNotFound { .. }
        | EngineError::SessionNotFound { .. }
        | EngineError::UserNotFound { .. }
        | EngineError::ReviewNotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::NoSlotsAvailable { .. } | EngineError::AlreadyQueued { .. } => {
            StatusCode::CONFLICT
        }
        EngineError::InvalidSlotCounts { .. }
        | EngineError::InvalidPrice { .. }
        | EngineError::InvalidRating { .. }
        | EngineError::InvalidChargeTarget { .. }
        | EngineError::UnknownVehicle { .. } => StatusCode::BAD_REQUEST,
    }
}

pub fn store_error_response(error: StoreError) -> Response {
    let status = match &error {
        StoreError::Engine(engine) => engine_status(engine),
        StoreError::Conflict { .. } => StatusCode::CONFLICT,
        StoreError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

pub fn engine_error_response(error: EngineError) -> Response {
    store_error_response(StoreError::Engine(error))
}

pub fn auth_error_response(error: AuthError) -> Response {
    let status = match &error {
        AuthError::EmailTaken { .. } => StatusCode::CONFLICT,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
