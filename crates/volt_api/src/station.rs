use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use volt_core::estimate::{estimate_charge, ChargeEstimate, EvModel, EV_MODELS};
use volt_store::memory::{NewStation, StationPatch};

use crate::error::{engine_error_response, store_error_response};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationQuery {
    pub city: Option<String>,
}

/// List stations, optionally filtered by city.
pub async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<StationQuery>,
) -> impl IntoResponse {
    match state.store.stations(query.city.as_deref()) {
        Ok(stations) => Json(stations).into_response(),
        Err(error) => store_error_response(error),
    }
}

/// Create a station (administrator action). Slot counts and pricing are
/// validated; `available > total` is rejected.
pub async fn create_station(
    State(state): State<AppState>,
    Json(payload): Json<NewStation>,
) -> impl IntoResponse {
    match state.store.create_station(payload) {
        Ok(station) => {
            tracing::info!(station_id = %station.id, name = %station.name, "station created");
            (StatusCode::CREATED, Json(station)).into_response()
        }
        Err(error) => store_error_response(error),
    }
}

pub async fn get_station(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.station(station_id) {
        Ok(snapshot) => Json(snapshot.station).into_response(),
        Err(error) => store_error_response(error),
    }
}

pub async fn update_station(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
    Json(payload): Json<StationPatch>,
) -> impl IntoResponse {
    match state.store.update_station(station_id, payload) {
        Ok(station) => Json(station).into_response(),
        Err(error) => store_error_response(error),
    }
}

pub async fn delete_station(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.delete_station(station_id) {
        Ok(()) => {
            tracing::info!(%station_id, "station deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(error) => store_error_response(error),
    }
}

/// Completed bookings recorded against a station, most recent first.
pub async fn station_bookings(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.bookings_for_station(station_id) {
        Ok(bookings) => Json(bookings).into_response(),
        Err(error) => store_error_response(error),
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub station_id: Uuid,
    pub vehicle_model: String,
    pub current_soc: u8,
    pub target_soc: u8,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub estimate: ChargeEstimate,
}

/// Estimate energy, cost, and charging time for topping a vehicle up at a
/// station's current effective price.
pub async fn estimate(
    State(state): State<AppState>,
    Json(payload): Json<EstimateRequest>,
) -> impl IntoResponse {
    let snapshot = match state.store.station(payload.station_id) {
        Ok(snapshot) => snapshot,
        Err(error) => return store_error_response(error),
    };
    match estimate_charge(
        &payload.vehicle_model,
        payload.current_soc,
        payload.target_soc,
        &snapshot.station,
    ) {
        Ok(estimate) => Json(EstimateResponse { estimate }).into_response(),
        Err(error) => engine_error_response(error),
    }
}

/// The fixed EV model table backing profile vehicle keys and estimates.
pub async fn list_ev_models() -> Json<&'static [EvModel]> {
    Json(EV_MODELS)
}
