//! VoltSpot HTTP API.
//!
//! Station locator and booking endpoints over the record store. Slot
//! mutations only ever go through the booking service's atomic commits;
//! handlers never read-then-write slot counts themselves.

mod auth;
mod error;
mod review;
mod session;
mod station;
mod user;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use volt_store::auth::MemoryIdentity;
use volt_store::memory::MemoryStore;
use volt_store::BookingService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub identity: Arc<MemoryIdentity>,
    pub bookings: BookingService,
}

impl AppState {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(MemoryIdentity::new(store.clone()));
        let bookings = BookingService::new(store.clone());
        AppState {
            store,
            identity,
            bookings,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Create the application router with all endpoints
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/signout", post(auth::sign_out))
        .route(
            "/stations",
            get(station::list_stations).post(station::create_station),
        )
        .route(
            "/stations/{station_id}",
            get(station::get_station)
                .put(station::update_station)
                .delete(station::delete_station),
        )
        .route("/stations/{station_id}/queue", post(session::join_queue))
        .route(
            "/stations/{station_id}/bookings",
            get(station::station_bookings),
        )
        .route(
            "/stations/{station_id}/reviews",
            get(review::list_reviews).post(review::create_review),
        )
        .route("/reviews/{review_id}", delete(review::delete_review))
        .route(
            "/sessions",
            post(session::create_session).get(session::list_sessions),
        )
        .route("/sessions/{session_id}/stop", post(session::stop_session))
        .route("/bookings", get(session::list_bookings))
        .route("/users/{user_id}", get(user::get_user))
        .route("/users/{user_id}/profile", patch(user::update_profile))
        .route(
            "/users/{user_id}/favorites/{station_id}",
            put(user::add_favorite).delete(user::remove_favorite),
        )
        .route("/estimate", post(station::estimate))
        .route("/ev-models", get(station::list_ev_models))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
