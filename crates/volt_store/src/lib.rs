pub mod auth;
pub mod memory;
mod service;

pub use crate::service::BookingService;

use thiserror::Error;
use volt_core::EngineError;

/// Failures surfaced by the record store. A `Conflict` means a commit lost
/// the race against a concurrent mutation of the same station and nothing
/// was applied; the caller retries from a fresh read or gives up.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("transaction conflict on station {station_id}")]
    Conflict { station_id: uuid::Uuid },
    #[error("backend unavailable: {reason}")]
    Unavailable { reason: String },
}
