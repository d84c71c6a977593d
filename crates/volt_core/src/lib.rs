pub mod engine;
pub mod estimate;
mod models;

pub use crate::models::*;

use thiserror::Error;

/// Failures of the slot accounting engine and input validation. Every
/// variant is scoped to the single requested action; nothing here is
/// fatal to the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("station {station_id} not found")]
    StationNotFound { station_id: uuid::Uuid },
    #[error("session {session_id} not found")]
    SessionNotFound { session_id: uuid::Uuid },
    #[error("user {user_id} not found")]
    UserNotFound { user_id: uuid::Uuid },
    #[error("review {review_id} not found")]
    ReviewNotFound { review_id: uuid::Uuid },
    #[error("no slots available at station {station_id}")]
    NoSlotsAvailable { station_id: uuid::Uuid },
    #[error("user {user_id} is already queued at station {station_id}")]
    AlreadyQueued {
        station_id: uuid::Uuid,
        user_id: uuid::Uuid,
    },
    #[error("available slots ({available}) cannot exceed total ({total})")]
    InvalidSlotCounts { total: u32, available: u32 },
    #[error("price per kWh must be positive, got {price}")]
    InvalidPrice { price: f64 },
    #[error("rating must be between 1 and 5, got {rating}")]
    InvalidRating { rating: u8 },
    #[error("target charge {target_soc}% must be above current {current_soc}% and at most 100%")]
    InvalidChargeTarget { current_soc: u8, target_soc: u8 },
    #[error("unknown vehicle model '{model}'")]
    UnknownVehicle { model: String },
}

/// Validate a review rating (1 to 5 inclusive).
pub fn validate_rating(rating: u8) -> Result<(), EngineError> {
    if !(1..=5).contains(&rating) {
        return Err(EngineError::InvalidRating { rating });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }
}
