//! Booking service: the only path by which slot counts change.
//!
//! Each operation reads a station snapshot, asks the engine for a plan, and
//! hands the plan to the store's atomic commit. A commit that lost a race
//! (version conflict) is retried from a fresh read, so a concurrent start
//! that took the last slot surfaces as `NoSlotsAvailable` on the re-plan,
//! never as a lost update.

use std::sync::Arc;

use chrono::Utc;

use volt_core::{engine, ActiveSession, Booking};

use crate::memory::MemoryStore;
use crate::StoreError;

const MAX_COMMIT_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct BookingService {
    store: Arc<MemoryStore>,
}

impl BookingService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        BookingService { store }
    }

    /// Start a charging session, taking one slot on the station.
    pub fn start_session(
        &self,
        station_id: uuid::Uuid,
        user_id: uuid::Uuid,
    ) -> Result<ActiveSession, StoreError> {
        for _ in 0..MAX_COMMIT_ATTEMPTS {
            let snapshot = self.store.station(station_id)?;
            let plan = engine::plan_start(&snapshot.station, user_id)?;
            match self.store.commit_start(&plan, snapshot.version) {
                Ok(session) => {
                    tracing::info!(%station_id, %user_id, session_id = %session.id, "session started");
                    return Ok(session);
                }
                Err(StoreError::Conflict { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(StoreError::Conflict { station_id })
    }

    /// Stop a session: billing is computed at the instant of stop, against
    /// the station's pricing as it stands now, then the four stop effects
    /// commit as a unit.
    pub fn stop_session(&self, session_id: uuid::Uuid) -> Result<Booking, StoreError> {
        for _ in 0..MAX_COMMIT_ATTEMPTS {
            let session = self.store.session(session_id)?;
            let snapshot = self.store.station(session.station_id)?;
            let plan = engine::plan_stop(&session, &snapshot.station, Utc::now());
            match self.store.commit_stop(&plan, snapshot.version) {
                Ok(booking) => {
                    tracing::info!(
                        %session_id,
                        station_id = %booking.station_id,
                        kwh = booking.kwh_consumed,
                        cost = booking.cost,
                        "session stopped"
                    );
                    return Ok(booking);
                }
                Err(StoreError::Conflict { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(StoreError::Conflict {
            station_id: self.store.session(session_id)?.station_id,
        })
    }

    /// Join the station's waiting queue. Returns the 1-based position.
    /// Queue membership reserves nothing; a queued user books again once a
    /// slot frees up.
    pub fn join_queue(
        &self,
        station_id: uuid::Uuid,
        user_id: uuid::Uuid,
    ) -> Result<usize, StoreError> {
        for _ in 0..MAX_COMMIT_ATTEMPTS {
            let snapshot = self.store.station(station_id)?;
            let plan = engine::plan_join_queue(&snapshot.station, user_id)?;
            match self.store.commit_join_queue(&plan, snapshot.version) {
                Ok(position) => {
                    tracing::info!(%station_id, %user_id, position, "joined queue");
                    return Ok(position);
                }
                Err(StoreError::Conflict { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(StoreError::Conflict { station_id })
    }
}
