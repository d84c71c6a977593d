//! Slot accounting engine.
//!
//! Pure decision logic: given a snapshot of a station (and, for stops, the
//! owning session), validate a requested action and describe the mutation set
//! the store must apply atomically. No I/O happens here; the store re-checks
//! each precondition under its own lock at commit time.

use chrono::{DateTime, Utc};

use crate::models::{ActiveSession, Station};
use crate::EngineError;

/// Charging power applied uniformly to every session, regardless of the
/// declared charger types of the station. Kept fixed for numeric parity with
/// historical booking records.
pub const CHARGING_POWER_KW: f64 = 25.0;

/// Loyalty points awarded per completed session.
pub const LOYALTY_AWARD: u32 = 10;

/// Mutation set for a session start: one slot is taken and a session record
/// is created. The start timestamp is assigned by the store at commit.
#[derive(Debug, Clone, PartialEq)]
pub struct StartPlan {
    pub station_id: uuid::Uuid,
    pub user_id: uuid::Uuid,
}

/// Mutation set for a session stop. All four effects (delete session, free
/// the slot, award loyalty points, append the booking) commit together or
/// not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct StopPlan {
    pub session_id: uuid::Uuid,
    pub station_id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub stopped_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub kwh_consumed: f64,
    pub cost: f64,
    pub loyalty_award: u32,
}

/// Mutation set for a queue join: the user is appended at the tail.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuePlan {
    pub station_id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    /// 1-based display position the user will hold after the append.
    pub position: usize,
}

/// The price a stopping session is billed at: the peak override when it is
/// set and strictly above the base price, the base price otherwise.
pub fn effective_price(station: &Station) -> f64 {
    match station.current_price {
        Some(peak) if peak > station.price_per_kwh => peak,
        _ => station.price_per_kwh,
    }
}

/// Simulated energy delivered over `duration_secs` at the fixed rate.
pub fn energy_consumed(duration_secs: i64) -> f64 {
    duration_secs as f64 / 3600.0 * CHARGING_POWER_KW
}

/// Validate a StartSession request against a station snapshot.
///
/// Fails with [`EngineError::NoSlotsAvailable`] when the station is full;
/// the caller should offer [`plan_join_queue`] instead. The slot count is
/// never touched on failure.
pub fn plan_start(
    station: &Station,
    user_id: uuid::Uuid,
) -> Result<StartPlan, EngineError> {
    if station.slots.available == 0 {
        return Err(EngineError::NoSlotsAvailable {
            station_id: station.id,
        });
    }
    Ok(StartPlan {
        station_id: station.id,
        user_id,
    })
}

/// Compute the stop-time mutation set for a session.
///
/// Duration is floored to whole seconds and clamped at zero; energy follows
/// the fixed-rate model; cost uses the pricing in effect *now*, not at start
/// time, so a peak surcharge raised mid-session is billed.
pub fn plan_stop(
    session: &ActiveSession,
    station: &Station,
    now: DateTime<Utc>,
) -> StopPlan {
    let duration_secs = (now - session.started_at).num_seconds().max(0);
    let kwh_consumed = energy_consumed(duration_secs);
    let cost = kwh_consumed * effective_price(station);
    tracing::debug!(session_id = %session.id, duration_secs, kwh_consumed, cost, "computed stop plan");
    StopPlan {
        session_id: session.id,
        station_id: station.id,
        user_id: session.user_id,
        stopped_at: now,
        duration_secs,
        kwh_consumed,
        cost,
        loyalty_award: LOYALTY_AWARD,
    }
}

/// Validate a JoinQueue request against a station snapshot.
///
/// A user already in the queue is rejected with
/// [`EngineError::AlreadyQueued`] rather than silently ignored, so the
/// caller can surface the condition.
pub fn plan_join_queue(
    station: &Station,
    user_id: uuid::Uuid,
) -> Result<QueuePlan, EngineError> {
    if station.queue.contains(&user_id) {
        return Err(EngineError::AlreadyQueued {
            station_id: station.id,
            user_id,
        });
    }
    Ok(QueuePlan {
        station_id: station.id,
        user_id,
        position: station.queue.len() + 1,
    })
}

/// Validate slot counts submitted on station create or edit.
pub fn validate_slots(total: u32, available: u32) -> Result<(), EngineError> {
    if available > total {
        return Err(EngineError::InvalidSlotCounts { total, available });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::{SlotCounts, StationStatus};
    use chrono::TimeZone;

    fn test_station(total: u32, available: u32) -> Station {
        Station {
            id: uuid::Uuid::new_v4(),
            name: "Riverside Hub".into(),
            city: "Lyon".into(),
            lat: 45.76,
            lng: 4.84,
            slots: SlotCounts { total, available },
            queue: Vec::new(),
            price_per_kwh: 0.40,
            current_price: None,
            status: StationStatus::Operational,
            images: Vec::new(),
            amenities: Vec::new(),
            charger_types: vec!["CCS".into()],
            mobile: "+33400000000".into(),
        }
    }

    fn test_session(station: &Station, started_at: DateTime<Utc>) -> ActiveSession {
        ActiveSession {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            station_id: station.id,
            started_at,
        }
    }

    #[test]
    fn start_requires_a_free_slot() {
        let station = test_station(2, 1);
        let user = uuid::Uuid::new_v4();

        let plan = plan_start(&station, user).expect("one slot is free");
        assert_eq!(plan.station_id, station.id);
        assert_eq!(plan.user_id, user);

        let full = test_station(2, 0);
        match plan_start(&full, user) {
            Err(EngineError::NoSlotsAvailable { station_id }) => {
                assert_eq!(station_id, full.id);
            }
            other => panic!("expected NoSlotsAvailable, got {other:?}"),
        }
    }

    #[test]
    fn stop_derives_duration_energy_and_cost() {
        let station = test_station(4, 2);
        let started = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let stopped = Utc.with_ymd_and_hms(2025, 3, 1, 11, 12, 0).unwrap();
        let session = test_session(&station, started);

        let plan = plan_stop(&session, &station, stopped);
        assert_eq!(plan.duration_secs, 4320);
        // 1.2 h at 25 kW
        assert!((plan.kwh_consumed - 30.0).abs() < 1e-9);
        assert!((plan.cost - 30.0 * 0.40).abs() < 1e-9);
        assert_eq!(plan.loyalty_award, 10);
    }

    #[test]
    fn stop_bills_the_peak_price_when_it_is_higher() {
        let mut station = test_station(4, 2);
        station.current_price = Some(0.55);
        let started = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let stopped = started + chrono::Duration::hours(2);
        let session = test_session(&station, started);

        let plan = plan_stop(&session, &station, stopped);
        assert!((plan.cost - 50.0 * 0.55).abs() < 1e-9);

        // An override at or below the base price is not a surcharge.
        station.current_price = Some(0.30);
        let plan = plan_stop(&session, &station, stopped);
        assert!((plan.cost - 50.0 * 0.40).abs() < 1e-9);
    }

    #[test]
    fn stop_clamps_clock_skew_to_zero_duration() {
        let station = test_station(1, 0);
        let started = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let session = test_session(&station, started);

        let plan = plan_stop(&session, &station, started - chrono::Duration::seconds(5));
        assert_eq!(plan.duration_secs, 0);
        assert_eq!(plan.kwh_consumed, 0.0);
        assert_eq!(plan.cost, 0.0);
    }

    #[test]
    fn queue_rejects_duplicates_and_orders_by_arrival() {
        let mut station = test_station(1, 0);
        let first = uuid::Uuid::new_v4();
        let second = uuid::Uuid::new_v4();

        let plan = plan_join_queue(&station, first).expect("queue is empty");
        assert_eq!(plan.position, 1);
        station.queue.push(first);

        let plan = plan_join_queue(&station, second).expect("not yet queued");
        assert_eq!(plan.position, 2);
        station.queue.push(second);

        match plan_join_queue(&station, first) {
            Err(EngineError::AlreadyQueued { user_id, .. }) => assert_eq!(user_id, first),
            other => panic!("expected AlreadyQueued, got {other:?}"),
        }
    }

    #[test]
    fn slot_validation_rejects_available_above_total() {
        assert!(validate_slots(4, 4).is_ok());
        assert!(validate_slots(4, 0).is_ok());
        match validate_slots(2, 3) {
            Err(EngineError::InvalidSlotCounts { total, available }) => {
                assert_eq!((total, available), (2, 3));
            }
            other => panic!("expected InvalidSlotCounts, got {other:?}"),
        }
    }
}
