//! In-process reference implementation of the record store contract.
//!
//! Five typed collections behind one lock. Station records carry a version
//! that increments on every mutation; the `commit_*` methods are the
//! transaction coordinator: they re-check the caller's observed version and
//! every precondition under the lock, and apply the whole mutation set or
//! none of it. Change notifications are pushed over a broadcast channel
//! after each committed mutation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use volt_core::engine::{QueuePlan, StartPlan, StopPlan};
use volt_core::{
    engine, validate_rating, ActiveSession, Booking, EngineError, Review, SlotCounts, Station,
    StationStatus, Theme, UserRecord, UserRole,
};

use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Stations,
    Sessions,
    Bookings,
    Users,
    Reviews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Pushed to subscribers on every committed record change. Transactional
/// commits emit one event per touched record, after the commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub collection: Collection,
    pub id: uuid::Uuid,
    pub kind: ChangeKind,
}

/// A station read together with the version it had at read time. Commits
/// take this version back and abort on mismatch.
#[derive(Debug, Clone)]
pub struct StationSnapshot {
    pub version: u64,
    pub station: Station,
}

/// Fields accepted when an administrator creates a station.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStation {
    pub name: String,
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    pub slots: SlotCounts,
    pub price_per_kwh: f64,
    #[serde(default)]
    pub current_price: Option<f64>,
    pub status: StationStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub charger_types: Vec<String>,
    #[serde(default)]
    pub mobile: String,
}

/// Field-level patch for station edits. Absent fields are left untouched;
/// the peak override is cleared explicitly, never by omission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub slots: Option<SlotCounts>,
    pub price_per_kwh: Option<f64>,
    pub current_price: Option<f64>,
    #[serde(default)]
    pub clear_current_price: bool,
    pub status: Option<StationStatus>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub charger_types: Option<Vec<String>>,
    pub mobile: Option<String>,
}

/// Field-level patch for the mutable parts of a user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub vehicle: Option<String>,
    pub theme: Option<Theme>,
    pub has_completed_tour: Option<bool>,
}

#[derive(Default)]
struct Inner {
    stations: HashMap<uuid::Uuid, (u64, Station)>,
    sessions: HashMap<uuid::Uuid, ActiveSession>,
    bookings: HashMap<uuid::Uuid, Booking>,
    users: HashMap<uuid::Uuid, UserRecord>,
    reviews: HashMap<uuid::Uuid, Review>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
    events: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        MemoryStore {
            inner: Mutex::new(Inner::default()),
            events,
        }
    }

    /// Receive a change event for every mutation committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Unavailable {
            reason: "store lock poisoned".into(),
        })
    }

    fn emit(&self, collection: Collection, id: uuid::Uuid, kind: ChangeKind) {
        // Nobody listening is fine.
        let _ = self.events.send(ChangeEvent {
            collection,
            id,
            kind,
        });
    }

    // ---- stations ----

    pub fn create_station(&self, new: NewStation) -> Result<Station, StoreError> {
        engine::validate_slots(new.slots.total, new.slots.available)?;
        if new.price_per_kwh <= 0.0 {
            return Err(EngineError::InvalidPrice {
                price: new.price_per_kwh,
            }
            .into());
        }
        let station = Station {
            id: uuid::Uuid::new_v4(),
            name: new.name,
            city: new.city,
            lat: new.lat,
            lng: new.lng,
            slots: new.slots,
            queue: Vec::new(),
            price_per_kwh: new.price_per_kwh,
            current_price: new.current_price,
            status: new.status,
            images: new.images,
            amenities: new.amenities,
            charger_types: new.charger_types,
            mobile: new.mobile,
        };
        self.lock()?
            .stations
            .insert(station.id, (0, station.clone()));
        self.emit(Collection::Stations, station.id, ChangeKind::Created);
        Ok(station)
    }

    pub fn station(&self, station_id: uuid::Uuid) -> Result<StationSnapshot, StoreError> {
        let inner = self.lock()?;
        let (version, station) = inner
            .stations
            .get(&station_id)
            .ok_or(EngineError::StationNotFound { station_id })?;
        Ok(StationSnapshot {
            version: *version,
            station: station.clone(),
        })
    }

    /// All stations, optionally filtered by city, ordered by name.
    pub fn stations(&self, city: Option<&str>) -> Result<Vec<Station>, StoreError> {
        let inner = self.lock()?;
        let mut out: Vec<Station> = inner
            .stations
            .values()
            .map(|(_, s)| s.clone())
            .filter(|s| city.is_none_or(|c| s.city.eq_ignore_ascii_case(c)))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    pub fn update_station(
        &self,
        station_id: uuid::Uuid,
        patch: StationPatch,
    ) -> Result<Station, StoreError> {
        let mut inner = self.lock()?;
        let (version, station) = inner
            .stations
            .get_mut(&station_id)
            .ok_or(EngineError::StationNotFound { station_id })?;
        if let Some(slots) = patch.slots {
            engine::validate_slots(slots.total, slots.available)?;
        }
        if let Some(price) = patch.price_per_kwh {
            if price <= 0.0 {
                return Err(EngineError::InvalidPrice { price }.into());
            }
        }
        if let Some(name) = patch.name {
            station.name = name;
        }
        if let Some(city) = patch.city {
            station.city = city;
        }
        if let Some(lat) = patch.lat {
            station.lat = lat;
        }
        if let Some(lng) = patch.lng {
            station.lng = lng;
        }
        if let Some(slots) = patch.slots {
            station.slots = slots;
        }
        if let Some(price) = patch.price_per_kwh {
            station.price_per_kwh = price;
        }
        if patch.clear_current_price {
            station.current_price = None;
        } else if let Some(peak) = patch.current_price {
            station.current_price = Some(peak);
        }
        if let Some(status) = patch.status {
            station.status = status;
        }
        if let Some(images) = patch.images {
            station.images = images;
        }
        if let Some(amenities) = patch.amenities {
            station.amenities = amenities;
        }
        if let Some(charger_types) = patch.charger_types {
            station.charger_types = charger_types;
        }
        if let Some(mobile) = patch.mobile {
            station.mobile = mobile;
        }
        *version += 1;
        let updated = station.clone();
        drop(inner);
        self.emit(Collection::Stations, station_id, ChangeKind::Updated);
        Ok(updated)
    }

    pub fn delete_station(&self, station_id: uuid::Uuid) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner
            .stations
            .remove(&station_id)
            .ok_or(EngineError::StationNotFound { station_id })?;
        drop(inner);
        self.emit(Collection::Stations, station_id, ChangeKind::Deleted);
        Ok(())
    }

    // ---- sessions & bookings ----

    pub fn session(&self, session_id: uuid::Uuid) -> Result<ActiveSession, StoreError> {
        let inner = self.lock()?;
        inner
            .sessions
            .get(&session_id)
            .cloned()
            .ok_or(EngineError::SessionNotFound { session_id }.into())
    }

    pub fn sessions_for_user(&self, user_id: uuid::Uuid) -> Result<Vec<ActiveSession>, StoreError> {
        let inner = self.lock()?;
        let mut out: Vec<ActiveSession> = inner
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.started_at);
        Ok(out)
    }

    /// Bookings for a user, most recent first.
    pub fn bookings_for_user(&self, user_id: uuid::Uuid) -> Result<Vec<Booking>, StoreError> {
        let inner = self.lock()?;
        let mut out: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    pub fn bookings_for_station(&self, station_id: uuid::Uuid) -> Result<Vec<Booking>, StoreError> {
        let inner = self.lock()?;
        let mut out: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.station_id == station_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    // ---- users ----

    pub fn create_user(&self, email: &str, role: UserRole) -> Result<UserRecord, StoreError> {
        let user = UserRecord::new(uuid::Uuid::new_v4(), email.to_string(), role);
        self.lock()?.users.insert(user.id, user.clone());
        self.emit(Collection::Users, user.id, ChangeKind::Created);
        Ok(user)
    }

    pub fn user(&self, user_id: uuid::Uuid) -> Result<UserRecord, StoreError> {
        let inner = self.lock()?;
        inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or(EngineError::UserNotFound { user_id }.into())
    }

    pub fn delete_user(&self, user_id: uuid::Uuid) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner
            .users
            .remove(&user_id)
            .ok_or(EngineError::UserNotFound { user_id })?;
        drop(inner);
        self.emit(Collection::Users, user_id, ChangeKind::Deleted);
        Ok(())
    }

    pub fn update_profile(
        &self,
        user_id: uuid::Uuid,
        patch: ProfilePatch,
    ) -> Result<UserRecord, StoreError> {
        let mut inner = self.lock()?;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or(EngineError::UserNotFound { user_id })?;
        if let Some(vehicle) = patch.vehicle {
            user.profile.vehicle = vehicle;
        }
        if let Some(theme) = patch.theme {
            user.profile.theme = theme;
        }
        if let Some(done) = patch.has_completed_tour {
            user.profile.has_completed_tour = done;
        }
        let updated = user.clone();
        drop(inner);
        self.emit(Collection::Users, user_id, ChangeKind::Updated);
        Ok(updated)
    }

    /// Add a station to the user's favorites. Adding twice is a no-op.
    pub fn add_favorite(
        &self,
        user_id: uuid::Uuid,
        station_id: uuid::Uuid,
    ) -> Result<UserRecord, StoreError> {
        let mut inner = self.lock()?;
        if !inner.stations.contains_key(&station_id) {
            return Err(EngineError::StationNotFound { station_id }.into());
        }
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or(EngineError::UserNotFound { user_id })?;
        if !user.profile.favorites.contains(&station_id) {
            user.profile.favorites.push(station_id);
        }
        let updated = user.clone();
        drop(inner);
        self.emit(Collection::Users, user_id, ChangeKind::Updated);
        Ok(updated)
    }

    pub fn remove_favorite(
        &self,
        user_id: uuid::Uuid,
        station_id: uuid::Uuid,
    ) -> Result<UserRecord, StoreError> {
        let mut inner = self.lock()?;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or(EngineError::UserNotFound { user_id })?;
        user.profile.favorites.retain(|id| *id != station_id);
        let updated = user.clone();
        drop(inner);
        self.emit(Collection::Users, user_id, ChangeKind::Updated);
        Ok(updated)
    }

    // ---- reviews ----

    pub fn create_review(
        &self,
        station_id: uuid::Uuid,
        user_id: uuid::Uuid,
        username: &str,
        rating: u8,
        text: &str,
    ) -> Result<Review, StoreError> {
        validate_rating(rating)?;
        let mut inner = self.lock()?;
        if !inner.stations.contains_key(&station_id) {
            return Err(EngineError::StationNotFound { station_id }.into());
        }
        let review = Review {
            id: uuid::Uuid::new_v4(),
            user_id,
            username: username.to_string(),
            station_id,
            rating,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        inner.reviews.insert(review.id, review.clone());
        drop(inner);
        self.emit(Collection::Reviews, review.id, ChangeKind::Created);
        Ok(review)
    }

    /// Reviews for a station, most recent first.
    pub fn reviews_for_station(&self, station_id: uuid::Uuid) -> Result<Vec<Review>, StoreError> {
        let inner = self.lock()?;
        let mut out: Vec<Review> = inner
            .reviews
            .values()
            .filter(|r| r.station_id == station_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    pub fn delete_review(&self, review_id: uuid::Uuid) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner
            .reviews
            .remove(&review_id)
            .ok_or(EngineError::ReviewNotFound { review_id })?;
        drop(inner);
        self.emit(Collection::Reviews, review_id, ChangeKind::Deleted);
        Ok(())
    }

    // ---- atomic commits (transaction coordinator) ----

    /// Take one slot and create the session, as a unit.
    ///
    /// Aborts with [`StoreError::Conflict`] when the station changed since
    /// the caller's read; the slot precondition is re-checked under the lock
    /// so a racing start can never drive `available` negative.
    pub fn commit_start(
        &self,
        plan: &StartPlan,
        expected_version: u64,
    ) -> Result<ActiveSession, StoreError> {
        let mut inner = self.lock()?;
        let station_id = plan.station_id;
        let (version, station) = inner
            .stations
            .get_mut(&station_id)
            .ok_or(EngineError::StationNotFound { station_id })?;
        if *version != expected_version {
            return Err(StoreError::Conflict { station_id });
        }
        if station.slots.available == 0 {
            return Err(EngineError::NoSlotsAvailable { station_id }.into());
        }
        station.slots.available -= 1;
        *version += 1;
        let session = ActiveSession {
            id: uuid::Uuid::new_v4(),
            user_id: plan.user_id,
            station_id,
            started_at: Utc::now(),
        };
        inner.sessions.insert(session.id, session.clone());
        drop(inner);
        self.emit(Collection::Stations, station_id, ChangeKind::Updated);
        self.emit(Collection::Sessions, session.id, ChangeKind::Created);
        Ok(session)
    }

    /// Delete the session, free its slot, award loyalty points, and append
    /// the booking, as a unit. Every record is checked before anything is
    /// touched; a missing session, station, or user aborts with no effect.
    pub fn commit_stop(
        &self,
        plan: &StopPlan,
        expected_version: u64,
    ) -> Result<Booking, StoreError> {
        let mut inner = self.lock()?;

        if !inner.sessions.contains_key(&plan.session_id) {
            return Err(EngineError::SessionNotFound {
                session_id: plan.session_id,
            }
            .into());
        }
        if !inner.users.contains_key(&plan.user_id) {
            return Err(EngineError::UserNotFound {
                user_id: plan.user_id,
            }
            .into());
        }
        let station_id = plan.station_id;
        match inner.stations.get(&station_id) {
            None => return Err(EngineError::StationNotFound { station_id }.into()),
            Some((version, _)) if *version != expected_version => {
                return Err(StoreError::Conflict { station_id });
            }
            Some(_) => {}
        }

        inner.sessions.remove(&plan.session_id);
        let (version, station) = inner
            .stations
            .get_mut(&station_id)
            .expect("checked above while holding the lock");
        station.slots.available = (station.slots.available + 1).min(station.slots.total);
        *version += 1;
        let user = inner
            .users
            .get_mut(&plan.user_id)
            .expect("checked above while holding the lock");
        user.profile.loyalty_points += plan.loyalty_award;
        let booking = Booking {
            id: uuid::Uuid::new_v4(),
            user_id: plan.user_id,
            station_id,
            created_at: plan.stopped_at,
            duration_secs: plan.duration_secs,
            kwh_consumed: plan.kwh_consumed,
            cost: plan.cost,
        };
        inner.bookings.insert(booking.id, booking.clone());
        drop(inner);

        self.emit(Collection::Sessions, plan.session_id, ChangeKind::Deleted);
        self.emit(Collection::Stations, station_id, ChangeKind::Updated);
        self.emit(Collection::Users, plan.user_id, ChangeKind::Updated);
        self.emit(Collection::Bookings, booking.id, ChangeKind::Created);
        Ok(booking)
    }

    /// Append the user to the station's waiting queue. The duplicate check
    /// is re-run under the lock.
    pub fn commit_join_queue(
        &self,
        plan: &QueuePlan,
        expected_version: u64,
    ) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let station_id = plan.station_id;
        let (version, station) = inner
            .stations
            .get_mut(&station_id)
            .ok_or(EngineError::StationNotFound { station_id })?;
        if *version != expected_version {
            return Err(StoreError::Conflict { station_id });
        }
        if station.queue.contains(&plan.user_id) {
            return Err(EngineError::AlreadyQueued {
                station_id,
                user_id: plan.user_id,
            }
            .into());
        }
        station.queue.push(plan.user_id);
        let position = station.queue.len();
        *version += 1;
        drop(inner);
        self.emit(Collection::Stations, station_id, ChangeKind::Updated);
        Ok(position)
    }
}
