use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StationStatus {
    Operational,
    Maintenance,
}

/// Slot capacity of a station. `available` never exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCounts {
    pub total: u32,
    pub available: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: uuid::Uuid,
    pub name: String,
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    pub slots: SlotCounts,
    /// Waiting users in arrival order. Advisory only: nothing promotes a
    /// queued user into a session when a slot frees up.
    pub queue: Vec<uuid::Uuid>,
    pub price_per_kwh: f64,
    /// Peak override. In effect only while strictly greater than the base price.
    pub current_price: Option<f64>,
    pub status: StationStatus,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub charger_types: Vec<String>,
    pub mobile: String,
}

impl Station {
    pub fn occupied(&self) -> u32 {
        self.slots.total - self.slots.available
    }
}

/// An in-progress charging occupancy, holding one slot on its station.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub station_id: uuid::Uuid,
    pub started_at: DateTime<Utc>,
}

/// Immutable record of a completed session. Energy and cost are derived at
/// stop time and never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub station_id: uuid::Uuid,
    pub created_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub kwh_consumed: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub username: String,
    pub station_id: uuid::Uuid,
    pub rating: u8,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub favorites: Vec<uuid::Uuid>,
    /// Key into the fixed EV model table, see [`crate::estimate::ev_model`].
    pub vehicle: String,
    pub theme: Theme,
    pub loyalty_points: u32,
    pub has_completed_tour: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            favorites: Vec::new(),
            vehicle: String::new(),
            theme: Theme::Light,
            loyalty_points: 0,
            has_completed_tour: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: uuid::Uuid,
    pub email: String,
    pub role: UserRole,
    pub profile: UserProfile,
}

impl UserRecord {
    pub fn new(id: uuid::Uuid, email: String, role: UserRole) -> Self {
        UserRecord {
            id,
            email,
            role,
            profile: UserProfile::default(),
        }
    }
}
