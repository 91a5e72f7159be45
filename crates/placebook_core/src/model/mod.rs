//! Typed entity model for the place-discovery store.
//!
//! # Responsibility
//! - Define canonical data structures held by `RelationalStore`.
//! - Own the serialized (camelCase, RFC 3339 timestamps) shape of each entity.
//!
//! # Invariants
//! - Every entity is identified by an opaque string id, never reused.
//! - Timestamps are `DateTime<Utc>` so persistence round-trips losslessly.

pub mod announcement;
pub mod inquiry;
pub mod notification;
pub mod place;
pub mod question;
pub mod review;
pub mod subscription;
pub mod user;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier shared by every entity collection.
pub type EntityId = String;

/// Generates a fresh, never-reused entity id.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4().to_string()
}

/// Current wall-clock timestamp used for `createdAt`-style fields.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Geographic coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Response text attached by a place manager to a review or inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub text: String,
    pub responded_at: DateTime<Utc>,
}
