//! Place domain model.
//!
//! # Responsibility
//! - Describe a reviewable location and its management rights.
//!
//! # Invariants
//! - `owner_id` empty implies `is_claimed == false`.
//! - `delegated_users` never contains duplicates.
//! - Places are never deleted.

use super::{EntityId, GeoPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: EntityId,
    /// Empty string means unclaimed.
    pub owner_id: EntityId,
    pub is_claimed: bool,
    #[serde(default)]
    pub delegated_users: Vec<EntityId>,
    pub name: String,
    pub category: String,
    pub description: String,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    /// Lowercase weekday name to display range, e.g. `monday -> 09:00-18:00`.
    #[serde(default)]
    pub hours: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Returns whether `user_id` holds owner-equivalent rights.
    pub fn is_managed_by(&self, user_id: &str) -> bool {
        if user_id.is_empty() {
            return false;
        }
        self.owner_id == user_id || self.delegated_users.iter().any(|id| id == user_id)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.owner_id == user_id
    }
}

/// Creation input for a place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlace {
    pub name: String,
    pub category: String,
    pub description: String,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    pub hours: BTreeMap<String, String>,
    /// Empty for an unclaimed place.
    pub owner_id: EntityId,
}

/// Partial place edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    pub hours: Option<BTreeMap<String, String>>,
}

impl Place {
    pub fn apply(&mut self, update: PlaceUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        if let Some(location) = update.location {
            self.location = Some(location);
        }
        if let Some(hours) = update.hours {
            self.hours = hours;
        }
    }
}
