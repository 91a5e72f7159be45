//! Time-boxed feature entitlement.
//!
//! # Invariants
//! - `expires_at` is fixed at creation; cancellation only clears `is_active`.

use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: EntityId,
    pub user_id: EntityId,
    pub plan: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Returns whether the entitlement is usable at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.started_at <= now && now < self.expires_at
    }
}
