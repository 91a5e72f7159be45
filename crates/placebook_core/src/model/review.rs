//! Review domain model.
//!
//! # Invariants
//! - `verified == (integrity_score >= VERIFIED_THRESHOLD)` after every
//!   create or update performed by the store.
//! - `likes` holds each user id at most once.

use super::{EntityId, OwnerResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Integrity score at or above which a review is marked verified.
pub const VERIFIED_THRESHOLD: u8 = 70;

/// Optional structured detail attached to a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetails {
    pub service: Option<u8>,
    pub value: Option<u8>,
    pub atmosphere: Option<u8>,
    /// Free-form visit date as entered by the author.
    pub visited_on: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: EntityId,
    pub place_id: EntityId,
    pub user_id: EntityId,
    /// 1..=5 by convention; not validated here.
    pub rating: u8,
    pub comment: String,
    pub details: Option<ReviewDetails>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub likes: Vec<EntityId>,
    #[serde(default)]
    pub reports: u32,
    pub integrity_score: u8,
    pub verified: bool,
    pub owner_response: Option<OwnerResponse>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Stores a freshly computed score and re-derives `verified` with it.
    pub fn set_integrity_score(&mut self, score: u8) {
        self.integrity_score = score;
        self.verified = score >= VERIFIED_THRESHOLD;
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

/// Creation input for a review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewReview {
    pub place_id: EntityId,
    pub user_id: EntityId,
    pub rating: u8,
    pub comment: String,
    pub details: Option<ReviewDetails>,
    pub images: Vec<String>,
}

/// Author edit of a review. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub details: Option<ReviewDetails>,
    pub images: Option<Vec<String>>,
}

impl ReviewUpdate {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none()
            && self.comment.is_none()
            && self.details.is_none()
            && self.images.is_none()
    }
}
