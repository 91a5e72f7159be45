//! Private inquiry sent by a user to a place's management.

use super::{EntityId, OwnerResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    Open,
    Answered,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: EntityId,
    pub place_id: EntityId,
    pub user_id: EntityId,
    pub subject: String,
    pub message: String,
    pub status: InquiryStatus,
    pub response: Option<OwnerResponse>,
    pub created_at: DateTime<Utc>,
}
