//! Place announcement model.

use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    Announcement,
    Offer,
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: EntityId,
    pub place_id: EntityId,
    pub title: String,
    pub content: String,
    /// Serialized as `type` to match the stored schema.
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
    pub place_id: EntityId,
    pub title: String,
    pub content: String,
    pub kind: AnnouncementKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub kind: Option<AnnouncementKind>,
}
