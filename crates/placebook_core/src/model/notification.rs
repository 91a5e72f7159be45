//! Notification model.
//!
//! # Invariants
//! - Notifications are write-once fan-out artifacts; only `read` ever changes.
//! - `kind` is a closed set.

use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Review,
    Response,
    Question,
    Answer,
    Announcement,
    Like,
    NewReviewOnLikedPlace,
    NewQuestionOnOwnedPlace,
}

impl NotificationKind {
    /// Kinds addressed to a place manager about activity on that place.
    ///
    /// These are routed to the owner's place stream while the owner still
    /// owns the referenced place.
    pub fn is_place_activity(self) -> bool {
        matches!(
            self,
            Self::Review | Self::Question | Self::NewQuestionOnOwnedPlace
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: EntityId,
    pub user_id: EntityId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub place_id: Option<EntityId>,
    pub review_id: Option<EntityId>,
    pub question_id: Option<EntityId>,
    pub answer_id: Option<EntityId>,
    pub action_url: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification content before id/timestamp assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub user_id: EntityId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub place_id: Option<EntityId>,
    pub review_id: Option<EntityId>,
    pub question_id: Option<EntityId>,
    pub answer_id: Option<EntityId>,
    pub action_url: String,
}

impl NotificationDraft {
    pub fn into_notification(self, id: EntityId, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            place_id: self.place_id,
            review_id: self.review_id,
            question_id: self.question_id,
            answer_id: self.answer_id,
            action_url: self.action_url,
            read: false,
            created_at,
        }
    }
}
