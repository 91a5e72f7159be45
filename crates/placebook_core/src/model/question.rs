//! Question/answer domain model.
//!
//! # Invariants
//! - Answers are owned exclusively by their parent question; removing the
//!   question removes every answer with it.
//! - `answers` keeps insertion order.

use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: EntityId,
    pub user_id: EntityId,
    pub text: String,
    /// Set when the answerer managed the place at answer time.
    pub is_owner: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: EntityId,
    pub place_id: EntityId,
    pub user_id: EntityId,
    pub question: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn answer(&self, answer_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|answer| answer.id == answer_id)
    }

    pub fn answer_mut(&mut self, answer_id: &str) -> Option<&mut Answer> {
        self.answers.iter_mut().find(|answer| answer.id == answer_id)
    }
}
