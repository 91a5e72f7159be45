//! Notification read-state API and personal/place stream partitioning.
//!
//! The split between streams is derived on every read from the
//! notification kind, its place and who owns that place right now.

use super::{RelationalStore, StoreError, StoreResult};
use crate::model::notification::{Notification, NotificationDraft};
use crate::model::{new_entity_id, now_utc};
use log::info;

impl RelationalStore {
    /// Stores a standalone notification.
    pub fn create_notification(&self, draft: NotificationDraft) -> StoreResult<Notification> {
        self.write("create_notification", |state| {
            let notification = draft.into_notification(new_entity_id(), now_utc());
            state.notifications.push(notification.clone());
            Ok(notification)
        })
    }

    /// Every notification addressed to `user_id`, newest first.
    pub fn notifications_for(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        self.read(|state| {
            let mut items: Vec<Notification> = state
                .notifications
                .iter()
                .filter(|n| n.user_id == user_id)
                .cloned()
                .collect();
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            items
        })
    }

    /// Notifications about the user's own activity, excluding activity on
    /// places the user currently owns.
    pub fn personal_notifications(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        self.read(|state| {
            let mut items: Vec<Notification> = state
                .notifications
                .iter()
                .filter(|n| n.user_id == user_id && !state.is_place_stream(n))
                .cloned()
                .collect();
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            items
        })
    }

    /// Reviews/questions on places the user currently owns.
    pub fn place_notifications(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        self.read(|state| {
            let mut items: Vec<Notification> = state
                .notifications
                .iter()
                .filter(|n| n.user_id == user_id && state.is_place_stream(n))
                .cloned()
                .collect();
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            items
        })
    }

    pub fn unread_personal_count(&self, user_id: &str) -> StoreResult<usize> {
        self.read(|state| {
            state
                .notifications
                .iter()
                .filter(|n| n.user_id == user_id && !n.read && !state.is_place_stream(n))
                .count()
        })
    }

    pub fn unread_place_count(&self, user_id: &str) -> StoreResult<usize> {
        self.read(|state| {
            state
                .notifications
                .iter()
                .filter(|n| n.user_id == user_id && !n.read && state.is_place_stream(n))
                .count()
        })
    }

    /// Marks one notification read. Recipient only.
    pub fn mark_read(&self, notification_id: &str, user_id: &str) -> StoreResult<bool> {
        self.write("mark_read", |state| {
            let notification = state
                .notifications
                .iter_mut()
                .find(|n| n.id == notification_id)
                .ok_or_else(|| StoreError::not_found("notification", notification_id))?;
            if notification.user_id != user_id {
                return Ok(false);
            }
            notification.read = true;
            Ok(true)
        })
    }

    /// Marks every notification of the user read. Returns how many changed.
    pub fn mark_all_read(&self, user_id: &str) -> StoreResult<usize> {
        self.write("mark_all_read", |state| {
            let mut changed = 0;
            for notification in state
                .notifications
                .iter_mut()
                .filter(|n| n.user_id == user_id && !n.read)
            {
                notification.read = true;
                changed += 1;
            }
            info!("event=notifications_read_all module=store status=ok changed={changed}");
            Ok(changed)
        })
    }
}
