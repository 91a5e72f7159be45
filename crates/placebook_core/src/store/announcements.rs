//! Place announcements (news, offers, events).

use super::fanout::{plan_notifications, WriteEvent};
use super::{RelationalStore, StoreResult};
use crate::model::announcement::{Announcement, AnnouncementUpdate, NewAnnouncement};
use crate::model::{new_entity_id, now_utc};
use log::info;

impl RelationalStore {
    /// Publishes an announcement and notifies every user who liked the place.
    ///
    /// Returns `Ok(None)` when `requester_id` does not manage the place.
    pub fn create_announcement(
        &self,
        requester_id: &str,
        input: NewAnnouncement,
    ) -> StoreResult<Option<Announcement>> {
        self.write("create_announcement", |state| {
            if !state.place(&input.place_id)?.is_managed_by(requester_id) {
                return Ok(None);
            }
            let now = now_utc();
            let announcement = Announcement {
                id: new_entity_id(),
                place_id: input.place_id,
                title: input.title,
                content: input.content,
                kind: input.kind,
                is_active: true,
                created_at: now,
            };
            state.announcements.push(announcement.clone());

            let drafts = plan_notifications(
                &WriteEvent::AnnouncementCreated {
                    announcement: &announcement,
                    place: state.place(&announcement.place_id)?,
                },
                &state.liked_places,
            );
            let notified = state.push_notifications(drafts, now).len();
            info!(
                "event=announcement_create module=store status=ok announcement_id={} place_id={} notified={}",
                announcement.id, announcement.place_id, notified
            );
            Ok(Some(announcement))
        })
    }

    /// Announcements of a place, newest first.
    pub fn announcements_for_place(
        &self,
        place_id: &str,
        active_only: bool,
    ) -> StoreResult<Vec<Announcement>> {
        self.read(|state| {
            let mut announcements: Vec<Announcement> = state
                .announcements
                .iter()
                .filter(|a| a.place_id == place_id && (!active_only || a.is_active))
                .cloned()
                .collect();
            announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            announcements
        })
    }

    /// Edits an announcement. Owner or delegate only.
    pub fn update_announcement(
        &self,
        announcement_id: &str,
        requester_id: &str,
        update: AnnouncementUpdate,
    ) -> StoreResult<bool> {
        self.write("update_announcement", |state| {
            let place_id = state.announcement(announcement_id)?.place_id.clone();
            if !state.place(&place_id)?.is_managed_by(requester_id) {
                return Ok(false);
            }
            let announcement = state.announcement_mut(announcement_id)?;
            if let Some(title) = update.title {
                announcement.title = title;
            }
            if let Some(content) = update.content {
                announcement.content = content;
            }
            if let Some(kind) = update.kind {
                announcement.kind = kind;
            }
            Ok(true)
        })
    }

    /// Shows or hides an announcement. Owner or delegate only.
    pub fn set_announcement_active(
        &self,
        announcement_id: &str,
        requester_id: &str,
        is_active: bool,
    ) -> StoreResult<bool> {
        self.write("set_announcement_active", |state| {
            let place_id = state.announcement(announcement_id)?.place_id.clone();
            if !state.place(&place_id)?.is_managed_by(requester_id) {
                return Ok(false);
            }
            state.announcement_mut(announcement_id)?.is_active = is_active;
            Ok(true)
        })
    }

    /// Deletes an announcement. Owner or delegate only.
    pub fn delete_announcement(&self, announcement_id: &str, requester_id: &str) -> StoreResult<bool> {
        self.write("delete_announcement", |state| {
            let place_id = state.announcement(announcement_id)?.place_id.clone();
            if !state.place(&place_id)?.is_managed_by(requester_id) {
                return Ok(false);
            }
            state
                .announcements
                .retain(|announcement| announcement.id != announcement_id);
            Ok(true)
        })
    }
}
