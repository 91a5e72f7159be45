//! In-memory collections owned by `RelationalStore`, plus lookups and
//! derived queries that only need read access.
//!
//! # Invariants
//! - Collections keep insertion order; derived queries sort copies.
//! - `seed_version` only moves forward.

use super::fanout::LikedIndex;
use super::geo::{distance_km, week_start};
use super::scoring::{integrity_score, IntegritySignals};
use super::{StoreError, StoreResult};
use crate::model::announcement::Announcement;
use crate::model::inquiry::Inquiry;
use crate::model::notification::{Notification, NotificationDraft};
use crate::model::place::Place;
use crate::model::question::{Answer, Question};
use crate::model::review::Review;
use crate::model::subscription::Subscription;
use crate::model::user::User;
use crate::model::{new_entity_id, EntityId, GeoPoint};
use chrono::{DateTime, TimeZone, Utc, Weekday};
use std::cmp::Reverse;

/// Every entity collection held by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub places: Vec<Place>,
    pub reviews: Vec<Review>,
    pub users: Vec<User>,
    pub notifications: Vec<Notification>,
    pub questions: Vec<Question>,
    pub announcements: Vec<Announcement>,
    pub inquiries: Vec<Inquiry>,
    pub subscriptions: Vec<Subscription>,
    pub liked_places: LikedIndex,
    /// Last content seed revision merged into this state.
    pub seed_version: u32,
}

/// Place with its aggregate rating.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedPlace {
    pub place: Place,
    pub average_rating: f64,
    pub review_count: usize,
}

/// Place with its distance from a query point.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPlace {
    pub place: Place,
    pub distance_km: f64,
}

/// One item in a user's activity timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEntry {
    Review(Review),
    Question(Question),
    Answer {
        question_id: EntityId,
        place_id: EntityId,
        answer: Answer,
    },
}

impl TimelineEntry {
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Review(review) => review.created_at,
            Self::Question(question) => question.created_at,
            Self::Answer { answer, .. } => answer.created_at,
        }
    }
}

impl StoreState {
    pub fn place(&self, place_id: &str) -> StoreResult<&Place> {
        self.places
            .iter()
            .find(|place| place.id == place_id)
            .ok_or_else(|| StoreError::not_found("place", place_id))
    }

    pub fn place_mut(&mut self, place_id: &str) -> StoreResult<&mut Place> {
        self.places
            .iter_mut()
            .find(|place| place.id == place_id)
            .ok_or_else(|| StoreError::not_found("place", place_id))
    }

    pub fn review(&self, review_id: &str) -> StoreResult<&Review> {
        self.reviews
            .iter()
            .find(|review| review.id == review_id)
            .ok_or_else(|| StoreError::not_found("review", review_id))
    }

    pub fn review_mut(&mut self, review_id: &str) -> StoreResult<&mut Review> {
        self.reviews
            .iter_mut()
            .find(|review| review.id == review_id)
            .ok_or_else(|| StoreError::not_found("review", review_id))
    }

    pub fn question(&self, question_id: &str) -> StoreResult<&Question> {
        self.questions
            .iter()
            .find(|question| question.id == question_id)
            .ok_or_else(|| StoreError::not_found("question", question_id))
    }

    pub fn question_mut(&mut self, question_id: &str) -> StoreResult<&mut Question> {
        self.questions
            .iter_mut()
            .find(|question| question.id == question_id)
            .ok_or_else(|| StoreError::not_found("question", question_id))
    }

    pub fn announcement(&self, announcement_id: &str) -> StoreResult<&Announcement> {
        self.announcements
            .iter()
            .find(|announcement| announcement.id == announcement_id)
            .ok_or_else(|| StoreError::not_found("announcement", announcement_id))
    }

    pub fn announcement_mut(&mut self, announcement_id: &str) -> StoreResult<&mut Announcement> {
        self.announcements
            .iter_mut()
            .find(|announcement| announcement.id == announcement_id)
            .ok_or_else(|| StoreError::not_found("announcement", announcement_id))
    }

    pub fn inquiry(&self, inquiry_id: &str) -> StoreResult<&Inquiry> {
        self.inquiries
            .iter()
            .find(|inquiry| inquiry.id == inquiry_id)
            .ok_or_else(|| StoreError::not_found("inquiry", inquiry_id))
    }

    pub fn inquiry_mut(&mut self, inquiry_id: &str) -> StoreResult<&mut Inquiry> {
        self.inquiries
            .iter_mut()
            .find(|inquiry| inquiry.id == inquiry_id)
            .ok_or_else(|| StoreError::not_found("inquiry", inquiry_id))
    }

    pub fn user(&self, user_id: &str) -> StoreResult<&User> {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }

    pub fn user_mut(&mut self, user_id: &str) -> StoreResult<&mut User> {
        self.users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|user| user.email == email)
    }

    /// Display name for notification text; unknown ids read as "Someone".
    pub fn display_name(&self, user_id: &str) -> String {
        self.user(user_id)
            .map(|user| user.name.clone())
            .unwrap_or_else(|_| "Someone".to_string())
    }

    /// Adds loyalty points when the user exists; unknown ids are ignored.
    pub fn award_points(&mut self, user_id: &str, points: u32) {
        if let Ok(user) = self.user_mut(user_id) {
            user.loyalty_points = user.loyalty_points.saturating_add(points);
        }
    }

    /// Materializes planned drafts into stored notifications.
    pub fn push_notifications(
        &mut self,
        drafts: Vec<NotificationDraft>,
        now: DateTime<Utc>,
    ) -> Vec<Notification> {
        let created: Vec<Notification> = drafts
            .into_iter()
            .map(|draft| draft.into_notification(new_entity_id(), now))
            .collect();
        self.notifications.extend(created.iter().cloned());
        created
    }

    pub fn is_place_liked(&self, user_id: &str, place_id: &str) -> bool {
        self.liked_places
            .get(user_id)
            .is_some_and(|places| places.contains(place_id))
    }

    /// Arithmetic mean of ratings on `place_id`, 0 when it has no reviews.
    pub fn average_rating(&self, place_id: &str) -> f64 {
        let (sum, count) = self
            .reviews
            .iter()
            .filter(|review| review.place_id == place_id)
            .fold((0u64, 0u64), |(sum, count), review| {
                (sum + u64::from(review.rating), count + 1)
            });
        if count == 0 {
            return 0.0;
        }
        sum as f64 / count as f64
    }

    pub fn review_count(&self, place_id: &str) -> usize {
        self.reviews
            .iter()
            .filter(|review| review.place_id == place_id)
            .count()
    }

    pub fn reviews_by_author_count(&self, user_id: &str) -> usize {
        self.reviews
            .iter()
            .filter(|review| review.user_id == user_id)
            .count()
    }

    /// Places with a positive average, best first; ties go to the place
    /// with more reviews.
    pub fn top_rated_places(&self, limit: usize) -> Vec<RatedPlace> {
        let mut rated: Vec<RatedPlace> = self
            .places
            .iter()
            .map(|place| RatedPlace {
                average_rating: self.average_rating(&place.id),
                review_count: self.review_count(&place.id),
                place: place.clone(),
            })
            .filter(|rated| rated.average_rating > 0.0)
            .collect();
        rated.sort_by(|a, b| {
            b.average_rating
                .total_cmp(&a.average_rating)
                .then_with(|| b.review_count.cmp(&a.review_count))
        });
        rated.truncate(limit);
        rated
    }

    /// Located places within `radius_km` of `origin`, nearest first.
    pub fn nearby_places(&self, origin: GeoPoint, radius_km: f64) -> Vec<NearbyPlace> {
        let mut nearby: Vec<NearbyPlace> = self
            .places
            .iter()
            .filter_map(|place| {
                let location = place.location?;
                let distance = distance_km(origin, location);
                (distance <= radius_km).then(|| NearbyPlace {
                    place: place.clone(),
                    distance_km: distance,
                })
            })
            .collect();
        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby
    }

    /// Reviews by `user_id` created since the start of the week containing
    /// `now`, measured in `now`'s timezone.
    pub fn weekly_reviews_count_at<Tz: TimeZone>(
        &self,
        user_id: &str,
        now: &DateTime<Tz>,
        first_day: Weekday,
    ) -> usize {
        let since = week_start(now, first_day);
        self.reviews
            .iter()
            .filter(|review| review.user_id == user_id && review.created_at >= since)
            .count()
    }

    /// Integrity score of `review` against the current author history.
    ///
    /// A review not yet stored is counted as one more authored review.
    pub fn integrity_score_for(&self, review: &Review) -> u8 {
        let stored = self.reviews.iter().any(|existing| existing.id == review.id);
        let mut author_review_count = self.reviews_by_author_count(&review.user_id);
        if !stored {
            author_review_count += 1;
        }
        integrity_score(IntegritySignals {
            comment_chars: review.comment.chars().count(),
            image_count: review.images.len(),
            author_review_count,
        })
    }

    /// The user's reviews, questions and answers, newest first.
    pub fn timeline(&self, user_id: &str, limit: usize) -> Vec<TimelineEntry> {
        let mut entries: Vec<TimelineEntry> = self
            .reviews
            .iter()
            .filter(|review| review.user_id == user_id)
            .cloned()
            .map(TimelineEntry::Review)
            .collect();
        for question in &self.questions {
            if question.user_id == user_id {
                entries.push(TimelineEntry::Question(question.clone()));
            }
            for answer in question.answers.iter().filter(|a| a.user_id == user_id) {
                entries.push(TimelineEntry::Answer {
                    question_id: question.id.clone(),
                    place_id: question.place_id.clone(),
                    answer: answer.clone(),
                });
            }
        }
        entries.sort_by_key(|entry| Reverse(entry.created_at()));
        entries.truncate(limit);
        entries
    }

    /// Whether `notification` belongs to its recipient's place stream,
    /// judged against ownership at call time.
    pub fn is_place_stream(&self, notification: &Notification) -> bool {
        if !notification.kind.is_place_activity() {
            return false;
        }
        notification
            .place_id
            .as_deref()
            .and_then(|place_id| self.place(place_id).ok())
            .is_some_and(|place| place.is_owned_by(&notification.user_id))
    }
}
