//! Review operations: authoring, likes, reports and owner responses.

use super::fanout::{plan_notifications, WriteEvent};
use super::state::TimelineEntry;
use super::{RelationalStore, StoreResult};
use crate::model::review::{NewReview, Review, ReviewUpdate};
use crate::model::{new_entity_id, now_utc, OwnerResponse};
use chrono::{DateTime, Local, TimeZone};
use log::info;

/// Loyalty points granted for each published review.
pub const REVIEW_LOYALTY_POINTS: u32 = 10;

impl RelationalStore {
    /// Publishes a review, scores it, and notifies the place owner and
    /// every other user who liked the place.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when the place does not exist.
    pub fn create_review(&self, input: NewReview) -> StoreResult<Review> {
        self.write("create_review", |state| {
            let now = now_utc();
            state.place(&input.place_id)?;

            let mut review = Review {
                id: new_entity_id(),
                place_id: input.place_id,
                user_id: input.user_id,
                rating: input.rating,
                comment: input.comment,
                details: input.details,
                images: input.images,
                likes: Vec::new(),
                reports: 0,
                integrity_score: 0,
                verified: false,
                owner_response: None,
                created_at: now,
            };
            let score = state.integrity_score_for(&review);
            review.set_integrity_score(score);
            state.reviews.push(review.clone());
            state.award_points(&review.user_id, REVIEW_LOYALTY_POINTS);

            let reviewer_name = state.display_name(&review.user_id);
            let drafts = plan_notifications(
                &WriteEvent::ReviewCreated {
                    review: &review,
                    place: state.place(&review.place_id)?,
                    reviewer_name: &reviewer_name,
                },
                &state.liked_places,
            );
            let notified = state.push_notifications(drafts, now).len();

            info!(
                "event=review_create module=store status=ok review_id={} place_id={} integrity_score={} notified={}",
                review.id, review.place_id, review.integrity_score, notified
            );
            Ok(review)
        })
    }

    pub fn get_review(&self, review_id: &str) -> StoreResult<Option<Review>> {
        self.read(|state| state.review(review_id).ok().cloned())
    }

    /// Reviews on a place, newest first.
    pub fn reviews_for_place(&self, place_id: &str) -> StoreResult<Vec<Review>> {
        self.read(|state| {
            let mut reviews: Vec<Review> = state
                .reviews
                .iter()
                .filter(|review| review.place_id == place_id)
                .cloned()
                .collect();
            reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            reviews
        })
    }

    /// Reviews written by a user, newest first.
    pub fn reviews_by_user(&self, user_id: &str) -> StoreResult<Vec<Review>> {
        self.read(|state| {
            let mut reviews: Vec<Review> = state
                .reviews
                .iter()
                .filter(|review| review.user_id == user_id)
                .cloned()
                .collect();
            reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            reviews
        })
    }

    /// Applies an author edit and re-derives integrity and `verified`.
    ///
    /// Returns `Ok(false)` when `requester_id` is not the author.
    pub fn update_review(
        &self,
        review_id: &str,
        requester_id: &str,
        update: ReviewUpdate,
    ) -> StoreResult<bool> {
        self.write("update_review", |state| {
            let mut review = state.review(review_id)?.clone();
            if review.user_id != requester_id {
                return Ok(false);
            }
            if update.is_empty() {
                return Ok(true);
            }
            if let Some(rating) = update.rating {
                review.rating = rating;
            }
            if let Some(comment) = update.comment {
                review.comment = comment;
            }
            if let Some(details) = update.details {
                review.details = Some(details);
            }
            if let Some(images) = update.images {
                review.images = images;
            }
            let score = state.integrity_score_for(&review);
            review.set_integrity_score(score);
            *state.review_mut(review_id)? = review;
            Ok(true)
        })
    }

    /// Deletes a review. Author only.
    pub fn delete_review(&self, review_id: &str, requester_id: &str) -> StoreResult<bool> {
        self.write("delete_review", |state| {
            if state.review(review_id)?.user_id != requester_id {
                return Ok(false);
            }
            state.reviews.retain(|review| review.id != review_id);
            info!("event=review_delete module=store status=ok review_id={review_id}");
            Ok(true)
        })
    }

    /// Toggles `user_id`'s like on a review; a new like from someone other
    /// than the author notifies the author.
    ///
    /// Returns whether the review is liked by `user_id` after the call.
    pub fn toggle_review_like(&self, review_id: &str, user_id: &str) -> StoreResult<bool> {
        self.write("toggle_review_like", |state| {
            let place_id = state.review(review_id)?.place_id.clone();
            state.place(&place_id)?;
            let review = state.review_mut(review_id)?;
            if review.is_liked_by(user_id) {
                review.likes.retain(|id| id != user_id);
                return Ok(false);
            }
            review.likes.push(user_id.to_string());

            let review = state.review(review_id)?;
            let liker_name = state.display_name(user_id);
            let drafts = plan_notifications(
                &WriteEvent::ReviewLiked {
                    review,
                    place: state.place(&place_id)?,
                    liker_id: user_id,
                    liker_name: &liker_name,
                },
                &state.liked_places,
            );
            state.push_notifications(drafts, now_utc());
            Ok(true)
        })
    }

    /// Increments the report counter. Returns the new count.
    pub fn report_review(&self, review_id: &str) -> StoreResult<u32> {
        self.write("report_review", |state| {
            let review = state.review_mut(review_id)?;
            review.reports = review.reports.saturating_add(1);
            info!(
                "event=review_report module=store status=ok review_id={} reports={}",
                review.id, review.reports
            );
            Ok(review.reports)
        })
    }

    /// Attaches or replaces the manager response and notifies the author.
    ///
    /// Returns `Ok(false)` when `responder_id` does not manage the place.
    pub fn respond_to_review(
        &self,
        review_id: &str,
        responder_id: &str,
        text: impl Into<String>,
    ) -> StoreResult<bool> {
        let text = text.into();
        self.write("respond_to_review", |state| {
            let place_id = state.review(review_id)?.place_id.clone();
            if !state.place(&place_id)?.is_managed_by(responder_id) {
                return Ok(false);
            }
            let now = now_utc();
            state.review_mut(review_id)?.owner_response = Some(OwnerResponse {
                text,
                responded_at: now,
            });

            let drafts = plan_notifications(
                &WriteEvent::ReviewResponded {
                    review: state.review(review_id)?,
                    place: state.place(&place_id)?,
                    responder_id,
                },
                &state.liked_places,
            );
            state.push_notifications(drafts, now);
            Ok(true)
        })
    }

    /// Removes the manager response. Owner or delegate only.
    pub fn delete_review_response(&self, review_id: &str, requester_id: &str) -> StoreResult<bool> {
        self.write("delete_review_response", |state| {
            let place_id = state.review(review_id)?.place_id.clone();
            if !state.place(&place_id)?.is_managed_by(requester_id) {
                return Ok(false);
            }
            state.review_mut(review_id)?.owner_response = None;
            Ok(true)
        })
    }

    /// Integrity score of `review` against current author history.
    pub fn review_integrity_score(&self, review: &Review) -> StoreResult<u8> {
        self.read(|state| state.integrity_score_for(review))
    }

    /// Reviews the user wrote since the start of the current local week.
    pub fn weekly_reviews_count(&self, user_id: &str) -> StoreResult<usize> {
        self.weekly_reviews_count_at(user_id, &Local::now())
    }

    /// Like `weekly_reviews_count`, evaluated at an explicit instant.
    pub fn weekly_reviews_count_at<Tz: TimeZone>(
        &self,
        user_id: &str,
        now: &DateTime<Tz>,
    ) -> StoreResult<usize> {
        let first_day = self.config().week_starts_on;
        self.read(|state| state.weekly_reviews_count_at(user_id, now, first_day))
    }

    /// The user's reviews, questions and answers, newest first.
    pub fn timeline(&self, user_id: &str, limit: usize) -> StoreResult<Vec<TimelineEntry>> {
        self.read(|state| state.timeline(user_id, limit))
    }
}
