//! User accounts and subscription entitlements.

use super::{RelationalStore, StoreError, StoreResult};
use crate::model::subscription::Subscription;
use crate::model::user::{ProfileVisibility, User, UserProfileUpdate, UserRole};
use crate::model::{new_entity_id, now_utc};
use chrono::{DateTime, Duration, Utc};
use log::info;

impl RelationalStore {
    /// Returns the user with `email`, creating it on first reference.
    ///
    /// Email matching is exact and case-sensitive.
    pub fn get_or_create_user(&self, email: &str, name: &str) -> StoreResult<User> {
        if let Some(user) = self.get_user_by_email(email)? {
            return Ok(user);
        }
        self.write("create_user", |state| {
            // Another caller may have created it between the two locks.
            if let Some(user) = state.user_by_email(email) {
                return Ok(user.clone());
            }
            let user = User {
                id: new_entity_id(),
                name: name.to_string(),
                email: email.to_string(),
                role: UserRole::User,
                bio: None,
                avatar: None,
                phone: None,
                gender: None,
                date_of_birth: None,
                location: None,
                loyalty_points: 0,
                visibility: ProfileVisibility::default(),
                preferences: Vec::new(),
                created_at: now_utc(),
            };
            state.users.push(user.clone());
            info!("event=user_create module=store status=ok user_id={}", user.id);
            Ok(user)
        })
    }

    pub fn get_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.read(|state| state.user(user_id).ok().cloned())
    }

    pub fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.read(|state| state.user_by_email(email).cloned())
    }

    pub fn all_users(&self) -> StoreResult<Vec<User>> {
        self.read(|state| state.users.clone())
    }

    /// Applies a profile edit and returns the updated user.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when the user does not exist.
    pub fn update_user_profile(&self, user_id: &str, update: UserProfileUpdate) -> StoreResult<User> {
        self.write("update_user_profile", |state| {
            let user = state.user_mut(user_id)?;
            user.apply(update);
            Ok(user.clone())
        })
    }

    /// Starts a subscription lasting `duration_days` from now.
    pub fn create_subscription(
        &self,
        user_id: &str,
        plan: &str,
        duration_days: u32,
    ) -> StoreResult<Subscription> {
        self.write("create_subscription", |state| {
            let now = now_utc();
            let subscription = Subscription {
                id: new_entity_id(),
                user_id: user_id.to_string(),
                plan: plan.to_string(),
                started_at: now,
                expires_at: now + Duration::days(i64::from(duration_days)),
                is_active: true,
                created_at: now,
            };
            state.subscriptions.push(subscription.clone());
            info!(
                "event=subscription_create module=store status=ok subscription_id={} plan={} duration_days={duration_days}",
                subscription.id, subscription.plan
            );
            Ok(subscription)
        })
    }

    /// Cancels a subscription. Holder only.
    pub fn cancel_subscription(&self, subscription_id: &str, user_id: &str) -> StoreResult<bool> {
        self.write("cancel_subscription", |state| {
            let subscription = state
                .subscriptions
                .iter_mut()
                .find(|s| s.id == subscription_id)
                .ok_or_else(|| StoreError::not_found("subscription", subscription_id))?;
            if subscription.user_id != user_id {
                return Ok(false);
            }
            subscription.is_active = false;
            Ok(true)
        })
    }

    /// The usable subscription at `now` that expires last, if any.
    pub fn active_subscription(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Subscription>> {
        self.read(|state| {
            state
                .subscriptions
                .iter()
                .filter(|s| s.user_id == user_id && s.is_active_at(now))
                .max_by_key(|s| s.expires_at)
                .cloned()
        })
    }

    pub fn subscriptions_for_user(&self, user_id: &str) -> StoreResult<Vec<Subscription>> {
        self.read(|state| {
            state
                .subscriptions
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect()
        })
    }
}
