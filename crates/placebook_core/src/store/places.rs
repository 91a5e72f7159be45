//! Place, ownership/delegation and liked-place operations.

use super::fanout::users_liking;
use super::state::{NearbyPlace, RatedPlace};
use super::{RelationalStore, StoreResult};
use crate::model::place::{NewPlace, Place, PlaceUpdate};
use crate::model::{new_entity_id, now_utc, EntityId, GeoPoint};
use log::{info, warn};

impl RelationalStore {
    /// Creates a place; a non-empty `owner_id` makes it claimed.
    pub fn create_place(&self, input: NewPlace) -> StoreResult<Place> {
        self.write("create_place", |state| {
            let now = now_utc();
            let place = Place {
                id: new_entity_id(),
                is_claimed: !input.owner_id.is_empty(),
                owner_id: input.owner_id,
                delegated_users: Vec::new(),
                name: input.name,
                category: input.category,
                description: input.description,
                address: input.address,
                location: input.location,
                hours: input.hours,
                created_at: now,
                updated_at: now,
            };
            state.places.push(place.clone());
            info!(
                "event=place_create module=store status=ok place_id={} claimed={}",
                place.id, place.is_claimed
            );
            Ok(place)
        })
    }

    pub fn get_place(&self, place_id: &str) -> StoreResult<Option<Place>> {
        self.read(|state| state.place(place_id).ok().cloned())
    }

    pub fn all_places(&self) -> StoreResult<Vec<Place>> {
        self.read(|state| state.places.clone())
    }

    /// Edits place details. Only the owner or a delegate may do so.
    pub fn update_place(
        &self,
        place_id: &str,
        requester_id: &str,
        update: PlaceUpdate,
    ) -> StoreResult<bool> {
        self.write("update_place", |state| {
            let place = state.place_mut(place_id)?;
            if !place.is_managed_by(requester_id) {
                return Ok(false);
            }
            place.apply(update);
            place.updated_at = now_utc();
            Ok(true)
        })
    }

    /// Sets `new_owner_id` as owner regardless of any existing claim.
    ///
    /// An existing claim by someone else is overwritten; this is logged at
    /// `warn` since the current owner is not consulted.
    pub fn claim_place(&self, place_id: &str, new_owner_id: &str) -> StoreResult<()> {
        self.write("claim_place", |state| {
            let place = state.place_mut(place_id)?;
            if place.is_claimed && !place.owner_id.is_empty() && place.owner_id != new_owner_id {
                warn!(
                    "event=place_claim module=store status=overwrite place_id={} previous_owner={} new_owner={}",
                    place.id, place.owner_id, new_owner_id
                );
            }
            place.owner_id = new_owner_id.to_string();
            place.is_claimed = true;
            place.updated_at = now_utc();
            Ok(())
        })
    }

    /// Releases ownership. Only the current owner may unclaim.
    pub fn unclaim_place(&self, place_id: &str, requester_id: &str) -> StoreResult<bool> {
        self.write("unclaim_place", |state| {
            let place = state.place_mut(place_id)?;
            if !place.is_owned_by(requester_id) {
                return Ok(false);
            }
            place.owner_id.clear();
            place.is_claimed = false;
            place.updated_at = now_utc();
            Ok(true)
        })
    }

    /// Grants `user_id` owner-equivalent rights. Owner only; idempotent.
    pub fn add_delegated_user(
        &self,
        place_id: &str,
        requester_id: &str,
        user_id: &str,
    ) -> StoreResult<bool> {
        self.write("add_delegated_user", |state| {
            let place = state.place_mut(place_id)?;
            if !place.is_owned_by(requester_id) {
                return Ok(false);
            }
            if !place.delegated_users.iter().any(|id| id == user_id) {
                place.delegated_users.push(user_id.to_string());
                place.updated_at = now_utc();
            }
            Ok(true)
        })
    }

    /// Revokes a delegate. Owner only.
    pub fn remove_delegated_user(
        &self,
        place_id: &str,
        requester_id: &str,
        user_id: &str,
    ) -> StoreResult<bool> {
        self.write("remove_delegated_user", |state| {
            let place = state.place_mut(place_id)?;
            if !place.is_owned_by(requester_id) {
                return Ok(false);
            }
            place.delegated_users.retain(|id| id != user_id);
            place.updated_at = now_utc();
            Ok(true)
        })
    }

    pub fn can_manage_place(&self, place_id: &str, user_id: &str) -> StoreResult<bool> {
        self.try_read(|state| Ok(state.place(place_id)?.is_managed_by(user_id)))
    }

    pub fn places_owned_by(&self, user_id: &str) -> StoreResult<Vec<Place>> {
        self.read(|state| {
            state
                .places
                .iter()
                .filter(|place| place.is_owned_by(user_id))
                .cloned()
                .collect()
        })
    }

    /// Places the user owns or is a delegate of.
    pub fn places_managed_by(&self, user_id: &str) -> StoreResult<Vec<Place>> {
        self.read(|state| {
            state
                .places
                .iter()
                .filter(|place| place.is_managed_by(user_id))
                .cloned()
                .collect()
        })
    }

    /// Adds or removes `place_id` from the user's favorites.
    ///
    /// Returns whether the place is liked after the call.
    pub fn toggle_liked_place(&self, user_id: &str, place_id: &str) -> StoreResult<bool> {
        self.write("toggle_liked_place", |state| {
            state.place(place_id)?;
            let liked = state.liked_places.entry(user_id.to_string()).or_default();
            let now_liked = if liked.remove(place_id) {
                false
            } else {
                liked.insert(place_id.to_string());
                true
            };
            if liked.is_empty() {
                state.liked_places.remove(user_id);
            }
            Ok(now_liked)
        })
    }

    pub fn is_place_liked(&self, user_id: &str, place_id: &str) -> StoreResult<bool> {
        self.read(|state| state.is_place_liked(user_id, place_id))
    }

    /// The user's liked places that still exist, in collection order.
    pub fn liked_places(&self, user_id: &str) -> StoreResult<Vec<Place>> {
        self.read(|state| {
            state
                .places
                .iter()
                .filter(|place| state.is_place_liked(user_id, &place.id))
                .cloned()
                .collect()
        })
    }

    pub fn users_liking_place(&self, place_id: &str) -> StoreResult<Vec<EntityId>> {
        self.read(|state| users_liking(&state.liked_places, place_id))
    }

    /// Mean rating of the place's reviews, 0 when there are none.
    pub fn average_rating(&self, place_id: &str) -> StoreResult<f64> {
        self.read(|state| state.average_rating(place_id))
    }

    pub fn top_rated_places(&self, limit: usize) -> StoreResult<Vec<RatedPlace>> {
        self.read(|state| state.top_rated_places(limit))
    }

    /// Located places within `radius_km` of (`lat`, `lng`), nearest first.
    pub fn nearby_places(&self, lat: f64, lng: f64, radius_km: f64) -> StoreResult<Vec<NearbyPlace>> {
        self.read(|state| state.nearby_places(GeoPoint::new(lat, lng), radius_km))
    }
}
