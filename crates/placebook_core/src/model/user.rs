//! User domain model.
//!
//! # Invariants
//! - `email` is unique across users and compared case-sensitively.
//! - Users are never deleted.

use super::{EntityId, GeoPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular reviewer account.
    User,
    /// Account operating one or more places.
    Business,
}

/// Per-field visibility flags for the public profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileVisibility {
    pub show_email: bool,
    pub show_phone: bool,
    pub show_gender: bool,
    pub show_date_of_birth: bool,
    pub show_location: bool,
}

impl Default for ProfileVisibility {
    fn default() -> Self {
        Self {
            show_email: false,
            show_phone: false,
            show_gender: true,
            show_date_of_birth: false,
            show_location: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    /// Free-form `YYYY-MM-DD`; the store does not validate it.
    pub date_of_birth: Option<String>,
    pub location: Option<GeoPoint>,
    pub loyalty_points: u32,
    #[serde(default)]
    pub visibility: ProfileVisibility,
    #[serde(default)]
    pub preferences: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial profile edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub location: Option<GeoPoint>,
    pub visibility: Option<ProfileVisibility>,
    pub preferences: Option<Vec<String>>,
}

impl User {
    /// Applies every present field of `update`.
    pub fn apply(&mut self, update: UserProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(bio) = update.bio {
            self.bio = Some(bio);
        }
        if let Some(avatar) = update.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(gender) = update.gender {
            self.gender = Some(gender);
        }
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = Some(date_of_birth);
        }
        if let Some(location) = update.location {
            self.location = Some(location);
        }
        if let Some(visibility) = update.visibility {
            self.visibility = visibility;
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
    }
}
