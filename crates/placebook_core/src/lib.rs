//! Core data store for the PlaceBook place-discovery platform.
//! This crate is the single source of truth for entity invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::announcement::{Announcement, AnnouncementKind, AnnouncementUpdate, NewAnnouncement};
pub use model::inquiry::{Inquiry, InquiryStatus};
pub use model::notification::{Notification, NotificationDraft, NotificationKind};
pub use model::place::{NewPlace, Place, PlaceUpdate};
pub use model::question::{Answer, Question};
pub use model::review::{NewReview, Review, ReviewDetails, ReviewUpdate, VERIFIED_THRESHOLD};
pub use model::subscription::Subscription;
pub use model::user::{ProfileVisibility, User, UserProfileUpdate, UserRole};
pub use model::{EntityId, GeoPoint, OwnerResponse};
pub use repo::kv_repo::{
    KeyValueMedium, MediumError, MediumResult, MemoryKeyValueMedium, SqliteKeyValueMedium,
};
pub use store::state::{NearbyPlace, RatedPlace, StoreState, TimelineEntry};
pub use store::{RelationalStore, StoreConfig, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
