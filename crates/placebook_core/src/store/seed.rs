//! Canonical seed data and merge-idempotent seeding.
//!
//! # Responsibility
//! - Create the two canonical users for an empty store.
//! - Merge canonical places, reviews, questions/answers and notifications
//!   into a possibly partially populated store.
//!
//! # Invariants
//! - Re-running any seed step never duplicates an entity:
//!   places match by name, reviews by (place, author, comment), questions by
//!   (place, text), notifications by (recipient, kind, title, place).
//! - Seeding only adds; it never edits or removes existing entities.

use super::state::StoreState;
use crate::model::notification::{NotificationDraft, NotificationKind};
use crate::model::place::Place;
use crate::model::question::{Answer, Question};
use crate::model::review::Review;
use crate::model::user::{ProfileVisibility, User, UserRole};
use crate::model::{new_entity_id, GeoPoint};
use chrono::{DateTime, Duration, Utc};
use log::info;
use std::collections::BTreeMap;

/// Content seed revision. Bump when the canonical set below changes.
pub const SEED_VERSION: u32 = 1;

pub const SEED_EXPLORER_EMAIL: &str = "alex@placebook.app";
pub const SEED_OWNER_EMAIL: &str = "morgan@placebook.app";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeedAuthor {
    Explorer,
    Owner,
}

struct SeedUser {
    name: &'static str,
    email: &'static str,
    role: UserRole,
    bio: &'static str,
}

struct SeedPlace {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    address: &'static str,
    location: (f64, f64),
    owned: bool,
    hours: &'static [(&'static str, &'static str)],
}

struct SeedReview {
    place: &'static str,
    author: SeedAuthor,
    rating: u8,
    comment: &'static str,
    images: &'static [&'static str],
    days_ago: i64,
}

struct SeedQuestion {
    place: &'static str,
    author: SeedAuthor,
    text: &'static str,
    owner_answer: Option<&'static str>,
    days_ago: i64,
}

struct SeedNotification {
    recipient: SeedAuthor,
    kind: NotificationKind,
    place: &'static str,
    title: &'static str,
    message: &'static str,
}

const WEEKDAY_HOURS: &[(&str, &str)] = &[
    ("monday", "07:00-18:00"),
    ("tuesday", "07:00-18:00"),
    ("wednesday", "07:00-18:00"),
    ("thursday", "07:00-18:00"),
    ("friday", "07:00-20:00"),
    ("saturday", "08:00-20:00"),
    ("sunday", "closed"),
];

const EVENING_HOURS: &[(&str, &str)] = &[
    ("tuesday", "17:00-23:00"),
    ("wednesday", "17:00-23:00"),
    ("thursday", "17:00-23:00"),
    ("friday", "17:00-02:00"),
    ("saturday", "17:00-02:00"),
];

const SEED_USERS: [SeedUser; 2] = [
    SeedUser {
        name: "Alex Rivera",
        email: SEED_EXPLORER_EMAIL,
        role: UserRole::User,
        bio: "Coffee first, then everything else.",
    },
    SeedUser {
        name: "Morgan Lee",
        email: SEED_OWNER_EMAIL,
        role: UserRole::Business,
        bio: "Running a couple of neighborhood spots in the city.",
    },
];

const SEED_PLACES: &[SeedPlace] = &[
    SeedPlace {
        name: "Blue Door Coffee",
        category: "cafe",
        description: "Small-batch roastery with a sunny back patio.",
        address: "412 Valencia St, San Francisco",
        location: (37.7763, -122.4241),
        owned: true,
        hours: WEEKDAY_HOURS,
    },
    SeedPlace {
        name: "Mission Taqueria",
        category: "restaurant",
        description: "Late-night burritos and house salsas.",
        address: "2889 Mission St, San Francisco",
        location: (37.7599, -122.4148),
        owned: true,
        hours: EVENING_HOURS,
    },
    SeedPlace {
        name: "Golden Gate Books",
        category: "bookstore",
        description: "Used and rare books, two floors.",
        address: "1600 Fulton St, San Francisco",
        location: (37.7694, -122.4862),
        owned: false,
        hours: WEEKDAY_HOURS,
    },
    SeedPlace {
        name: "Bayview Climbing Gym",
        category: "fitness",
        description: "Bouldering walls reset every two weeks.",
        address: "1500 Evans Ave, San Francisco",
        location: (37.7296, -122.3925),
        owned: false,
        hours: WEEKDAY_HOURS,
    },
    SeedPlace {
        name: "Presidio Picnic Grounds",
        category: "park",
        description: "Open lawn with bay views and public grills.",
        address: "Presidio Pkwy, San Francisco",
        location: (37.7989, -122.4662),
        owned: false,
        hours: &[],
    },
    SeedPlace {
        name: "Night Owl Ramen",
        category: "restaurant",
        description: "Tonkotsu and shoyu bowls until late.",
        address: "88 Kearny St, San Francisco",
        location: (37.7857, -122.4100),
        owned: true,
        hours: EVENING_HOURS,
    },
];

const SEED_REVIEWS: &[SeedReview] = &[
    SeedReview {
        place: "Blue Door Coffee",
        author: SeedAuthor::Explorer,
        rating: 5,
        comment: "The single-origin pour over is excellent and the baristas take the time to explain each roast. The patio gets morning sun, which makes it my favorite spot to start the week.",
        images: &["seed/blue-door-patio.jpg"],
        days_ago: 12,
    },
    SeedReview {
        place: "Blue Door Coffee",
        author: SeedAuthor::Owner,
        rating: 4,
        comment: "Great espresso, gets crowded on weekends.",
        images: &[],
        days_ago: 30,
    },
    SeedReview {
        place: "Mission Taqueria",
        author: SeedAuthor::Explorer,
        rating: 4,
        comment: "Carnitas burrito was huge. Salsa bar could use more variety.",
        images: &[],
        days_ago: 9,
    },
    SeedReview {
        place: "Golden Gate Books",
        author: SeedAuthor::Explorer,
        rating: 5,
        comment: "Found a first edition I had been hunting for years.",
        images: &[],
        days_ago: 20,
    },
    SeedReview {
        place: "Golden Gate Books",
        author: SeedAuthor::Owner,
        rating: 4,
        comment: "Cozy reading nook upstairs.",
        images: &[],
        days_ago: 40,
    },
    SeedReview {
        place: "Bayview Climbing Gym",
        author: SeedAuthor::Owner,
        rating: 5,
        comment: "Friendly staff and fresh problems every visit.",
        images: &[],
        days_ago: 15,
    },
    SeedReview {
        place: "Night Owl Ramen",
        author: SeedAuthor::Explorer,
        rating: 3,
        comment: "Broth was rich but the noodles were a bit soft.",
        images: &[],
        days_ago: 4,
    },
];

const SEED_QUESTIONS: &[SeedQuestion] = &[
    SeedQuestion {
        place: "Blue Door Coffee",
        author: SeedAuthor::Explorer,
        text: "Do you offer oat milk?",
        owner_answer: Some("Yes, oat and almond at no extra charge."),
        days_ago: 10,
    },
    SeedQuestion {
        place: "Night Owl Ramen",
        author: SeedAuthor::Explorer,
        text: "Is there a vegetarian broth?",
        owner_answer: None,
        days_ago: 3,
    },
    SeedQuestion {
        place: "Presidio Picnic Grounds",
        author: SeedAuthor::Owner,
        text: "Are the grills first come, first served?",
        owner_answer: None,
        days_ago: 6,
    },
];

const SEED_NOTIFICATIONS: &[SeedNotification] = &[
    SeedNotification {
        recipient: SeedAuthor::Owner,
        kind: NotificationKind::Review,
        place: "Blue Door Coffee",
        title: "New review",
        message: "Alex Rivera rated Blue Door Coffee 5 stars",
    },
    SeedNotification {
        recipient: SeedAuthor::Owner,
        kind: NotificationKind::NewQuestionOnOwnedPlace,
        place: "Night Owl Ramen",
        title: "New question",
        message: "Alex Rivera asked about Night Owl Ramen",
    },
    SeedNotification {
        recipient: SeedAuthor::Explorer,
        kind: NotificationKind::Answer,
        place: "Blue Door Coffee",
        title: "New answer",
        message: "Blue Door Coffee answered your question",
    },
];

/// Counts of entities added by one seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_added: usize,
    pub places_added: usize,
    pub reviews_added: usize,
    pub questions_added: usize,
    pub notifications_added: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

struct SeedIds {
    explorer: String,
    owner: String,
}

impl SeedIds {
    fn of(&self, author: SeedAuthor) -> &str {
        match author {
            SeedAuthor::Explorer => &self.explorer,
            SeedAuthor::Owner => &self.owner,
        }
    }
}

/// Creates the canonical users when the store has no users at all.
pub fn seed_users(state: &mut StoreState, now: DateTime<Utc>) -> usize {
    if !state.users.is_empty() {
        return 0;
    }
    let (_, added) = ensure_seed_users(state, now);
    info!("event=seed_users module=store status=ok users_added={added}");
    added
}

/// Merges the canonical content set and advances `seed_version`.
pub fn seed_content(state: &mut StoreState, now: DateTime<Utc>) -> SeedReport {
    let (ids, users_added) = ensure_seed_users(state, now);
    let mut report = SeedReport {
        users_added,
        ..SeedReport::default()
    };

    for seed in SEED_PLACES {
        if state.places.iter().any(|place| place.name == seed.name) {
            continue;
        }
        let owner_id = if seed.owned {
            ids.owner.clone()
        } else {
            String::new()
        };
        state.places.push(Place {
            id: new_entity_id(),
            is_claimed: !owner_id.is_empty(),
            owner_id,
            delegated_users: Vec::new(),
            name: seed.name.to_string(),
            category: seed.category.to_string(),
            description: seed.description.to_string(),
            address: Some(seed.address.to_string()),
            location: Some(GeoPoint::new(seed.location.0, seed.location.1)),
            hours: seed
                .hours
                .iter()
                .map(|(day, range)| ((*day).to_string(), (*range).to_string()))
                .collect::<BTreeMap<_, _>>(),
            created_at: now,
            updated_at: now,
        });
        report.places_added += 1;
    }

    for seed in SEED_REVIEWS {
        let Some(place_id) = place_id_by_name(state, seed.place) else {
            continue;
        };
        let user_id = ids.of(seed.author);
        let exists = state.reviews.iter().any(|review| {
            review.place_id == place_id && review.user_id == user_id && review.comment == seed.comment
        });
        if exists {
            continue;
        }
        let mut review = Review {
            id: new_entity_id(),
            place_id,
            user_id: user_id.to_string(),
            rating: seed.rating,
            comment: seed.comment.to_string(),
            details: None,
            images: seed.images.iter().map(|image| (*image).to_string()).collect(),
            likes: Vec::new(),
            reports: 0,
            integrity_score: 0,
            verified: false,
            owner_response: None,
            created_at: now - Duration::days(seed.days_ago),
        };
        let score = state.integrity_score_for(&review);
        review.set_integrity_score(score);
        state.reviews.push(review);
        report.reviews_added += 1;
    }

    for seed in SEED_QUESTIONS {
        let Some(place_id) = place_id_by_name(state, seed.place) else {
            continue;
        };
        let exists = state
            .questions
            .iter()
            .any(|question| question.place_id == place_id && question.question == seed.text);
        if exists {
            continue;
        }
        let asked_at = now - Duration::days(seed.days_ago);
        let answers = seed
            .owner_answer
            .map(|text| Answer {
                id: new_entity_id(),
                user_id: ids.owner.clone(),
                text: text.to_string(),
                is_owner: true,
                created_at: asked_at + Duration::hours(2),
            })
            .into_iter()
            .collect();
        state.questions.push(Question {
            id: new_entity_id(),
            place_id,
            user_id: ids.of(seed.author).to_string(),
            question: seed.text.to_string(),
            answers,
            created_at: asked_at,
        });
        report.questions_added += 1;
    }

    for seed in SEED_NOTIFICATIONS {
        let Some(place_id) = place_id_by_name(state, seed.place) else {
            continue;
        };
        let recipient = ids.of(seed.recipient);
        let exists = state.notifications.iter().any(|notification| {
            notification.user_id == recipient
                && notification.kind == seed.kind
                && notification.title == seed.title
                && notification.place_id.as_deref() == Some(place_id.as_str())
        });
        if exists {
            continue;
        }
        let draft = NotificationDraft {
            user_id: recipient.to_string(),
            kind: seed.kind,
            title: seed.title.to_string(),
            message: seed.message.to_string(),
            action_url: format!("/places/{place_id}"),
            place_id: Some(place_id),
            review_id: None,
            question_id: None,
            answer_id: None,
        };
        state.push_notifications(vec![draft], now);
        report.notifications_added += 1;
    }

    state.seed_version = state.seed_version.max(SEED_VERSION);
    info!(
        "event=seed_content module=store status=ok seed_version={} users_added={} places_added={} reviews_added={} questions_added={} notifications_added={}",
        state.seed_version,
        report.users_added,
        report.places_added,
        report.reviews_added,
        report.questions_added,
        report.notifications_added
    );
    report
}

fn place_id_by_name(state: &StoreState, name: &str) -> Option<String> {
    state
        .places
        .iter()
        .find(|place| place.name == name)
        .map(|place| place.id.clone())
}

fn ensure_seed_users(state: &mut StoreState, now: DateTime<Utc>) -> (SeedIds, usize) {
    let mut added = 0;
    let mut ids = Vec::with_capacity(SEED_USERS.len());
    for seed in &SEED_USERS {
        if let Some(user) = state.user_by_email(seed.email) {
            ids.push(user.id.clone());
            continue;
        }
        let user = User {
            id: new_entity_id(),
            name: seed.name.to_string(),
            email: seed.email.to_string(),
            role: seed.role,
            bio: Some(seed.bio.to_string()),
            avatar: None,
            phone: None,
            gender: None,
            date_of_birth: None,
            location: Some(GeoPoint::new(37.7749, -122.4194)),
            loyalty_points: 0,
            visibility: ProfileVisibility::default(),
            preferences: Vec::new(),
            created_at: now,
        };
        ids.push(user.id.clone());
        state.users.push(user);
        added += 1;
    }
    let owner = ids.pop().unwrap_or_default();
    let explorer = ids.pop().unwrap_or_default();
    (SeedIds { explorer, owner }, added)
}

#[cfg(test)]
mod tests {
    use super::{seed_content, seed_users, SEED_PLACES, SEED_REVIEWS, SEED_VERSION};
    use crate::store::state::StoreState;
    use chrono::Utc;

    #[test]
    fn seed_users_only_runs_on_empty_user_set() {
        let mut state = StoreState::default();
        assert_eq!(seed_users(&mut state, Utc::now()), 2);
        assert_eq!(seed_users(&mut state, Utc::now()), 0);
        assert_eq!(state.users.len(), 2);
    }

    #[test]
    fn seed_content_is_merge_idempotent() {
        let mut state = StoreState::default();
        let first = seed_content(&mut state, Utc::now());
        assert_eq!(first.places_added, SEED_PLACES.len());
        assert_eq!(first.reviews_added, SEED_REVIEWS.len());
        assert_eq!(state.seed_version, SEED_VERSION);

        let second = seed_content(&mut state, Utc::now());
        assert!(second.is_empty());
        assert_eq!(state.places.len(), SEED_PLACES.len());
        assert_eq!(state.reviews.len(), SEED_REVIEWS.len());
    }

    #[test]
    fn partial_store_only_receives_missing_entities() {
        let mut state = StoreState::default();
        seed_content(&mut state, Utc::now());
        let removed = state.places.remove(0);
        state.reviews.retain(|review| review.place_id != removed.id);
        state.seed_version = 0;

        let report = seed_content(&mut state, Utc::now());
        assert_eq!(report.places_added, 1);
        assert_eq!(report.reviews_added, 2);
        assert_eq!(state.places.len(), SEED_PLACES.len());
    }

    #[test]
    fn seeded_reviews_keep_verified_in_step_with_score() {
        let mut state = StoreState::default();
        seed_content(&mut state, Utc::now());
        assert!(state
            .reviews
            .iter()
            .all(|review| review.verified == (review.integrity_score >= 70)));
    }
}
