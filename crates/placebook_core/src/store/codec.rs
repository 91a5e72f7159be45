//! Versioned JSON codec between `StoreState` and the key-value medium.
//!
//! # Responsibility
//! - Encode each collection as an independent keyed blob.
//! - Restore collections, including every nested timestamp, losslessly.
//!
//! # Invariants
//! - Written blobs are always `{"schemaVersion": N, "data": ...}`.
//! - Unversioned blobs (bare array/map) are read as schema 0.
//! - A blob newer than `STORE_SCHEMA_VERSION` is rejected, never guessed at.

use super::state::StoreState;
use crate::repo::kv_repo::{KeyValueMedium, MediumError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Blob schema revision written by this binary.
pub const STORE_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_FIELD: &str = "schemaVersion";
const DATA_FIELD: &str = "data";

/// Persistence keys, one per collection.
pub mod keys {
    pub const PLACES: &str = "places";
    pub const REVIEWS: &str = "reviews";
    pub const USERS: &str = "users";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const QUESTIONS: &str = "questions";
    pub const ANNOUNCEMENTS: &str = "announcements";
    pub const INQUIRIES: &str = "inquiries";
    pub const SUBSCRIPTIONS: &str = "subscriptions";
    pub const LIKED_PLACES: &str = "likedPlaces";
    pub const META: &str = "meta";

    pub const ALL: [&str; 10] = [
        PLACES,
        REVIEWS,
        USERS,
        NOTIFICATIONS,
        QUESTIONS,
        ANNOUNCEMENTS,
        INQUIRIES,
        SUBSCRIPTIONS,
        LIKED_PLACES,
        META,
    ];
}

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    Json {
        key: &'static str,
        source: serde_json::Error,
    },
    UnsupportedSchemaVersion {
        key: &'static str,
        found: u32,
        supported: u32,
    },
    Medium(MediumError),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json { key, source } => write!(f, "invalid `{key}` blob: {source}"),
            Self::UnsupportedSchemaVersion {
                key,
                found,
                supported,
            } => write!(
                f,
                "`{key}` blob schema version {found} is newer than supported {supported}"
            ),
            Self::Medium(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::Medium(err) => Some(err),
        }
    }
}

impl From<MediumError> for CodecError {
    fn from(value: MediumError) -> Self {
        Self::Medium(value)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreMeta {
    seed_version: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a, T> {
    schema_version: u32,
    data: &'a T,
}

fn encode_one<T: Serialize>(key: &'static str, data: &T) -> CodecResult<(&'static str, String)> {
    let envelope = EnvelopeRef {
        schema_version: STORE_SCHEMA_VERSION,
        data,
    };
    let text = serde_json::to_string(&envelope).map_err(|source| CodecError::Json { key, source })?;
    Ok((key, text))
}

fn decode_one<T: DeserializeOwned + Default>(
    key: &'static str,
    text: Option<String>,
) -> CodecResult<T> {
    let Some(text) = text else {
        return Ok(T::default());
    };
    let json = |source| CodecError::Json { key, source };
    let value: Value = serde_json::from_str(&text).map_err(json)?;

    let payload = match value {
        Value::Object(mut object) if object.contains_key(SCHEMA_VERSION_FIELD) => {
            let found = object
                .get(SCHEMA_VERSION_FIELD)
                .and_then(Value::as_u64)
                .map_or(u32::MAX, |version| u32::try_from(version).unwrap_or(u32::MAX));
            if found > STORE_SCHEMA_VERSION {
                return Err(CodecError::UnsupportedSchemaVersion {
                    key,
                    found,
                    supported: STORE_SCHEMA_VERSION,
                });
            }
            object.remove(DATA_FIELD).unwrap_or(Value::Null)
        }
        legacy => legacy,
    };
    serde_json::from_value(payload).map_err(json)
}

/// Encodes every collection into `(key, json)` pairs.
pub fn encode_state(state: &StoreState) -> CodecResult<Vec<(&'static str, String)>> {
    let meta = StoreMeta {
        seed_version: state.seed_version,
    };
    Ok(vec![
        encode_one(keys::PLACES, &state.places)?,
        encode_one(keys::REVIEWS, &state.reviews)?,
        encode_one(keys::USERS, &state.users)?,
        encode_one(keys::NOTIFICATIONS, &state.notifications)?,
        encode_one(keys::QUESTIONS, &state.questions)?,
        encode_one(keys::ANNOUNCEMENTS, &state.announcements)?,
        encode_one(keys::INQUIRIES, &state.inquiries)?,
        encode_one(keys::SUBSCRIPTIONS, &state.subscriptions)?,
        encode_one(keys::LIKED_PLACES, &state.liked_places)?,
        encode_one(keys::META, &meta)?,
    ])
}

/// Restores every collection from `medium`; absent keys restore as empty.
pub fn decode_state(medium: &dyn KeyValueMedium) -> CodecResult<StoreState> {
    let meta: StoreMeta = decode_one(keys::META, medium.read(keys::META)?)?;
    Ok(StoreState {
        places: decode_one(keys::PLACES, medium.read(keys::PLACES)?)?,
        reviews: decode_one(keys::REVIEWS, medium.read(keys::REVIEWS)?)?,
        users: decode_one(keys::USERS, medium.read(keys::USERS)?)?,
        notifications: decode_one(keys::NOTIFICATIONS, medium.read(keys::NOTIFICATIONS)?)?,
        questions: decode_one(keys::QUESTIONS, medium.read(keys::QUESTIONS)?)?,
        announcements: decode_one(keys::ANNOUNCEMENTS, medium.read(keys::ANNOUNCEMENTS)?)?,
        inquiries: decode_one(keys::INQUIRIES, medium.read(keys::INQUIRIES)?)?,
        subscriptions: decode_one(keys::SUBSCRIPTIONS, medium.read(keys::SUBSCRIPTIONS)?)?,
        liked_places: decode_one(keys::LIKED_PLACES, medium.read(keys::LIKED_PLACES)?)?,
        seed_version: meta.seed_version,
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_state, encode_state, keys, CodecError, STORE_SCHEMA_VERSION};
    use crate::model::question::{Answer, Question};
    use crate::repo::kv_repo::{KeyValueMedium, MemoryKeyValueMedium};
    use crate::store::state::StoreState;
    use chrono::{TimeZone, Utc};

    #[test]
    fn legacy_bare_array_with_js_dates_is_revived() {
        let mut medium = MemoryKeyValueMedium::new();
        let legacy = r#"[{
            "id": "q1",
            "placeId": "p1",
            "userId": "u1",
            "question": "Dog friendly?",
            "answers": [{
                "id": "a1",
                "userId": "u2",
                "text": "Yes",
                "isOwner": true,
                "createdAt": "2024-03-05T10:15:30.123Z"
            }],
            "createdAt": "2024-03-04T08:00:00.000Z"
        }]"#;
        medium
            .write_entries(&[(keys::QUESTIONS, legacy.to_string())])
            .unwrap();

        let state = decode_state(&medium).unwrap();
        let answer = &state.questions[0].answers[0];
        assert_eq!(
            answer.created_at,
            Utc.with_ymd_and_hms(2024, 3, 5, 10, 15, 30).unwrap()
                + chrono::Duration::milliseconds(123)
        );
        assert_eq!(state.seed_version, 0);
    }

    #[test]
    fn newer_schema_version_is_rejected() {
        let mut medium = MemoryKeyValueMedium::new();
        medium
            .write_entries(&[(
                keys::PLACES,
                format!(r#"{{"schemaVersion":{},"data":[]}}"#, STORE_SCHEMA_VERSION + 1),
            )])
            .unwrap();

        let err = decode_state(&medium).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnsupportedSchemaVersion { key: "places", .. }
        ));
    }

    #[test]
    fn encoded_state_restores_identically() {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let mut state = StoreState {
            seed_version: 3,
            ..StoreState::default()
        };
        state.questions.push(Question {
            id: "q".to_string(),
            place_id: "p".to_string(),
            user_id: "u".to_string(),
            question: "?".to_string(),
            answers: vec![Answer {
                id: "a".to_string(),
                user_id: "o".to_string(),
                text: "!".to_string(),
                is_owner: false,
                created_at,
            }],
            created_at,
        });
        state
            .liked_places
            .entry("u".to_string())
            .or_default()
            .insert("p".to_string());

        let mut medium = MemoryKeyValueMedium::new();
        let entries = encode_state(&state).unwrap();
        medium.write_entries(&entries).unwrap();

        let restored = decode_state(&medium).unwrap();
        assert_eq!(restored, state);
        assert_eq!(encode_state(&restored).unwrap(), entries);
    }

    #[test]
    fn corrupt_blob_names_its_key() {
        let mut medium = MemoryKeyValueMedium::new();
        medium
            .write_entries(&[(keys::USERS, "{not json".to_string())])
            .unwrap();
        let err = decode_state(&medium).unwrap_err();
        assert!(err.to_string().contains("`users`"));
    }
}
