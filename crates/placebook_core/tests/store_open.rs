use placebook_core::db::open_db;
use placebook_core::store::codec::{keys, CodecError, STORE_SCHEMA_VERSION};
use placebook_core::store::seed::{SEED_EXPLORER_EMAIL, SEED_OWNER_EMAIL, SEED_VERSION};
use placebook_core::{
    KeyValueMedium, MemoryKeyValueMedium, RelationalStore, SqliteKeyValueMedium, StoreConfig,
    StoreError, UserRole,
};

fn counts(store: &RelationalStore) -> (usize, usize, usize, usize, usize) {
    let state = store.snapshot().unwrap();
    (
        state.users.len(),
        state.places.len(),
        state.reviews.len(),
        state.questions.len(),
        state.notifications.len(),
    )
}

#[test]
fn open_seeds_canonical_users_and_content() {
    let store = RelationalStore::open(MemoryKeyValueMedium::new()).unwrap();

    let explorer = store.get_user_by_email(SEED_EXPLORER_EMAIL).unwrap().unwrap();
    let owner = store.get_user_by_email(SEED_OWNER_EMAIL).unwrap().unwrap();
    assert_eq!(explorer.role, UserRole::User);
    assert_eq!(owner.role, UserRole::Business);

    let state = store.snapshot().unwrap();
    assert_eq!(state.seed_version, SEED_VERSION);
    assert!(!state.places.is_empty());
    assert!(!state.reviews.is_empty());
    assert!(state
        .places
        .iter()
        .filter(|place| place.is_claimed)
        .all(|place| place.owner_id == owner.id));
    assert!(state.reviews.iter().all(|review| review.verified == (review.integrity_score >= 70)));
}

#[test]
fn reopening_file_store_does_not_reseed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("placebook.db");

    let first = RelationalStore::open(SqliteKeyValueMedium::new(open_db(&path).unwrap())).unwrap();
    let seeded = counts(&first);
    let explorer = first.get_user_by_email(SEED_EXPLORER_EMAIL).unwrap().unwrap();
    drop(first);

    let second = RelationalStore::open(SqliteKeyValueMedium::new(open_db(&path).unwrap())).unwrap();
    assert_eq!(counts(&second), seeded);
    assert_eq!(
        second.get_user_by_email(SEED_EXPLORER_EMAIL).unwrap().unwrap().id,
        explorer.id
    );
}

#[test]
fn seeding_can_be_disabled() {
    let config = StoreConfig {
        seed_on_open: false,
        ..StoreConfig::default()
    };
    let store = RelationalStore::open_with_config(MemoryKeyValueMedium::new(), config).unwrap();

    assert_eq!(counts(&store), (0, 0, 0, 0, 0));
    assert_eq!(store.snapshot().unwrap().seed_version, 0);
    assert_eq!(store.config(), config);
}

#[test]
fn legacy_data_without_seed_marker_is_merged_not_duplicated() {
    let medium = MemoryKeyValueMedium::new();
    let store = RelationalStore::open(medium.clone()).unwrap();
    let seeded = counts(&store);
    let snapshot = store.snapshot().unwrap();
    drop(store);

    // Rewrite the collections the way an unversioned writer left them.
    let mut legacy = MemoryKeyValueMedium::new();
    let places = serde_json::to_string(&snapshot.places).unwrap();
    let reviews = serde_json::to_string(&snapshot.reviews).unwrap();
    let users = serde_json::to_string(&snapshot.users).unwrap();
    let questions = serde_json::to_string(&snapshot.questions).unwrap();
    let notifications = serde_json::to_string(&snapshot.notifications).unwrap();
    legacy
        .write_entries(&[
            (keys::PLACES, places),
            (keys::REVIEWS, reviews),
            (keys::USERS, users),
            (keys::QUESTIONS, questions),
            (keys::NOTIFICATIONS, notifications),
        ])
        .unwrap();
    assert!(medium.read(keys::META).unwrap().is_some());
    assert!(legacy.read(keys::META).unwrap().is_none());

    let reopened = RelationalStore::open(legacy.clone()).unwrap();
    assert_eq!(counts(&reopened), seeded);
    assert_eq!(reopened.snapshot().unwrap().seed_version, SEED_VERSION);

    let meta = legacy.read(keys::META).unwrap().unwrap();
    assert!(meta.contains(&format!("\"schemaVersion\":{STORE_SCHEMA_VERSION}")));
}

#[test]
fn blob_from_newer_binary_is_rejected() {
    let mut medium = MemoryKeyValueMedium::new();
    medium
        .write_entries(&[(keys::PLACES, r#"{"schemaVersion":99,"data":[]}"#.to_string())])
        .unwrap();

    let err = RelationalStore::open(medium).err().unwrap();
    match err {
        StoreError::Codec(CodecError::UnsupportedSchemaVersion { key, found, .. }) => {
            assert_eq!(key, keys::PLACES);
            assert_eq!(found, 99);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reset_clears_user_data_and_reseeds() {
    let medium = MemoryKeyValueMedium::new();
    let store = RelationalStore::open(medium.clone()).unwrap();
    let seeded = counts(&store);
    store.get_or_create_user("new@placebook.app", "New").unwrap();
    assert_eq!(counts(&store).0, seeded.0 + 1);

    store.reset().unwrap();

    assert_eq!(counts(&store), seeded);
    assert!(store.get_user_by_email("new@placebook.app").unwrap().is_none());
    let reopened = RelationalStore::open(medium).unwrap();
    assert_eq!(counts(&reopened), seeded);
}

#[test]
fn reset_seeds_even_when_open_skipped_seeding() {
    let config = StoreConfig {
        seed_on_open: false,
        ..StoreConfig::default()
    };
    let store = RelationalStore::open_with_config(MemoryKeyValueMedium::new(), config).unwrap();
    store.get_or_create_user("temp@placebook.app", "Temp").unwrap();

    store.reset().unwrap();

    assert!(store.get_user_by_email("temp@placebook.app").unwrap().is_none());
    assert!(store.get_user_by_email(SEED_OWNER_EMAIL).unwrap().is_some());
    assert_eq!(store.snapshot().unwrap().seed_version, SEED_VERSION);
}
