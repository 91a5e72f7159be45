use placebook_core::db::open_db;
use placebook_core::{
    GeoPoint, KeyValueMedium, MediumError, MediumResult, MemoryKeyValueMedium, NewPlace, NewReview, RelationalStore, ReviewDetails,
    SqliteKeyValueMedium, StoreConfig, UserProfileUpdate,
};

fn config() -> StoreConfig {
    StoreConfig {
        seed_on_open: false,
        ..StoreConfig::default()
    }
}

fn populate(store: &RelationalStore) {
    let author = store.get_or_create_user("ana@example.com", "Ana").unwrap();
    store
        .update_user_profile(
            &author.id,
            UserProfileUpdate {
                location: Some(GeoPoint::new(37.7749, -122.4194)),
                ..UserProfileUpdate::default()
            },
        )
        .unwrap();
    let place = store
        .create_place(NewPlace {
            name: "Pier Bakery".to_string(),
            category: "bakery".to_string(),
            location: Some(GeoPoint::new(37.808_0, -122.417_7)),
            owner_id: "owner".to_string(),
            ..NewPlace::default()
        })
        .unwrap();
    let review = store
        .create_review(NewReview {
            place_id: place.id.clone(),
            user_id: author.id.clone(),
            rating: 4,
            comment: "Sourdough worth the line.".to_string(),
            details: Some(ReviewDetails {
                service: Some(5),
                ..ReviewDetails::default()
            }),
            images: vec!["bread.jpg".to_string()],
        })
        .unwrap();
    store.respond_to_review(&review.id, "owner", "Thanks!").unwrap();
    let question = store
        .create_question(&place.id, &author.id, "Gluten-free options?")
        .unwrap();
    store.add_answer(&question.id, "owner", "On weekends.").unwrap();
    store.toggle_liked_place(&author.id, &place.id).unwrap();
    store.create_subscription("owner", "pro", 30).unwrap();
}

#[test]
fn sqlite_store_restores_identical_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("placebook.db");

    let store =
        RelationalStore::open_with_config(SqliteKeyValueMedium::new(open_db(&path).unwrap()), config())
            .unwrap();
    populate(&store);
    let before = store.snapshot().unwrap();
    drop(store);

    let reopened =
        RelationalStore::open_with_config(SqliteKeyValueMedium::new(open_db(&path).unwrap()), config())
            .unwrap();
    let after = reopened.snapshot().unwrap();

    assert_eq!(after, before);
    let response = after.reviews[0].owner_response.as_ref().unwrap();
    assert_eq!(
        response.responded_at,
        before.reviews[0].owner_response.as_ref().unwrap().responded_at
    );
    assert_eq!(after.questions[0].answers[0].created_at, before.questions[0].answers[0].created_at);
}

#[test]
fn instances_sharing_a_medium_are_last_write_wins() {
    let medium = MemoryKeyValueMedium::new();
    let first = RelationalStore::open_with_config(medium.clone(), config()).unwrap();
    let second = RelationalStore::open_with_config(medium.clone(), config()).unwrap();

    first.get_or_create_user("first@example.com", "First").unwrap();
    second.get_or_create_user("second@example.com", "Second").unwrap();

    // The second instance never saw the first write and overwrote it.
    let third = RelationalStore::open_with_config(medium, config()).unwrap();
    assert!(third.get_user_by_email("first@example.com").unwrap().is_none());
    assert!(third.get_user_by_email("second@example.com").unwrap().is_some());

    first.reload().unwrap();
    assert!(first.get_user_by_email("first@example.com").unwrap().is_none());
    assert_eq!(first.all_users().unwrap().len(), 1);
}

/// Reads succeed with nothing stored; every write is refused.
struct UnwritableMedium;

impl KeyValueMedium for UnwritableMedium {
    fn read(&self, _key: &str) -> MediumResult<Option<String>> {
        Ok(None)
    }

    fn write_entries(&mut self, _entries: &[(&str, String)]) -> MediumResult<()> {
        Err(MediumError::Unavailable("disk full".to_string()))
    }

    fn clear(&mut self) -> MediumResult<()> {
        Ok(())
    }

    fn keys(&self) -> MediumResult<Vec<String>> {
        Ok(Vec::new())
    }
}

#[test]
fn failed_writes_keep_memory_authoritative() {
    let store = RelationalStore::open(UnwritableMedium).unwrap();
    let seeded_users = store.all_users().unwrap().len();

    let user = store.get_or_create_user("ana@example.com", "Ana").unwrap();
    let place = store
        .create_place(NewPlace {
            name: "Offline Diner".to_string(),
            category: "diner".to_string(),
            ..NewPlace::default()
        })
        .unwrap();
    store
        .create_review(NewReview {
            place_id: place.id.clone(),
            user_id: user.id.clone(),
            rating: 5,
            comment: "Still counted.".to_string(),
            ..NewReview::default()
        })
        .unwrap();

    assert_eq!(store.all_users().unwrap().len(), seeded_users + 1);
    assert_eq!(store.get_user(&user.id).unwrap().unwrap().loyalty_points, 10);
    assert_eq!(store.average_rating(&place.id).unwrap(), 5.0);
}
