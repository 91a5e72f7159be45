use placebook_core::{
    AnnouncementKind, AnnouncementUpdate, MemoryKeyValueMedium, NewAnnouncement, NewPlace,
    NotificationKind, PlaceUpdate, RelationalStore, StoreConfig,
};

fn empty_store() -> RelationalStore {
    let config = StoreConfig {
        seed_on_open: false,
        ..StoreConfig::default()
    };
    RelationalStore::open_with_config(MemoryKeyValueMedium::new(), config).unwrap()
}

fn place(store: &RelationalStore, owner_id: &str) -> String {
    store
        .create_place(NewPlace {
            name: "Harbor Cafe".to_string(),
            category: "cafe".to_string(),
            owner_id: owner_id.to_string(),
            ..NewPlace::default()
        })
        .unwrap()
        .id
}

#[test]
fn new_place_claim_state_follows_owner() {
    let store = empty_store();
    let unclaimed = store.get_place(&place(&store, "")).unwrap().unwrap();
    assert!(!unclaimed.is_claimed);
    assert!(unclaimed.owner_id.is_empty());

    let claimed = store.get_place(&place(&store, "owner-a")).unwrap().unwrap();
    assert!(claimed.is_claimed);
}

#[test]
fn claim_overwrites_existing_owner() {
    let store = empty_store();
    let p = place(&store, "owner-a");

    store.claim_place(&p, "owner-b").unwrap();

    let place = store.get_place(&p).unwrap().unwrap();
    assert_eq!(place.owner_id, "owner-b");
    assert!(place.is_claimed);
}

#[test]
fn unclaim_requires_current_owner() {
    let store = empty_store();
    let p = place(&store, "owner-b");
    let before = store.get_place(&p).unwrap().unwrap();

    assert!(!store.unclaim_place(&p, "owner-a").unwrap());
    assert_eq!(store.get_place(&p).unwrap().unwrap(), before);

    assert!(store.unclaim_place(&p, "owner-b").unwrap());
    let after = store.get_place(&p).unwrap().unwrap();
    assert!(after.owner_id.is_empty());
    assert!(!after.is_claimed);
}

#[test]
fn delegation_is_owner_only_and_deduplicated() {
    let store = empty_store();
    let p = place(&store, "owner");

    assert!(!store.add_delegated_user(&p, "stranger", "helper").unwrap());
    assert!(store.add_delegated_user(&p, "owner", "helper").unwrap());
    assert!(store.add_delegated_user(&p, "owner", "helper").unwrap());
    assert_eq!(
        store.get_place(&p).unwrap().unwrap().delegated_users,
        vec!["helper".to_string()]
    );

    assert!(!store.add_delegated_user(&p, "helper", "friend").unwrap());
    assert!(store.can_manage_place(&p, "helper").unwrap());
    assert_eq!(store.places_managed_by("helper").unwrap().len(), 1);
    assert!(store.places_owned_by("helper").unwrap().is_empty());

    assert!(!store.remove_delegated_user(&p, "helper", "helper").unwrap());
    assert!(store.remove_delegated_user(&p, "owner", "helper").unwrap());
    assert!(!store.can_manage_place(&p, "helper").unwrap());
}

#[test]
fn place_edits_require_management() {
    let store = empty_store();
    let p = place(&store, "owner");
    let update = PlaceUpdate {
        description: Some("Now with pastries".to_string()),
        ..PlaceUpdate::default()
    };

    assert!(!store.update_place(&p, "stranger", update.clone()).unwrap());
    assert!(store.update_place(&p, "owner", update).unwrap());
    let place = store.get_place(&p).unwrap().unwrap();
    assert_eq!(place.description, "Now with pastries");
    assert!(place.updated_at >= place.created_at);
}

#[test]
fn announcements_notify_likers_and_respect_management() {
    let store = empty_store();
    let p = place(&store, "owner");
    store.toggle_liked_place("fan-1", &p).unwrap();
    store.toggle_liked_place("fan-2", &p).unwrap();

    let input = NewAnnouncement {
        place_id: p.clone(),
        title: "Happy hour".to_string(),
        content: "Half-price lattes after 3pm".to_string(),
        kind: AnnouncementKind::Offer,
    };
    assert!(store
        .create_announcement("stranger", input.clone())
        .unwrap()
        .is_none());

    let announcement = store.create_announcement("owner", input).unwrap().unwrap();
    for fan in ["fan-1", "fan-2"] {
        let received = store.notifications_for(fan).unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].kind, NotificationKind::Announcement);
    }

    assert!(!store
        .set_announcement_active(&announcement.id, "stranger", false)
        .unwrap());
    assert!(store
        .set_announcement_active(&announcement.id, "owner", false)
        .unwrap());
    assert!(store.announcements_for_place(&p, true).unwrap().is_empty());
    assert_eq!(store.announcements_for_place(&p, false).unwrap().len(), 1);

    assert!(store
        .update_announcement(
            &announcement.id,
            "owner",
            AnnouncementUpdate {
                kind: Some(AnnouncementKind::Event),
                ..AnnouncementUpdate::default()
            },
        )
        .unwrap());
    assert_eq!(
        store.announcements_for_place(&p, false).unwrap()[0].kind,
        AnnouncementKind::Event
    );

    assert!(!store.delete_announcement(&announcement.id, "fan-1").unwrap());
    assert!(store.delete_announcement(&announcement.id, "owner").unwrap());
}

#[test]
fn liked_places_toggle() {
    let store = empty_store();
    let p = place(&store, "");

    assert!(store.toggle_liked_place("u", &p).unwrap());
    assert!(store.is_place_liked("u", &p).unwrap());
    assert_eq!(store.liked_places("u").unwrap().len(), 1);
    assert_eq!(store.users_liking_place(&p).unwrap(), vec!["u".to_string()]);

    assert!(!store.toggle_liked_place("u", &p).unwrap());
    assert!(store.liked_places("u").unwrap().is_empty());
    assert!(store.toggle_liked_place("u", "missing").is_err());
}
