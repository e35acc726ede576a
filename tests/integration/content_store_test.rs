//! Integration tests for the content store against a mock remote

use std::time::Duration;

use noornest::content::{
    CategoryFilter, ChangeAction, ContentKind, ContentStore, NewPrintable, NewTradition,
    PrintableCategory, RefreshStatus, Session, UserRole,
};

use super::content_mock::{MockFeed, MockRemote};

type Store = ContentStore<MockRemote, MockFeed>;

fn store() -> (MockRemote, MockFeed, Store) {
    let remote = MockRemote::new();
    let feed = MockFeed::new();
    let store = ContentStore::new(Some(remote.clone()), Some(feed.clone()));
    (remote, feed, store)
}

async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

fn kids_calendar() -> NewPrintable {
    NewPrintable {
        title: "Kids Ramadan Calendar".to_string(),
        description: "Color a lantern for every fast".to_string(),
        category: PrintableCategory::Kids,
        is_premium: false,
        thumbnail_url: "https://cdn.example/calendar.png".to_string(),
        file_url: None,
    }
}

#[tokio::test]
async fn test_admin_publish_flows_through_notification() {
    let (remote, feed, store) = store();
    let admin_id = remote.add_profile(UserRole::Admin);
    let session = Session::resolve(Some(&remote), admin_id, Some("admin@noornest.app".into())).await;
    let admin = session.admin_capability().expect("admin profile");

    let _subscription = store.subscribe(ContentKind::Printables).await.unwrap();
    store.refresh(ContentKind::Printables).await.unwrap();
    assert_eq!(store.printables().len(), 3);

    store.create_printable(&admin, kids_calendar()).await.unwrap();
    // Nothing changes locally until the remote confirms
    assert_eq!(store.printables()[0].id, "p-1");

    feed.notify(ContentKind::Printables, ChangeAction::Insert);
    assert!(eventually(|| store.printables().len() == 1).await);

    let printable = &store.printables()[0];
    assert_eq!(printable.title, "Kids Ramadan Calendar");
    assert!(printable.created_at.is_some());
    assert_eq!(store.printables_in(CategoryFilter::Only(PrintableCategory::Kids)).len(), 1);
    assert!(store.printables_in(CategoryFilter::Only(PrintableCategory::Planners)).is_empty());
}

#[tokio::test]
async fn test_deleting_last_row_restores_defaults() {
    let (remote, feed, store) = store();
    let admin_id = remote.add_profile(UserRole::Admin);
    let admin = Session::resolve(Some(&remote), admin_id, None)
        .await
        .admin_capability()
        .unwrap();

    let _subscription = store.subscribe(ContentKind::Traditions).await.unwrap();
    store
        .create_tradition(
            &admin,
            NewTradition {
                title: "Neighbourhood Iftar".to_string(),
                description: "Share a plate with the family next door".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    feed.notify(ContentKind::Traditions, ChangeAction::Insert);
    assert!(eventually(|| store.traditions().len() == 1).await);

    let id = store.traditions()[0].id.clone();
    assert_eq!(store.traditions()[0].icon, "✨");

    store.delete(&admin, ContentKind::Traditions, &id).await.unwrap();
    assert_eq!(remote.row_count(ContentKind::Traditions), 0);

    feed.notify(ContentKind::Traditions, ChangeAction::Delete);
    assert!(eventually(|| store.traditions().len() == 3).await);
    assert_eq!(store.traditions()[0].id, "t-1");
}

#[tokio::test]
async fn test_regular_users_cannot_obtain_write_access() {
    let (remote, _feed, _store) = store();
    let user_id = remote.add_profile(UserRole::User);

    let session = Session::resolve(Some(&remote), user_id, None).await;
    assert!(session.is_signed_in());
    assert!(session.admin_capability().is_none());

    // No profile row at all
    let stranger = Session::resolve(Some(&remote), uuid::Uuid::new_v4(), None).await;
    assert_eq!(stranger.role(), UserRole::User);
    assert!(stranger.admin_capability().is_none());
}

#[tokio::test]
async fn test_missing_table_serves_defaults() {
    let (remote, _feed, store) = store();
    remote.drop_table(ContentKind::Printables);

    assert_eq!(
        store.refresh(ContentKind::Printables).await.unwrap(),
        RefreshStatus::Applied
    );
    assert_eq!(store.printables().len(), 3);
    store.refresh_all().await.unwrap();
    assert_eq!(store.traditions().len(), 3);
}

#[tokio::test]
async fn test_dropped_subscription_stops_listening() {
    let (_remote, feed, store) = store();

    let subscription = store.subscribe(ContentKind::Printables).await.unwrap();
    assert_eq!(subscription.kind(), ContentKind::Printables);
    assert_eq!(feed.listener_count(), 1);

    drop(subscription);
    assert!(eventually(|| feed.listener_count() == 0).await);
}

#[tokio::test]
async fn test_closed_store_ignores_notifications() {
    let (remote, feed, store) = store();
    let admin_id = remote.add_profile(UserRole::Admin);
    let admin = Session::resolve(Some(&remote), admin_id, None)
        .await
        .admin_capability()
        .unwrap();

    let _subscription = store.subscribe(ContentKind::Printables).await.unwrap();
    store.create_printable(&admin, kids_calendar()).await.unwrap();

    store.close();
    assert!(store.is_closed());
    feed.notify(ContentKind::Printables, ChangeAction::Insert);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.printables().len(), 3);
}
