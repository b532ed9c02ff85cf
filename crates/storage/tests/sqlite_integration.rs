use serde_json::json;
use storage::keys::{RESUME_ELAPSED_KEY, reviewed_key};
use storage::sqlite::SqliteStore;
use storage::store::ProgressStore;
use study_core::model::{ItemKind, WeekId};

#[tokio::test]
async fn sqlite_round_trips_progress_values() {
    let store = SqliteStore::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");

    let week = WeekId::new("w1");
    let key = reviewed_key(ItemKind::Vocab, &week);
    store.set(&key, &json!(["v1", "v2"])).await.unwrap();
    store.set(RESUME_ELAPSED_KEY, &json!(65_000)).await.unwrap();

    assert_eq!(store.get(&key).await.unwrap(), Some(json!(["v1", "v2"])));
    assert_eq!(
        store.get(RESUME_ELAPSED_KEY).await.unwrap(),
        Some(json!(65_000))
    );
}

#[tokio::test]
async fn sqlite_set_replaces_and_remove_deletes() {
    let store = SqliteStore::connect("sqlite:file:memdb_replace?mode=memory&cache=shared")
        .await
        .expect("connect");

    let week = WeekId::new("w2");
    let key = reviewed_key(ItemKind::Phrase, &week);
    store.set(&key, &json!(["p1"])).await.unwrap();
    store.set(&key, &json!(["p1", "p2"])).await.unwrap();
    assert_eq!(store.get(&key).await.unwrap(), Some(json!(["p1", "p2"])));

    store.remove(&key).await.unwrap();
    assert!(store.get(&key).await.unwrap().is_none());

    // Removing an absent key is fine.
    store.remove(&key).await.unwrap();
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let url = "sqlite:file:memdb_migrate?mode=memory&cache=shared";
    let first = SqliteStore::connect(url).await.expect("first connect");
    first.set("k", &json!(1)).await.unwrap();

    // A second connect re-runs the migration path against the same database.
    let second = SqliteStore::connect(url).await.expect("second connect");
    assert_eq!(second.get("k").await.unwrap(), Some(json!(1)));
}
