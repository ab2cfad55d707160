use contentdesk_core::backend::SavedQueriesBackend;
use contentdesk_core::db::{open_db, open_db_in_memory};
use contentdesk_core::model::saved_query::{QuerySpec, SavedQuery, SavedQueryId};
use contentdesk_core::{
    BackendError, BackendErrorKind, BackendResult, RecordingNotifier, RepoError,
    SavedQueriesStore, SavedQueryError, SqliteSavedQueryRepository,
};
use futures::executor::block_on;
use futures::future::{self, FutureExt, LocalBoxFuture};
use rusqlite::params;
use std::collections::BTreeMap;
use std::rc::Rc;

fn spec(text: &str) -> QuerySpec {
    let mut filters = BTreeMap::new();
    filters.insert("status".to_string(), "published".to_string());
    QuerySpec {
        text: text.to_string(),
        filters,
    }
}

fn sqlite_store(notifier: Rc<RecordingNotifier>) -> (Rc<SqliteSavedQueryRepository>, SavedQueriesStore) {
    let repo = Rc::new(SqliteSavedQueryRepository::new(open_db_in_memory().unwrap()));
    let store = SavedQueriesStore::new(
        repo.clone(),
        notifier,
        "Queries reloaded",
        "Query saved",
        "Query deleted",
    );
    (repo, store)
}

#[test]
fn repository_round_trips_spec_and_orders_newest_first() {
    let repo = SqliteSavedQueryRepository::new(open_db_in_memory().unwrap());
    let older = repo.create_query("older", &spec("a")).unwrap();
    let newer = repo.create_query("newer", &spec("b")).unwrap();

    repo.connection()
        .execute(
            "UPDATE saved_queries SET updated_at = 1000 WHERE uuid = ?1;",
            params![older.id.to_string()],
        )
        .unwrap();
    repo.connection()
        .execute(
            "UPDATE saved_queries SET updated_at = 2000 WHERE uuid = ?1;",
            params![newer.id.to_string()],
        )
        .unwrap();

    let listed = repo.list_queries().unwrap();
    assert_eq!(
        listed.iter().map(|query| query.name.as_str()).collect::<Vec<_>>(),
        vec!["newer", "older"]
    );
    assert_eq!(listed[1].spec, spec("a"));
    assert_eq!(listed[0].updated_at_ms, 2000);
}

#[test]
fn repository_delete_of_missing_row_is_not_found() {
    let repo = SqliteSavedQueryRepository::new(open_db_in_memory().unwrap());
    let id = SavedQueryId::new_v4();
    match repo.delete_query(id) {
        Err(RepoError::NotFound(missing)) => assert_eq!(missing, id),
        other => panic!("unexpected result: {other:?}"),
    }

    let err = block_on(repo.delete_saved_query(id)).unwrap_err();
    assert_eq!(err.kind(), BackendErrorKind::NotFound);
}

#[test]
fn corrupted_spec_is_reported_as_invalid_data() {
    let repo = SqliteSavedQueryRepository::new(open_db_in_memory().unwrap());
    repo.connection()
        .execute(
            "INSERT INTO saved_queries (uuid, name, spec_json) VALUES (?1, 'broken', '{');",
            params![SavedQueryId::new_v4().to_string()],
        )
        .unwrap();

    assert!(matches!(
        repo.list_queries(),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn store_save_normalizes_name_and_prepends_item() {
    let notifier = Rc::new(RecordingNotifier::new());
    let (repo, store) = sqlite_store(notifier.clone());
    block_on(store.load(false)).unwrap();

    let first = block_on(store.save("  drafts  ", spec("x"))).unwrap();
    let second = block_on(store.save("open\n bugs", spec("y"))).unwrap();

    assert_eq!(first.name, "drafts");
    assert_eq!(second.name, "open bugs");
    assert_eq!(
        store.names().get(),
        vec!["open bugs".to_string(), "drafts".to_string()]
    );
    assert_eq!(repo.list_queries().unwrap().len(), 2);
    assert_eq!(
        notifier.messages(),
        vec!["Query saved".to_string(), "Query saved".to_string()]
    );
    assert!(!store.state().snapshot().is_saving);
}

#[test]
fn store_rejects_blank_name_without_touching_state() {
    let (repo, store) = sqlite_store(Rc::new(RecordingNotifier::new()));
    let version = store.state().version();

    let err = block_on(store.save(" \t ", spec("x"))).unwrap_err();
    assert!(matches!(err, SavedQueryError::InvalidName(_)));
    assert_eq!(store.state().version(), version);
    assert!(repo.list_queries().unwrap().is_empty());
}

#[test]
fn store_delete_removes_item_and_notifies() {
    let notifier = Rc::new(RecordingNotifier::new());
    let (repo, store) = sqlite_store(notifier.clone());
    let kept = repo.create_query("kept", &spec("k")).unwrap();
    let gone = repo.create_query("gone", &spec("g")).unwrap();
    block_on(store.load(true)).unwrap();

    block_on(store.delete(gone.id)).unwrap();

    let items: Vec<SavedQuery> = store.items().get();
    assert_eq!(items, vec![kept]);
    assert_eq!(
        notifier.messages(),
        vec!["Queries reloaded".to_string(), "Query deleted".to_string()]
    );
}

#[test]
fn store_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contentdesk.db");
    {
        let repo = Rc::new(SqliteSavedQueryRepository::new(open_db(&path).unwrap()));
        let store = SavedQueriesStore::new(
            repo,
            Rc::new(RecordingNotifier::new()),
            "r",
            "s",
            "d",
        );
        block_on(store.save("persisted", spec("p"))).unwrap();
    }

    let repo = Rc::new(SqliteSavedQueryRepository::new(open_db(&path).unwrap()));
    let store = SavedQueriesStore::new(repo, Rc::new(RecordingNotifier::new()), "r", "s", "d");
    block_on(store.load(false)).unwrap();
    assert_eq!(store.names().get(), vec!["persisted".to_string()]);
}

struct FailingQueries;

impl SavedQueriesBackend for FailingQueries {
    fn list_saved_queries(&self) -> LocalBoxFuture<'_, BackendResult<Vec<SavedQuery>>> {
        future::ready(Err(BackendError::transport("offline"))).boxed_local()
    }

    fn create_saved_query(
        &self,
        _name: String,
        _spec: QuerySpec,
    ) -> LocalBoxFuture<'_, BackendResult<SavedQuery>> {
        future::ready(Err(BackendError::transport("offline"))).boxed_local()
    }

    fn delete_saved_query(&self, _id: SavedQueryId) -> LocalBoxFuture<'_, BackendResult<()>> {
        future::ready(Err(BackendError::transport("offline"))).boxed_local()
    }
}

#[test]
fn failing_backend_clears_every_in_flight_flag() {
    let notifier = Rc::new(RecordingNotifier::new());
    let store = SavedQueriesStore::new(
        Rc::new(FailingQueries),
        notifier.clone(),
        "r",
        "s",
        "d",
    );

    assert!(block_on(store.load(true)).is_err());
    assert!(block_on(store.save("name", spec("x"))).is_err());
    assert!(block_on(store.delete(SavedQueryId::new_v4())).is_err());

    let snapshot = store.state().snapshot();
    assert!(!snapshot.is_loading);
    assert!(!snapshot.is_saving);
    assert!(!snapshot.is_loaded);
    assert!(notifier.is_empty());
}
