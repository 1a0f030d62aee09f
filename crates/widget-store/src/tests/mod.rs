//! Unit tests for the filesystem store and lifecycle events.

use std::fs;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use widget_config::Config;

use crate::{
    DocumentStore, EventKind, FsDocumentStore, LifecycleEvent, LifecycleListener, ProjectKey,
    StoreError, Subscribers,
};

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<widget xmlns="http://www.w3.org/ns/widgets" id="org.example.app" version="1.0.0">
    <name>Example</name>
</widget>
"#;

struct Workspace {
    _dir: TempDir,
    project: ProjectKey,
    store: FsDocumentStore,
}

impl Workspace {
    fn manifest(&self) -> Utf8PathBuf {
        self.store.manifest_path(&self.project)
    }

    fn write(&self, markup: &str) {
        let path = self.manifest();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|error| panic!("mkdir {parent}: {error}"));
        }
        fs::write(&path, markup).unwrap_or_else(|error| panic!("write {path}: {error}"));
    }

    fn read(&self) -> String {
        let path = self.manifest();
        fs::read_to_string(&path).unwrap_or_else(|error| panic!("read {path}: {error}"))
    }
}

/// Listener that keeps every event it receives.
#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl EventLog {
    fn listener(self: &Arc<Self>) -> Weak<dyn LifecycleListener> {
        let listener: Arc<dyn LifecycleListener> = Arc::clone(self) as Arc<dyn LifecycleListener>;
        Arc::downgrade(&listener)
    }

    fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LifecycleListener for EventLog {
    fn on_event(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().unwrap_or_else(|error| panic!("temp dir: {error}"));
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .unwrap_or_else(|path| panic!("non UTF-8 temp dir: {}", path.display()));
    Workspace {
        _dir: dir,
        project: ProjectKey::new("demo", root),
        store: FsDocumentStore::new(&Config::default()),
    }
}

#[fixture]
fn populated(workspace: Workspace) -> Workspace {
    workspace.write(MANIFEST);
    workspace
}

#[rstest]
fn resolves_manifest_under_project_root(workspace: Workspace) {
    assert!(workspace.manifest().ends_with("www/config.xml"));
    assert!(workspace.manifest().starts_with(workspace.project.root()));
    assert!(!workspace.store.exists(&workspace.project));
}

#[rstest]
fn snapshot_of_missing_manifest_is_io_error(workspace: Workspace) {
    match workspace.store.parse_snapshot(&workspace.project) {
        Err(error @ StoreError::Io { .. }) => assert!(!error.is_parse_failure()),
        other => panic!("expected I/O error, got {other:?}"),
    }
}

#[rstest]
fn snapshot_of_malformed_manifest_is_parse_error(workspace: Workspace) {
    workspace.write("<widget><name></widget>");
    match workspace.store.parse_snapshot(&workspace.project) {
        Err(error) => assert!(error.is_parse_failure(), "unexpected error: {error}"),
        Ok(_) => panic!("malformed manifest should not parse"),
    }
}

#[rstest]
fn stamp_is_stable_until_the_file_changes(populated: Workspace) {
    let store = &populated.store;
    let project = &populated.project;
    let first = store
        .modification_stamp(project)
        .unwrap_or_else(|error| panic!("stamp: {error}"));
    let again = store
        .modification_stamp(project)
        .unwrap_or_else(|error| panic!("stamp: {error}"));
    assert_eq!(first, again);

    populated.write(&MANIFEST.replace("Example", "Renamed example"));
    let changed = store
        .modification_stamp(project)
        .unwrap_or_else(|error| panic!("stamp: {error}"));
    assert!(changed > first);
}

#[rstest]
fn sessions_are_shared_and_reference_counted(populated: Workspace) {
    let store = &populated.store;
    let project = &populated.project;
    let first = store
        .open_for_edit(project)
        .unwrap_or_else(|error| panic!("open: {error}"));
    let second = store
        .open_for_edit(project)
        .unwrap_or_else(|error| panic!("open: {error}"));
    assert!(first.document().ptr_eq(&second.document()));
    assert_eq!(store.open_references(project), 2);

    first.release().unwrap_or_else(|error| panic!("release: {error}"));
    assert_eq!(store.open_references(project), 1);
    assert!(matches!(first.release(), Err(StoreError::Released { .. })));
    assert_eq!(store.open_references(project), 1);

    second.release().unwrap_or_else(|error| panic!("release: {error}"));
    assert_eq!(store.open_references(project), 0);
}

#[rstest]
fn persist_writes_edits_and_clears_dirty_state(populated: Workspace) {
    let store = &populated.store;
    let project = &populated.project;
    let live = store
        .open_for_edit(project)
        .unwrap_or_else(|error| panic!("open: {error}"));
    let log = Arc::new(EventLog::default());
    let _subscription = live.subscribe(log.listener());
    let before = store
        .modification_stamp(project)
        .unwrap_or_else(|error| panic!("stamp: {error}"));

    let root = live
        .current_root()
        .unwrap_or_else(|| panic!("manifest should have a root"));
    root.set_attribute("version", Some("2.0.0"))
        .unwrap_or_else(|error| panic!("set version: {error}"));
    assert!(live.is_dirty());

    store
        .cleanup(live.as_ref())
        .unwrap_or_else(|error| panic!("cleanup: {error}"));
    store
        .persist(live.as_ref())
        .unwrap_or_else(|error| panic!("persist: {error}"));

    assert!(!live.is_dirty());
    assert!(populated.read().contains(r#"version="2.0.0""#));
    let after = store
        .modification_stamp(project)
        .unwrap_or_else(|error| panic!("stamp: {error}"));
    assert!(after > before);
    assert_eq!(
        log.events(),
        vec![
            LifecycleEvent::pre(EventKind::DirtyState),
            LifecycleEvent::post(EventKind::DirtyState),
        ]
    );
    live.release().unwrap_or_else(|error| panic!("release: {error}"));
}

#[rstest]
fn persist_without_session_fails(populated: Workspace) {
    let live = populated
        .store
        .open_for_edit(&populated.project)
        .unwrap_or_else(|error| panic!("open: {error}"));
    live.release().unwrap_or_else(|error| panic!("release: {error}"));
    assert!(matches!(
        populated.store.persist(live.as_ref()),
        Err(StoreError::NotOpen { .. })
    ));
}

#[rstest]
fn revert_swaps_in_a_fresh_document(populated: Workspace) {
    let store = &populated.store;
    let project = &populated.project;
    assert!(!store
        .revert(project)
        .unwrap_or_else(|error| panic!("revert: {error}")));

    let live = store
        .open_for_edit(project)
        .unwrap_or_else(|error| panic!("open: {error}"));
    let log = Arc::new(EventLog::default());
    let _subscription = live.subscribe(log.listener());
    let original = live.document();
    let root = live
        .current_root()
        .unwrap_or_else(|| panic!("manifest should have a root"));
    root.set_attribute("id", Some("org.example.changed"))
        .unwrap_or_else(|error| panic!("set id: {error}"));

    assert!(store
        .revert(project)
        .unwrap_or_else(|error| panic!("revert: {error}")));
    assert!(!live.document().ptr_eq(&original));
    assert!(!live.is_dirty());
    let reverted = live
        .current_root()
        .unwrap_or_else(|| panic!("reverted manifest should have a root"));
    assert_eq!(reverted.attribute("id").as_deref(), Some("org.example.app"));
    assert_eq!(
        log.events(),
        vec![
            LifecycleEvent::pre(EventKind::DocumentReplaced),
            LifecycleEvent::post(EventKind::DocumentReplaced),
            LifecycleEvent::post(EventKind::DirtyState),
        ]
    );
    live.release().unwrap_or_else(|error| panic!("release: {error}"));
}

#[rstest]
fn listeners_see_the_replacement_while_being_notified(populated: Workspace) {
    let store = &populated.store;
    let project = &populated.project;
    let live = store
        .open_for_edit(project)
        .unwrap_or_else(|error| panic!("open: {error}"));
    populated.write(&MANIFEST.replace("org.example.app", "org.example.external"));

    let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
    let listener: Arc<dyn LifecycleListener> = {
        let live = Arc::clone(&live);
        let seen = Arc::clone(&seen);
        Arc::new(move |event: LifecycleEvent| {
            if event == LifecycleEvent::post(EventKind::DirtyState) {
                let id = live.current_root().and_then(|root| root.attribute("id"));
                seen.lock().unwrap_or_else(PoisonError::into_inner).push(id);
            }
        })
    };
    let _subscription = live.subscribe(Arc::downgrade(&listener));

    assert!(store
        .revert(project)
        .unwrap_or_else(|error| panic!("revert: {error}")));
    assert_eq!(
        *seen.lock().unwrap_or_else(PoisonError::into_inner),
        vec![Some(String::from("org.example.external"))]
    );
    live.release().unwrap_or_else(|error| panic!("release: {error}"));
}

#[rstest]
fn unsubscribed_listeners_stop_receiving() {
    let subscribers = Subscribers::default();
    let kept = Arc::new(EventLog::default());
    let cancelled = Arc::new(EventLog::default());
    let _kept_id = subscribers.subscribe(kept.listener());
    let cancelled_id = subscribers.subscribe(cancelled.listener());
    subscribers.unsubscribe(cancelled_id);
    assert_eq!(subscribers.len(), 1);

    subscribers.emit(LifecycleEvent::post(EventKind::DirtyState));
    assert_eq!(kept.events().len(), 1);
    assert!(cancelled.events().is_empty());
}

#[rstest]
fn dropped_listeners_are_pruned_on_emit() {
    let subscribers = Subscribers::default();
    let log = Arc::new(EventLog::default());
    let _id = subscribers.subscribe(log.listener());
    drop(log);

    subscribers.emit(LifecycleEvent::post(EventKind::DirtyState));
    assert!(subscribers.is_empty());
}

#[rstest]
fn listeners_may_unsubscribe_while_notified() {
    let subscribers = Arc::new(Subscribers::default());
    let calls = Arc::new(Mutex::new(0_usize));
    let slot: Arc<Mutex<Option<crate::SubscriptionId>>> = Arc::default();
    let listener: Arc<dyn LifecycleListener> = {
        let subscribers = Arc::clone(&subscribers);
        let calls = Arc::clone(&calls);
        let slot = Arc::clone(&slot);
        Arc::new(move |_event: LifecycleEvent| {
            *calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
            if let Some(id) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
                subscribers.unsubscribe(id);
            }
        })
    };
    let id = subscribers.subscribe(Arc::downgrade(&listener));
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);

    subscribers.emit(LifecycleEvent::post(EventKind::DirtyState));
    subscribers.emit(LifecycleEvent::post(EventKind::DirtyState));

    assert_eq!(*calls.lock().unwrap_or_else(PoisonError::into_inner), 1);
    assert!(subscribers.is_empty());
}
