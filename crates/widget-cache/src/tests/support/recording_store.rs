//! Recording document store used in tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use widget_dom::{Document, SharedDocument};
use widget_store::{
    DocumentStore, FsDocumentStore, LifecycleListener, LiveDocument, ModificationStamp,
    ProjectKey, StoreError, SubscriptionId,
};

/// Discriminates the store calls recorded by the double.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// `exists` was invoked.
    Exists,
    /// `modification_stamp` was invoked.
    Stamp,
    /// `parse_snapshot` was invoked.
    Parse,
    /// `open_for_edit` was invoked.
    Open,
    /// `cleanup` was invoked.
    Cleanup,
    /// `persist` was invoked.
    Persist,
    /// A live handle was released.
    Release,
}

#[derive(Default)]
struct RecordingState {
    calls: Vec<(CallKind, ProjectKey)>,
    failing_persist: bool,
    failing_release: HashSet<ProjectKey>,
}

/// Test double that wraps the filesystem store and records every call.
#[derive(Clone)]
pub struct RecordingStore {
    inner: FsDocumentStore,
    shared: Arc<Mutex<RecordingState>>,
}

impl RecordingStore {
    /// Wraps `inner`.
    pub fn new(inner: FsDocumentStore) -> Self {
        Self {
            inner,
            shared: Arc::new(Mutex::new(RecordingState::default())),
        }
    }

    /// Underlying filesystem store.
    pub fn inner(&self) -> &FsDocumentStore {
        &self.inner
    }

    /// Number of recorded calls of `kind`.
    pub fn count(&self, kind: CallKind) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|(recorded, _)| *recorded == kind)
            .count()
    }

    /// Number of recorded calls of `kind` for `project`.
    pub fn count_for(&self, kind: CallKind, project: &ProjectKey) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|(recorded, key)| *recorded == kind && key == project)
            .count()
    }

    /// Makes every later `persist` fail with an I/O error.
    pub fn fail_persist(&self) {
        self.state().failing_persist = true;
    }

    /// Makes releasing handles of `project` fail.
    pub fn fail_release(&self, project: &ProjectKey) {
        self.state().failing_release.insert(project.clone());
    }

    /// Lets releases of `project` reach the wrapped store again.
    pub fn heal_release(&self, project: &ProjectKey) {
        self.state().failing_release.remove(project);
    }

    fn record(&self, kind: CallKind, project: &ProjectKey) {
        self.state().calls.push((kind, project.clone()));
    }

    fn state(&self) -> MutexGuard<'_, RecordingState> {
        state(&self.shared)
    }
}

fn state(shared: &Mutex<RecordingState>) -> MutexGuard<'_, RecordingState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(project: &ProjectKey, operation: &str) -> StoreError {
    StoreError::Io {
        path: project.root().to_path_buf(),
        source: std::io::Error::other(format!("injected {operation} failure")),
    }
}

impl DocumentStore for RecordingStore {
    fn exists(&self, project: &ProjectKey) -> bool {
        self.record(CallKind::Exists, project);
        self.inner.exists(project)
    }

    fn modification_stamp(&self, project: &ProjectKey) -> Result<ModificationStamp, StoreError> {
        self.record(CallKind::Stamp, project);
        self.inner.modification_stamp(project)
    }

    fn parse_snapshot(&self, project: &ProjectKey) -> Result<Document, StoreError> {
        self.record(CallKind::Parse, project);
        self.inner.parse_snapshot(project)
    }

    fn open_for_edit(&self, project: &ProjectKey) -> Result<Arc<dyn LiveDocument>, StoreError> {
        self.record(CallKind::Open, project);
        let live = self.inner.open_for_edit(project)?;
        Ok(Arc::new(RecordingLive {
            inner: live,
            shared: Arc::clone(&self.shared),
        }))
    }

    fn cleanup(&self, live: &dyn LiveDocument) -> Result<(), StoreError> {
        self.record(CallKind::Cleanup, live.project());
        self.inner.cleanup(live)
    }

    fn persist(&self, live: &dyn LiveDocument) -> Result<(), StoreError> {
        self.record(CallKind::Persist, live.project());
        if self.state().failing_persist {
            return Err(injected(live.project(), "persist"));
        }
        self.inner.persist(live)
    }
}

struct RecordingLive {
    inner: Arc<dyn LiveDocument>,
    shared: Arc<Mutex<RecordingState>>,
}

impl LiveDocument for RecordingLive {
    fn project(&self) -> &ProjectKey {
        self.inner.project()
    }

    fn document(&self) -> SharedDocument {
        self.inner.document()
    }

    fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    fn subscribe(&self, listener: Weak<dyn LifecycleListener>) -> SubscriptionId {
        self.inner.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.unsubscribe(id);
    }

    fn release(&self) -> Result<(), StoreError> {
        let failing = {
            let mut state = state(&self.shared);
            state
                .calls
                .push((CallKind::Release, self.inner.project().clone()));
            state.failing_release.contains(self.inner.project())
        };
        if failing {
            return Err(injected(self.inner.project(), "release"));
        }
        self.inner.release()
    }
}
