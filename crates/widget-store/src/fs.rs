//! Filesystem-backed document store.

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;
use widget_config::Config;
use widget_dom::{Document, SharedDocument};

use crate::errors::StoreError;
use crate::events::{EventKind, LifecycleEvent, LifecycleListener, Subscribers, SubscriptionId};
use crate::project::ProjectKey;
use crate::stamp::ModificationStamp;
use crate::store::{DocumentStore, LiveDocument};

const STORE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::fs");

/// Stores manifests at `<project root>/<manifest path>` on the local disk.
///
/// Editing sessions are shared: every [`DocumentStore::open_for_edit`] call
/// for the same project joins the session already open and adds a reference
/// that is dropped again by [`LiveDocument::release`].
#[derive(Clone)]
pub struct FsDocumentStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    manifest_path: Utf8PathBuf,
    indent_width: usize,
    sessions: Mutex<HashMap<ProjectKey, SessionSlot>>,
    stamps: Mutex<HashMap<Utf8PathBuf, StampState>>,
}

struct SessionSlot {
    session: Arc<EditSession>,
    references: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    length: u64,
}

#[derive(Default)]
struct StampState {
    counter: u64,
    observed: Option<Fingerprint>,
}

struct EditSession {
    project: ProjectKey,
    document: RwLock<SharedDocument>,
    saved_revision: AtomicU64,
    subscribers: Subscribers,
}

impl FsDocumentStore {
    /// Builds a store that resolves manifests using `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                manifest_path: config.manifest_path().to_path_buf(),
                indent_width: config.indent_width(),
                sessions: Mutex::new(HashMap::new()),
                stamps: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Location of the project's manifest.
    #[must_use]
    pub fn manifest_path(&self, project: &ProjectKey) -> Utf8PathBuf {
        self.inner.manifest_file(project)
    }

    /// Number of handles currently holding the project's session.
    #[must_use]
    pub fn open_references(&self, project: &ProjectKey) -> usize {
        lock(&self.inner.sessions)
            .get(project)
            .map_or(0, |slot| slot.references)
    }

    /// Discards unsaved edits by re-reading the manifest into the session.
    ///
    /// The session receives a fresh document, so subscribers see a
    /// [`EventKind::DocumentReplaced`] followed by a clean
    /// [`EventKind::DirtyState`]. Returns `false` when no session is open.
    ///
    /// # Errors
    ///
    /// Returns an error when the manifest cannot be read or parsed. The
    /// session keeps its current document in that case.
    pub fn revert(&self, project: &ProjectKey) -> Result<bool, StoreError> {
        let Some(session) = self.inner.session(project) else {
            return Ok(false);
        };
        let document = self.inner.read_document(project)?;
        session
            .subscribers
            .emit(LifecycleEvent::pre(EventKind::DocumentReplaced));
        let replacement = SharedDocument::new(document);
        session
            .saved_revision
            .store(replacement.revision(), Ordering::Release);
        *session
            .document
            .write()
            .unwrap_or_else(PoisonError::into_inner) = replacement;
        session
            .subscribers
            .emit(LifecycleEvent::post(EventKind::DocumentReplaced));
        session
            .subscribers
            .emit(LifecycleEvent::post(EventKind::DirtyState));
        debug!(
            target: STORE_TARGET,
            project = %project,
            "reverted editing session"
        );
        Ok(true)
    }
}

impl FsDocumentStore {
    fn handle(&self, session: Arc<EditSession>) -> Arc<dyn LiveDocument> {
        Arc::new(FsLiveDocument {
            session,
            store: Arc::clone(&self.inner),
            released: AtomicBool::new(false),
        })
    }
}

impl std::fmt::Debug for FsDocumentStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FsDocumentStore")
            .field("manifest_path", &self.inner.manifest_path)
            .field("indent_width", &self.inner.indent_width)
            .finish_non_exhaustive()
    }
}

impl StoreInner {
    fn manifest_file(&self, project: &ProjectKey) -> Utf8PathBuf {
        project.root().join(&self.manifest_path)
    }

    fn session(&self, project: &ProjectKey) -> Option<Arc<EditSession>> {
        lock(&self.sessions)
            .get(project)
            .map(|slot| Arc::clone(&slot.session))
    }

    fn read_document(&self, project: &ProjectKey) -> Result<Document, StoreError> {
        let path = self.manifest_file(project);
        let markup = fs::read_to_string(&path).map_err(|source| StoreError::io(&path, source))?;
        Document::parse(&markup).map_err(|source| StoreError::Parse { path, source })
    }

    fn observe(&self, path: &Utf8Path, advance: bool) -> Result<ModificationStamp, StoreError> {
        let metadata = fs::metadata(path).map_err(|source| StoreError::io(path, source))?;
        let fingerprint = Fingerprint {
            modified: metadata.modified().ok(),
            length: metadata.len(),
        };
        let mut stamps = lock(&self.stamps);
        let state = stamps.entry(path.to_path_buf()).or_default();
        if advance || state.observed != Some(fingerprint) {
            state.counter += 1;
            state.observed = Some(fingerprint);
        }
        Ok(ModificationStamp::new(state.counter))
    }

    fn release(&self, project: &ProjectKey) {
        let mut sessions = lock(&self.sessions);
        let Some(slot) = sessions.get_mut(project) else {
            return;
        };
        slot.references = slot.references.saturating_sub(1);
        if slot.references == 0 {
            sessions.remove(project);
            debug!(
                target: STORE_TARGET,
                project = %project,
                "closed editing session"
            );
        }
    }
}

impl EditSession {
    fn new(project: ProjectKey, document: SharedDocument) -> Self {
        let saved_revision = AtomicU64::new(document.revision());
        Self {
            project,
            document: RwLock::new(document),
            saved_revision,
            subscribers: Subscribers::default(),
        }
    }

    fn document(&self) -> SharedDocument {
        self.document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_dirty(&self) -> bool {
        self.document().revision() != self.saved_revision.load(Ordering::Acquire)
    }
}

impl DocumentStore for FsDocumentStore {
    fn exists(&self, project: &ProjectKey) -> bool {
        self.inner.manifest_file(project).is_file()
    }

    fn modification_stamp(&self, project: &ProjectKey) -> Result<ModificationStamp, StoreError> {
        self.inner.observe(&self.inner.manifest_file(project), false)
    }

    fn parse_snapshot(&self, project: &ProjectKey) -> Result<Document, StoreError> {
        self.inner.read_document(project)
    }

    fn open_for_edit(&self, project: &ProjectKey) -> Result<Arc<dyn LiveDocument>, StoreError> {
        let mut sessions = lock(&self.inner.sessions);
        if let Some(slot) = sessions.get_mut(project) {
            slot.references += 1;
            return Ok(self.handle(Arc::clone(&slot.session)));
        }
        let document = self.inner.read_document(project)?;
        let session = Arc::new(EditSession::new(
            project.clone(),
            SharedDocument::new(document),
        ));
        sessions.insert(
            project.clone(),
            SessionSlot {
                session: Arc::clone(&session),
                references: 1,
            },
        );
        debug!(
            target: STORE_TARGET,
            project = %project,
            "opened editing session"
        );
        Ok(self.handle(session))
    }

    fn cleanup(&self, live: &dyn LiveDocument) -> Result<(), StoreError> {
        live.document().edit(Document::cleanup);
        Ok(())
    }

    fn persist(&self, live: &dyn LiveDocument) -> Result<(), StoreError> {
        let project = live.project();
        let session = self
            .inner
            .session(project)
            .ok_or_else(|| StoreError::NotOpen {
                project: project.clone(),
            })?;
        let path = self.inner.manifest_file(project);
        let document = session.document();
        let revision = document.revision();
        let markup = document
            .to_xml_string(self.inner.indent_width)
            .map_err(|source| StoreError::Serialise {
                path: path.clone(),
                source,
            })?;
        let was_dirty = session.is_dirty();
        if was_dirty {
            session
                .subscribers
                .emit(LifecycleEvent::pre(EventKind::DirtyState));
        }
        fs::write(&path, markup).map_err(|source| StoreError::io(&path, source))?;
        let stamp = self.inner.observe(&path, true)?;
        session.saved_revision.store(revision, Ordering::Release);
        if was_dirty {
            session
                .subscribers
                .emit(LifecycleEvent::post(EventKind::DirtyState));
        }
        debug!(
            target: STORE_TARGET,
            project = %project,
            %path,
            %stamp,
            "persisted manifest"
        );
        Ok(())
    }
}

struct FsLiveDocument {
    session: Arc<EditSession>,
    store: Arc<StoreInner>,
    released: AtomicBool,
}

impl LiveDocument for FsLiveDocument {
    fn project(&self) -> &ProjectKey {
        &self.session.project
    }

    fn document(&self) -> SharedDocument {
        self.session.document()
    }

    fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    fn subscribe(&self, listener: Weak<dyn LifecycleListener>) -> SubscriptionId {
        self.session.subscribers.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.session.subscribers.unsubscribe(id);
    }

    fn release(&self) -> Result<(), StoreError> {
        if self.released.swap(true, Ordering::AcqRel) {
            return Err(StoreError::Released {
                project: self.session.project.clone(),
            });
        }
        self.store.release(&self.session.project);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
