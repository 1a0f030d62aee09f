//! Per-project manifest model with a read-only and an editable view.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

use tracing::{debug, info, warn};
use widget_dom::SharedDocument;
use widget_model::{
    Access, Author, ConfigElement, ConfigObject, Content, Feature, Icon, License, ObjectKind,
    Preference, Splash, Widget,
};
use widget_store::{
    DocumentStore, EventKind, LifecycleEvent, LifecycleListener, LiveDocument, ModificationStamp,
    ProjectKey, StoreError, SubscriptionId,
};

use crate::cache::CACHE_TARGET;
use crate::errors::CacheError;

/// Which views a model currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelPhase {
    /// Nothing has been loaded.
    Uninitialised,
    /// Only the read-only snapshot is cached.
    ReadOnlyLoaded,
    /// An editable view is bound to a live document.
    EditBound,
}

/// Cached views of one project's manifest.
///
/// Reads, binds and lifecycle reactions for a project run under the model's
/// state lock, while other projects proceed independently. Saves are
/// serialised on a lock of their own and let go of the state lock while the
/// store persists, because the store reports the resulting clean transition
/// synchronously and the model reacts to it before `save` returns.
pub struct WidgetModel {
    project: ProjectKey,
    store: Arc<dyn DocumentStore>,
    state: Arc<Mutex<ModelState>>,
    save_lock: Mutex<()>,
}

#[derive(Default)]
struct ModelState {
    editable: Option<EditBinding>,
    readonly: Option<ReadOnlySnapshot>,
    unreleased: Vec<Arc<dyn LiveDocument>>,
}

struct EditBinding {
    widget: Arc<Widget>,
    live: Arc<dyn LiveDocument>,
    _reloader: Arc<Reloader>,
    subscription: SubscriptionId,
}

struct ReadOnlySnapshot {
    widget: Arc<Widget>,
    stamp: ModificationStamp,
}

/// Listener registered with the live document of an editable binding.
///
/// The store only holds it weakly and it only holds the model state weakly,
/// so neither side keeps the other alive.
struct Reloader {
    project: ProjectKey,
    state: Weak<Mutex<ModelState>>,
}

impl LifecycleListener for Reloader {
    fn on_event(&self, event: LifecycleEvent) {
        if let Some(state) = self.state.upgrade() {
            lock(&state).react(&self.project, event);
        }
    }
}

impl ModelState {
    fn react(&mut self, project: &ProjectKey, event: LifecycleEvent) {
        if !event.is_post() || event.kind != EventKind::DirtyState {
            return;
        }
        let Some(binding) = &self.editable else {
            return;
        };
        if binding.live.is_dirty() {
            return;
        }
        match binding.live.current_root() {
            Some(root) => binding.widget.reload(root),
            None => warn!(
                target: CACHE_TARGET,
                project = %project,
                "live document lost its root element"
            ),
        }
        self.readonly = None;
        debug!(
            target: CACHE_TARGET,
            project = %project,
            "reloaded editable view after clean transition"
        );
    }
}

macro_rules! create_shortcuts {
    ($($method:ident => $object:ty;)*) => {
        $(
            #[doc = concat!("Creates a detached `", stringify!($object), "` in the editable document.")]
            pub fn $method(&self) -> Result<$object, CacheError> {
                self.create::<$object>()
            }
        )*
    };
}

impl WidgetModel {
    pub(crate) fn new(project: ProjectKey, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            project,
            store,
            state: Arc::new(Mutex::new(ModelState::default())),
            save_lock: Mutex::new(()),
        }
    }

    /// Project this model belongs to.
    #[must_use]
    pub fn project(&self) -> &ProjectKey {
        &self.project
    }

    /// Views currently held by the model.
    #[must_use]
    pub fn phase(&self) -> ModelPhase {
        let state = self.lock();
        if state.editable.is_some() {
            ModelPhase::EditBound
        } else if state.readonly.is_some() {
            ModelPhase::ReadOnlyLoaded
        } else {
            ModelPhase::Uninitialised
        }
    }

    /// Read-only view of the persisted manifest.
    ///
    /// The cached view is returned as long as the store reports the stamp it
    /// was built from. Returns `Ok(None)` when the project has no manifest.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Parse`] for malformed markup and
    /// [`CacheError::Io`] when the manifest cannot be read.
    pub fn read_only_widget(&self) -> Result<Option<Arc<Widget>>, CacheError> {
        if !self.store.exists(&self.project) {
            self.lock().readonly = None;
            return Ok(None);
        }
        let mut state = self.lock();
        let stamp = self
            .store
            .modification_stamp(&self.project)
            .map_err(|error| CacheError::store(&self.project, error))?;
        if let Some(snapshot) = state
            .readonly
            .as_ref()
            .filter(|snapshot| snapshot.stamp == stamp)
        {
            debug!(
                target: CACHE_TARGET,
                project = %self.project,
                %stamp,
                "read-only view is current"
            );
            return Ok(Some(Arc::clone(&snapshot.widget)));
        }

        let started = Instant::now();
        let document = self
            .store
            .parse_snapshot(&self.project)
            .map_err(|error| CacheError::store(&self.project, error))?;
        let root = SharedDocument::new(document).root().ok_or_else(|| {
            CacheError::invalid_state(&self.project, "manifest has no root element")
        })?;
        let widget = Arc::new(Widget::new(root));
        state.readonly = Some(ReadOnlySnapshot {
            widget: Arc::clone(&widget),
            stamp,
        });
        debug!(
            target: CACHE_TARGET,
            project = %self.project,
            %stamp,
            elapsed_ms = elapsed_ms(started),
            "rebuilt read-only view"
        );
        Ok(Some(widget))
    }

    /// Editable view bound to the store's live editing session.
    ///
    /// The first call opens the session and subscribes to its lifecycle
    /// events. Later calls return the same view. Returns `Ok(None)` when the
    /// project has no manifest.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Parse`] or [`CacheError::Io`] when the session
    /// cannot be opened, and [`CacheError::InvalidState`] when the live
    /// document has no root element. The model is left unchanged.
    pub fn editable_widget(&self) -> Result<Option<Arc<Widget>>, CacheError> {
        let mut state = self.lock();
        if let Some(binding) = &state.editable {
            return Ok(Some(Arc::clone(&binding.widget)));
        }
        if !self.store.exists(&self.project) {
            return Ok(None);
        }

        let started = Instant::now();
        let live = self
            .store
            .open_for_edit(&self.project)
            .map_err(|error| CacheError::store(&self.project, error))?;
        let reloader = Arc::new(Reloader {
            project: self.project.clone(),
            state: Arc::downgrade(&self.state),
        });
        let listener: Weak<dyn LifecycleListener> = Arc::<Reloader>::downgrade(&reloader);
        let subscription = live.subscribe(listener);
        let Some(root) = live.current_root() else {
            live.unsubscribe(subscription);
            if let Err(error) = live.release() {
                warn!(
                    target: CACHE_TARGET,
                    project = %self.project,
                    %error,
                    "failed to release rootless session"
                );
            }
            return Err(CacheError::invalid_state(
                &self.project,
                "live document has no root element",
            ));
        };
        let widget = Arc::new(Widget::new(root));
        state.editable = Some(EditBinding {
            widget: Arc::clone(&widget),
            live,
            _reloader: reloader,
            subscription,
        });
        debug!(
            target: CACHE_TARGET,
            project = %self.project,
            elapsed_ms = elapsed_ms(started),
            "bound editable view"
        );
        Ok(Some(widget))
    }

    /// Normalises and persists the live document.
    ///
    /// Does nothing when no editable view is bound. The editable view stays
    /// bound whatever the outcome. When the write succeeds the store reports
    /// the clean transition, so the editable view has been reloaded and the
    /// read-only snapshot dropped by the time this returns.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] when the store cannot write the manifest.
    pub fn save(&self) -> Result<(), CacheError> {
        let _saving = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let bound = self
            .lock()
            .editable
            .as_ref()
            .map(|binding| Arc::clone(&binding.live));
        let Some(live) = bound else {
            return Ok(());
        };

        let started = Instant::now();
        self.store
            .cleanup(live.as_ref())
            .and_then(|()| self.store.persist(live.as_ref()))
            .map_err(|error| CacheError::store(&self.project, error))?;
        info!(
            target: CACHE_TARGET,
            project = %self.project,
            elapsed_ms = elapsed_ms(started),
            "saved manifest"
        );
        Ok(())
    }

    /// Reacts to a lifecycle event of the live document.
    ///
    /// A post-change dirty-state event that leaves the document clean
    /// reloads the editable view in place and drops the read-only snapshot.
    /// Every other event is ignored.
    pub fn on_external_change(&self, event: &LifecycleEvent) {
        self.lock().react(&self.project, *event);
    }

    /// Releases the live session and clears both views.
    ///
    /// The model stays registered; the next access starts from scratch. A
    /// handle the store refused to release is kept aside and released again
    /// by the next `dispose`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] when the store refuses a release. The views
    /// are cleared regardless.
    pub fn dispose(&self) -> Result<(), CacheError> {
        let previous = std::mem::take(&mut *self.lock());
        let mut pending = previous.unreleased;
        if let Some(binding) = previous.editable {
            binding.live.unsubscribe(binding.subscription);
            pending.push(binding.live);
        }
        if pending.is_empty() {
            debug!(
                target: CACHE_TARGET,
                project = %self.project,
                "disposed model without live session"
            );
            return Ok(());
        }

        let mut failure = None;
        for live in pending {
            let Err(error) = live.release() else {
                continue;
            };
            if !matches!(error, StoreError::Released { .. }) {
                warn!(
                    target: CACHE_TARGET,
                    project = %self.project,
                    %error,
                    "live session kept for another release attempt"
                );
                self.lock().unreleased.push(live);
            }
            if failure.is_none() {
                failure = Some(error);
            }
        }
        if let Some(error) = failure {
            return Err(CacheError::store(&self.project, error));
        }
        info!(
            target: CACHE_TARGET,
            project = %self.project,
            "disposed model"
        );
        Ok(())
    }

    /// Creates a detached object of `kind` for the given editable widget.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotEditable`] when `widget` is not this model's
    /// bound editable view. No document is touched in that case.
    pub fn create_object(
        &self,
        widget: &Arc<Widget>,
        kind: ObjectKind,
    ) -> Result<ConfigObject, CacheError> {
        let document = self.editable_document(Some(widget))?;
        Ok(kind.create_detached(&document))
    }

    /// Creates a detached object in the editable document.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotEditable`] when no editable view is bound.
    pub fn create<T: ConfigElement>(&self) -> Result<T, CacheError> {
        let document = self.editable_document(None)?;
        Ok(T::create_detached(&document))
    }

    create_shortcuts! {
        create_author => Author;
        create_content => Content;
        create_preference => Preference;
        create_feature => Feature;
        create_access => Access;
        create_icon => Icon;
        create_splash => Splash;
        create_license => License;
    }

    fn editable_document(
        &self,
        expected: Option<&Arc<Widget>>,
    ) -> Result<SharedDocument, CacheError> {
        self.lock()
            .editable
            .as_ref()
            .filter(|binding| {
                expected.is_none_or(|widget| Arc::ptr_eq(widget, &binding.widget))
            })
            .map(|binding| binding.widget.document())
            .ok_or(CacheError::NotEditable)
    }

    fn lock(&self) -> MutexGuard<'_, ModelState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<ModelState>) -> MutexGuard<'_, ModelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl fmt::Debug for WidgetModel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("WidgetModel")
            .field("project", &self.project)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
