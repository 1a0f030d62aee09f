//! Registry of per-project widget models.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};
use widget_model::{ConfigObject, ObjectKind, Widget};
use widget_store::{DocumentStore, LifecycleEvent, ProjectKey};

use crate::errors::CacheError;
use crate::model::WidgetModel;

pub(crate) const CACHE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::cache");

/// Owns exactly one [`WidgetModel`] per project.
///
/// Construct one registry at startup and share it with every consumer that
/// needs manifest views. Models are created on first access and stay
/// registered until the registry is dropped.
pub struct ConfigModelCache {
    store: Arc<dyn DocumentStore>,
    models: Mutex<HashMap<ProjectKey, Arc<WidgetModel>>>,
}

impl ConfigModelCache {
    /// Builds an empty registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            models: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the project's model, creating it when absent.
    #[must_use]
    pub fn model(&self, project: &ProjectKey) -> Arc<WidgetModel> {
        let mut models = self.lock();
        let model = models.entry(project.clone()).or_insert_with(|| {
            Arc::new(WidgetModel::new(project.clone(), Arc::clone(&self.store)))
        });
        Arc::clone(model)
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no model has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view of the project's persisted manifest.
    ///
    /// # Errors
    ///
    /// See [`WidgetModel::read_only_widget`].
    pub fn read_only_widget(
        &self,
        project: &ProjectKey,
    ) -> Result<Option<Arc<Widget>>, CacheError> {
        self.model(project).read_only_widget()
    }

    /// Editable view of the project's manifest.
    ///
    /// # Errors
    ///
    /// See [`WidgetModel::editable_widget`].
    pub fn editable_widget(
        &self,
        project: &ProjectKey,
    ) -> Result<Option<Arc<Widget>>, CacheError> {
        self.model(project).editable_widget()
    }

    /// Saves the project's editable view, if one is bound.
    ///
    /// # Errors
    ///
    /// See [`WidgetModel::save`].
    pub fn save(&self, project: &ProjectKey) -> Result<(), CacheError> {
        self.model(project).save()
    }

    /// Forwards a lifecycle event to the project's model.
    pub fn on_external_change(&self, project: &ProjectKey, event: &LifecycleEvent) {
        self.model(project).on_external_change(event);
    }

    /// Disposes the project's model if it was ever created.
    ///
    /// # Errors
    ///
    /// See [`WidgetModel::dispose`].
    pub fn dispose(&self, project: &ProjectKey) -> Result<(), CacheError> {
        let Some(model) = self.lock().get(project).map(Arc::clone) else {
            return Ok(());
        };
        model.dispose()
    }

    /// Disposes every registered model.
    ///
    /// A failing model is logged and skipped. The failures are returned so
    /// callers can report them.
    #[must_use]
    pub fn shutdown(&self) -> Vec<(ProjectKey, CacheError)> {
        let models = self.models();
        let mut failures = Vec::new();
        for model in &models {
            if let Err(error) = model.dispose() {
                warn!(
                    target: CACHE_TARGET,
                    project = %model.project(),
                    %error,
                    "failed to dispose model"
                );
                failures.push((model.project().clone(), error));
            }
        }
        info!(
            target: CACHE_TARGET,
            models = models.len(),
            failures = failures.len(),
            "shut down model cache"
        );
        failures
    }

    /// Creates a detached object of `kind` for an editable widget.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotEditable`] when `widget` is not the editable
    /// view currently bound for any project.
    pub fn create_object(
        &self,
        widget: &Arc<Widget>,
        kind: ObjectKind,
    ) -> Result<ConfigObject, CacheError> {
        for model in self.models() {
            match model.create_object(widget, kind) {
                Err(CacheError::NotEditable) => {}
                outcome => return outcome,
            }
        }
        Err(CacheError::NotEditable)
    }

    fn models(&self) -> Vec<Arc<WidgetModel>> {
        self.lock().values().map(Arc::clone).collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ProjectKey, Arc<WidgetModel>>> {
        self.models.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ConfigModelCache {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConfigModelCache")
            .field("models", &self.len())
            .finish_non_exhaustive()
    }
}
