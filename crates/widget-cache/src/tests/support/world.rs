//! Test world holding a cache over a temporary workspace.

use std::fs;
use std::sync::Arc;

use camino::Utf8PathBuf;
use tempfile::TempDir;
use widget_config::Config;
use widget_config::telemetry::{self, LogSink};
use widget_model::Widget;
use widget_store::{FsDocumentStore, ProjectKey};

use super::recording_store::RecordingStore;
use crate::{CacheError, ConfigModelCache};

/// Shared state exercised by unit tests and BDD steps.
pub struct CacheWorld {
    _dir: TempDir,
    root: Utf8PathBuf,
    /// Store double wrapped by the cache.
    pub store: RecordingStore,
    /// Cache under test.
    pub cache: ConfigModelCache,
    /// Project most steps act on.
    pub project: ProjectKey,
    /// Views observed so far, in order.
    pub views: Vec<Arc<Widget>>,
    /// Last error observed while exercising the cache.
    pub last_error: Option<CacheError>,
}

impl CacheWorld {
    /// Builds a world with an empty project called `app`.
    ///
    /// Cache and store events are logged into the test capture buffer, so a
    /// failing test shows the loads, reloads and saves that led up to it.
    pub fn new() -> Self {
        let logging = Config {
            log_filter: "widget-cache=debug,widget-store=debug".to_owned(),
            ..Config::default()
        };
        if let Err(error) = telemetry::initialise_with(&logging, LogSink::TestCapture) {
            panic!("telemetry: {error}");
        }
        let dir = TempDir::new().unwrap_or_else(|error| panic!("temp dir: {error}"));
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("non UTF-8 temp dir: {}", path.display()));
        let store = RecordingStore::new(FsDocumentStore::new(&Config::default()));
        let cache = ConfigModelCache::new(Arc::new(store.clone()));
        let project = ProjectKey::new("app", root.join("app"));
        Self {
            _dir: dir,
            root,
            store,
            cache,
            project,
            views: Vec::new(),
            last_error: None,
        }
    }

    /// Key for another project inside the workspace.
    pub fn other_project(&self, name: &str) -> ProjectKey {
        ProjectKey::new(name, self.root.join(name))
    }

    /// Writes `markup` as the manifest of `project`.
    pub fn write_manifest(&self, project: &ProjectKey, markup: &str) {
        let path = self.store.inner().manifest_path(project);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|error| panic!("mkdir {parent}: {error}"));
        }
        fs::write(&path, markup).unwrap_or_else(|error| panic!("write {path}: {error}"));
    }

    /// Reads the persisted manifest of `project`.
    pub fn read_manifest(&self, project: &ProjectKey) -> String {
        let path = self.store.inner().manifest_path(project);
        fs::read_to_string(&path).unwrap_or_else(|error| panic!("read {path}: {error}"))
    }

    /// Read-only view of the current project, which must exist.
    pub fn read_only(&self) -> Arc<Widget> {
        self.cache
            .read_only_widget(&self.project)
            .unwrap_or_else(|error| panic!("read-only view: {error}"))
            .unwrap_or_else(|| panic!("project should have a manifest"))
    }

    /// Editable view of the current project, which must exist.
    pub fn editable(&self) -> Arc<Widget> {
        self.cache
            .editable_widget(&self.project)
            .unwrap_or_else(|error| panic!("editable view: {error}"))
            .unwrap_or_else(|| panic!("project should have a manifest"))
    }

    /// Records a view so later steps can compare identities.
    pub fn remember(&mut self, view: Arc<Widget>) {
        self.views.push(view);
    }

    /// The two most recently remembered views.
    pub fn last_two(&self) -> (&Arc<Widget>, &Arc<Widget>) {
        match self.views.as_slice() {
            [.., first, second] => (first, second),
            _ => panic!("expected at least two remembered views"),
        }
    }
}
