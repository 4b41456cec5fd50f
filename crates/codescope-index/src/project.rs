//! Project lifecycle and the indexing facade.
//!
//! The engine owns a `.codescope/` directory under the project root holding
//! the store and the configuration document. `init` creates it, `open`
//! requires it, and `index`/`sync` drive the pipeline.

use crate::frameworks::FrameworkRegistry;
use crate::parser::ParserPool;
use crate::queries::QueryEngine;
use crate::sync::SyncEngine;
use codescope_core::{
    CancelToken, CodescopeError, IndexSummary, ProjectConfig, CONFIG_FILE_NAME, PROJECT_DIR_NAME,
};
use codescope_store::Store;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE_NAME: &str = "codescope.db";
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// An opened codescope project.
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
    store: Store,
    pool: ParserPool,
    engine: QueryEngine,
    frameworks: FrameworkRegistry,
}

impl Project {
    /// Initialize a new project directory under `root`.
    pub fn init(root: &Path) -> Result<Self, CodescopeError> {
        let dir = root.join(PROJECT_DIR_NAME);
        if dir.exists() {
            return Err(CodescopeError::AlreadyInitialized(
                root.to_string_lossy().into_owned(),
            ));
        }
        std::fs::create_dir_all(&dir)?;

        let mut config = ProjectConfig::default();
        config.project_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        config.save(&dir.join(CONFIG_FILE_NAME))?;

        let store = Store::open(&dir.join(DB_FILE_NAME), LOCK_TIMEOUT)?;
        Ok(Self::assemble(root, config, store))
    }

    /// Open an existing project directory under `root`.
    pub fn open(root: &Path) -> Result<Self, CodescopeError> {
        let dir = root.join(PROJECT_DIR_NAME);
        if !dir.exists() {
            return Err(CodescopeError::NotInitialized(
                root.to_string_lossy().into_owned(),
            ));
        }
        let config = ProjectConfig::load(&dir.join(CONFIG_FILE_NAME))?;
        let store = Store::open(&dir.join(DB_FILE_NAME), LOCK_TIMEOUT)?;
        Ok(Self::assemble(root, config, store))
    }

    fn assemble(root: &Path, config: ProjectConfig, store: Store) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            store,
            pool: ParserPool::new(),
            engine: QueryEngine::new(),
            frameworks: FrameworkRegistry::with_builtins(),
        }
    }

    /// Full index of the project (first run: everything is "added").
    pub fn index(&mut self, cancel: Option<&CancelToken>) -> Result<IndexSummary, CodescopeError> {
        self.run_sync(cancel)
    }

    /// Incremental sync against the current on-disk state.
    pub fn sync(&mut self, cancel: Option<&CancelToken>) -> Result<IndexSummary, CodescopeError> {
        self.run_sync(cancel)
    }

    /// Re-index one file. The path may be absolute or project-relative but
    /// must stay inside the project root.
    pub fn index_file(&mut self, path: &Path) -> Result<IndexSummary, CodescopeError> {
        let rel = codescope_core::validate_project_path(&self.root, path)?;
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        let sync_engine = SyncEngine::new(&self.store, &self.config, &self.root);
        sync_engine.sync_file(&rel_str, &mut self.pool, &mut self.engine, &self.frameworks)
    }

    fn run_sync(&mut self, cancel: Option<&CancelToken>) -> Result<IndexSummary, CodescopeError> {
        let sync_engine = SyncEngine::new(&self.store, &self.config, &self.root);
        sync_engine.sync(&mut self.pool, &mut self.engine, &self.frameworks, cancel)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Update and atomically persist the configuration.
    pub fn update_config(&mut self, config: ProjectConfig) -> Result<(), CodescopeError> {
        config.save(&self.root.join(PROJECT_DIR_NAME).join(CONFIG_FILE_NAME))?;
        self.config = config;
        Ok(())
    }
}
