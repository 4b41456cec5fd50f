//! Project configuration.
//!
//! Lives at `<project>/.codescope/config.toml`. Writes are atomic: the new
//! document is serialized to a temp file in the same directory and renamed
//! over the target, so readers never observe a torn config.

use crate::CodescopeError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Name of the engine's directory under the project root.
pub const PROJECT_DIR_NAME: &str = ".codescope";

/// Name of the configuration document inside the project directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Current config schema version.
const CONFIG_VERSION: u32 = 1;

/// Per-project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Config schema version.
    pub version: u32,
    /// Human label; does not affect indexing.
    pub project_name: String,
    /// Enabled languages; empty means all supported, auto-detected.
    pub languages: Vec<String>,
    /// Include glob patterns; empty means everything the walker yields.
    pub include: Vec<String>,
    /// Exclude glob patterns, applied after includes.
    pub exclude: Vec<String>,
    /// Framework hints; enables matching resolvers even when detection is
    /// ambiguous.
    pub frameworks: Vec<String>,
    /// Files larger than this many bytes are skipped.
    pub max_file_size: u64,
    pub enable_embeddings: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            project_name: String::new(),
            languages: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            frameworks: Vec::new(),
            max_file_size: 1024 * 1024,
            enable_embeddings: false,
        }
    }
}

impl ProjectConfig {
    /// Load configuration from the given path.
    pub fn load(path: &Path) -> Result<Self, CodescopeError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CodescopeError::Config(e.to_string()))
    }

    /// Atomically save configuration to the given path.
    pub fn save(&self, path: &Path) -> Result<(), CodescopeError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CodescopeError::Config(e.to_string()))?;
        let dir = path
            .parent()
            .ok_or_else(|| CodescopeError::Config(format!("no parent dir for {}", path.display())))?;
        std::fs::create_dir_all(dir)?;

        // Temp file must live in the target directory for the rename to be
        // atomic on the same filesystem.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path)
            .map_err(|e| CodescopeError::Config(e.to_string()))?;
        Ok(())
    }
}
