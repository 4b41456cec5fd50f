//! Pluggable framework resolvers.
//!
//! A framework resolver is a value that (1) detects whether its framework
//! is in play for the project, (2) contributes derived nodes that are not
//! visible as plain syntactic forms (routes, components), and (3) resolves
//! framework-idiom references. Resolvers are assembled into an ordered
//! registry; during resolution the first hit wins. They see the project
//! only through the read-only [`ResolveContext`].

mod flask;
mod react;

pub use flask::FlaskResolver;
pub use react::ReactResolver;

use codescope_core::{Node, UnresolvedReference};
use codescope_store::Store;
use std::path::{Path, PathBuf};

/// A framework resolver's answer for one reference.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub target_node_id: String,
    pub confidence: f64,
}

/// Read-only view of the project a resolver may consult.
pub trait ResolveContext {
    fn read_file(&self, path: &str) -> Option<Vec<u8>>;
    fn file_exists(&self, path: &str) -> bool;
    /// All indexed file paths.
    fn all_files(&self) -> Vec<String>;
    fn nodes_in_file(&self, path: &str) -> Vec<Node>;
}

/// One framework's detection, node hooks, and resolution.
pub trait FrameworkResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Pure check, run once per indexing session.
    fn detect(&self, ctx: &dyn ResolveContext) -> bool;

    /// Derived nodes for one file (routes, components). Called after
    /// generic extraction.
    fn extract_nodes(&self, file_path: &str, content: &[u8]) -> Vec<Node>;

    /// Try to resolve a framework-idiom reference.
    fn resolve(
        &self,
        reference: &UnresolvedReference,
        ctx: &dyn ResolveContext,
    ) -> Option<ResolvedTarget>;
}

/// Ordered collection of framework resolvers.
pub struct FrameworkRegistry {
    resolvers: Vec<Box<dyn FrameworkResolver>>,
}

impl FrameworkRegistry {
    pub fn new(resolvers: Vec<Box<dyn FrameworkResolver>>) -> Self {
        Self { resolvers }
    }

    /// The built-in registry, in resolution order.
    pub fn with_builtins() -> Self {
        Self::new(vec![
            Box::new(FlaskResolver),
            Box::new(ReactResolver),
        ])
    }

    /// Run detection once; `hints` force-enable resolvers by name even when
    /// detection is ambiguous.
    pub fn detect_active(
        &self,
        ctx: &dyn ResolveContext,
        hints: &[String],
    ) -> Vec<&dyn FrameworkResolver> {
        let mut active = Vec::new();
        for resolver in &self.resolvers {
            let hinted = hints.iter().any(|h| h == resolver.name());
            if hinted || resolver.detect(ctx) {
                tracing::debug!(framework = resolver.name(), hinted, "framework active");
                active.push(resolver.as_ref());
            }
        }
        active
    }
}

impl Default for FrameworkRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// The standard context: file contents from disk under the project root,
/// structure from the store.
pub struct StoreContext<'a> {
    root: PathBuf,
    store: &'a Store,
}

impl<'a> StoreContext<'a> {
    pub fn new(root: &Path, store: &'a Store) -> Self {
        Self {
            root: root.to_path_buf(),
            store,
        }
    }
}

impl ResolveContext for StoreContext<'_> {
    fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        let rel = codescope_core::validate_project_path(&self.root, Path::new(path)).ok()?;
        std::fs::read(self.root.join(rel)).ok()
    }

    fn file_exists(&self, path: &str) -> bool {
        match codescope_core::validate_project_path(&self.root, Path::new(path)) {
            Ok(rel) => self.root.join(rel).exists(),
            Err(_) => false,
        }
    }

    fn all_files(&self) -> Vec<String> {
        self.store
            .all_files()
            .map(|files| files.into_iter().map(|f| f.path).collect())
            .unwrap_or_default()
    }

    fn nodes_in_file(&self, path: &str) -> Vec<Node> {
        self.store.get_nodes_by_file(path).unwrap_or_default()
    }
}
