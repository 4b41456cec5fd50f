//! Ordered-pass reference resolution.
//!
//! Runs after extraction of a batch. For every unresolved edge the passes
//! execute in order — local, class hierarchy, import, framework, global
//! fallback — and the first hit wins, with the pass's confidence. Edges no
//! pass can place stay unresolved; their `target_symbol` is retained so
//! name-based queries still locate callers.

use crate::frameworks::{FrameworkResolver, ResolveContext};
use codescope_core::{
    node_id, simple_name_of, CodescopeError, Edge, EdgeKind, Node, NodeKind, UnresolvedReference,
};
use codescope_store::Store;
use std::collections::HashSet;

const LOCAL_CONFIDENCE: f64 = 1.0;
const CLASS_CONFIDENCE: f64 = 0.95;
const IMPORT_CONFIDENCE: f64 = 0.9;
const GLOBAL_CONFIDENCE: f64 = 0.5;

/// How far up the extends/implements chain the class pass searches.
const HIERARCHY_DEPTH: usize = 5;

/// Counters for one resolution run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub unresolved: usize,
}

/// Resolves unresolved edges against the store.
pub struct Resolver<'a> {
    store: &'a Store,
    frameworks: Vec<&'a dyn FrameworkResolver>,
    ctx: &'a dyn ResolveContext,
}

impl<'a> Resolver<'a> {
    pub fn new(
        store: &'a Store,
        frameworks: Vec<&'a dyn FrameworkResolver>,
        ctx: &'a dyn ResolveContext,
    ) -> Self {
        Self {
            store,
            frameworks,
            ctx,
        }
    }

    /// Resolve every unresolved edge in the store.
    pub fn resolve_all(&self) -> Result<ResolutionStats, CodescopeError> {
        let edges = self.store.unresolved_edges()?;
        self.resolve_edges(&edges)
    }

    /// Resolve unresolved edges sourced from the touched files, plus any
    /// previously-unresolved reference whose name matches a newly added
    /// node (forward discovery).
    pub fn resolve_files(
        &self,
        touched: &[String],
        new_names: &HashSet<String>,
    ) -> Result<ResolutionStats, CodescopeError> {
        let touched_set: HashSet<&str> = touched.iter().map(|s| s.as_str()).collect();
        let mut edges = self.store.unresolved_edges_in_files(touched)?;
        if !new_names.is_empty() {
            for edge in self.store.unresolved_edges()? {
                if !touched_set.contains(edge.file_path.as_str())
                    && new_names.contains(simple_name_of(&edge.target_symbol))
                {
                    edges.push(edge);
                }
            }
        }
        self.resolve_edges(&edges)
    }

    fn resolve_edges(&self, edges: &[Edge]) -> Result<ResolutionStats, CodescopeError> {
        let mut stats = ResolutionStats::default();
        // Imports first (the import pass reads file-to-file links resolved
        // in this same run), then inheritance (the class pass walks those
        // edges), then everything else.
        let rank = |e: &Edge| match e.kind {
            EdgeKind::Imports => 0,
            EdgeKind::Extends | EdgeKind::Implements => 1,
            _ => 2,
        };
        let mut ordered: Vec<&Edge> = edges.iter().collect();
        ordered.sort_by_key(|e| rank(e));
        for edge in ordered {
            let hit = if edge.kind == EdgeKind::Imports {
                self.resolve_import(edge)?
            } else {
                self.resolve_symbol(edge)?
            };
            match hit {
                Some((target_id, confidence, pass)) => {
                    self.store.resolve_edge(edge, &target_id, confidence, pass.as_str())?;
                    stats.resolved += 1;
                }
                None => stats.unresolved += 1,
            }
        }
        tracing::debug!(
            resolved = stats.resolved,
            unresolved = stats.unresolved,
            "resolution pass complete"
        );
        Ok(stats)
    }

    // ── Import Resolution ───────────────────────────────────────────────

    /// Two-step import resolution: map the imported path/identifier to a
    /// file node (exact, then case-insensitive, then namespace-normalized).
    fn resolve_import(&self, edge: &Edge) -> Result<Option<(String, f64, String)>, CodescopeError> {
        let raw = edge.target_symbol.as_str();
        let files = self.store.all_files()?;

        // Relative imports resolve against the importing file's directory.
        let wanted = if raw.starts_with('.') && (raw.starts_with("./") || raw.starts_with("../")) {
            let base = std::path::Path::new(&edge.file_path)
                .parent()
                .unwrap_or_else(|| std::path::Path::new(""));
            Some(normalize_join(base, raw))
        } else {
            None
        };

        if let Some(wanted) = &wanted {
            for file in &files {
                if &file.path == wanted || stem_path(&file.path) == *wanted {
                    return Ok(Some(self.file_hit(&file.path)));
                }
            }
            let wanted_lower = wanted.to_lowercase();
            for file in &files {
                if stem_path(&file.path).to_lowercase() == wanted_lower {
                    return Ok(Some(self.file_hit(&file.path)));
                }
            }
        }

        // Exact path match (includes header-style imports like "buf.h").
        for file in &files {
            if file.path == raw || file.path.ends_with(&format!("/{raw}")) {
                return Ok(Some(self.file_hit(&file.path)));
            }
        }

        // Namespace-normalized: A.B.C and a::b::c reduce to their last
        // segment, matched against file stems.
        let segment = last_segment(raw);
        if !segment.is_empty() {
            for file in &files {
                if file_stem(&file.path) == segment {
                    return Ok(Some(self.file_hit(&file.path)));
                }
            }
            let lower = segment.to_lowercase();
            for file in &files {
                if file_stem(&file.path).to_lowercase() == lower {
                    return Ok(Some(self.file_hit(&file.path)));
                }
            }
        }

        Ok(None)
    }

    fn file_hit(&self, path: &str) -> (String, f64, String) {
        (
            node_id(NodeKind::File, path, path, 0),
            1.0,
            "import".to_string(),
        )
    }

    // ── Symbol Resolution ───────────────────────────────────────────────

    fn resolve_symbol(
        &self,
        edge: &Edge,
    ) -> Result<Option<(String, f64, String)>, CodescopeError> {
        let Some(source) = self.store.get_node_by_id(&edge.source_id)? else {
            return Ok(None);
        };
        let simple = simple_name_of(&edge.target_symbol).to_string();
        if simple.is_empty() {
            return Ok(None);
        }
        let candidates = self.store.get_nodes_by_name(&simple)?;
        if candidates.is_empty() {
            return self.resolve_framework(edge);
        }

        let sep = separator_for(&source.language);

        // Pass 1: same file, same enclosing scope.
        if let Some(node) = self.local_pass(&source, &candidates, &simple, sep)? {
            return Ok(Some((node.id, LOCAL_CONFIDENCE, "local".to_string())));
        }

        // Pass 2: class hierarchy.
        if let Some(node) = self.class_pass(&source, &candidates, &simple, sep)? {
            return Ok(Some((node.id, CLASS_CONFIDENCE, "class".to_string())));
        }

        // Pass 3: symbols exported by imported files.
        if let Some(node) = self.import_pass(edge, &candidates)? {
            return Ok(Some((node.id, IMPORT_CONFIDENCE, "import".to_string())));
        }

        // Pass 4: framework resolvers, in registry order.
        if let Some(hit) = self.resolve_framework(edge)? {
            return Ok(Some(hit));
        }

        // Pass 5: global fallback; ties go to the first candidate in file
        // path order (candidates are already sorted that way).
        if candidates.len() > 1 {
            tracing::debug!(
                symbol = %simple,
                count = candidates.len(),
                "ambiguous global resolution, taking first by path"
            );
        }
        let qualifier = edge_qualifier(&edge.target_symbol);
        let chosen = match &qualifier {
            Some(q) if q != "this" && q != "self" => candidates
                .iter()
                .find(|c| {
                    c.qualified_name.ends_with(&format!("{q}.{simple}"))
                        || c.qualified_name.ends_with(&format!("{q}::{simple}"))
                })
                .or_else(|| candidates.first()),
            _ => candidates.first(),
        };
        Ok(chosen.map(|node| (node.id.clone(), GLOBAL_CONFIDENCE, "global".to_string())))
    }

    /// Targets nested inside the source, or siblings in a shared non-type
    /// scope (top-level functions of the same file, nested functions).
    fn local_pass(
        &self,
        source: &Node,
        candidates: &[Node],
        simple: &str,
        sep: &str,
    ) -> Result<Option<Node>, CodescopeError> {
        let nested = format!("{}{sep}{simple}", source.qualified_name);
        for candidate in candidates {
            if candidate.file_path != source.file_path {
                continue;
            }
            if candidate.qualified_name == nested {
                return Ok(Some(candidate.clone()));
            }
            let source_parent = parent_scope(&source.qualified_name, sep);
            let candidate_parent = parent_scope(&candidate.qualified_name, sep);
            if source_parent == candidate_parent {
                if source_parent.is_empty() {
                    return Ok(Some(candidate.clone()));
                }
                // A shared parent that is a class belongs to the class pass.
                if !self.scope_is_type(&source.file_path, &source_parent)? {
                    return Ok(Some(candidate.clone()));
                }
            }
        }
        Ok(None)
    }

    /// Members of the source's enclosing class, then of its bases reached
    /// through resolved extends/implements edges.
    fn class_pass(
        &self,
        source: &Node,
        candidates: &[Node],
        simple: &str,
        sep: &str,
    ) -> Result<Option<Node>, CodescopeError> {
        let Some(class) = self.enclosing_type(source, sep)? else {
            return Ok(None);
        };

        let mut frontier = vec![class];
        let mut visited: HashSet<String> = HashSet::new();
        for _ in 0..=HIERARCHY_DEPTH {
            let mut next = Vec::new();
            for class in &frontier {
                if !visited.insert(class.id.clone()) {
                    continue;
                }
                let member = format!("{}{sep}{simple}", class.qualified_name);
                if let Some(node) = candidates
                    .iter()
                    .find(|c| c.file_path == class.file_path && c.qualified_name == member)
                {
                    return Ok(Some(node.clone()));
                }
                let bases = self.store.get_outgoing_edges(
                    &class.id,
                    Some(&[EdgeKind::Extends, EdgeKind::Implements]),
                )?;
                for base in bases {
                    if let Some(target_id) = base.target_id {
                        if let Some(base_node) = self.store.get_node_by_id(&target_id)? {
                            next.push(base_node);
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        Ok(None)
    }

    fn import_pass(
        &self,
        edge: &Edge,
        candidates: &[Node],
    ) -> Result<Option<Node>, CodescopeError> {
        let file_id = node_id(NodeKind::File, &edge.file_path, &edge.file_path, 0);
        let imports = self
            .store
            .get_outgoing_edges(&file_id, Some(&[EdgeKind::Imports]))?;
        for import in imports {
            let Some(target_id) = import.target_id else {
                continue;
            };
            let Some(file_node) = self.store.get_node_by_id(&target_id)? else {
                continue;
            };
            if let Some(node) = candidates
                .iter()
                .find(|c| c.file_path == file_node.file_path && c.is_exported)
            {
                return Ok(Some(node.clone()));
            }
        }
        Ok(None)
    }

    fn resolve_framework(
        &self,
        edge: &Edge,
    ) -> Result<Option<(String, f64, String)>, CodescopeError> {
        if self.frameworks.is_empty() {
            return Ok(None);
        }
        let reference = UnresolvedReference {
            source_node_id: edge.source_id.clone(),
            reference_name: edge.target_symbol.clone(),
            qualifier: edge_qualifier(&edge.target_symbol),
            kind: edge.kind,
            file_path: edge.file_path.clone(),
            line: edge.line,
        };
        for framework in &self.frameworks {
            if let Some(hit) = framework.resolve(&reference, self.ctx) {
                return Ok(Some((
                    hit.target_node_id,
                    hit.confidence,
                    framework.name().to_string(),
                )));
            }
        }
        Ok(None)
    }

    /// Nearest enclosing type of a node, found by walking qualified-name
    /// prefixes within its file.
    fn enclosing_type(&self, source: &Node, sep: &str) -> Result<Option<Node>, CodescopeError> {
        let mut prefix = source.qualified_name.as_str();
        while let Some((head, _)) = prefix.rsplit_once(sep) {
            let nodes = self.store.get_nodes_by_file(&source.file_path)?;
            if let Some(node) = nodes
                .into_iter()
                .find(|n| n.qualified_name == head && is_type_kind(n.kind))
            {
                return Ok(Some(node));
            }
            prefix = head;
        }
        Ok(None)
    }

    fn scope_is_type(&self, file_path: &str, qualified: &str) -> Result<bool, CodescopeError> {
        let nodes = self.store.get_nodes_by_file(file_path)?;
        Ok(nodes
            .iter()
            .any(|n| n.qualified_name == qualified && is_type_kind(n.kind)))
    }
}

fn is_type_kind(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Class
            | NodeKind::Struct
            | NodeKind::Interface
            | NodeKind::Trait
            | NodeKind::Enum
    )
}

fn separator_for(language: &str) -> &'static str {
    match language {
        "rust" | "cpp" => "::",
        _ => ".",
    }
}

fn parent_scope(qualified: &str, sep: &str) -> String {
    qualified
        .rsplit_once(sep)
        .map(|(head, _)| head.to_string())
        .unwrap_or_default()
}

/// Explicit qualifier embedded in a stored target symbol ("Obj.bar" -> Obj).
fn edge_qualifier(target_symbol: &str) -> Option<String> {
    let (head, _) = target_symbol.rsplit_once('.')?;
    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}

fn normalize_join(base: &std::path::Path, rel: &str) -> String {
    let mut parts: Vec<String> = base
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    for segment in rel.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other.to_string()),
        }
    }
    parts.join("/")
}

fn stem_path(path: &str) -> String {
    match path.rsplit_once('.') {
        Some((head, _ext)) if !head.is_empty() => head.to_string(),
        _ => path.to_string(),
    }
}

fn file_stem(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    stem_path(name)
}

/// Last segment of a dotted / double-colon / slashed module path.
fn last_segment(raw: &str) -> String {
    raw.rsplit("::")
        .next()
        .unwrap_or(raw)
        .rsplit(['.', '/'])
        .next()
        .unwrap_or(raw)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_join_folds_dot_segments() {
        let base = std::path::Path::new("src/app");
        assert_eq!(normalize_join(base, "./b"), "src/app/b");
        assert_eq!(normalize_join(base, "../lib/c"), "src/lib/c");
        assert_eq!(normalize_join(std::path::Path::new(""), "./a"), "a");
    }

    #[test]
    fn stems_and_segments() {
        assert_eq!(stem_path("src/b.ts"), "src/b");
        assert_eq!(file_stem("src/Utils.Case.cs"), "Utils.Case");
        assert_eq!(last_segment("A.B.C"), "C");
        assert_eq!(last_segment("a::b"), "b");
        assert_eq!(last_segment("plain"), "plain");
    }

    #[test]
    fn qualifier_extraction() {
        assert_eq!(edge_qualifier("Obj.bar"), Some("Obj".to_string()));
        assert_eq!(edge_qualifier("bar"), None);
    }
}
