//! Content-hash-driven incremental sync.
//!
//! Enumerates candidate files under the project root, partitions them into
//! added/modified/removed/unchanged by comparing content hashes and sizes
//! against the store, replaces the slice of every touched file, and re-runs
//! resolution restricted to the touched files (plus forward discovery for
//! previously-unresolved names). Cancellation is observed at file
//! boundaries.

use crate::extractor::extract_file;
use crate::frameworks::{FrameworkRegistry, StoreContext};
use crate::parser::{Lang, ParserPool};
use crate::queries::QueryEngine;
use crate::resolver::Resolver;
use codescope_core::{
    content_hash, CancelToken, CodescopeError, Edge, EdgeKind, FileRecord, IndexSummary,
    IndexWarning, ProjectConfig, WarningKind,
};
use codescope_store::Store;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// One enumerated candidate file.
struct Candidate {
    rel_path: String,
    abs_path: std::path::PathBuf,
    lang: Lang,
    size: u64,
}

/// Orchestrates change detection and slice replacement.
pub struct SyncEngine<'a> {
    store: &'a Store,
    config: &'a ProjectConfig,
    root: &'a Path,
}

impl<'a> SyncEngine<'a> {
    pub fn new(store: &'a Store, config: &'a ProjectConfig, root: &'a Path) -> Self {
        Self {
            store,
            config,
            root,
        }
    }

    pub fn sync(
        &self,
        pool: &mut ParserPool,
        engine: &mut QueryEngine,
        registry: &FrameworkRegistry,
        cancel: Option<&CancelToken>,
    ) -> Result<IndexSummary, CodescopeError> {
        let mut summary = IndexSummary::default();
        let (candidates, mut warnings) = self.enumerate()?;
        summary.files_checked = candidates.len();

        let known: HashMap<String, FileRecord> = self
            .store
            .all_files()?
            .into_iter()
            .map(|f| (f.path.clone(), f))
            .collect();

        // Framework detection runs once per session, before any node hooks.
        let ctx = StoreContext::new(self.root, self.store);
        let active = registry.detect_active(&ctx, &self.config.frameworks);

        // Partition candidates.
        let mut touched: Vec<(Candidate, Vec<u8>, String, bool)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for candidate in candidates {
            seen.insert(candidate.rel_path.clone());
            let content = match std::fs::read(&candidate.abs_path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warnings.push(IndexWarning {
                        path: candidate.rel_path.clone(),
                        kind: WarningKind::ReadFailure,
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            let hash = content_hash(&content);
            match known.get(&candidate.rel_path) {
                Some(record) if record.content_hash == hash && record.size == candidate.size => {}
                Some(_) => touched.push((candidate, content, hash, false)),
                None => touched.push((candidate, content, hash, true)),
            }
        }

        // Removed files first, so their slices are gone before re-extraction.
        for path in known.keys() {
            if !seen.contains(path) {
                self.store.delete_file(path)?;
                summary.files_removed += 1;
            }
        }

        let mut touched_paths: Vec<String> = Vec::new();
        let mut new_names: HashSet<String> = HashSet::new();

        for (candidate, content, hash, is_new) in touched {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                tracing::info!("sync cancelled at file boundary");
                break;
            }
            match self.reindex_file(&candidate, &content, &hash, pool, engine, &active) {
                Ok((names, parse_errors)) => {
                    new_names.extend(names);
                    touched_paths.push(candidate.rel_path.clone());
                    if is_new {
                        summary.files_added += 1;
                    } else {
                        summary.files_modified += 1;
                    }
                    // A broken file never fails the batch; the partial
                    // extraction is kept and the problem becomes a warning.
                    if parse_errors {
                        warnings.push(IndexWarning {
                            path: candidate.rel_path.clone(),
                            kind: WarningKind::ParseFailure,
                            message: "syntax errors; partial extraction kept".to_string(),
                        });
                    }
                }
                Err(CodescopeError::ParseFailure { message, .. }) => {
                    warnings.push(IndexWarning {
                        path: candidate.rel_path.clone(),
                        kind: WarningKind::ParseFailure,
                        message,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        // Resolution is restricted to the touched files plus forward
        // discovery against the names that just appeared.
        if !touched_paths.is_empty() {
            let resolver = Resolver::new(self.store, active, &ctx);
            let stats = resolver.resolve_files(&touched_paths, &new_names)?;
            tracing::info!(
                added = summary.files_added,
                modified = summary.files_modified,
                removed = summary.files_removed,
                resolved = stats.resolved,
                unresolved = stats.unresolved,
                "sync complete"
            );
        }

        summary.errors = warnings;
        Ok(summary)
    }

    /// Re-index a single file by project-relative path, then resolve the
    /// references it sourced. The caller has already validated the path.
    pub fn sync_file(
        &self,
        rel_path: &str,
        pool: &mut ParserPool,
        engine: &mut QueryEngine,
        registry: &FrameworkRegistry,
    ) -> Result<IndexSummary, CodescopeError> {
        let mut summary = IndexSummary::default();
        summary.files_checked = 1;

        let abs_path = self.root.join(rel_path);
        let lang = Lang::detect(rel_path)?;
        let metadata = std::fs::metadata(&abs_path)?;
        if metadata.len() > self.config.max_file_size {
            return Err(CodescopeError::OversizedFile {
                path: rel_path.to_string(),
                size: metadata.len(),
                limit: self.config.max_file_size,
            });
        }
        let content = std::fs::read(&abs_path)?;
        let hash = content_hash(&content);

        let is_new = self.store.get_file(rel_path)?.is_none();
        let candidate = Candidate {
            rel_path: rel_path.to_string(),
            abs_path,
            lang,
            size: metadata.len(),
        };

        let ctx = StoreContext::new(self.root, self.store);
        let active = registry.detect_active(&ctx, &self.config.frameworks);
        let (names, parse_errors) =
            self.reindex_file(&candidate, &content, &hash, pool, engine, &active)?;
        if is_new {
            summary.files_added = 1;
        } else {
            summary.files_modified = 1;
        }
        if parse_errors {
            summary.errors.push(IndexWarning {
                path: rel_path.to_string(),
                kind: WarningKind::ParseFailure,
                message: "syntax errors; partial extraction kept".to_string(),
            });
        }

        let resolver = Resolver::new(self.store, active, &ctx);
        resolver.resolve_files(
            &[rel_path.to_string()],
            &names.into_iter().collect(),
        )?;
        Ok(summary)
    }

    /// Replace one file's slice: delete, extract, commit, run node hooks.
    /// Returns the simple names of the nodes that were (re)created and
    /// whether the tree carried syntax errors.
    fn reindex_file(
        &self,
        candidate: &Candidate,
        content: &[u8],
        hash: &str,
        pool: &mut ParserPool,
        engine: &mut QueryEngine,
        active: &[&dyn crate::frameworks::FrameworkResolver],
    ) -> Result<(Vec<String>, bool), CodescopeError> {
        let path = &candidate.rel_path;
        let extraction = extract_file(path, content, candidate.lang, pool, engine).map_err(
            |err| match err {
                CodescopeError::ParseFailure { message, .. } => CodescopeError::ParseFailure {
                    path: path.clone(),
                    message,
                },
                other => other,
            },
        )?;

        if extraction.has_parse_errors {
            tracing::warn!(path = %path, "parse errors; keeping partial extraction");
        }

        // Remove the previous slice, then commit the new one. The file
        // record goes first so the nodes' foreign key holds.
        self.store.delete_nodes_by_file(path)?;
        self.store.delete_edges_by_file(path)?;
        self.store.upsert_file(&FileRecord {
            path: path.clone(),
            language: candidate.lang.as_str().to_string(),
            content_hash: hash.to_string(),
            size: candidate.size,
            indexed_at: chrono::Utc::now(),
        })?;

        let mut nodes = Vec::with_capacity(extraction.nodes.len() + 1);
        nodes.push(extraction.file_node.clone());
        nodes.extend(extraction.nodes.iter().cloned());
        let mut edges = extraction.edges.clone();

        // Framework node hooks add derived nodes invisible to the generic
        // extractor; they hang off the file node.
        for framework in active {
            for node in framework.extract_nodes(path, content) {
                edges.push(Edge {
                    source_id: extraction.file_node.id.clone(),
                    target_id: Some(node.id.clone()),
                    target_symbol: node.qualified_name.clone(),
                    kind: EdgeKind::Contains,
                    confidence: 1.0,
                    file_path: path.clone(),
                    line: node.span.start_line,
                    resolved_by: None,
                });
                nodes.push(node);
            }
        }

        for reference in &extraction.references {
            edges.push(Edge {
                source_id: reference.source_node_id.clone(),
                target_id: None,
                target_symbol: reference.reference_name.clone(),
                kind: reference.kind,
                confidence: 0.0,
                file_path: path.clone(),
                line: reference.line,
                resolved_by: None,
            });
        }

        let names = nodes.iter().map(|n| n.name.clone()).collect();
        self.store.upsert_nodes(&nodes)?;
        self.store.upsert_edges(&edges)?;

        Ok((names, extraction.has_parse_errors))
    }

    /// Walk the project root and collect candidate files, honoring the
    /// include/exclude globs, the language allowlist, and the size limit.
    fn enumerate(&self) -> Result<(Vec<Candidate>, Vec<IndexWarning>), CodescopeError> {
        let include = build_globset(&self.config.include)?;
        let exclude = build_globset(&self.config.exclude)?;
        let language_filter: Option<HashSet<&str>> = if self.config.languages.is_empty() {
            None
        } else {
            Some(self.config.languages.iter().map(|s| s.as_str()).collect())
        };

        let mut candidates = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkBuilder::new(self.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!("walk error: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let abs_path = entry.path().to_path_buf();
            let rel_path = match abs_path.strip_prefix(self.root) {
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };

            let Some(lang) = Lang::from_path(&rel_path) else {
                continue;
            };
            if let Some(filter) = &language_filter {
                if !filter.contains(lang.as_str()) {
                    continue;
                }
            }
            if let Some(include) = &include {
                if !include.is_match(&rel_path) {
                    continue;
                }
            }
            if let Some(exclude) = &exclude {
                if exclude.is_match(&rel_path) {
                    continue;
                }
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if size > self.config.max_file_size {
                warnings.push(IndexWarning {
                    path: rel_path.clone(),
                    kind: WarningKind::OversizedFile,
                    message: format!(
                        "{size} bytes exceeds limit of {}",
                        self.config.max_file_size
                    ),
                });
                continue;
            }

            candidates.push(Candidate {
                rel_path,
                abs_path,
                lang,
                size,
            });
        }

        candidates.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Ok((candidates, warnings))
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, CodescopeError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).map_err(|e| CodescopeError::Config(format!("glob {pattern}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|e| CodescopeError::Config(e.to_string()))
}
