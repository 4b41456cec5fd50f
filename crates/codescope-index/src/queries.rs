//! Pattern query execution.
//!
//! Each language supplies ordered definition and reference patterns as
//! tree-sitter S-expression queries. The engine compiles each pattern once
//! per language and yields captures `{name, range, text}` grouped by match,
//! preserving source order.

use crate::languages::LanguageSpec;
use crate::parser::Lang;
use codescope_core::{CodescopeError, EdgeKind, NodeKind, Span};
use std::collections::HashMap;
use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

/// A named subtree extracted by a pattern query.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Capture name without the leading `@`.
    pub name: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub span: Span,
    pub text: String,
}

/// All captures of one query match, in capture order.
#[derive(Debug, Clone)]
pub struct MatchGroup {
    pub captures: Vec<Capture>,
}

impl MatchGroup {
    /// First capture with the given name.
    pub fn capture(&self, name: &str) -> Option<&Capture> {
        self.captures.iter().find(|c| c.name == name)
    }
}

pub struct CompiledDef {
    pub kind: NodeKind,
    pub query: Query,
}

pub struct CompiledRef {
    pub kind: EdgeKind,
    pub query: Query,
}

/// Compiled pattern set for one language.
pub struct CompiledSet {
    pub defs: Vec<CompiledDef>,
    pub refs: Vec<CompiledRef>,
}

/// Compiles and caches pattern sets per language.
pub struct QueryEngine {
    sets: HashMap<Lang, CompiledSet>,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self {
            sets: HashMap::new(),
        }
    }

    /// The compiled pattern set for a language, compiling on first use.
    pub fn compiled(&mut self, spec: &LanguageSpec) -> Result<&CompiledSet, CodescopeError> {
        if !self.sets.contains_key(&spec.lang) {
            let grammar = spec.grammar();
            let mut defs = Vec::with_capacity(spec.def_patterns.len());
            for pattern in spec.def_patterns {
                let query = Query::new(&grammar, pattern.query).map_err(|e| {
                    CodescopeError::ParseFailure {
                        path: String::new(),
                        message: format!("{} definition pattern: {e}", spec.lang),
                    }
                })?;
                defs.push(CompiledDef {
                    kind: pattern.kind,
                    query,
                });
            }
            let mut refs = Vec::with_capacity(spec.ref_patterns.len());
            for pattern in spec.ref_patterns {
                let query = Query::new(&grammar, pattern.query).map_err(|e| {
                    CodescopeError::ParseFailure {
                        path: String::new(),
                        message: format!("{} reference pattern: {e}", spec.lang),
                    }
                })?;
                refs.push(CompiledRef {
                    kind: pattern.kind,
                    query,
                });
            }
            self.sets.insert(spec.lang, CompiledSet { defs, refs });
        }
        Ok(self.sets.get(&spec.lang).expect("set just inserted"))
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one compiled query over a tree, grouping captures by match in
/// source order.
pub fn run_query(query: &Query, root: Node<'_>, source: &[u8]) -> Vec<MatchGroup> {
    let mut cursor = QueryCursor::new();
    let mut groups = Vec::new();

    let mut matches = cursor.matches(query, root, source);
    while let Some(m) = matches.next() {
        let mut captures = Vec::with_capacity(m.captures.len());
        for capture in m.captures {
            let name = query.capture_names()[capture.index as usize].to_string();
            let node = capture.node;
            let start = node.start_position();
            let end = node.end_position();
            captures.push(Capture {
                name,
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                span: Span {
                    start_line: start.row,
                    start_column: start.column,
                    end_line: end.row,
                    end_column: end.column,
                },
                text: node.utf8_text(source).unwrap_or("").to_string(),
            });
        }
        groups.push(MatchGroup { captures });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages;
    use crate::parser::ParserPool;

    #[test]
    fn captures_group_by_match_in_source_order() {
        let mut pool = ParserPool::new();
        let source = b"fn alpha() {}\nfn beta() {}\n";
        let tree = pool.parse(source, Lang::Rust).unwrap();

        let grammar = languages::spec_for(Lang::Rust).grammar();
        let query = Query::new(&grammar, "(function_item name: (identifier) @name) @def").unwrap();
        let groups = run_query(&query, tree.root_node(), source);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].capture("name").unwrap().text, "alpha");
        assert_eq!(groups[1].capture("name").unwrap().text, "beta");
        assert!(groups[0].capture("def").unwrap().start_byte < groups[1].capture("def").unwrap().start_byte);
    }

    #[test]
    fn every_language_pattern_set_compiles() {
        let mut engine = QueryEngine::new();
        for lang in Lang::all() {
            let spec = languages::spec_for(*lang);
            let compiled = engine.compiled(spec);
            assert!(
                compiled.is_ok(),
                "pattern set for {lang} failed to compile: {:?}",
                compiled.err()
            );
        }
    }

    #[test]
    fn compiled_sets_are_cached() {
        let mut engine = QueryEngine::new();
        let spec = languages::spec_for(Lang::Python);
        engine.compiled(spec).unwrap();
        engine.compiled(spec).unwrap();
        assert_eq!(engine.sets.len(), 1);
    }
}
