//! Capture-to-graph extraction.
//!
//! Turns the query engine's captures into typed nodes with deterministic
//! IDs, `contains` edges, and unresolved references. Qualified names come
//! from the nesting of extracted definitions; the innermost definition
//! containing a reference site becomes that reference's source node.

use crate::languages::{self, ExportRule, LanguageSpec};
use crate::parser::{Lang, ParserPool};
use crate::queries::{run_query, QueryEngine};
use codescope_core::{
    node_id, CodescopeError, Edge, EdgeKind, Node, NodeKind, Span, UnresolvedReference,
};
use tree_sitter::Tree;

/// Everything extracted from one file.
#[derive(Debug)]
pub struct FileExtraction {
    /// Synthetic node for the file itself.
    pub file_node: Node,
    /// Extracted definitions (the file node is not in this list).
    pub nodes: Vec<Node>,
    /// Structural `contains` edges, confidence 1.0.
    pub edges: Vec<Edge>,
    pub references: Vec<UnresolvedReference>,
    /// True when tree-sitter reported an error tree; extraction is still
    /// whatever could be recovered.
    pub has_parse_errors: bool,
}

struct RawDef {
    kind: NodeKind,
    name: String,
    scope: Option<String>,
    start_byte: usize,
    end_byte: usize,
    span: Span,
}

struct PlacedDef {
    node: Node,
    start_byte: usize,
    end_byte: usize,
    parent: Option<usize>,
}

/// Extract nodes, edges, and references from one file.
pub fn extract_file(
    path: &str,
    content: &[u8],
    lang: Lang,
    pool: &mut ParserPool,
    engine: &mut QueryEngine,
) -> Result<FileExtraction, CodescopeError> {
    let spec = languages::spec_for(lang);
    let tree = pool.parse(content, lang)?;
    let now = chrono::Utc::now();

    let file_node = make_file_node(path, lang, &tree, now);
    let raw_defs = collect_defs(spec, &tree, content, engine)?;
    let placed = place_defs(path, spec, &tree, content, raw_defs, now);

    let mut edges = Vec::with_capacity(placed.len());
    for def in &placed {
        let parent_id = match def.parent {
            Some(parent_index) => placed[parent_index].node.id.clone(),
            None => file_node.id.clone(),
        };
        edges.push(Edge {
            source_id: parent_id,
            target_id: Some(def.node.id.clone()),
            target_symbol: def.node.qualified_name.clone(),
            kind: EdgeKind::Contains,
            confidence: 1.0,
            file_path: path.to_string(),
            line: def.node.span.start_line,
            resolved_by: None,
        });
    }

    let references = collect_refs(path, spec, &tree, content, engine, &placed, &file_node)?;

    Ok(FileExtraction {
        file_node,
        nodes: placed.into_iter().map(|d| d.node).collect(),
        edges,
        references,
        has_parse_errors: tree.root_node().has_error(),
    })
}

fn make_file_node(path: &str, lang: Lang, tree: &Tree, now: chrono::DateTime<chrono::Utc>) -> Node {
    let end = tree.root_node().end_position();
    Node {
        id: node_id(NodeKind::File, path, path, 0),
        kind: NodeKind::File,
        name: path.to_string(),
        qualified_name: path.to_string(),
        language: lang.as_str().to_string(),
        file_path: path.to_string(),
        span: Span {
            start_line: 0,
            start_column: 0,
            end_line: end.row,
            end_column: end.column,
        },
        signature: None,
        docstring: None,
        is_exported: true,
        updated_at: now,
    }
}

fn collect_defs(
    spec: &LanguageSpec,
    tree: &Tree,
    content: &[u8],
    engine: &mut QueryEngine,
) -> Result<Vec<RawDef>, CodescopeError> {
    let compiled = engine.compiled(spec)?;
    let mut defs: Vec<RawDef> = Vec::new();
    let mut seen: std::collections::HashSet<(usize, usize)> = std::collections::HashSet::new();

    for def_query in &compiled.defs {
        for group in run_query(&def_query.query, tree.root_node(), content) {
            let Some(def_capture) = group.capture("def") else {
                continue;
            };
            // Ordered patterns: the first pattern to claim a position wins.
            if !seen.insert((def_capture.start_byte, def_capture.end_byte)) {
                continue;
            }
            let name = match group.capture("name") {
                Some(c) => c.text.trim().to_string(),
                None => match derive_name(tree, def_capture.start_byte, def_capture.end_byte, content)
                {
                    Some(name) => name,
                    None => continue,
                },
            };
            if name.is_empty() {
                continue;
            }
            defs.push(RawDef {
                kind: def_query.kind,
                name,
                scope: group.capture("scope").map(|c| c.text.trim().to_string()),
                start_byte: def_capture.start_byte,
                end_byte: def_capture.end_byte,
                span: def_capture.span,
            });
        }
    }

    // Parents before children: outer intervals first.
    defs.sort_by(|a, b| {
        a.start_byte
            .cmp(&b.start_byte)
            .then_with(|| b.end_byte.cmp(&a.end_byte))
    });
    Ok(defs)
}

/// Nest definitions, build qualified names and IDs, and apply kind remaps.
fn place_defs(
    path: &str,
    spec: &LanguageSpec,
    tree: &Tree,
    content: &[u8],
    defs: Vec<RawDef>,
    now: chrono::DateTime<chrono::Utc>,
) -> Vec<PlacedDef> {
    let sep = spec.separator;
    let mut placed: Vec<PlacedDef> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut seen_ids: std::collections::HashSet<String> = std::collections::HashSet::new();

    for def in defs {
        while let Some(&top) = stack.last() {
            if placed[top].end_byte <= def.start_byte {
                stack.pop();
            } else {
                break;
            }
        }

        let (parent, qualified) = match &def.scope {
            // Explicit scope capture (e.g. a Rust impl target): attach to the
            // scope's type definition when it lives in this file.
            Some(scope) => {
                let owner = placed
                    .iter()
                    .position(|p| p.node.name == *scope && is_type_kind(p.node.kind));
                let prefix = owner
                    .map(|i| placed[i].node.qualified_name.clone())
                    .unwrap_or_else(|| scope.clone());
                (owner, format!("{prefix}{sep}{}", def.name))
            }
            None => match stack.last() {
                Some(&parent_index) => (
                    Some(parent_index),
                    format!("{}{sep}{}", placed[parent_index].node.qualified_name, def.name),
                ),
                None => (None, def.name.clone()),
            },
        };

        let parent_kind = parent.map(|i| placed[i].node.kind);
        let kind = remap_kind(def.kind, &def.name, parent_kind, spec);

        let id = node_id(kind, path, &qualified, def.span.start_line);
        if !seen_ids.insert(id.clone()) {
            continue;
        }

        let def_text = text_slice(content, def.start_byte, def.end_byte);
        let node = Node {
            id,
            kind,
            name: def.name.clone(),
            qualified_name: qualified,
            language: spec.lang.as_str().to_string(),
            file_path: path.to_string(),
            span: def.span,
            signature: Some(first_line_signature(def_text)),
            docstring: leading_comment(tree, def.start_byte, def.end_byte, content),
            is_exported: is_exported(
                spec.export_rule,
                &def.name,
                def_text,
                tree,
                def.start_byte,
                def.end_byte,
                content,
            ),
            updated_at: now,
        };

        placed.push(PlacedDef {
            node,
            start_byte: def.start_byte,
            end_byte: def.end_byte,
            parent,
        });
        stack.push(placed.len() - 1);
    }

    placed
}

fn collect_refs(
    path: &str,
    spec: &LanguageSpec,
    tree: &Tree,
    content: &[u8],
    engine: &mut QueryEngine,
    defs: &[PlacedDef],
    file_node: &Node,
) -> Result<Vec<UnresolvedReference>, CodescopeError> {
    let compiled = engine.compiled(spec)?;
    let mut refs = Vec::new();
    let mut seen: std::collections::HashSet<(EdgeKind, usize)> = std::collections::HashSet::new();

    for ref_query in &compiled.refs {
        for group in run_query(&ref_query.query, tree.root_node(), content) {
            let Some(ref_capture) = group.capture("ref") else {
                continue;
            };
            if !seen.insert((ref_query.kind, ref_capture.start_byte)) {
                continue;
            }
            let target = strip_quotes(ref_capture.text.trim());
            if target.is_empty() {
                continue;
            }
            let qualifier = group.capture("qualifier").map(|c| c.text.trim().to_string());

            // Imports belong to the file; everything else to the innermost
            // enclosing definition.
            let source_node_id = if ref_query.kind == EdgeKind::Imports {
                file_node.id.clone()
            } else {
                innermost_def(defs, ref_capture.start_byte)
                    .map(|d| d.node.id.clone())
                    .unwrap_or_else(|| file_node.id.clone())
            };

            let reference_name = match &qualifier {
                Some(q) if !q.is_empty() => format!("{q}.{target}"),
                _ => target,
            };

            refs.push(UnresolvedReference {
                source_node_id,
                reference_name,
                qualifier,
                kind: ref_query.kind,
                file_path: path.to_string(),
                line: ref_capture.span.start_line,
            });
        }
    }

    refs.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.reference_name.cmp(&b.reference_name)));
    Ok(refs)
}

/// Name for a definition whose pattern could not capture one directly:
/// the `name` field if the grammar has it, else the first identifier-like
/// named child.
fn derive_name(
    tree: &Tree,
    start_byte: usize,
    end_byte: usize,
    source: &[u8],
) -> Option<String> {
    let node = tree
        .root_node()
        .descendant_for_byte_range(start_byte, end_byte)?;
    if let Some(name_node) = node.child_by_field_name("name") {
        let text = name_node.utf8_text(source).ok()?.trim().to_string();
        if !text.is_empty() {
            return Some(text);
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let kind = child.kind();
        if kind.ends_with("identifier") || kind == "name" || kind == "constant" {
            let text = child.utf8_text(source).unwrap_or("").trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn innermost_def(defs: &[PlacedDef], byte: usize) -> Option<&PlacedDef> {
    defs.iter()
        .filter(|d| d.start_byte <= byte && byte < d.end_byte)
        .min_by_key(|d| d.end_byte - d.start_byte)
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

fn remap_kind(
    kind: NodeKind,
    name: &str,
    parent_kind: Option<NodeKind>,
    spec: &LanguageSpec,
) -> NodeKind {
    let in_type = parent_kind.is_some_and(is_type_kind);
    let mut kind = kind;

    if kind == NodeKind::Function && in_type {
        kind = NodeKind::Method;
    }
    if matches!(kind, NodeKind::Function | NodeKind::Method) {
        if spec.constructor_names.contains(&name) && in_type {
            kind = NodeKind::Constructor;
        } else if spec.destructor_names.contains(&name) && in_type {
            kind = NodeKind::Destructor;
        }
    }
    // Rust impl methods carry an explicit scope rather than a parent.
    if kind == NodeKind::Method && spec.constructor_names.contains(&name) {
        kind = NodeKind::Constructor;
    }
    if kind == NodeKind::Variable && is_screaming_case(name) {
        kind = NodeKind::Constant;
    }
    kind
}

fn is_screaming_case(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn is_exported(
    rule: ExportRule,
    name: &str,
    def_text: &str,
    tree: &Tree,
    start_byte: usize,
    end_byte: usize,
    source: &[u8],
) -> bool {
    match rule {
        ExportRule::PubKeyword => def_text.trim_start().starts_with("pub"),
        ExportRule::UppercaseName => name.chars().next().is_some_and(|c| c.is_uppercase()),
        ExportRule::NoLeadingUnderscore => !name.starts_with('_'),
        ExportRule::PublicModifier => modifier_text(tree, start_byte, end_byte, source)
            .is_some_and(|m| m.contains("public")),
        ExportRule::NotPrivateModifier => modifier_text(tree, start_byte, end_byte, source)
            .map(|m| {
                !(m.contains("private") || m.contains("protected") || m.contains("fileprivate"))
            })
            .unwrap_or(true),
        ExportRule::NotFileStatic => !def_text.trim_start().starts_with("static"),
        ExportRule::ExportAncestor => {
            let Some(mut node) = tree
                .root_node()
                .descendant_for_byte_range(start_byte, end_byte)
            else {
                return false;
            };
            while let Some(parent) = node.parent() {
                if parent.kind() == "export_statement" {
                    return true;
                }
                node = parent;
            }
            false
        }
    }
}

/// Concatenated text of a definition's modifier children ("modifiers",
/// "modifier", "visibility_modifier", ...), if it has any.
fn modifier_text(
    tree: &Tree,
    start_byte: usize,
    end_byte: usize,
    source: &[u8],
) -> Option<String> {
    let node = tree
        .root_node()
        .descendant_for_byte_range(start_byte, end_byte)?;
    let mut out = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind().contains("modifier") {
            out.push_str(child.utf8_text(source).unwrap_or(""));
            out.push(' ');
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// First line of a definition up to its body opener, whitespace-collapsed.
fn first_line_signature(def_text: &str) -> String {
    let mut s = def_text;
    if let Some(i) = s.find('{') {
        s = &s[..i];
    }
    if let Some(i) = s.find('\n') {
        s = &s[..i];
    }
    let mut out = String::with_capacity(s.len().min(200));
    let mut prev_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_ws && !out.is_empty() {
                out.push(' ');
            }
            prev_ws = true;
        } else {
            out.push(ch);
            prev_ws = false;
        }
        if out.len() >= 200 {
            break;
        }
    }
    out.trim().to_string()
}

/// Documentation comment directly above a definition, markers stripped.
fn leading_comment(tree: &Tree, start_byte: usize, end_byte: usize, source: &[u8]) -> Option<String> {
    let def_node = tree
        .root_node()
        .descendant_for_byte_range(start_byte, end_byte)?;
    let mut lines: Vec<String> = Vec::new();
    let mut expected_row = def_node.start_position().row;
    let mut sibling = def_node.prev_named_sibling();

    while let Some(node) = sibling {
        if !node.kind().contains("comment") || node.end_position().row + 1 < expected_row {
            break;
        }
        let text = node.utf8_text(source).unwrap_or("");
        for line in text.lines().rev() {
            lines.push(clean_comment_line(line));
        }
        expected_row = node.start_position().row;
        sibling = node.prev_named_sibling();
    }

    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    let joined = lines.join("\n").trim().to_string();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

fn clean_comment_line(line: &str) -> String {
    let t = line.trim();
    let t = t
        .trim_start_matches("///")
        .trim_start_matches("//!")
        .trim_start_matches("//")
        .trim_start_matches("/*")
        .trim_start_matches('#')
        .trim_end_matches("*/");
    t.trim_start_matches('*').trim().to_string()
}

fn strip_quotes(s: &str) -> String {
    let t = s.trim();
    if t.len() >= 2 {
        let bytes = t.as_bytes();
        let (first, last) = (bytes[0], bytes[t.len() - 1]);
        if (first == b'"' && last == b'"')
            || (first == b'\'' && last == b'\'')
            || (first == b'`' && last == b'`')
            || (first == b'<' && last == b'>')
        {
            return t[1..t.len() - 1].to_string();
        }
    }
    t.to_string()
}

fn text_slice<'a>(content: &'a [u8], start: usize, end: usize) -> &'a str {
    std::str::from_utf8(&content[start.min(content.len())..end.min(content.len())]).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(path: &str, source: &str, lang: Lang) -> FileExtraction {
        let mut pool = ParserPool::new();
        let mut engine = QueryEngine::new();
        extract_file(path, source.as_bytes(), lang, &mut pool, &mut engine).unwrap()
    }

    #[test]
    fn file_node_uses_path_as_name_and_qualified_name() {
        let out = extract("src/a.ts", "export function f() {}\n", Lang::TypeScript);
        assert_eq!(out.file_node.kind, NodeKind::File);
        assert_eq!(out.file_node.name, "src/a.ts");
        assert_eq!(out.file_node.qualified_name, "src/a.ts");
    }

    #[test]
    fn ids_are_stable_across_reruns() {
        let source = "export class A { run() {} }\n";
        let first = extract("src/a.ts", source, Lang::TypeScript);
        let second = extract("src/a.ts", source, Lang::TypeScript);

        let mut a: Vec<&str> = first.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut b: Vec<&str> = second.nodes.iter().map(|n| n.id.as_str()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn every_node_has_a_contains_edge_to_a_parent() {
        let out = extract(
            "src/a.ts",
            "export class A { run() { helper(); } }\nfunction helper() {}\n",
            Lang::TypeScript,
        );
        assert_eq!(out.edges.len(), out.nodes.len());
        for edge in &out.edges {
            assert_eq!(edge.kind, EdgeKind::Contains);
            assert!((edge.confidence - 1.0).abs() < f64::EPSILON);
            assert!(edge.is_resolved());
        }
        // Top-level defs hang off the file node.
        let class = out.nodes.iter().find(|n| n.name == "A").unwrap();
        let class_edge = out
            .edges
            .iter()
            .find(|e| e.target_id.as_deref() == Some(class.id.as_str()))
            .unwrap();
        assert_eq!(class_edge.source_id, out.file_node.id);
    }

    #[test]
    fn call_references_attach_to_innermost_definition() {
        let out = extract(
            "src/a.ts",
            "export class A { run() { helper(); } }\nfunction helper() {}\n",
            Lang::TypeScript,
        );
        let call = out
            .references
            .iter()
            .find(|r| r.kind == EdgeKind::Calls && r.reference_name == "helper")
            .unwrap();
        let run = out.nodes.iter().find(|n| n.name == "run").unwrap();
        assert_eq!(call.source_node_id, run.id);
    }

    #[test]
    fn parse_errors_are_reported_but_extraction_continues() {
        let out = extract(
            "src/broken.ts",
            "export function ok() {}\nexport function broken( {\n",
            Lang::TypeScript,
        );
        assert!(out.has_parse_errors);
        assert!(out.nodes.iter().any(|n| n.name == "ok"));
    }

    #[test]
    fn signature_is_collapsed_first_line() {
        let out = extract(
            "src/a.ts",
            "export function add(\n    a: number,\n    b: number\n): number { return a + b; }\n",
            Lang::TypeScript,
        );
        let add = out.nodes.iter().find(|n| n.name == "add").unwrap();
        // The definition node starts at `function`; the export keyword
        // belongs to the wrapping statement.
        let signature = add.signature.as_deref().unwrap();
        assert!(signature.starts_with("function add("));
        assert!(!signature.contains('\n'));
    }

    #[test]
    fn leading_doc_comment_becomes_docstring() {
        let out = extract(
            "src/a.rs",
            "/// Adds two numbers.\n/// Carefully.\npub fn add(a: i32, b: i32) -> i32 { a + b }\n",
            Lang::Rust,
        );
        let add = out.nodes.iter().find(|n| n.name == "add").unwrap();
        let doc = add.docstring.as_deref().unwrap();
        assert!(doc.contains("Adds two numbers."));
        assert!(doc.contains("Carefully."));
    }

    #[test]
    fn nested_class_methods_inherit_parent_prefix() {
        let out = extract(
            "src/a.py",
            "class Outer:\n    class Inner:\n        def run(self):\n            pass\n",
            Lang::Python,
        );
        let run = out.nodes.iter().find(|n| n.name == "run").unwrap();
        assert_eq!(run.qualified_name, "Outer.Inner.run");
        assert_eq!(run.kind, NodeKind::Method);
    }
}
