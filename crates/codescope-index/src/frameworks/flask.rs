//! Flask route extraction.
//!
//! Routes are decorator-driven and invisible to the generic extractor, so
//! this resolver scans Python sources for `@app.route(...)` /
//! `@bp.route(...)` decorators and emits `route` nodes named by their URL
//! path, with the handler recorded in the signature.

use super::{FrameworkResolver, ResolveContext, ResolvedTarget};
use codescope_core::{node_id, Node, NodeKind, Span, UnresolvedReference};

pub struct FlaskResolver;

impl FrameworkResolver for FlaskResolver {
    fn name(&self) -> &'static str {
        "flask"
    }

    fn detect(&self, ctx: &dyn ResolveContext) -> bool {
        if let Some(bytes) = ctx.read_file("requirements.txt") {
            let text = String::from_utf8_lossy(&bytes).to_lowercase();
            if text.lines().any(|l| l.trim_start().starts_with("flask")) {
                return true;
            }
        }
        ctx.all_files()
            .iter()
            .filter(|p| p.ends_with(".py"))
            .take(64)
            .any(|p| {
                ctx.read_file(p)
                    .map(|bytes| {
                        let text = String::from_utf8_lossy(&bytes);
                        text.contains("from flask import") || text.contains("import flask")
                    })
                    .unwrap_or(false)
            })
    }

    fn extract_nodes(&self, file_path: &str, content: &[u8]) -> Vec<Node> {
        if !file_path.ends_with(".py") {
            return Vec::new();
        }
        let text = String::from_utf8_lossy(content);
        let now = chrono::Utc::now();
        let mut nodes = Vec::new();

        let lines: Vec<&str> = text.lines().collect();
        for (line_no, line) in lines.iter().enumerate() {
            let Some(path) = route_path(line) else {
                continue;
            };
            // The decorated handler is the next `def` below the decorator
            // stack.
            let handler = lines[line_no + 1..]
                .iter()
                .take(8)
                .find_map(|l| handler_name(l));

            nodes.push(Node {
                id: node_id(NodeKind::Route, file_path, &path, line_no),
                kind: NodeKind::Route,
                name: path.clone(),
                qualified_name: path,
                language: "python".to_string(),
                file_path: file_path.to_string(),
                span: Span {
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    end_column: line.len(),
                },
                signature: handler.map(|h| format!("handler: {h}")),
                docstring: None,
                is_exported: true,
                updated_at: now,
            });
        }
        nodes
    }

    fn resolve(
        &self,
        reference: &UnresolvedReference,
        ctx: &dyn ResolveContext,
    ) -> Option<ResolvedTarget> {
        let name = reference.reference_name.as_str();
        // Route paths resolve anywhere; bare endpoint names only from a
        // `url_for(...)` call site, so ordinary calls are left to the
        // later passes.
        if !name.starts_with('/') && !site_is_url_for(reference, ctx) {
            return None;
        }

        for file in ctx.all_files() {
            let nodes = ctx.nodes_in_file(&file);
            for node in &nodes {
                if node.kind != NodeKind::Route {
                    continue;
                }
                let handler = node
                    .signature
                    .as_deref()
                    .and_then(|s| s.strip_prefix("handler: "));
                if node.name != name && handler != Some(name) {
                    continue;
                }
                // Bind to the decorated handler itself when it was
                // extracted; the route node is the fallback.
                if let Some(handler) = handler {
                    if let Some(target) = nodes.iter().find(|n| {
                        n.name == handler
                            && matches!(n.kind, NodeKind::Function | NodeKind::Method)
                    }) {
                        return Some(ResolvedTarget {
                            target_node_id: target.id.clone(),
                            confidence: 0.85,
                        });
                    }
                }
                return Some(ResolvedTarget {
                    target_node_id: node.id.clone(),
                    confidence: 0.85,
                });
            }
        }
        None
    }
}

/// True when the reference's source line is a `url_for(...)` call.
fn site_is_url_for(reference: &UnresolvedReference, ctx: &dyn ResolveContext) -> bool {
    let Some(bytes) = ctx.read_file(&reference.file_path) else {
        return false;
    };
    let text = String::from_utf8_lossy(&bytes);
    text.lines()
        .nth(reference.line)
        .is_some_and(|line| line.contains("url_for("))
}

/// Extract the URL path from a `@x.route("...")` decorator line.
fn route_path(line: &str) -> Option<String> {
    let t = line.trim_start();
    if !t.starts_with('@') || !t.contains(".route(") {
        return None;
    }
    let after = &t[t.find(".route(")? + ".route(".len()..];
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &after[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

/// Extract a handler name from a `def name(` line.
fn handler_name(line: &str) -> Option<String> {
    let t = line.trim_start();
    let rest = t.strip_prefix("def ")?;
    let end = rest.find('(')?;
    Some(rest[..end].trim().to_string())
}
