//! React component detection and JSX reference resolution.

use super::{FrameworkResolver, ResolveContext, ResolvedTarget};
use codescope_core::{node_id, simple_name_of, Node, NodeKind, Span, UnresolvedReference};

pub struct ReactResolver;

impl FrameworkResolver for ReactResolver {
    fn name(&self) -> &'static str {
        "react"
    }

    fn detect(&self, ctx: &dyn ResolveContext) -> bool {
        if let Some(bytes) = ctx.read_file("package.json") {
            let text = String::from_utf8_lossy(&bytes);
            if text.contains("\"react\"") {
                return true;
            }
        }
        false
    }

    /// Exported, capitalized function components in `.tsx`/`.jsx` files.
    fn extract_nodes(&self, file_path: &str, content: &[u8]) -> Vec<Node> {
        if !file_path.ends_with(".tsx") && !file_path.ends_with(".jsx") {
            return Vec::new();
        }
        let text = String::from_utf8_lossy(content);
        let now = chrono::Utc::now();
        let mut nodes = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let Some(name) = component_name(line) else {
                continue;
            };
            nodes.push(Node {
                id: node_id(NodeKind::Component, file_path, &name, line_no),
                kind: NodeKind::Component,
                name: name.clone(),
                qualified_name: name,
                language: "typescript".to_string(),
                file_path: file_path.to_string(),
                span: Span {
                    start_line: line_no,
                    start_column: 0,
                    end_line: line_no,
                    end_column: line.len(),
                },
                signature: Some(line.trim().chars().take(120).collect()),
                docstring: None,
                is_exported: true,
                updated_at: now,
            });
        }
        nodes
    }

    /// Capitalized JSX-style references resolve to the component node.
    fn resolve(
        &self,
        reference: &UnresolvedReference,
        ctx: &dyn ResolveContext,
    ) -> Option<ResolvedTarget> {
        let name = simple_name_of(&reference.reference_name);
        if !name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            return None;
        }
        let mut candidates: Vec<Node> = Vec::new();
        for file in ctx.all_files() {
            for node in ctx.nodes_in_file(&file) {
                if node.kind == NodeKind::Component && node.name == name {
                    candidates.push(node);
                }
            }
        }
        // all_files is path-ordered, so the first candidate is stable.
        candidates.into_iter().next().map(|node| ResolvedTarget {
            target_node_id: node.id,
            confidence: 0.8,
        })
    }
}

/// Component declarations: `export function Name(` or
/// `export const Name = (`/`=>`, capitalized.
fn component_name(line: &str) -> Option<String> {
    let t = line.trim_start();
    let rest = t.strip_prefix("export ")?;
    let name = if let Some(after) = rest.strip_prefix("function ") {
        let end = after.find('(')?;
        after[..end].trim().to_string()
    } else if let Some(after) = rest
        .strip_prefix("const ")
        .or_else(|| rest.strip_prefix("default function "))
    {
        let end = after.find(|c: char| c == '=' || c == '(' || c == ':')?;
        after[..end].trim().to_string()
    } else {
        return None;
    };
    if name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !name.is_empty()
    {
        Some(name)
    } else {
        None
    }
}
