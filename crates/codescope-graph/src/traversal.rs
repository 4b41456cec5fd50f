//! Containment walks, call neighborhoods, impact radius, and context
//! assembly.

use codescope_core::{CodescopeError, Edge, EdgeKind, Node, NodeKind};
use codescope_store::Store;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// A node reached by impact analysis, annotated with its minimum depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactEntry {
    pub node: Node,
    pub depth: usize,
}

/// Everything assembled around a focal node for context queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeContext {
    pub node: Node,
    /// Containment chain, nearest enclosing scope first, file node last.
    pub ancestors: Vec<Node>,
    pub children: Vec<Node>,
    /// Incoming references, `contains` excluded.
    pub incoming: Vec<Edge>,
    /// Outgoing references, `contains` excluded.
    pub outgoing: Vec<Edge>,
    /// Import edges of the enclosing file.
    pub file_imports: Vec<Edge>,
}

/// Read-only traversal facade over the store.
pub struct GraphQuery<'a> {
    store: &'a Store,
}

impl<'a> GraphQuery<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Walk `contains` edges upward until the file node. Nearest enclosing
    /// scope first.
    pub fn ancestors(&self, node_id: &str) -> Result<Vec<Node>, CodescopeError> {
        let mut out = Vec::new();
        let mut current = node_id.to_string();
        // Containment is a forest, but a corrupted store must not hang us.
        let mut seen = HashSet::new();
        seen.insert(current.clone());

        loop {
            let parents = self
                .store
                .get_incoming_edges(&current, Some(&[EdgeKind::Contains]))?;
            let Some(parent_edge) = parents.first() else {
                break;
            };
            let Some(parent) = self.store.get_node_by_id(&parent_edge.source_id)? else {
                break;
            };
            if !seen.insert(parent.id.clone()) {
                tracing::warn!(node_id, "containment cycle detected; stopping ancestor walk");
                break;
            }
            let is_file = parent.kind == NodeKind::File;
            current = parent.id.clone();
            out.push(parent);
            if is_file {
                break;
            }
        }
        Ok(out)
    }

    /// Immediate `contains` children, in source order.
    pub fn children(&self, node_id: &str) -> Result<Vec<Node>, CodescopeError> {
        let edges = self
            .store
            .get_outgoing_edges(node_id, Some(&[EdgeKind::Contains]))?;
        let mut nodes = self.materialize_targets(&edges)?;
        sort_siblings(&mut nodes);
        Ok(nodes)
    }

    /// Nodes with a `calls` edge into this node, one hop.
    pub fn callers(&self, node_id: &str) -> Result<Vec<Node>, CodescopeError> {
        let edges = self
            .store
            .get_incoming_edges(node_id, Some(&[EdgeKind::Calls]))?;
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();
        for edge in &edges {
            if seen.insert(edge.source_id.clone()) {
                if let Some(node) = self.store.get_node_by_id(&edge.source_id)? {
                    nodes.push(node);
                }
            }
        }
        sort_siblings(&mut nodes);
        Ok(nodes)
    }

    /// Resolved `calls` targets of this node, one hop.
    pub fn callees(&self, node_id: &str) -> Result<Vec<Node>, CodescopeError> {
        let edges = self
            .store
            .get_outgoing_edges(node_id, Some(&[EdgeKind::Calls]))?;
        let mut nodes = self.materialize_targets(&edges)?;
        sort_siblings(&mut nodes);
        Ok(nodes)
    }

    /// Bounded reverse BFS over calls/imports/extends/implements edges.
    ///
    /// Depth 0 is the focal node itself; each node appears once, at its
    /// minimum depth. Results are sorted by `(depth, file_path, start_line)`.
    pub fn impact_radius(
        &self,
        node_id: &str,
        depth: usize,
    ) -> Result<Vec<ImpactEntry>, CodescopeError> {
        let focal = self
            .store
            .get_node_by_id(node_id)?
            .ok_or_else(|| CodescopeError::NotFound(format!("node {node_id}")))?;

        let mut out = vec![ImpactEntry {
            node: focal,
            depth: 0,
        }];
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(node_id.to_string());

        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((node_id.to_string(), 0));

        while let Some((current, current_depth)) = queue.pop_front() {
            if current_depth >= depth {
                continue;
            }
            let incoming = self
                .store
                .get_incoming_edges(&current, Some(&EdgeKind::IMPACT))?;
            for edge in &incoming {
                if visited.insert(edge.source_id.clone()) {
                    if let Some(node) = self.store.get_node_by_id(&edge.source_id)? {
                        out.push(ImpactEntry {
                            node,
                            depth: current_depth + 1,
                        });
                        queue.push_back((edge.source_id.clone(), current_depth + 1));
                    }
                }
            }
        }

        out.sort_by(|a, b| {
            a.depth
                .cmp(&b.depth)
                .then_with(|| a.node.file_path.cmp(&b.node.file_path))
                .then_with(|| a.node.span.start_line.cmp(&b.node.span.start_line))
        });
        Ok(out)
    }

    /// Assemble the focal node plus its structural neighborhood.
    pub fn context(&self, node_id: &str) -> Result<NodeContext, CodescopeError> {
        let node = self
            .store
            .get_node_by_id(node_id)?
            .ok_or_else(|| CodescopeError::NotFound(format!("node {node_id}")))?;

        let ancestors = self.ancestors(node_id)?;
        let children = self.children(node_id)?;

        let non_contains = [
            EdgeKind::Calls,
            EdgeKind::Imports,
            EdgeKind::Extends,
            EdgeKind::Implements,
            EdgeKind::Returns,
            EdgeKind::TypeOf,
            EdgeKind::Reads,
            EdgeKind::Writes,
        ];
        let incoming = self.store.get_incoming_edges(node_id, Some(&non_contains))?;
        let outgoing = self.store.get_outgoing_edges(node_id, Some(&non_contains))?;

        // The enclosing file is the tail of the ancestor chain (or the node
        // itself, for file nodes).
        let file_id = if node.kind == NodeKind::File {
            Some(node.id.clone())
        } else {
            ancestors
                .iter()
                .find(|n| n.kind == NodeKind::File)
                .map(|n| n.id.clone())
        };
        let file_imports = match file_id {
            Some(id) => self
                .store
                .get_outgoing_edges(&id, Some(&[EdgeKind::Imports]))?,
            None => Vec::new(),
        };

        Ok(NodeContext {
            node,
            ancestors,
            children,
            incoming,
            outgoing,
            file_imports,
        })
    }

    fn materialize_targets(&self, edges: &[Edge]) -> Result<Vec<Node>, CodescopeError> {
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();
        for edge in edges {
            if let Some(target_id) = &edge.target_id {
                if seen.insert(target_id.clone()) {
                    if let Some(node) = self.store.get_node_by_id(target_id)? {
                        nodes.push(node);
                    }
                }
            }
        }
        Ok(nodes)
    }
}

fn sort_siblings(nodes: &mut [Node]) {
    nodes.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then_with(|| a.span.start_line.cmp(&b.span.start_line))
    });
}
