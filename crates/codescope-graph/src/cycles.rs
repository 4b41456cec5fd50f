//! Import-cycle enumeration over file-level `imports` edges.

use codescope_core::{CodescopeError, EdgeKind, NodeKind};
use codescope_store::Store;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Enumerate circular dependencies among files.
///
/// Builds a scratch directed graph from resolved file-to-file `imports`
/// edges and runs a DFS with an explicit recursion stack; every back edge
/// yields the cycle slice currently on the stack. Cycles sharing nodes are
/// reported separately; each cycle lists file paths and has length >= 2.
pub fn find_circular_dependencies(store: &Store) -> Result<Vec<Vec<String>>, CodescopeError> {
    let files = store.get_nodes_by_kind(NodeKind::File)?;
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut index_of: HashMap<String, NodeIndex> = HashMap::new();

    // get_nodes_by_kind is path-ordered, so indices (and DFS entry order)
    // are deterministic.
    for file in &files {
        let idx = graph.add_node(file.file_path.clone());
        index_of.insert(file.id.clone(), idx);
    }

    for edge in store.get_edges_by_kind(EdgeKind::Imports)? {
        let Some(target_id) = &edge.target_id else {
            continue;
        };
        let (Some(&src), Some(&dst)) = (index_of.get(&edge.source_id), index_of.get(target_id))
        else {
            continue; // only file-to-file imports participate
        };
        if src != dst {
            graph.update_edge(src, dst, ());
        }
    }

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut stack: Vec<NodeIndex> = Vec::new();
    let mut on_stack: HashSet<NodeIndex> = HashSet::new();
    let mut seen_cycles: HashSet<Vec<String>> = HashSet::new();
    let mut cycles: Vec<Vec<String>> = Vec::new();

    for start in graph.node_indices() {
        if !visited.contains(&start) {
            dfs(
                &graph,
                start,
                &mut visited,
                &mut stack,
                &mut on_stack,
                &mut seen_cycles,
                &mut cycles,
            );
        }
    }

    Ok(cycles)
}

fn dfs(
    graph: &DiGraph<String, ()>,
    node: NodeIndex,
    visited: &mut HashSet<NodeIndex>,
    stack: &mut Vec<NodeIndex>,
    on_stack: &mut HashSet<NodeIndex>,
    seen_cycles: &mut HashSet<Vec<String>>,
    cycles: &mut Vec<Vec<String>>,
) {
    visited.insert(node);
    stack.push(node);
    on_stack.insert(node);

    let mut neighbors: Vec<NodeIndex> = graph.neighbors(node).collect();
    neighbors.sort_by_key(|n| graph[*n].clone());

    for next in neighbors {
        if on_stack.contains(&next) {
            // Back edge: the slice from `next` to the stack top is a cycle.
            let pos = stack.iter().position(|n| *n == next).expect("on stack");
            let slice: Vec<String> = stack[pos..].iter().map(|n| graph[*n].clone()).collect();
            if slice.len() >= 2 && seen_cycles.insert(canonical(&slice)) {
                cycles.push(slice);
            }
        } else if !visited.contains(&next) {
            dfs(graph, next, visited, stack, on_stack, seen_cycles, cycles);
        }
    }

    stack.pop();
    on_stack.remove(&node);
}

/// Rotate a cycle so its lexicographically smallest member comes first,
/// making equal cycles discovered from different entry points comparable.
fn canonical(cycle: &[String]) -> Vec<String> {
    let min_pos = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = Vec::with_capacity(cycle.len());
    rotated.extend_from_slice(&cycle[min_pos..]);
    rotated.extend_from_slice(&cycle[..min_pos]);
    rotated
}
