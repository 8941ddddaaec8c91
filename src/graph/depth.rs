//! Reference Depth Analysis
//!
//! Longest simple reference chain from each schema, counted in edges.
//! Cycles truncate the walk: a node already on the current path
//! contributes depth 0 instead of recursing. Results are memoized in a
//! per-run table, but only for nodes whose reachable subgraph never hit a
//! truncation — a depth measured inside a cut-off branch depends on the
//! entry point and must not be reused.

use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::RefGraph;

/// Per-run traversal state, never shared across documents
struct DepthContext {
    memo: HashMap<NodeIndex, usize>,
    on_path: HashSet<NodeIndex>,
}

/// Longest reference chain per schema, ordered by name
pub fn schema_depths(graph: &RefGraph) -> BTreeMap<String, usize> {
    let mut ctx = DepthContext {
        memo: HashMap::with_capacity(graph.node_count()),
        on_path: HashSet::new(),
    };

    let mut depths = BTreeMap::new();
    for (name, &idx) in &graph.node_indices {
        let (depth, _) = walk(graph, idx, &mut ctx);
        depths.insert(name.clone(), depth);
    }
    depths
}

/// Document-level max depth over all schemas
pub fn max_depth(graph: &RefGraph) -> usize {
    schema_depths(graph).into_values().max().unwrap_or(0)
}

/// Returns (depth, cycle_free). Depth is memoized only when the entire
/// subtree below the node was traversed without truncation.
fn walk(graph: &RefGraph, node: NodeIndex, ctx: &mut DepthContext) -> (usize, bool) {
    if let Some(&depth) = ctx.memo.get(&node) {
        return (depth, true);
    }

    ctx.on_path.insert(node);
    let mut best = 0;
    let mut cycle_free = true;

    let successors: Vec<NodeIndex> = graph.graph.neighbors(node).collect();
    for succ in successors {
        if ctx.on_path.contains(&succ) {
            // Back-edge: terminate this branch instead of recursing
            cycle_free = false;
            continue;
        }
        let (depth, free) = walk(graph, succ, ctx);
        cycle_free &= free;
        best = best.max(1 + depth);
    }
    ctx.on_path.remove(&node);

    if cycle_free {
        ctx.memo.insert(node, best);
    }
    (best, cycle_free)
}
