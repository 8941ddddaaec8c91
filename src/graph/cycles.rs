//! Cycle Detection
//!
//! Finds every schema participating in a reference cycle. Strongly
//! connected components give the full circular set in linear time:
//! any SCC with more than one member is a cycle, and a singleton is
//! circular exactly when it carries a self-edge.

use petgraph::algo::kosaraju_scc;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::BTreeSet;

use super::RefGraph;

/// Names of all schemas on at least one reference cycle, sorted
pub fn circular_schemas(graph: &RefGraph) -> BTreeSet<String> {
    let mut circular = BTreeSet::new();

    for scc in kosaraju_scc(&graph.graph) {
        if scc.len() > 1 {
            for idx in scc {
                if let Some(name) = graph.graph.node_weight(idx) {
                    circular.insert(name.clone());
                }
            }
        } else {
            // Self-loop is a cycle of size one
            let idx = scc[0];
            let has_self_ref = graph
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .any(|e| e.target() == idx);
            if has_self_ref {
                if let Some(name) = graph.graph.node_weight(idx) {
                    circular.insert(name.clone());
                }
            }
        }
    }

    circular
}
