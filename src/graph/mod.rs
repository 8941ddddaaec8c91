//! Schema Reference Graph
//!
//! Directed graph over named schema definitions using petgraph. Nodes are
//! schema names, edges are internal `$ref` pointers classified by the
//! keyword context that produced them. Cycles are legal and measured, not
//! rejected. Operation-level references are kept as a separate touch tally
//! rather than graph edges.

pub mod cycles;
pub mod depth;

pub use cycles::circular_schemas;
pub use depth::{max_depth, schema_depths};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::document::Document;
use crate::error::{AnalysisError, Result};

/// Prefix of an internal schema reference pointer
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Keyword context a reference pointer was found under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Bare $ref at the schema root or an unclassified position
    Ref,
    /// Property field type
    Property,
    /// Array items type
    Items,
    /// allOf composition fragment
    AllOf,
    /// oneOf union branch
    OneOf,
    /// anyOf union branch
    AnyOf,
}

/// The schema reference graph for one document
#[derive(Debug)]
pub struct RefGraph {
    pub(crate) graph: DiGraph<String, EdgeKind>,
    pub(crate) node_indices: HashMap<String, NodeIndex>,
    /// Every internal schema-reference occurrence (schemas and operations)
    pub(crate) total_refs: usize,
    /// Schema name -> number of references from operations
    pub(crate) operation_touches: BTreeMap<String, usize>,
}

impl RefGraph {
    /// Build the reference graph for a loaded document.
    ///
    /// Every internal pointer must resolve to a schema present in the
    /// document; a dangling pointer is fatal because it invalidates every
    /// downstream metric.
    pub fn build(document: &Document) -> Result<RefGraph> {
        let schema_count = document.schemas.len();
        let mut graph = DiGraph::with_capacity(schema_count, schema_count * 3);
        let mut node_indices = HashMap::with_capacity(schema_count);

        for name in document.schemas.keys() {
            let idx = graph.add_node(name.clone());
            node_indices.insert(name.clone(), idx);
        }

        let mut total_refs = 0;
        for (name, schema) in &document.schemas {
            let mut refs = Vec::new();
            collect_refs(&schema.raw, EdgeKind::Ref, &mut refs);
            total_refs += refs.len();

            let from_idx = node_indices[name];
            for (target, kind) in refs {
                let Some(&to_idx) = node_indices.get(&target) else {
                    return Err(AnalysisError::UnresolvedReference {
                        source_name: format!("schema '{}'", name),
                        target,
                    });
                };
                graph.add_edge(from_idx, to_idx, kind);
            }
        }

        let mut operation_touches: BTreeMap<String, usize> = BTreeMap::new();
        for op in document.operations() {
            let mut refs = Vec::new();
            collect_refs(&op.raw, EdgeKind::Ref, &mut refs);
            total_refs += refs.len();

            for (target, _) in refs {
                if !node_indices.contains_key(&target) {
                    return Err(AnalysisError::UnresolvedReference {
                        source_name: format!("operation '{}'", op.location()),
                        target,
                    });
                }
                *operation_touches.entry(target).or_default() += 1;
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            total_refs,
            "reference graph built"
        );

        Ok(RefGraph {
            graph,
            node_indices,
            total_refs,
            operation_touches,
        })
    }

    /// Number of schema nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of schema-to-schema edges (parallel edges counted)
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every internal reference occurrence, operations included
    pub fn total_refs(&self) -> usize {
        self.total_refs
    }

    /// Distinct (source, target) schema pairs
    pub fn distinct_refs(&self) -> usize {
        let pairs: HashSet<(NodeIndex, NodeIndex)> = self
            .graph
            .edge_references()
            .map(|e| (e.source(), e.target()))
            .collect();
        pairs.len()
    }

    /// Schema most referenced by operations, ties broken by name
    pub fn most_referenced(&self) -> Option<(&str, usize)> {
        self.operation_touches
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(name, count)| (name.as_str(), *count))
    }

    /// Outgoing neighbor names of a schema
    pub fn refs_out(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };
        self.graph
            .edges(idx)
            .filter_map(|e| self.graph.node_weight(e.target()))
            .map(|s| s.as_str())
            .collect()
    }
}

/// Recursively collect internal schema references with their keyword context
fn collect_refs(node: &serde_json::Value, context: EdgeKind, out: &mut Vec<(String, EdgeKind)>) {
    match node {
        serde_json::Value::Object(map) => {
            if let Some(target) = map.get("$ref").and_then(|v| v.as_str()) {
                if let Some(name) = parse_ref(target) {
                    out.push((name.to_string(), context));
                }
            }
            for (key, value) in map {
                let child_context = match key.as_str() {
                    "properties" => EdgeKind::Property,
                    "items" => EdgeKind::Items,
                    "allOf" => EdgeKind::AllOf,
                    "oneOf" => EdgeKind::OneOf,
                    "anyOf" => EdgeKind::AnyOf,
                    "$ref" => continue,
                    _ => context,
                };
                collect_refs(value, child_context, out);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_refs(item, context, out);
            }
        }
        _ => {}
    }
}

/// Extract the schema name from an internal reference pointer.
/// External and non-schema pointers yield None and are not graph edges.
fn parse_ref(pointer: &str) -> Option<&str> {
    let name = pointer.strip_prefix(SCHEMA_REF_PREFIX)?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name)
}
