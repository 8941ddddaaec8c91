//! Metric Aggregation
//!
//! Pure counting pass over the document and its reference graph. The
//! resulting snapshot is an immutable value; the scorer and narrative
//! stages are total functions over it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::document::{Document, Method, SchemaKind};
use crate::graph::RefGraph;

/// Aggregated structural counts for one document, computed once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub title: String,
    pub version: String,

    pub path_count: usize,
    pub operation_count: usize,
    pub operations_by_method: BTreeMap<Method, usize>,
    pub avg_parameters: f64,
    pub max_parameters: usize,

    pub schema_count: usize,
    pub object_schema_count: usize,
    pub avg_properties: f64,
    pub max_properties: usize,

    pub total_refs: usize,
    pub distinct_refs: usize,
    pub circular_schemas: Vec<String>,
    pub max_depth: usize,

    pub union_branches: usize,
    pub all_of_usages: usize,
    pub discriminator_count: usize,
    /// oneOf/anyOf branches on schemas with no discriminator
    pub undiscriminated_branches: usize,

    /// Schema most referenced by operations, with its touch count
    pub most_referenced: Option<(String, usize)>,
}

impl MetricsSnapshot {
    pub fn circular_count(&self) -> usize {
        self.circular_schemas.len()
    }
}

/// Aggregate all metric families into a snapshot
pub fn aggregate(
    document: &Document,
    graph: &RefGraph,
    circular: &BTreeSet<String>,
    depths: &BTreeMap<String, usize>,
) -> MetricsSnapshot {
    let mut operations_by_method: BTreeMap<Method, usize> = BTreeMap::new();
    let mut operation_count = 0;
    let mut param_total = 0;
    let mut max_parameters = 0;
    for op in document.operations() {
        *operations_by_method.entry(op.method).or_default() += 1;
        operation_count += 1;
        param_total += op.parameter_count;
        max_parameters = max_parameters.max(op.parameter_count);
    }
    let avg_parameters = ratio(param_total, operation_count);

    let mut object_schema_count = 0;
    let mut prop_total = 0;
    let mut max_properties = 0;
    let mut union_branches = 0;
    let mut all_of_usages = 0;
    let mut discriminator_count = 0;
    let mut undiscriminated_branches = 0;
    for schema in document.schemas.values() {
        if schema.kind == SchemaKind::Object {
            object_schema_count += 1;
            prop_total += schema.property_count;
            max_properties = max_properties.max(schema.property_count);
        }
        union_branches += schema.union_branches;
        all_of_usages += schema.all_of_usages;
        if schema.has_discriminator {
            discriminator_count += 1;
        } else {
            undiscriminated_branches += schema.union_branches;
        }
    }
    let avg_properties = ratio(prop_total, object_schema_count);

    MetricsSnapshot {
        title: document.title.clone(),
        version: document.version.clone(),
        path_count: document.paths.len(),
        operation_count,
        operations_by_method,
        avg_parameters,
        max_parameters,
        schema_count: document.schemas.len(),
        object_schema_count,
        avg_properties,
        max_properties,
        total_refs: graph.total_refs(),
        distinct_refs: graph.distinct_refs(),
        circular_schemas: circular.iter().cloned().collect(),
        max_depth: depths.values().copied().max().unwrap_or(0),
        union_branches,
        all_of_usages,
        discriminator_count,
        undiscriminated_branches,
        most_referenced: graph
            .most_referenced()
            .map(|(name, count)| (name.to_string(), count)),
    }
}

/// Average defined as 0 when the denominator is 0
fn ratio(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::graph::{circular_schemas, schema_depths, RefGraph};
    use serde_json::json;

    fn snapshot_for(value: serde_json::Value) -> MetricsSnapshot {
        let doc = Document::from_value(&value).unwrap();
        let graph = RefGraph::build(&doc).unwrap();
        let circular = circular_schemas(&graph);
        let depths = schema_depths(&graph);
        aggregate(&doc, &graph, &circular, &depths)
    }

    #[test]
    fn test_empty_document_all_zero() {
        let snapshot = snapshot_for(json!({"info": {"title": "empty", "version": "1.0"}}));
        assert_eq!(snapshot.path_count, 0);
        assert_eq!(snapshot.operation_count, 0);
        assert_eq!(snapshot.schema_count, 0);
        assert_eq!(snapshot.avg_properties, 0.0);
        assert_eq!(snapshot.avg_parameters, 0.0);
        assert_eq!(snapshot.max_depth, 0);
        assert_eq!(snapshot.circular_count(), 0);
    }

    #[test]
    fn test_method_partition() {
        let snapshot = snapshot_for(json!({
            "paths": {
                "/a": {"get": {}, "post": {}},
                "/b": {"get": {}}
            }
        }));
        assert_eq!(snapshot.path_count, 2);
        assert_eq!(snapshot.operation_count, 3);
        assert_eq!(snapshot.operations_by_method[&Method::Get], 2);
        assert_eq!(snapshot.operations_by_method[&Method::Post], 1);
    }

    #[test]
    fn test_object_vs_non_object_partition() {
        let snapshot = snapshot_for(json!({
            "components": {"schemas": {
                "Obj": {"type": "object", "properties": {"a": {}, "b": {}, "c": {}}},
                "Small": {"type": "object", "properties": {"a": {}}},
                "Str": {"type": "string"}
            }}
        }));
        assert_eq!(snapshot.schema_count, 3);
        assert_eq!(snapshot.object_schema_count, 2);
        assert_eq!(snapshot.avg_properties, 2.0);
        assert_eq!(snapshot.max_properties, 3);
    }

    #[test]
    fn test_undiscriminated_branch_accounting() {
        let snapshot = snapshot_for(json!({
            "components": {"schemas": {
                "Untagged": {"oneOf": [
                    {"type": "string"}, {"type": "integer"}, {"type": "boolean"}
                ]},
                "Tagged": {
                    "oneOf": [{"type": "object"}, {"type": "object"}],
                    "discriminator": {"propertyName": "type"}
                }
            }}
        }));
        assert_eq!(snapshot.union_branches, 5);
        assert_eq!(snapshot.discriminator_count, 1);
        assert_eq!(snapshot.undiscriminated_branches, 3);
    }

    #[test]
    fn test_determinism() {
        let value = json!({
            "info": {"title": "t", "version": "1"},
            "paths": {"/x": {"get": {"responses": {"200": {"content": {"application/json": {
                "schema": {"$ref": "#/components/schemas/A"}
            }}}}}}},
            "components": {"schemas": {
                "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}}},
                "B": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}}
            }}
        });
        assert_eq!(snapshot_for(value.clone()), snapshot_for(value));
    }
}
