//! Document Loading
//!
//! Normalizes a parsed OpenAPI value tree into the typed in-memory model
//! the rest of the pipeline works with. Shape decisions (object / array /
//! scalar / composite) are made once here, never re-sniffed downstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};

/// HTTP methods recognized inside a path item
pub const HTTP_METHODS: [Method; 8] = [
    Method::Get,
    Method::Put,
    Method::Post,
    Method::Delete,
    Method::Options,
    Method::Head,
    Method::Patch,
    Method::Trace,
];

/// HTTP method of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Options => "options",
            Method::Head => "head",
            Method::Patch => "patch",
            Method::Trace => "trace",
        }
    }

    fn from_key(key: &str) -> Option<Method> {
        HTTP_METHODS
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(key))
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural shape of a schema definition, decided at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    Scalar,
    Composite,
}

/// A named schema definition from `components.schemas`
#[derive(Debug, Clone)]
pub struct SchemaDef {
    pub name: String,
    pub kind: SchemaKind,
    /// Direct property count (objects only; 0 otherwise)
    pub property_count: usize,
    /// Total oneOf/anyOf branches anywhere in the definition
    pub union_branches: usize,
    /// Total allOf keywords anywhere in the definition
    pub all_of_usages: usize,
    pub has_discriminator: bool,
    /// Raw definition, kept for reference collection
    pub raw: Value,
}

/// A single HTTP operation on a path
#[derive(Debug, Clone)]
pub struct Operation {
    pub method: Method,
    pub path: String,
    /// Path-level plus operation-level parameters
    pub parameter_count: usize,
    /// Raw operation object, kept for reference collection
    pub raw: Value,
}

impl Operation {
    /// Human-readable location, e.g. "get /pets/{id}"
    pub fn location(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// A URL path and its operations (methods unique per path)
#[derive(Debug, Clone)]
pub struct PathItem {
    pub path: String,
    pub operations: Vec<Operation>,
}

/// The typed in-memory contract, immutable after loading
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub version: String,
    pub paths: Vec<PathItem>,
    /// Schema name -> definition, ordered for deterministic traversal
    pub schemas: BTreeMap<String, SchemaDef>,
    /// Recoverable load problems (malformed schema nodes)
    pub warnings: Vec<String>,
}

impl Document {
    /// Build a Document from a parsed value tree.
    ///
    /// Missing `paths` or `components.schemas` sections are tolerated and
    /// yield zero counts. A non-mapping root, or a section present with
    /// the wrong shape, is fatal.
    pub fn from_value(value: &Value) -> Result<Document> {
        let root = value.as_object().ok_or_else(|| {
            AnalysisError::MalformedDocument("root value is not a mapping".to_string())
        })?;

        let info = root.get("info").and_then(|v| v.as_object());
        let title = info
            .and_then(|i| i.get("title"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        let version = info
            .and_then(|i| i.get("version"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let mut warnings = Vec::new();
        let paths = load_paths(root, &mut warnings)?;
        let schemas = load_schemas(root, &mut warnings)?;

        debug!(
            title = %title,
            paths = paths.len(),
            schemas = schemas.len(),
            "document loaded"
        );

        Ok(Document {
            title,
            version,
            paths,
            schemas,
            warnings,
        })
    }

    /// All operations across all paths
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.iter().flat_map(|p| p.operations.iter())
    }
}

fn load_paths(
    root: &serde_json::Map<String, Value>,
    warnings: &mut Vec<String>,
) -> Result<Vec<PathItem>> {
    let Some(paths_value) = root.get("paths") else {
        return Ok(Vec::new());
    };
    let paths_obj = paths_value.as_object().ok_or_else(|| {
        AnalysisError::MalformedDocument("'paths' section is not a mapping".to_string())
    })?;

    let mut items = Vec::with_capacity(paths_obj.len());
    for (path, item_value) in paths_obj {
        let Some(item) = item_value.as_object() else {
            warn!(path = %path, "skipping non-mapping path item");
            warnings.push(format!("path item '{}' is not a mapping", path));
            // Still counts as a path entry
            items.push(PathItem {
                path: path.clone(),
                operations: Vec::new(),
            });
            continue;
        };

        let path_level_params = item
            .get("parameters")
            .and_then(|v| v.as_array())
            .map(|a| a.len())
            .unwrap_or(0);

        let mut operations = Vec::new();
        for (key, op_value) in item {
            let Some(method) = Method::from_key(key) else {
                continue;
            };
            let Some(op) = op_value.as_object() else {
                continue;
            };
            let op_params = op
                .get("parameters")
                .and_then(|v| v.as_array())
                .map(|a| a.len())
                .unwrap_or(0);
            operations.push(Operation {
                method,
                path: path.clone(),
                parameter_count: path_level_params + op_params,
                raw: op_value.clone(),
            });
        }

        items.push(PathItem {
            path: path.clone(),
            operations,
        });
    }
    Ok(items)
}

fn load_schemas(
    root: &serde_json::Map<String, Value>,
    warnings: &mut Vec<String>,
) -> Result<BTreeMap<String, SchemaDef>> {
    let schemas_value = root
        .get("components")
        .and_then(|c| c.as_object())
        .and_then(|c| c.get("schemas"));
    let Some(schemas_value) = schemas_value else {
        return Ok(BTreeMap::new());
    };
    let schemas_obj = schemas_value.as_object().ok_or_else(|| {
        AnalysisError::MalformedDocument("'components.schemas' section is not a mapping".to_string())
    })?;

    let mut schemas = BTreeMap::new();
    for (name, def) in schemas_obj {
        schemas.insert(name.clone(), extract_schema(name, def, warnings));
    }
    Ok(schemas)
}

fn extract_schema(name: &str, def: &Value, warnings: &mut Vec<String>) -> SchemaDef {
    let kind = match infer_kind(def) {
        Some(kind) => kind,
        None => {
            warn!(schema = %name, "schema has no inferable kind, treating as empty object");
            warnings.push(format!("schema '{}' has no inferable kind", name));
            SchemaKind::Object
        }
    };

    let property_count = def
        .get("properties")
        .and_then(|v| v.as_object())
        .map(|p| p.len())
        .unwrap_or(0);

    let mut union_branches = 0;
    let mut all_of_usages = 0;
    count_composition(def, &mut union_branches, &mut all_of_usages);

    SchemaDef {
        name: name.to_string(),
        kind,
        property_count,
        union_branches,
        all_of_usages,
        has_discriminator: def.get("discriminator").is_some(),
        raw: def.clone(),
    }
}

fn infer_kind(def: &Value) -> Option<SchemaKind> {
    let obj = def.as_object()?;

    if let Some(ty) = obj.get("type").and_then(|v| v.as_str()) {
        return match ty {
            "object" => Some(SchemaKind::Object),
            "array" => Some(SchemaKind::Array),
            "string" | "number" | "integer" | "boolean" => Some(SchemaKind::Scalar),
            _ => None,
        };
    }
    if obj.contains_key("properties") || obj.contains_key("additionalProperties") {
        return Some(SchemaKind::Object);
    }
    if obj.contains_key("items") {
        return Some(SchemaKind::Array);
    }
    if obj.contains_key("oneOf") || obj.contains_key("anyOf") || obj.contains_key("allOf") {
        return Some(SchemaKind::Composite);
    }
    if obj.contains_key("enum") {
        return Some(SchemaKind::Scalar);
    }
    None
}

/// Tally oneOf/anyOf branches and allOf keywords through the whole definition
fn count_composition(node: &Value, union_branches: &mut usize, all_of_usages: &mut usize) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                match key.as_str() {
                    "oneOf" | "anyOf" => {
                        if let Some(arr) = value.as_array() {
                            *union_branches += arr.len();
                        }
                    }
                    "allOf" => {
                        if value.is_array() {
                            *all_of_usages += 1;
                        }
                    }
                    _ => {}
                }
                count_composition(value, union_branches, all_of_usages);
            }
        }
        Value::Array(items) => {
            for item in items {
                count_composition(item, union_branches, all_of_usages);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_must_be_mapping() {
        let err = Document::from_value(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_missing_sections_tolerated() {
        let doc = Document::from_value(&json!({"info": {"title": "t", "version": "1"}})).unwrap();
        assert_eq!(doc.paths.len(), 0);
        assert_eq!(doc.schemas.len(), 0);
    }

    #[test]
    fn test_wrong_shape_paths_fatal() {
        let err = Document::from_value(&json!({"paths": "not a mapping"})).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedDocument(_)));
    }

    #[test]
    fn test_parameter_counts_combine_path_and_op_level() {
        let doc = Document::from_value(&json!({
            "paths": {
                "/pets/{id}": {
                    "parameters": [{"name": "id", "in": "path"}],
                    "get": {"parameters": [{"name": "verbose", "in": "query"}]},
                    "delete": {}
                }
            }
        }))
        .unwrap();
        let ops: Vec<&Operation> = doc.operations().collect();
        assert_eq!(ops.len(), 2);
        let get = ops.iter().find(|o| o.method == Method::Get).unwrap();
        assert_eq!(get.parameter_count, 2);
        let delete = ops.iter().find(|o| o.method == Method::Delete).unwrap();
        assert_eq!(delete.parameter_count, 1);
    }

    #[test]
    fn test_kind_inference() {
        let doc = Document::from_value(&json!({
            "components": {"schemas": {
                "Obj": {"type": "object", "properties": {"a": {}, "b": {}}},
                "Arr": {"items": {"type": "string"}},
                "Str": {"type": "string"},
                "Union": {"oneOf": [{"type": "string"}, {"type": "integer"}]},
                "Mystery": {"description": "nothing to go on"}
            }}
        }))
        .unwrap();
        assert_eq!(doc.schemas["Obj"].kind, SchemaKind::Object);
        assert_eq!(doc.schemas["Obj"].property_count, 2);
        assert_eq!(doc.schemas["Arr"].kind, SchemaKind::Array);
        assert_eq!(doc.schemas["Str"].kind, SchemaKind::Scalar);
        assert_eq!(doc.schemas["Union"].kind, SchemaKind::Composite);
        assert_eq!(doc.schemas["Union"].union_branches, 2);
        // Uninferable kind is recoverable, surfaced as a warning
        assert_eq!(doc.schemas["Mystery"].kind, SchemaKind::Object);
        assert_eq!(doc.schemas["Mystery"].property_count, 0);
        assert_eq!(doc.warnings.len(), 1);
    }

    #[test]
    fn test_nested_composition_counted() {
        let doc = Document::from_value(&json!({
            "components": {"schemas": {
                "Outer": {
                    "type": "object",
                    "properties": {
                        "inner": {"anyOf": [{"type": "string"}, {"type": "null"}]}
                    },
                    "allOf": [{"type": "object"}]
                }
            }}
        }))
        .unwrap();
        let outer = &doc.schemas["Outer"];
        assert_eq!(outer.union_branches, 2);
        assert_eq!(outer.all_of_usages, 1);
    }
}
