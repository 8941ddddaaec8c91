//! End-to-end pipeline tests over fixture documents

use serde_json::json;

use openapi_complexity::{
    analyze, AnalysisError, ComplexityLabel, Document, JsonReport, Method,
};

fn petstore() -> Document {
    let value: serde_json::Value =
        serde_yaml::from_str(include_str!("fixtures/petstore.yaml")).unwrap();
    Document::from_value(&value).unwrap()
}

#[test]
fn test_petstore_metrics() {
    let doc = petstore();
    let (snapshot, score) = analyze(&doc).unwrap();

    assert_eq!(snapshot.title, "Petstore");
    assert_eq!(snapshot.version, "1.2.0");
    assert_eq!(snapshot.path_count, 2);
    assert_eq!(snapshot.operation_count, 3);
    assert_eq!(snapshot.operations_by_method[&Method::Get], 2);
    assert_eq!(snapshot.operations_by_method[&Method::Post], 1);
    assert_eq!(snapshot.max_parameters, 1);

    assert_eq!(snapshot.schema_count, 7);
    assert_eq!(snapshot.object_schema_count, 5);
    assert_eq!(snapshot.max_properties, 4);
    assert!((snapshot.avg_properties - 1.8).abs() < 1e-9);

    // 5 schema-to-schema edges plus 4 operation references
    assert_eq!(snapshot.total_refs, 9);
    assert_eq!(snapshot.distinct_refs, 5);

    // Pet <-> Owner form the only cycle
    assert_eq!(snapshot.circular_schemas, vec!["Owner", "Pet"]);
    // Owner -> Pet -> Tag is the longest chain before the cycle cuts off
    assert_eq!(snapshot.max_depth, 2);

    assert_eq!(snapshot.union_branches, 2);
    assert_eq!(snapshot.all_of_usages, 0);
    assert_eq!(snapshot.discriminator_count, 1);
    assert_eq!(snapshot.undiscriminated_branches, 2);
    assert_eq!(snapshot.most_referenced, Some(("Pet".to_string(), 3)));

    assert!(score.value > 0.0);
    assert!(score.value <= 100.0);
    assert_eq!(score.label, ComplexityLabel::Low);
}

#[test]
fn test_analyze_is_deterministic() {
    let doc = petstore();
    let first = analyze(&doc).unwrap();
    let second = analyze(&doc).unwrap();
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

#[test]
fn test_adding_operation_never_decreases_composite() {
    let mut value: serde_json::Value =
        serde_yaml::from_str(include_str!("fixtures/petstore.yaml")).unwrap();
    let doc = Document::from_value(&value).unwrap();
    let (_, before) = analyze(&doc).unwrap();

    value["paths"]["/pets/{petId}"]["delete"] = json!({"responses": {"204": {"description": "gone"}}});
    let doc = Document::from_value(&value).unwrap();
    let (snapshot, after) = analyze(&doc).unwrap();

    assert_eq!(snapshot.operation_count, 4);
    assert!(after.value >= before.value);
}

#[test]
fn test_empty_document_scores_zero() {
    let doc = Document::from_value(&json!({
        "info": {"title": "Empty", "version": "0.1"},
        "paths": {}
    }))
    .unwrap();
    let (snapshot, score) = analyze(&doc).unwrap();

    assert_eq!(snapshot.path_count, 0);
    assert_eq!(snapshot.schema_count, 0);
    assert_eq!(snapshot.avg_properties, 0.0);
    assert_eq!(score.value, 0.0);
    assert_eq!(score.label, ComplexityLabel::Low);

    let summary = openapi_complexity::summary_line(&snapshot, &score);
    assert!(summary.contains("0 paths"));
    assert!(summary.contains("0 operations"));
    assert!(summary.contains("0 schemas"));
    assert!(summary.contains("(Low)"));
}

#[test]
fn test_unresolved_reference_aborts_analysis() {
    let doc = Document::from_value(&json!({
        "components": {"schemas": {
            "Order": {"type": "object", "properties": {
                "customer": {"$ref": "#/components/schemas/Customer"}
            }}
        }}
    }))
    .unwrap();

    match analyze(&doc) {
        Err(AnalysisError::UnresolvedReference { source_name, target }) => {
            assert!(source_name.contains("Order"));
            assert_eq!(target, "Customer");
        }
        other => panic!("expected UnresolvedReference, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_polymorphism_risk_in_rendered_report() {
    let doc = Document::from_value(&json!({
        "info": {"title": "Unions", "version": "1"},
        "components": {"schemas": {
            "Value": {"oneOf": [
                {"type": "string"}, {"type": "integer"}, {"type": "boolean"}
            ]}
        }}
    }))
    .unwrap();
    let (snapshot, score) = analyze(&doc).unwrap();
    assert_eq!(snapshot.union_branches, 3);
    assert_eq!(snapshot.discriminator_count, 0);

    let report = openapi_complexity::render(&snapshot, &score);
    assert!(report.assessment.contains("Unresolved polymorphism"));
    assert!(report.assessment.contains("Declare a discriminator"));
}

#[test]
fn test_json_report_round_trips_to_file() {
    let doc = petstore();
    let (snapshot, score) = analyze(&doc).unwrap();
    let report = JsonReport::new(&snapshot, &score);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    std::fs::write(&path, serde_json::to_string_pretty(&report).unwrap()).unwrap();

    let read_back: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(read_back["title"], "Petstore");
    assert_eq!(read_back["operations"]["get"], 2);
    assert_eq!(read_back["refs"]["total"], 9);
    assert_eq!(read_back["circular"], json!(["Owner", "Pet"]));
    assert_eq!(read_back["complexityLabel"], "Low");
}
