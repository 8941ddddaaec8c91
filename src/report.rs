//! Narrative Generation
//!
//! Renders the metrics snapshot and score into a one-line summary, the
//! persisted JSON report shape, and an optional assessment document whose
//! clauses are gated on metric thresholds. Total functions: given a valid
//! snapshot there are no failure modes here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::document::Method;
use crate::metrics::MetricsSnapshot;
use crate::score::{ComplexityLabel, ComplexityScore};

/// Nesting depth at which the consumer-burden commentary flags the contract
const DEEP_NESTING_THRESHOLD: usize = 5;

/// Rendered output: one-line summary plus the assessment document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub summary: String,
    pub assessment: String,
}

/// Persisted JSON report, field names stable
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub title: String,
    pub version: String,
    pub paths: usize,
    pub operations: BTreeMap<Method, usize>,
    pub parameters: ParameterStats,
    pub schemas: SchemaStats,
    pub refs: RefStats,
    pub circular: Vec<String>,
    pub max_depth: usize,
    pub one_of_branches: usize,
    pub all_of_usages: usize,
    pub discriminator_count: usize,
    pub complexity_score: f64,
    pub complexity_label: ComplexityLabel,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterStats {
    pub avg: f64,
    pub max: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaStats {
    pub count: usize,
    pub objects: usize,
    pub avg_props: f64,
    pub max_props: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefStats {
    pub total: usize,
    pub distinct: usize,
}

impl JsonReport {
    pub fn new(snapshot: &MetricsSnapshot, score: &ComplexityScore) -> JsonReport {
        JsonReport {
            title: snapshot.title.clone(),
            version: snapshot.version.clone(),
            paths: snapshot.path_count,
            operations: snapshot.operations_by_method.clone(),
            parameters: ParameterStats {
                avg: round2(snapshot.avg_parameters),
                max: snapshot.max_parameters,
            },
            schemas: SchemaStats {
                count: snapshot.schema_count,
                objects: snapshot.object_schema_count,
                avg_props: round2(snapshot.avg_properties),
                max_props: snapshot.max_properties,
            },
            refs: RefStats {
                total: snapshot.total_refs,
                distinct: snapshot.distinct_refs,
            },
            circular: snapshot.circular_schemas.clone(),
            max_depth: snapshot.max_depth,
            one_of_branches: snapshot.union_branches,
            all_of_usages: snapshot.all_of_usages,
            discriminator_count: snapshot.discriminator_count,
            complexity_score: score.value,
            complexity_label: score.label,
            summary: summary_line(snapshot, score),
        }
    }
}

/// Render the summary line and assessment document
pub fn render(snapshot: &MetricsSnapshot, score: &ComplexityScore) -> Report {
    Report {
        summary: summary_line(snapshot, score),
        assessment: assessment_document(snapshot, score),
    }
}

/// Single line embedding every headline metric
pub fn summary_line(snapshot: &MetricsSnapshot, score: &ComplexityScore) -> String {
    let methods = if snapshot.operations_by_method.is_empty() {
        String::from("none")
    } else {
        snapshot
            .operations_by_method
            .iter()
            .map(|(m, c)| format!("{}:{}", m, c))
            .collect::<Vec<_>>()
            .join(" ")
    };

    format!(
        "{} v{}: {} paths, {} operations ({}), {} schemas ({} objects, avg {:.1} props, max {}), \
         {} refs ({} distinct, {} circular), max depth {}, complexity {} ({})",
        snapshot.title,
        snapshot.version,
        snapshot.path_count,
        snapshot.operation_count,
        methods,
        snapshot.schema_count,
        snapshot.object_schema_count,
        snapshot.avg_properties,
        snapshot.max_properties,
        snapshot.total_refs,
        snapshot.distinct_refs,
        snapshot.circular_count(),
        snapshot.max_depth,
        score.value,
        score.label,
    )
}

/// Longer assessment document, section prose parameterized by the snapshot
fn assessment_document(snapshot: &MetricsSnapshot, score: &ComplexityScore) -> String {
    let mut doc = String::new();
    let _ = writeln!(
        doc,
        "# Architectural Assessment: {} v{}\n",
        snapshot.title, snapshot.version
    );

    let _ = writeln!(doc, "## Implementability\n");
    let implementability = match score.label {
        ComplexityLabel::Low => {
            "Structural complexity is low. The contract can be handed to an \
             external implementer without a guided walkthrough."
        }
        ComplexityLabel::Moderate => {
            "Structural complexity is moderate. An external implementer will \
             need the schema reference but no architectural support."
        }
        ComplexityLabel::High => {
            "Structural complexity is high. Expect an external implementer to \
             require clarification rounds on the schema model."
        }
        ComplexityLabel::Critical => {
            "Structural complexity is critical. Hand-off without a dedicated \
             integration guide is likely to fail."
        }
    };
    let _ = writeln!(doc, "{} Composite score: {} ({}).\n", implementability, score.value, score.label);

    let _ = writeln!(doc, "## REST Appropriateness\n");
    if snapshot.operation_count == 0 {
        let _ = writeln!(
            doc,
            "The document declares no operations; it is a schema catalog rather \
             than a service surface.\n"
        );
    } else {
        let _ = writeln!(
            doc,
            "{} operations across {} paths ({}).\n",
            snapshot.operation_count,
            snapshot.path_count,
            snapshot
                .operations_by_method
                .iter()
                .map(|(m, c)| format!("{} {}", c, m))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let _ = writeln!(doc, "## Consumer Burden\n");
    let _ = writeln!(
        doc,
        "{} schemas ({} objects) averaging {:.1} properties, widest object {} properties.",
        snapshot.schema_count,
        snapshot.object_schema_count,
        snapshot.avg_properties,
        snapshot.max_properties
    );
    if let Some((name, touches)) = &snapshot.most_referenced {
        let _ = writeln!(
            doc,
            "The most-referenced schema is '{}' ({} operation references); changes \
             to it ripple across the surface.",
            name, touches
        );
    }
    if snapshot.max_depth >= DEEP_NESTING_THRESHOLD {
        let _ = writeln!(
            doc,
            "Reference chains reach depth {}; consumers must materialize deeply \
             nested structures.",
            snapshot.max_depth
        );
    }
    doc.push('\n');

    let _ = writeln!(doc, "## Integration Risk\n");
    let mut risks = Vec::new();
    if snapshot.union_branches > 0 && snapshot.discriminator_count == 0 {
        risks.push(format!(
            "Unresolved polymorphism: {} oneOf/anyOf branches with no discriminator; \
             clients must resolve variants by shape sniffing.",
            snapshot.union_branches
        ));
    }
    if snapshot.circular_count() > 0 {
        risks.push(format!(
            "Circular references: {} schemas participate in reference cycles ({}).",
            snapshot.circular_count(),
            snapshot.circular_schemas.join(", ")
        ));
    }
    if risks.is_empty() {
        let _ = writeln!(doc, "No structural integration risks detected.\n");
    } else {
        for risk in &risks {
            let _ = writeln!(doc, "- {}", risk);
        }
        doc.push('\n');
    }

    let _ = writeln!(doc, "## Recommended Remediation\n");
    let mut steps = Vec::new();
    if snapshot.union_branches > 0 && snapshot.discriminator_count == 0 {
        steps.push("Declare a discriminator on every oneOf/anyOf union.".to_string());
    }
    if snapshot.circular_count() > 0 {
        steps.push(
            "Break reference cycles by extracting identifiers instead of embedding \
             full schemas."
                .to_string(),
        );
    }
    if snapshot.max_depth >= DEEP_NESTING_THRESHOLD {
        steps.push(format!(
            "Flatten reference chains (current max depth {}).",
            snapshot.max_depth
        ));
    }
    if steps.is_empty() {
        let _ = writeln!(doc, "None required.");
    } else {
        for step in &steps {
            let _ = writeln!(doc, "- {}", step);
        }
    }

    doc
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
