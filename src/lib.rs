//! OpenAPI Structural Complexity
//!
//! Quantitative structural-complexity assessment for OpenAPI-style
//! interface contracts: counted metrics, a normalized 0-100 score with a
//! categorical label, a one-line summary, and an optional narrative
//! assessment document.
//!
//! ## Pipeline
//!
//! ```text
//! value tree -> Document -> RefGraph -> cycles / depths
//!                                   \-> MetricsSnapshot -> ComplexityScore
//!                                                      \-> Report
//! ```
//!
//! Loading and graph building can fail (malformed document, dangling
//! reference); everything after a valid snapshot is a total function.

pub mod document;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod report;
pub mod score;

pub use document::{Document, Method, Operation, PathItem, SchemaDef, SchemaKind};
pub use error::{AnalysisError, Result};
pub use graph::{circular_schemas, schema_depths, EdgeKind, RefGraph};
pub use metrics::MetricsSnapshot;
pub use report::{render, summary_line, JsonReport, Report};
pub use score::{ComplexityLabel, ComplexityScore, ScoreWeights, SubScores};

/// Run the full metrics pipeline on a loaded document with default weights.
/// Pure and deterministic: the same document always yields the same
/// snapshot and score.
pub fn analyze(document: &Document) -> Result<(MetricsSnapshot, ComplexityScore)> {
    analyze_with_weights(document, &ScoreWeights::default())
}

/// Run the full metrics pipeline with explicit scorer weights
pub fn analyze_with_weights(
    document: &Document,
    weights: &ScoreWeights,
) -> Result<(MetricsSnapshot, ComplexityScore)> {
    let graph = RefGraph::build(document)?;
    let circular = graph::circular_schemas(&graph);
    let depths = graph::schema_depths(&graph);
    let snapshot = metrics::aggregate(document, &graph, &circular, &depths);
    let score = score::score(&snapshot, weights);
    Ok((snapshot, score))
}
