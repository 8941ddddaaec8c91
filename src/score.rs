//! Complexity Scoring
//!
//! Normalizes each metric family into a bounded [0,100] sub-score and
//! combines them by a fixed weighted sum into the composite score. Every
//! sub-score is a saturating linear function of its inputs, so the
//! composite is monotonic in each metric, deterministic, and bounded.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::metrics::MetricsSnapshot;

/// Family weights for the composite score. Must sum to 1.0 for the
/// composite to stay in [0,100]; the result is clamped either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_schema")]
    pub schema: f64,
    #[serde(default = "default_coupling")]
    pub coupling: f64,
    #[serde(default = "default_depth")]
    pub depth: f64,
    #[serde(default = "default_cycles")]
    pub cycles: f64,
    #[serde(default = "default_polymorphism")]
    pub polymorphism: f64,
}

fn default_volume() -> f64 {
    0.20
}
fn default_schema() -> f64 {
    0.20
}
fn default_coupling() -> f64 {
    0.20
}
fn default_depth() -> f64 {
    0.15
}
fn default_cycles() -> f64 {
    0.15
}
fn default_polymorphism() -> f64 {
    0.10
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            volume: default_volume(),
            schema: default_schema(),
            coupling: default_coupling(),
            depth: default_depth(),
            cycles: default_cycles(),
            polymorphism: default_polymorphism(),
        }
    }
}

impl ScoreWeights {
    /// Load weight overrides from a TOML file; missing keys keep defaults
    pub fn from_path(path: &Path) -> Result<ScoreWeights> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Per-family sub-scores, each in [0,100], kept for auditability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub volume: f64,
    pub schema: f64,
    pub coupling: f64,
    pub depth: f64,
    pub cycles: f64,
    pub polymorphism: f64,
}

/// Categorical complexity tier, ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplexityLabel {
    Low,
    Moderate,
    High,
    Critical,
}

impl ComplexityLabel {
    /// Ordered thresholds: [0,25) Low, [25,50) Moderate, [50,75) High,
    /// [75,100] Critical
    pub fn from_score(score: f64) -> ComplexityLabel {
        if score < 25.0 {
            ComplexityLabel::Low
        } else if score < 50.0 {
            ComplexityLabel::Moderate
        } else if score < 75.0 {
            ComplexityLabel::High
        } else {
            ComplexityLabel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLabel::Low => "Low",
            ComplexityLabel::Moderate => "Moderate",
            ComplexityLabel::High => "High",
            ComplexityLabel::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for ComplexityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite score with its label and the sub-scores that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityScore {
    /// Composite value in [0,100], rounded to one decimal
    pub value: f64,
    pub label: ComplexityLabel,
    pub sub_scores: SubScores,
}

/// Saturating linear scale: grows with the input, caps at 100
fn saturate(value: f64) -> f64 {
    value.min(100.0)
}

/// Compute the composite complexity score from a metrics snapshot.
/// Total over its input domain: never fails, never exceeds [0,100].
pub fn score(snapshot: &MetricsSnapshot, weights: &ScoreWeights) -> ComplexityScore {
    let sub = SubScores {
        // Path/operation volume saturates past ~40 operations
        volume: saturate(2.0 * snapshot.operation_count as f64 + snapshot.path_count as f64),
        // Schema inventory and property width
        schema: saturate(
            1.5 * snapshot.schema_count as f64
                + 2.0 * snapshot.max_properties as f64
                + 0.5 * snapshot.avg_properties,
        ),
        // Reference coupling: occurrences plus distinct pairs
        coupling: saturate(2.0 * snapshot.total_refs as f64 + 3.0 * snapshot.distinct_refs as f64),
        // Nesting depth
        depth: saturate(12.0 * snapshot.max_depth as f64),
        // Circularity penalty
        cycles: saturate(20.0 * snapshot.circular_count() as f64),
        // Polymorphism: untagged branches weigh four times tagged ones
        polymorphism: saturate(
            4.0 * snapshot.undiscriminated_branches as f64
                + (snapshot.union_branches - snapshot.undiscriminated_branches) as f64
                + 2.0 * snapshot.all_of_usages as f64,
        ),
    };

    let raw = weights.volume * sub.volume
        + weights.schema * sub.schema
        + weights.coupling * sub.coupling
        + weights.depth * sub.depth
        + weights.cycles * sub.cycles
        + weights.polymorphism * sub.polymorphism;

    let value = (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0;
    ComplexityScore {
        value,
        label: ComplexityLabel::from_score(value),
        sub_scores: sub,
    }
}
