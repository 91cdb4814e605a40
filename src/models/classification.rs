use serde::{Deserialize, Serialize};

/// One label candidate proposed by the upstream classifier
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassCandidate {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Score")]
    pub score: f64,
}

/// Classifier output for one call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallClassification {
    /// Source file name, the join key back to the transcript
    pub file: String,
    #[serde(alias = "Classes")]
    pub classes: Vec<ClassCandidate>,
}

/// How firmly a label decision can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

/// Final label assigned to a call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelDecision {
    pub label: String,
    pub score: f64,
    pub confidence: Confidence,
}
