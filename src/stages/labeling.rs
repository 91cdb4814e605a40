use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{CallClassification, ClassCandidate, Confidence, LabelDecision};
use crate::stages::roles::RoleReport;

/// A label forced by vocabulary, bypassing classifier scores
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LexiconRule {
    pub label: String,
    /// Terms matched case-insensitively as substrings of the caller phrase
    pub terms: Vec<String>,
}

/// Configuration for label decisions
#[derive(Debug, Clone)]
pub struct LabelConfig {
    /// Per-label score multipliers; unlisted labels weigh 1.0
    pub weights: HashMap<String, f64>,
    /// Weighted score below which the fallback label is used
    pub min_decision_score: f64,
    /// Weighted score at or above which confidence is high
    pub high_confidence_score: f64,
    /// Label applied when no candidate is convincing
    pub fallback_label: String,
    /// Label applied when the caller said nothing
    pub silent_phrase_label: String,
    pub lexicon_rules: Vec<LexiconRule>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
            min_decision_score: 0.9,
            high_confidence_score: 0.95,
            fallback_label: "OK".to_string(),
            silent_phrase_label: "SILENT".to_string(),
            lexicon_rules: Vec::new(),
        }
    }
}

/// One call with its final label
#[derive(Debug, Clone, Serialize)]
pub struct LabeledCall {
    pub file: String,
    /// Caller phrase the decision was made on
    pub phrase: String,
    pub decision: LabelDecision,
}

/// Decide the final label for one caller phrase.
///
/// Silent phrases and lexicon hits short-circuit with full confidence.
/// Otherwise the best weighted candidate wins if it clears the decision
/// threshold; anything weaker falls back.
pub fn decide_label(
    phrase: &str,
    candidates: &[ClassCandidate],
    config: &LabelConfig,
) -> LabelDecision {
    if phrase.trim().is_empty() {
        return LabelDecision {
            label: config.silent_phrase_label.clone(),
            score: 1.0,
            confidence: Confidence::High,
        };
    }

    let lowered = phrase.to_lowercase();
    for rule in &config.lexicon_rules {
        if rule.terms.iter().any(|term| lowered.contains(&term.to_lowercase())) {
            return LabelDecision {
                label: rule.label.clone(),
                score: 1.0,
                confidence: Confidence::High,
            };
        }
    }

    let best = candidates
        .iter()
        .map(|candidate| {
            let weight = config.weights.get(&candidate.name).copied().unwrap_or(1.0);
            (candidate.name.as_str(), candidate.score * weight)
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let Some((label, score)) = best else {
        return LabelDecision {
            label: config.fallback_label.clone(),
            score: 0.0,
            confidence: Confidence::Low,
        };
    };

    if score < config.min_decision_score {
        return LabelDecision {
            label: config.fallback_label.clone(),
            score,
            confidence: Confidence::Low,
        };
    }

    LabelDecision {
        label: label.to_string(),
        score,
        confidence: if score >= config.high_confidence_score {
            Confidence::High
        } else {
            Confidence::Low
        },
    }
}

/// Label every call in a role report using its classifier output.
///
/// Classifications join to calls by file name; calls with no classifier
/// output are decided on the phrase alone.
pub fn label_calls(
    report: &RoleReport,
    classifications: &[CallClassification],
    config: &LabelConfig,
) -> Vec<LabeledCall> {
    let by_file: HashMap<&str, &[ClassCandidate]> = classifications
        .iter()
        .map(|c| (c.file.as_str(), c.classes.as_slice()))
        .collect();

    report
        .calls
        .iter()
        .map(|call| {
            let candidates = match by_file.get(call.file.as_str()) {
                Some(classes) => *classes,
                None => {
                    debug!("No classifier output for {}", call.file);
                    &[]
                }
            };

            LabeledCall {
                file: call.file.clone(),
                phrase: call.human.phrase.clone(),
                decision: decide_label(&call.human.phrase, candidates, config),
            }
        })
        .collect()
}
