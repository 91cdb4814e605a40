use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::{parse_caption_text, CallClassification, CallTranscript, CaptionCue, TranscribeDocument};
use crate::stages::{LexiconRule, RoleReport};

use super::output::RoleReportDocument;

/// Parse a transcription-service JSON file into a CallTranscript
pub fn parse_transcribe_file(path: &Path) -> Result<CallTranscript> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_transcribe_json(&file_label(path), &content)
}

/// Parse a transcription-service JSON string into a CallTranscript
pub fn parse_transcribe_json(file: &str, json: &str) -> Result<CallTranscript> {
    let document: TranscribeDocument =
        serde_json::from_str(json).context("Failed to parse transcription JSON")?;

    let tokens = document.tokens();
    let excluded = document.item_count() - tokens.len();
    if excluded > 0 {
        debug!("Excluded {} punctuation or malformed items from {}", excluded, file);
    }

    Ok(CallTranscript {
        file: file.to_string(),
        tokens,
    })
}

/// Load every transcript named by the inputs, recursing one level into
/// directories
pub fn load_transcripts(inputs: &[PathBuf]) -> Result<Vec<CallTranscript>> {
    let mut transcripts = Vec::new();
    for path in collect_transcript_paths(inputs)? {
        transcripts.push(parse_transcribe_file(&path)?);
    }
    Ok(transcripts)
}

/// Expand inputs into concrete file paths; directories contribute their
/// .json entries in name order
fn collect_transcript_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let entries = std::fs::read_dir(input)
                .with_context(|| format!("Failed to read directory: {:?}", input))?;

            let mut found: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }

    Ok(paths)
}

/// Parse a SubRip caption file into cues
pub fn parse_caption_file(path: &Path) -> Result<Vec<CaptionCue>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let cues = parse_caption_text(&content)
        .with_context(|| format!("Failed to parse caption file: {:?}", path))?;
    Ok(cues)
}

/// Parse classifier output, one JSON object per line
pub fn parse_classifications_file(path: &Path) -> Result<Vec<CallClassification>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;

    let mut classifications = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let classification: CallClassification = serde_json::from_str(line)
            .with_context(|| format!("Failed to parse classification on line {}", number + 1))?;
        classifications.push(classification);
    }

    Ok(classifications)
}

/// Load a role report written by a previous run
pub fn load_role_report(path: &Path) -> Result<RoleReport> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let document: RoleReportDocument =
        serde_json::from_str(&content).context("Failed to parse role report JSON")?;
    Ok(RoleReport {
        calls: document.calls,
    })
}

/// Parse a label-to-weight map from a JSON file
pub fn parse_weights_file(path: &Path) -> Result<HashMap<String, f64>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let weights: HashMap<String, f64> =
        serde_json::from_str(&content).context("Failed to parse weights JSON")?;
    Ok(weights)
}

/// Parse lexicon rules from a JSON file
pub fn parse_lexicon_file(path: &Path) -> Result<Vec<LexiconRule>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let rules: Vec<LexiconRule> =
        serde_json::from_str(&content).context("Failed to parse lexicon JSON")?;
    Ok(rules)
}

/// File name component of a path, used as the call identifier
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
