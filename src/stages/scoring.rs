use serde::Serialize;
use thiserror::Error;

use crate::stages::alignment::AlignedPair;
use crate::text::normalize;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("cannot average an empty score set")]
    EmptyScores,
}

/// Edit distance between two strings, counted in characters
pub fn levenshtein(left: &str, right: &str) -> usize {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();

    if left.is_empty() {
        return right.len();
    }
    if right.is_empty() {
        return left.len();
    }

    let mut matrix = vec![vec![0usize; right.len() + 1]; left.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=left.len() {
        for j in 1..=right.len() {
            let substitution = if left[i - 1] == right[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + substitution);
        }
    }

    matrix[left.len()][right.len()]
}

/// Similarity between two texts after normalization, in `[0.0, 1.0]`.
///
/// Edit distance is divided by the longer normalized length, so the score is
/// symmetric and insensitive to which side is the reference.
pub fn similarity(reference: &str, candidate: &str) -> f64 {
    let reference = normalize(reference);
    let candidate = normalize(candidate);

    let max_len = reference.chars().count().max(candidate.chars().count());
    if max_len == 0 {
        // Both sides are silence; treat as a perfect match
        return 1.0;
    }

    1.0 - levenshtein(&reference, &candidate) as f64 / max_len as f64
}

/// Mean of a score set
pub fn average_similarity(scores: &[f64]) -> Result<f64, ScoreError> {
    if scores.is_empty() {
        return Err(ScoreError::EmptyScores);
    }

    Ok(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// One caption window with its similarity score
#[derive(Debug, Clone, Serialize)]
pub struct WindowScore {
    pub index: u32,
    pub start: f64,
    pub end: f64,
    pub reference: String,
    pub candidate: String,
    pub score: f64,
}

/// Transcription quality for one call
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub windows: Vec<WindowScore>,
    /// Mean window score
    pub average: f64,
}

/// Score every aligned window and average the results
pub fn grade_transcript(pairs: &[AlignedPair]) -> Result<ScoreReport, ScoreError> {
    let windows: Vec<WindowScore> = pairs
        .iter()
        .map(|pair| WindowScore {
            index: pair.index,
            start: pair.start,
            end: pair.end,
            reference: pair.reference.clone(),
            candidate: pair.candidate.clone(),
            score: similarity(&pair.reference, &pair.candidate),
        })
        .collect();

    let scores: Vec<f64> = windows.iter().map(|w| w.score).collect();
    let average = average_similarity(&scores)?;

    Ok(ScoreReport { windows, average })
}
