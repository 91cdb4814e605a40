use serde::Serialize;

use crate::models::{phrase_in_time_order, CaptionCue, TimedToken};

/// Reference text and recognized text paired over one caption window
#[derive(Debug, Clone, Serialize)]
pub struct AlignedPair {
    /// Cue number from the caption file
    pub index: u32,
    pub start: f64,
    pub end: f64,
    /// Caption text for the window
    pub reference: String,
    /// Recognized words falling inside the window, in time order
    pub candidate: String,
}

/// Pair each caption window with the recognized words it contains.
///
/// A token belongs to a window only when it lies entirely inside it; words
/// straddling a boundary are dropped rather than split. Windows with no
/// contained words still produce a pair with empty candidate text, so missed
/// speech counts against the score.
pub fn align_to_windows(cues: &[CaptionCue], tokens: &[TimedToken]) -> Vec<AlignedPair> {
    cues.iter()
        .map(|cue| {
            let contained: Vec<TimedToken> = tokens
                .iter()
                .filter(|t| t.start >= cue.start && t.end <= cue.end)
                .cloned()
                .collect();

            AlignedPair {
                index: cue.index,
                start: cue.start,
                end: cue.end,
                reference: cue.text.clone(),
                candidate: phrase_in_time_order(&contained),
            }
        })
        .collect()
}
