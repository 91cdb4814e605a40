use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single recognized word with seconds-based timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedToken {
    /// Start timestamp in seconds
    pub start: f64,
    /// End timestamp in seconds
    pub end: f64,
    /// The recognized text - immutable, never changed by the pipeline
    pub text: String,
    /// Channel label this token was recognized on (e.g. "ch_0")
    pub channel: String,
    /// Transcription accuracy score (0-1), when the service reports one
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl TimedToken {
    /// Duration of this token in seconds, clamped at zero
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// All tokens recognized in one source audio file, any channel mix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTranscript {
    /// Source file identifier (object key basename)
    pub file: String,
    /// Tokens in service order
    pub tokens: Vec<TimedToken>,
}

impl CallTranscript {
    /// Distinct channel labels present in this call, sorted
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.tokens.iter().map(|t| t.channel.clone()).collect();
        channels.sort();
        channels.dedup();
        channels
    }

    /// Group this call's tokens by channel label
    pub fn channel_groups(&self) -> Vec<UtteranceGroup> {
        let mut by_channel: BTreeMap<String, Vec<TimedToken>> = BTreeMap::new();
        for token in &self.tokens {
            by_channel
                .entry(token.channel.clone())
                .or_default()
                .push(token.clone());
        }

        by_channel
            .into_iter()
            .map(|(channel, tokens)| UtteranceGroup {
                file: self.file.clone(),
                channel,
                tokens,
            })
            .collect()
    }
}

/// Tokens of one (file, channel) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtteranceGroup {
    /// Source file identifier
    pub file: String,
    /// Channel label shared by every token in the group
    pub channel: String,
    /// Tokens in service order
    pub tokens: Vec<TimedToken>,
}

impl UtteranceGroup {
    /// Cumulative speaking time: the sum of per-token durations in seconds
    pub fn total_duration(&self) -> f64 {
        self.tokens.iter().map(|t| t.duration()).sum()
    }

    /// The group's tokens reconstructed as a phrase, in time order
    pub fn phrase(&self) -> String {
        phrase_in_time_order(&self.tokens)
    }
}

/// Speaker role derived from per-channel speaking time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRole {
    /// The channel with the larger cumulative speaking time
    Human,
    /// The channel with the smaller cumulative speaking time
    Bot,
}

impl SpeakerRole {
    /// Lowercase label used in report tables
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerRole::Human => "human",
            SpeakerRole::Bot => "bot",
        }
    }
}

/// Space-join token text in ascending start order, skipping empty text.
///
/// Tokens with equal start times keep their input order.
pub fn phrase_in_time_order(tokens: &[TimedToken]) -> String {
    let mut ordered: Vec<&TimedToken> = tokens.iter().filter(|t| !t.text.is_empty()).collect();
    ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

    let words: Vec<&str> = ordered.iter().map(|t| t.text.as_str()).collect();
    words.join(" ")
}
