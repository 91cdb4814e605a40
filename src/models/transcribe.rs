use serde::{Deserialize, Deserializer, Serialize};

use super::TimedToken;

/// Channel label applied to tokens from jobs that ran without channel
/// identification
pub const DEFAULT_CHANNEL: &str = "ch_0";

/// Root document produced by the transcription service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscribeDocument {
    pub results: TranscribeResults,
    /// Job name the service assigned, when present
    #[serde(rename = "jobName", default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscribeResults {
    /// Populated when the job ran with channel identification
    #[serde(default)]
    pub channel_labels: Option<ChannelLabels>,
    /// Flat item list, the only token source on single-channel jobs
    #[serde(default)]
    pub items: Vec<TranscribeItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelLabels {
    pub channels: Vec<LabeledChannel>,
    #[serde(default)]
    pub number_of_channels: Option<u32>,
}

/// One diarized channel with its recognized items
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabeledChannel {
    pub channel_label: String,
    pub items: Vec<TranscribeItem>,
}

/// A single recognized item; punctuation items carry no timestamps
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscribeItem {
    /// Start timestamp in seconds, encoded as a string or number
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub start_time: Option<f64>,
    /// End timestamp in seconds, encoded as a string or number
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub end_time: Option<f64>,
    /// "pronunciation" for spoken words, "punctuation" for markers
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<ItemAlternative>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemAlternative {
    pub content: String,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub confidence: Option<f64>,
}

impl TranscribeDocument {
    /// Extract word tokens from this document.
    ///
    /// Channel-separated results are preferred; documents without channel
    /// labels fall back to the flat item list, labeled [`DEFAULT_CHANNEL`].
    /// Punctuation items and items with missing or malformed timestamps are
    /// excluded rather than failing the document.
    pub fn tokens(&self) -> Vec<TimedToken> {
        if let Some(labels) = &self.results.channel_labels {
            if !labels.channels.is_empty() {
                return labels
                    .channels
                    .iter()
                    .flat_map(|channel| {
                        channel
                            .items
                            .iter()
                            .filter_map(|item| item.to_token(&channel.channel_label))
                    })
                    .collect();
            }
        }

        self.results
            .items
            .iter()
            .filter_map(|item| item.to_token(DEFAULT_CHANNEL))
            .collect()
    }

    /// Total item count in whichever list [`Self::tokens`] reads
    pub fn item_count(&self) -> usize {
        if let Some(labels) = &self.results.channel_labels {
            if !labels.channels.is_empty() {
                return labels.channels.iter().map(|channel| channel.items.len()).sum();
            }
        }

        self.results.items.len()
    }
}

impl TranscribeItem {
    /// Whether this item is a punctuation marker rather than a spoken word
    pub fn is_punctuation(&self) -> bool {
        self.item_type.as_deref() == Some("punctuation")
    }

    /// Convert to a [`TimedToken`], or `None` when the item must be excluded
    fn to_token(&self, channel: &str) -> Option<TimedToken> {
        if self.is_punctuation() {
            return None;
        }

        let start = self.start_time.filter(|v| v.is_finite())?;
        let end = self.end_time.filter(|v| v.is_finite())?;
        if end < start {
            return None;
        }

        let alternative = self.alternatives.first()?;
        if alternative.content.is_empty() {
            return None;
        }

        Some(TimedToken {
            start,
            end,
            text: alternative.content.clone(),
            channel: channel.to_string(),
            confidence: alternative.confidence,
        })
    }
}

/// Accept a decimal field encoded as a JSON number or a string.
///
/// Strings that fail to parse become `None` so that one malformed item never
/// poisons the whole document; the item is dropped later in `to_token`.
fn de_opt_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    let value: Option<Decimal> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Decimal::Number(number)) => Some(number),
        Some(Decimal::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_separated_document() {
        let json = r#"{
            "jobName": "DA20210118_call_0001",
            "status": "COMPLETED",
            "results": {
                "channel_labels": {
                    "number_of_channels": 2,
                    "channels": [
                        {
                            "channel_label": "ch_0",
                            "items": [
                                {"start_time": "0.54", "end_time": "0.91", "type": "pronunciation", "alternatives": [{"content": "buenas", "confidence": "0.99"}]},
                                {"type": "punctuation", "alternatives": [{"content": ",", "confidence": "0.0"}]},
                                {"start_time": "1.02", "end_time": "1.51", "type": "pronunciation", "alternatives": [{"content": "tardes", "confidence": "0.98"}]}
                            ]
                        },
                        {
                            "channel_label": "ch_1",
                            "items": [
                                {"start_time": 2.0, "end_time": 2.4, "type": "pronunciation", "alternatives": [{"content": "hola", "confidence": 0.97}]}
                            ]
                        }
                    ]
                },
                "items": []
            }
        }"#;

        let document: TranscribeDocument = serde_json::from_str(json).unwrap();
        let tokens = document.tokens();

        // Punctuation item is filtered, the three words survive
        assert_eq!(tokens.len(), 3);
        assert_eq!(document.item_count(), 4);
        assert_eq!(tokens[0].text, "buenas");
        assert_eq!(tokens[0].start, 0.54);
        assert_eq!(tokens[0].channel, "ch_0");
        assert_eq!(tokens[0].confidence, Some(0.99));
        // Numeric timestamps parse the same as string timestamps
        assert_eq!(tokens[2].text, "hola");
        assert_eq!(tokens[2].channel, "ch_1");
        assert_eq!(tokens[2].end, 2.4);
    }

    #[test]
    fn test_flat_document_uses_default_channel() {
        let json = r#"{
            "results": {
                "items": [
                    {"start_time": "0.1", "end_time": "0.6", "type": "pronunciation", "alternatives": [{"content": "hola"}]},
                    {"start_time": "0.7", "end_time": "1.2", "type": "pronunciation", "alternatives": [{"content": "mundo"}]}
                ]
            }
        }"#;

        let document: TranscribeDocument = serde_json::from_str(json).unwrap();
        let tokens = document.tokens();

        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.channel == DEFAULT_CHANNEL));
        assert_eq!(tokens[0].confidence, None);
    }

    #[test]
    fn test_malformed_items_are_excluded() {
        let json = r#"{
            "results": {
                "items": [
                    {"start_time": "not-a-number", "end_time": "1.0", "type": "pronunciation", "alternatives": [{"content": "roto"}]},
                    {"end_time": "2.0", "type": "pronunciation", "alternatives": [{"content": "sin-inicio"}]},
                    {"start_time": "3.0", "end_time": "2.0", "type": "pronunciation", "alternatives": [{"content": "invertido"}]},
                    {"start_time": "4.0", "end_time": "4.5", "type": "pronunciation", "alternatives": []},
                    {"start_time": "5.0", "end_time": "5.5", "type": "pronunciation", "alternatives": [{"content": "bueno"}]}
                ]
            }
        }"#;

        let document: TranscribeDocument = serde_json::from_str(json).unwrap();
        let tokens = document.tokens();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "bueno");
        assert_eq!(document.item_count(), 5);
    }

    #[test]
    fn test_empty_document() {
        let json = r#"{"results": {"items": []}}"#;

        let document: TranscribeDocument = serde_json::from_str(json).unwrap();

        assert!(document.tokens().is_empty());
        assert_eq!(document.item_count(), 0);
    }
}
