use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{phrase_in_time_order, CallTranscript, SpeakerRole, TimedToken, UtteranceGroup};

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("role attribution needs at least 2 expected channels, got {0}")]
    TooFewChannels(usize),
    #[error("channel {0:?} listed more than once in expected channels")]
    DuplicateChannel(String),
}

/// Configuration for role attribution
#[derive(Debug, Clone)]
pub struct RoleConfig {
    /// Channels every call is expected to carry; missing ones are synthesized
    pub expected_channels: Vec<String>,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            expected_channels: vec!["ch_0".to_string(), "ch_1".to_string()],
        }
    }
}

/// Parse a comma-separated channels argument into a channel list
pub fn parse_channels_string(channels: &str) -> Vec<String> {
    channels
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// One side of a call after role attribution
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleSide {
    pub role: SpeakerRole,
    pub channel: String,
    /// Summed token durations in seconds
    pub total_duration: f64,
    /// Channel text in time order
    pub phrase: String,
    /// True when the channel was absent and stand-in timings were used
    pub synthesized: bool,
}

/// Role attribution result for one call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallRoles {
    pub file: String,
    pub human: RoleSide,
    pub bot: RoleSide,
    /// Whole-call text across both channels, in time order
    pub transcript: String,
}

/// Role attribution results for a batch of calls
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleReport {
    pub calls: Vec<CallRoles>,
}

struct ChannelStanding {
    channel: String,
    total_duration: f64,
    phrase: String,
    synthesized: bool,
}

/// Assign human and bot roles to every call in the batch.
///
/// The channel that spoke longest is the human caller; the one that spoke
/// least is the bot. Expected channels missing from a call are synthesized
/// with stand-in durations ordered by position, so a silent channel still
/// participates in the comparison and a fully silent call resolves the same
/// way every time.
pub fn assign_roles(
    transcripts: &[CallTranscript],
    config: &RoleConfig,
) -> Result<RoleReport, RoleError> {
    if config.expected_channels.len() < 2 {
        return Err(RoleError::TooFewChannels(config.expected_channels.len()));
    }
    for (i, channel) in config.expected_channels.iter().enumerate() {
        if config.expected_channels[..i].contains(channel) {
            return Err(RoleError::DuplicateChannel(channel.clone()));
        }
    }

    let mut calls: Vec<CallRoles> = transcripts
        .iter()
        .filter_map(|transcript| assign_call_roles(transcript, config))
        .collect();
    calls.sort_by(|a, b| a.file.cmp(&b.file));

    Ok(RoleReport { calls })
}

fn assign_call_roles(transcript: &CallTranscript, config: &RoleConfig) -> Option<CallRoles> {
    let groups = transcript.channel_groups();

    let mut standings: Vec<ChannelStanding> = groups.iter().map(standing_from_group).collect();
    for (position, channel) in config.expected_channels.iter().enumerate() {
        if !standings.iter().any(|s| &s.channel == channel) {
            debug!(
                "Channel {} absent from {}, synthesizing stand-in",
                channel, transcript.file
            );
            standings.push(synthesize_standing(channel, position));
        }
    }

    // Longest first; equal durations rank the earlier channel name first
    standings.sort_by(|a, b| {
        b.total_duration
            .total_cmp(&a.total_duration)
            .then_with(|| a.channel.cmp(&b.channel))
    });

    // Validated configs always leave at least two standings
    let bot = standings.pop()?;
    let human = standings.into_iter().next()?;

    Some(CallRoles {
        file: transcript.file.clone(),
        human: role_side_from_standing(human, SpeakerRole::Human),
        bot: role_side_from_standing(bot, SpeakerRole::Bot),
        transcript: phrase_in_time_order(&transcript.tokens),
    })
}

fn standing_from_group(group: &UtteranceGroup) -> ChannelStanding {
    ChannelStanding {
        channel: group.channel.clone(),
        total_duration: group.total_duration(),
        phrase: group.phrase(),
        synthesized: false,
    }
}

/// Stand-in for an absent channel.
///
/// Durations grow with position, so when every expected channel is silent the
/// last one outlasts the rest and takes the human role.
fn synthesize_standing(channel: &str, position: usize) -> ChannelStanding {
    let token = placeholder_token(channel, position);
    ChannelStanding {
        channel: channel.to_string(),
        total_duration: token.duration(),
        phrase: String::new(),
        synthesized: true,
    }
}

/// Stand-in token for an absent channel: starts at 0.1s, ends at 1.0s plus
/// half a second per position
fn placeholder_token(channel: &str, position: usize) -> TimedToken {
    TimedToken {
        start: 0.1,
        end: 1.0 + 0.5 * position as f64,
        text: String::new(),
        channel: channel.to_string(),
        confidence: None,
    }
}

fn role_side_from_standing(standing: ChannelStanding, role: SpeakerRole) -> RoleSide {
    RoleSide {
        role,
        channel: standing.channel,
        total_duration: standing.total_duration,
        phrase: standing.phrase,
        synthesized: standing.synthesized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(channel: &str, start: f64, end: f64, text: &str) -> TimedToken {
        TimedToken {
            start,
            end,
            text: text.to_string(),
            channel: channel.to_string(),
            confidence: None,
        }
    }

    fn transcript(file: &str, tokens: Vec<TimedToken>) -> CallTranscript {
        CallTranscript {
            file: file.to_string(),
            tokens,
        }
    }

    #[test]
    fn test_longest_channel_is_human() {
        let call = transcript(
            "call_0001.json",
            vec![
                token("ch_0", 0.0, 2.0, "le"),
                token("ch_0", 2.0, 5.0, "llamo"),
                token("ch_1", 0.5, 1.5, "si"),
            ],
        );

        let report = assign_roles(&[call], &RoleConfig::default()).unwrap();
        let roles = &report.calls[0];

        assert_eq!(roles.human.role, SpeakerRole::Human);
        assert_eq!(roles.human.channel, "ch_0");
        assert_eq!(roles.human.total_duration, 5.0);
        assert_eq!(roles.human.phrase, "le llamo");
        assert!(!roles.human.synthesized);
        assert_eq!(roles.bot.role, SpeakerRole::Bot);
        assert_eq!(roles.bot.channel, "ch_1");
        assert_eq!(roles.bot.total_duration, 1.0);
        assert_eq!(roles.transcript, "le si llamo");
    }

    #[test]
    fn test_missing_channel_is_synthesized() {
        let call = transcript(
            "call_0002.json",
            vec![token("ch_0", 0.0, 3.0, "no"), token("ch_0", 3.0, 6.0, "gracias")],
        );

        let report = assign_roles(&[call], &RoleConfig::default()).unwrap();
        let roles = &report.calls[0];

        assert_eq!(roles.human.channel, "ch_0");
        assert_eq!(roles.human.phrase, "no gracias");
        assert!(!roles.human.synthesized);
        // The absent ch_1 ranks through its stand-in and takes the bot role
        assert_eq!(roles.bot.channel, "ch_1");
        assert!(roles.bot.synthesized);
        assert_eq!(roles.bot.phrase, "");
    }

    #[test]
    fn test_very_short_call_loses_to_stand_in() {
        let call = transcript("call_0006.json", vec![token("ch_0", 0.0, 0.4, "hola")]);

        let report = assign_roles(&[call], &RoleConfig::default()).unwrap();
        let roles = &report.calls[0];

        // ch_1 stand-in runs 0.1 to 1.5, outlasting the real 0.4s channel
        assert_eq!(roles.human.channel, "ch_1");
        assert!(roles.human.synthesized);
        assert_eq!(roles.bot.channel, "ch_0");
        assert_eq!(roles.bot.phrase, "hola");
    }

    #[test]
    fn test_fully_silent_call() {
        let call = transcript("call_0003.json", vec![]);

        let report = assign_roles(&[call], &RoleConfig::default()).unwrap();
        let roles = &report.calls[0];

        // Stand-in durations grow with position: ch_0 0.9s, ch_1 1.4s
        assert_eq!(roles.human.channel, "ch_1");
        assert!((roles.human.total_duration - 1.4).abs() < 1e-9);
        assert_eq!(roles.bot.channel, "ch_0");
        assert!((roles.bot.total_duration - 0.9).abs() < 1e-9);
        assert!(roles.human.synthesized && roles.bot.synthesized);
        assert_eq!(roles.transcript, "");
    }

    #[test]
    fn test_equal_durations_break_by_channel_name() {
        let call = transcript(
            "call_0004.json",
            vec![
                token("ch_0", 0.0, 1.0, "hola"),
                token("ch_1", 2.0, 3.0, "hola"),
            ],
        );

        let report = assign_roles(&[call], &RoleConfig::default()).unwrap();
        let roles = &report.calls[0];

        assert_eq!(roles.human.channel, "ch_0");
        assert_eq!(roles.bot.channel, "ch_1");
    }

    #[test]
    fn test_three_channel_config() {
        let config = RoleConfig {
            expected_channels: parse_channels_string("ch_0, ch_1, ch_2"),
        };
        let call = transcript(
            "call_0005.json",
            vec![
                token("ch_0", 0.0, 3.0, "habla"),
                token("ch_1", 0.0, 5.0, "contesta"),
                token("ch_2", 0.0, 1.0, "tono"),
            ],
        );

        let report = assign_roles(&[call], &config).unwrap();
        let roles = &report.calls[0];

        // Middle channel is neither human nor bot
        assert_eq!(roles.human.channel, "ch_1");
        assert_eq!(roles.bot.channel, "ch_2");
    }

    #[test]
    fn test_config_validation() {
        let one_channel = RoleConfig {
            expected_channels: vec!["ch_0".to_string()],
        };
        assert!(matches!(
            assign_roles(&[], &one_channel),
            Err(RoleError::TooFewChannels(1))
        ));

        let duplicated = RoleConfig {
            expected_channels: parse_channels_string("ch_0,ch_1,ch_0"),
        };
        assert!(matches!(
            assign_roles(&[], &duplicated),
            Err(RoleError::DuplicateChannel(channel)) if channel == "ch_0"
        ));
    }

    #[test]
    fn test_batch_is_sorted_by_file() {
        let calls = vec![
            transcript("b.json", vec![token("ch_0", 0.0, 1.0, "b")]),
            transcript("a.json", vec![token("ch_0", 0.0, 1.0, "a")]),
        ];

        let report = assign_roles(&calls, &RoleConfig::default()).unwrap();

        assert_eq!(report.calls[0].file, "a.json");
        assert_eq!(report.calls[1].file, "b.json");
    }

    #[test]
    fn test_parse_channels_string() {
        assert_eq!(parse_channels_string("ch_0,ch_1"), vec!["ch_0", "ch_1"]);
        assert_eq!(parse_channels_string(" ch_0 , ch_1 "), vec!["ch_0", "ch_1"]);
        assert_eq!(parse_channels_string("ch_0,,ch_1,"), vec!["ch_0", "ch_1"]);
        assert!(parse_channels_string("").is_empty());
    }
}
