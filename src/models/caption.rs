use serde::Serialize;
use thiserror::Error;

/// One timed cue from a caption file
#[derive(Debug, Clone, Serialize)]
pub struct CaptionCue {
    /// 1-based cue number from the source file
    pub index: u32,
    /// Window start in seconds
    pub start: f64,
    /// Window end in seconds
    pub end: f64,
    /// Cue text with internal line breaks joined by spaces
    pub text: String,
}

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("cue {cue}: expected a numeric index, got {line:?}")]
    BadIndex { cue: usize, line: String },
    #[error("cue {cue}: missing time range line")]
    MissingTimeRange { cue: usize },
    #[error("cue {cue}: time range {line:?} has no --> separator")]
    MissingArrow { cue: usize, line: String },
    #[error("invalid timestamp {text:?}")]
    BadTimestamp { text: String },
    #[error("cue {cue}: window ends at {end}s before it starts at {start}s")]
    ReversedWindow { cue: usize, start: f64, end: f64 },
}

/// Parse SubRip caption text into cues.
///
/// Blocks are separated by blank lines. Each block carries a numeric index,
/// a `start --> end` time range, and zero or more text lines.
pub fn parse_caption_text(text: &str) -> Result<Vec<CaptionCue>, CaptionError> {
    let mut cues = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    // Trailing sentinel flushes the final block without a special case
    for line in text.lines().chain(std::iter::once("")) {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !block.is_empty() {
                cues.push(parse_block(cues.len() + 1, &block)?);
                block.clear();
            }
        } else {
            block.push(line);
        }
    }

    Ok(cues)
}

fn parse_block(cue: usize, lines: &[&str]) -> Result<CaptionCue, CaptionError> {
    let index_line = lines[0].trim();
    let index: u32 = index_line.parse().map_err(|_| CaptionError::BadIndex {
        cue,
        line: index_line.to_string(),
    })?;

    let range_line = lines.get(1).ok_or(CaptionError::MissingTimeRange { cue })?;
    let (start_text, end_text) =
        range_line.split_once("-->").ok_or_else(|| CaptionError::MissingArrow {
            cue,
            line: range_line.to_string(),
        })?;

    let start = parse_timestamp(start_text)?;
    let end = parse_timestamp(end_text)?;
    if end < start {
        return Err(CaptionError::ReversedWindow { cue, start, end });
    }

    let text = lines[2..]
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(CaptionCue { index, start, end, text })
}

/// Parse an `HH:MM:SS,mmm` timestamp into seconds
pub fn parse_timestamp(text: &str) -> Result<f64, CaptionError> {
    let trimmed = text.trim();
    let bad = || CaptionError::BadTimestamp {
        text: trimmed.to_string(),
    };

    let (clock, millis_text) = trimmed.split_once(',').ok_or_else(bad)?;
    let fields: Vec<&str> = clock.split(':').collect();
    if fields.len() != 3 {
        return Err(bad());
    }

    let hours: u32 = fields[0].parse().map_err(|_| bad())?;
    let minutes: u32 = fields[1].parse().map_err(|_| bad())?;
    let seconds: u32 = fields[2].parse().map_err(|_| bad())?;
    let millis: u32 = millis_text.parse().map_err(|_| bad())?;
    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(bad());
    }

    Ok(f64::from(hours) * 3600.0
        + f64::from(minutes) * 60.0
        + f64::from(seconds)
        + f64::from(millis) / 1000.0)
}
