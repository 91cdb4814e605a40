use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::stages::{CallRoles, LabeledCall, RoleReport, RoleSide, ScoreReport, WindowScore};

/// Provenance block stamped on every written report
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportMetadata {
    pub report_id: String,
    /// RFC 3339 timestamp of the run
    pub generated_at: String,
    /// Number of rows in the report body
    pub rows: usize,
}

impl ReportMetadata {
    pub fn new(rows: usize) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            rows,
        }
    }
}

/// Machine-readable role attribution report
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleReportDocument {
    pub metadata: ReportMetadata,
    pub calls: Vec<CallRoles>,
}

impl RoleReportDocument {
    pub fn from_report(report: &RoleReport) -> Self {
        Self {
            metadata: ReportMetadata::new(report.calls.len()),
            calls: report.calls.clone(),
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_json_file(self, path)
    }
}

/// Machine-readable transcription quality report
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReportDocument {
    pub metadata: ReportMetadata,
    /// Mean window score
    pub average: f64,
    pub windows: Vec<WindowScore>,
}

impl ScoreReportDocument {
    pub fn from_report(report: &ScoreReport) -> Self {
        Self {
            metadata: ReportMetadata::new(report.windows.len()),
            average: report.average,
            windows: report.windows.clone(),
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_json_file(self, path)
    }
}

/// Machine-readable call labeling report
#[derive(Debug, Clone, Serialize)]
pub struct LabeledReportDocument {
    pub metadata: ReportMetadata,
    pub calls: Vec<LabeledCall>,
}

impl LabeledReportDocument {
    pub fn from_calls(calls: &[LabeledCall]) -> Self {
        Self {
            metadata: ReportMetadata::new(calls.len()),
            calls: calls.to_vec(),
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_json_file(self, path)
    }
}

fn write_json_file<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Human-readable role attribution format
pub struct RoleTable<'a> {
    report: &'a RoleReport,
}

impl<'a> RoleTable<'a> {
    pub fn new(report: &'a RoleReport) -> Self {
        Self { report }
    }

    /// Format the report as human-readable text
    pub fn format(&self) -> String {
        let mut output = String::new();

        for call in &self.report.calls {
            output.push_str(&format!("[{}]\n", call.file));
            push_side(&mut output, &call.human);
            push_side(&mut output, &call.bot);
            output.push('\n');
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

fn push_side(output: &mut String, side: &RoleSide) {
    let marker = if side.synthesized { ", synthesized" } else { "" };
    output.push_str(&format!(
        "  {} ({}, {:.1}s{})\n",
        side.role.as_str(),
        side.channel,
        side.total_duration,
        marker
    ));

    if side.phrase.is_empty() {
        output.push_str("    (no speech)\n");
    } else {
        for line in wrap_text(&side.phrase, 76).lines() {
            output.push_str("    ");
            output.push_str(line);
            output.push('\n');
        }
    }
}

/// Human-readable transcription quality format
pub struct ScoreTable<'a> {
    report: &'a ScoreReport,
}

impl<'a> ScoreTable<'a> {
    pub fn new(report: &'a ScoreReport) -> Self {
        Self { report }
    }

    /// Format the report as human-readable text
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{:>6}  {:>9}  {:>9}  {:>7}\n",
            "window", "start", "end", "score"
        ));
        for window in &self.report.windows {
            output.push_str(&format!(
                "{:>6}  {:>8.1}s  {:>8.1}s  {:>7.3}\n",
                window.index, window.start, window.end, window.score
            ));
            output.push_str(&format!("      ref: {}\n", window.reference));
            output.push_str(&format!("      hyp: {}\n", window.candidate));
        }
        output.push_str(&format!("\naverage: {:.3}\n", self.report.average));

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpeakerRole;

    fn sample_report() -> RoleReport {
        RoleReport {
            calls: vec![CallRoles {
                file: "call_0001.json".to_string(),
                human: RoleSide {
                    role: SpeakerRole::Human,
                    channel: "ch_0".to_string(),
                    total_duration: 182.4,
                    phrase: "le llamo porque mi factura llegó con un cargo que no reconozco"
                        .to_string(),
                    synthesized: false,
                },
                bot: RoleSide {
                    role: SpeakerRole::Bot,
                    channel: "ch_1".to_string(),
                    total_duration: 1.4,
                    phrase: String::new(),
                    synthesized: true,
                },
                transcript: "le llamo porque mi factura".to_string(),
            }],
        }
    }

    #[test]
    fn test_metadata_is_stamped() {
        let metadata = ReportMetadata::new(3);

        assert_eq!(metadata.rows, 3);
        assert!(!metadata.report_id.is_empty());
        assert!(!metadata.generated_at.is_empty());
    }

    #[test]
    fn test_role_report_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.json");

        let document = RoleReportDocument::from_report(&sample_report());
        document.write_json(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let read_back: RoleReportDocument = serde_json::from_str(&content).unwrap();

        assert_eq!(read_back.calls.len(), 1);
        assert_eq!(read_back.calls[0].file, "call_0001.json");
        assert_eq!(read_back.calls[0].human.channel, "ch_0");
        assert!(read_back.calls[0].bot.synthesized);
    }

    #[test]
    fn test_role_table_format() {
        let report = sample_report();
        let table = RoleTable::new(&report);

        let text = table.format();

        assert!(text.contains("[call_0001.json]"));
        assert!(text.contains("human (ch_0, 182.4s)"));
        assert!(text.contains("bot (ch_1, 1.4s, synthesized)"));
        assert!(text.contains("    (no speech)"));
    }

    #[test]
    fn test_score_table_format() {
        let report = ScoreReport {
            windows: vec![WindowScore {
                index: 1,
                start: 0.5,
                end: 2.0,
                reference: "buenas tardes".to_string(),
                candidate: "buena tarde".to_string(),
                score: 0.846,
            }],
            average: 0.846,
        };
        let table = ScoreTable::new(&report);

        let text = table.format();

        assert!(text.contains("window"));
        assert!(text.contains("ref: buenas tardes"));
        assert!(text.contains("hyp: buena tarde"));
        assert!(text.contains("average: 0.846"));
    }

    #[test]
    fn test_wrap_text() {
        let text = "le llamo porque mi factura llegó con un cargo que no reconozco de nadie";
        let wrapped = wrap_text(text, 20);
        for line in wrapped.lines() {
            assert!(line.len() <= 25); // Allow some slack for long words
        }
    }
}
