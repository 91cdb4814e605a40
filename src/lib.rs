pub mod io;
pub mod models;
pub mod stages;
pub mod text;

pub use io::{
    load_transcripts, parse_caption_file, parse_transcribe_file, parse_transcribe_json,
    LabeledReportDocument, RoleReportDocument, ScoreReportDocument,
};
pub use models::{
    CallClassification, CallTranscript, CaptionCue, LabelDecision, SpeakerRole, TimedToken,
};
pub use stages::{
    align_to_windows, assign_roles, decide_label, grade_transcript, label_calls, similarity,
    LabelConfig, RoleConfig, RoleReport, ScoreReport,
};
pub use text::normalize;
