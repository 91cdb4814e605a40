use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use callgrade::io::{
    load_role_report, parse_classifications_file, parse_lexicon_file, parse_weights_file,
    RoleTable, ScoreTable,
};
use callgrade::models::Confidence;
use callgrade::stages::parse_channels_string;
use callgrade::{
    align_to_windows, assign_roles, grade_transcript, label_calls, load_transcripts,
    parse_caption_file, parse_transcribe_file, LabelConfig, LabeledReportDocument, RoleConfig,
    RoleReportDocument, ScoreReportDocument,
};

#[derive(Parser)]
#[command(name = "callgrade")]
#[command(author, version, about = "Call-center transcript analytics pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign human and bot roles to call channels by speech duration
    Roles {
        /// Input transcript files or directories (transcription-service JSON)
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Output file for the machine-readable report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the human-readable report (text)
        #[arg(long)]
        table: Option<PathBuf>,

        /// Comma-separated channels every call is expected to carry
        #[arg(long, default_value = "ch_0,ch_1")]
        channels: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Grade a transcript against its reference captions
    Grade {
        /// Reference caption file (SubRip format)
        #[arg(short, long)]
        reference: PathBuf,

        /// Candidate transcript file (transcription-service JSON)
        #[arg(short, long)]
        candidate: PathBuf,

        /// Output file for the machine-readable report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the human-readable report (text)
        #[arg(long)]
        table: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Label calls from classifier output and caller phrases
    Label {
        /// Role report from a previous roles run (JSON)
        #[arg(long)]
        roles: PathBuf,

        /// Classifier output file, one JSON object per line
        #[arg(long)]
        classes: PathBuf,

        /// Output file for the machine-readable report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Label weight overrides (JSON map)
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Lexicon rules file (JSON array)
        #[arg(long)]
        lexicon: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze a transcript without making changes
    Analyze {
        /// Input transcript file (transcription-service JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Roles {
            input,
            output,
            table,
            channels,
            verbose,
        } => {
            setup_logging(verbose);
            run_roles(input, output, table, channels)
        }
        Commands::Grade {
            reference,
            candidate,
            output,
            table,
            verbose,
        } => {
            setup_logging(verbose);
            run_grade(reference, candidate, output, table)
        }
        Commands::Label {
            roles,
            classes,
            output,
            weights,
            lexicon,
            verbose,
        } => {
            setup_logging(verbose);
            run_label(roles, classes, output, weights, lexicon)
        }
        Commands::Analyze { input, verbose } => {
            setup_logging(verbose);
            analyze_transcript(input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn run_roles(
    input: Vec<PathBuf>,
    output: PathBuf,
    table: Option<PathBuf>,
    channels: String,
) -> Result<()> {
    info!("Loading transcripts from {} inputs", input.len());
    let transcripts = load_transcripts(&input)?;
    info!("Loaded {} calls", transcripts.len());

    let config = RoleConfig {
        expected_channels: parse_channels_string(&channels),
    };
    let report = assign_roles(&transcripts, &config)?;

    let synthesized = report
        .calls
        .iter()
        .filter(|c| c.human.synthesized || c.bot.synthesized)
        .count();
    info!(
        "Assigned roles for {} calls ({} with synthesized channels)",
        report.calls.len(),
        synthesized
    );

    let document = RoleReportDocument::from_report(&report);
    document.write_json(&output)?;
    info!("Output written to {:?}", output);

    if let Some(path) = table {
        RoleTable::new(&report).write_file(&path)?;
        info!("Human-readable output written to {:?}", path);
    }

    Ok(())
}

fn run_grade(
    reference: PathBuf,
    candidate: PathBuf,
    output: PathBuf,
    table: Option<PathBuf>,
) -> Result<()> {
    info!("Loading reference captions from {:?}", reference);
    let cues = parse_caption_file(&reference)?;
    info!("Loaded {} caption windows", cues.len());

    info!("Loading candidate transcript from {:?}", candidate);
    let transcript = parse_transcribe_file(&candidate)?;
    info!(
        "Loaded {} tokens across {} channels",
        transcript.tokens.len(),
        transcript.channels().len()
    );

    let pairs = align_to_windows(&cues, &transcript.tokens);
    let report = grade_transcript(&pairs).context("Failed to grade transcript")?;
    info!(
        "Average similarity {:.3} over {} windows",
        report.average,
        report.windows.len()
    );

    let document = ScoreReportDocument::from_report(&report);
    document.write_json(&output)?;
    info!("Output written to {:?}", output);

    if let Some(path) = table {
        ScoreTable::new(&report).write_file(&path)?;
        info!("Human-readable output written to {:?}", path);
    }

    Ok(())
}

fn run_label(
    roles: PathBuf,
    classes: PathBuf,
    output: PathBuf,
    weights: Option<PathBuf>,
    lexicon: Option<PathBuf>,
) -> Result<()> {
    info!("Loading role report from {:?}", roles);
    let report = load_role_report(&roles)?;
    info!("Loading classifications from {:?}", classes);
    let classifications = parse_classifications_file(&classes)?;

    let mut config = LabelConfig::default();
    if let Some(path) = weights {
        config.weights = parse_weights_file(&path)?;
        info!("Loaded {} label weights", config.weights.len());
    }
    if let Some(path) = lexicon {
        config.lexicon_rules = parse_lexicon_file(&path)?;
        info!("Loaded {} lexicon rules", config.lexicon_rules.len());
    }

    let labeled = label_calls(&report, &classifications, &config);

    let high = labeled
        .iter()
        .filter(|c| c.decision.confidence == Confidence::High)
        .count();
    info!("Labeled {} calls ({} high confidence)", labeled.len(), high);

    let document = LabeledReportDocument::from_calls(&labeled);
    document.write_json(&output)?;
    info!("Output written to {:?}", output);

    Ok(())
}

fn analyze_transcript(input: PathBuf) -> Result<()> {
    info!("Analyzing transcript from {:?}", input);
    let transcript =
        parse_transcribe_file(&input).context("Failed to parse input transcript")?;

    println!("Call Analysis");
    println!("=============");
    println!("File: {}", transcript.file);
    println!("Total tokens: {}", transcript.tokens.len());
    println!("Channels: {:?}", transcript.channels());
    println!();

    println!("Channel Statistics");
    println!("------------------");
    for group in transcript.channel_groups() {
        let confidences: Vec<f64> = group.tokens.iter().filter_map(|t| t.confidence).collect();
        let avg_confidence =
            confidences.iter().sum::<f64>() / confidences.len().max(1) as f64;

        println!(
            "{}: {} words, {:.1}s speech, avg conf {:.2}",
            group.channel,
            group.tokens.len(),
            group.total_duration(),
            avg_confidence
        );
    }

    let batch = [transcript];
    let report = assign_roles(&batch, &RoleConfig::default())?;
    if let Some(call) = report.calls.first() {
        println!();
        println!("Role Attribution");
        println!("----------------");
        println!(
            "Human: {} ({:.1}s{})",
            call.human.channel,
            call.human.total_duration,
            if call.human.synthesized { ", synthesized" } else { "" }
        );
        println!(
            "Bot: {} ({:.1}s{})",
            call.bot.channel,
            call.bot.total_duration,
            if call.bot.synthesized { ", synthesized" } else { "" }
        );
    }

    Ok(())
}
