use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use jobnote::io::{render_matches, render_suggestion, OutcomeKind, ReportMatch};
use jobnote::models::authorize;
use jobnote::{
    match_candidates, parse_roster_file, parse_user_file, read_transcript_file, tokenize,
    ApiConfig, Capability, Decision, DictationReport, DictationSession, JobsApiClient,
    MatcherConfig, PipelineConfig, ResolverConfig, Role, Roster, ScriptedCapture, StopOutcome,
    SuggestionPayload, TokenizerConfig, UserProfile,
};

#[derive(Parser)]
#[command(name = "jobnote")]
#[command(author, version)]
#[command(about = "Dictated job notes with team-member mentions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve mentions in a transcript against a roster file
    Process {
        #[command(flatten)]
        input: TranscriptArgs,

        /// Roster file (JSON array of {id, name})
        #[arg(short, long)]
        roster: PathBuf,

        /// Answer for a low-confidence suggestion (accept or reject);
        /// prompts on stdin when omitted
        #[arg(long)]
        decision: Option<Decision>,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Write a JSON report of the dictation
        #[arg(long)]
        report: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show candidate tokens and ranked matches without rewriting
    Analyze {
        #[command(flatten)]
        input: TranscriptArgs,

        /// Roster file (JSON array of {id, name})
        #[arg(short, long)]
        roster: PathBuf,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Resolve a dictated note and submit it to a job
    Note {
        /// Job to attach the note to
        #[arg(long)]
        job_id: String,

        #[command(flatten)]
        input: TranscriptArgs,

        /// Saved login or user profile JSON for the acting user
        #[arg(long, required_unless_present = "role")]
        user: Option<PathBuf>,

        /// Act as this role instead of the user's own (e.g. admin, trade-plumber)
        #[arg(long)]
        role: Option<String>,

        /// Answer for a low-confidence suggestion (accept or reject);
        /// prompts on stdin when omitted
        #[arg(long)]
        decision: Option<Decision>,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args)]
struct TranscriptArgs {
    /// Transcript text
    #[arg(long, conflicts_with = "transcript")]
    text: Option<String>,

    /// File containing the transcript
    #[arg(long)]
    transcript: Option<PathBuf>,
}

#[derive(Args)]
struct TuningArgs {
    /// Matches scoring above this are discarded
    #[arg(long, default_value = "0.4")]
    threshold: f64,

    /// Top matches scoring below this are applied without confirmation
    #[arg(long, default_value = "0.3")]
    confidence_threshold: f64,

    /// Edit budget as a fraction of word length
    #[arg(long, default_value = "0.4")]
    max_edit_ratio: f64,

    /// Offset in characters that costs a full score point
    #[arg(long, default_value = "100")]
    distance: usize,

    /// Words this short or shorter are never matched
    #[arg(long, default_value = "2")]
    min_token_chars: usize,
}

impl TuningArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            tokenizer: TokenizerConfig {
                min_token_chars: self.min_token_chars,
            },
            matcher: MatcherConfig {
                threshold: self.threshold,
                max_edit_ratio: self.max_edit_ratio,
                distance: self.distance,
                min_match_chars: self.min_token_chars + 1,
            },
            resolver: ResolverConfig {
                confidence_threshold: self.confidence_threshold,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            roster,
            decision,
            tuning,
            report,
            verbose,
        } => {
            setup_logging(verbose);
            process_command(input, roster, decision, tuning, report)
        }
        Commands::Analyze {
            input,
            roster,
            tuning,
            verbose,
        } => {
            setup_logging(verbose);
            analyze_command(input, roster, tuning)
        }
        Commands::Note {
            job_id,
            input,
            user,
            role,
            decision,
            tuning,
            verbose,
        } => {
            setup_logging(verbose);
            note_command(job_id, input, user, role, decision, tuning).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_text(input: &TranscriptArgs) -> Result<String> {
    match (&input.text, &input.transcript) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => read_transcript_file(path).context("Failed to read transcript"),
        (None, None) => anyhow::bail!("Provide --text or --transcript"),
    }
}

fn process_command(
    input: TranscriptArgs,
    roster_path: PathBuf,
    decision: Option<Decision>,
    tuning: TuningArgs,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let text = load_text(&input)?;
    let roster = parse_roster_file(&roster_path).context("Failed to load roster")?;
    info!("Loaded {} roster members", roster.len());

    let report = run_dictation(&text, roster, tuning.pipeline_config(), decision)?;
    if let Some(path) = report_path {
        report.write_json(&path)?;
        info!("Report written to {:?}", path);
    }

    println!("{}", report.final_text.as_deref().unwrap_or(report.original.as_str()));
    Ok(())
}

fn analyze_command(input: TranscriptArgs, roster_path: PathBuf, tuning: TuningArgs) -> Result<()> {
    let text = load_text(&input)?;
    let roster = parse_roster_file(&roster_path).context("Failed to load roster")?;
    let config = tuning.pipeline_config();

    let candidates = tokenize(&text, &config.tokenizer);
    let matches = match_candidates(&candidates, &roster, &config.matcher);

    println!("Transcript Analysis");
    println!("===================");
    println!("Roster members: {}", roster.len());
    println!("Well-formed members: {}", roster.well_formed().count());
    println!();

    println!("Candidate Tokens");
    println!("----------------");
    for candidate in &candidates {
        println!("{:>3}: {}", candidate.position, candidate.normalized);
    }
    println!();

    println!("Ranked Matches");
    println!("--------------");
    print!("{}", render_matches(&matches));

    if let Some(top) = matches.first() {
        println!();
        let verdict = if top.score < config.resolver.confidence_threshold {
            "auto-apply"
        } else {
            "needs confirmation"
        };
        println!("Top match: {} ({})", top.mention(), verdict);
    }

    Ok(())
}

async fn note_command(
    job_id: String,
    input: TranscriptArgs,
    user_path: Option<PathBuf>,
    role: Option<String>,
    decision: Option<Decision>,
    tuning: TuningArgs,
) -> Result<()> {
    let user = match user_path {
        Some(path) => parse_user_file(&path).context("Failed to load user")?,
        None => UserProfile::default(),
    };
    let mock_role = role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .context("Invalid --role")?;
    let role = authorize(&user, mock_role, Capability::DictateNotes)?;
    info!("Dictating as {}", role);

    let text = load_text(&input)?;
    if text.trim().is_empty() {
        anyhow::bail!("Empty note: nothing was dictated");
    }

    let client = JobsApiClient::new(ApiConfig::from_env()?);
    let roster = client
        .get_team_members()
        .await
        .context("Failed to fetch team members")?;
    info!("Fetched {} roster members", roster.len());

    let report = run_dictation(&text, roster, tuning.pipeline_config(), decision)?;
    let Some(final_text) = report.final_text.as_deref() else {
        anyhow::bail!("Dictation did not produce a note");
    };

    client
        .add_note(&job_id, final_text)
        .await
        .with_context(|| format!("Failed to add note to job {}", job_id))?;
    info!("Note added to job {} as {}", job_id, role);
    println!("{}", final_text);

    Ok(())
}

/// Drive one dictation session over a finalized transcript
fn run_dictation(
    text: &str,
    roster: Roster,
    config: PipelineConfig,
    decision: Option<Decision>,
) -> Result<DictationReport> {
    let candidates = tokenize(text, &config.tokenizer);
    let matches = match_candidates(&candidates, &roster, &config.matcher);

    let capture = ScriptedCapture::new(text);
    let event = capture.event();
    let mut session = DictationSession::new(capture, roster, config);

    let mut report = DictationReport::new(session.id().to_string(), text);
    report.matches = matches.iter().map(ReportMatch::from).collect();

    session.start()?;
    session.on_event(&event);

    match session.stop()? {
        StopOutcome::NothingCaptured => {
            report.final_text = Some(text.to_string());
            report.outcome = OutcomeKind::PassThrough;
        }
        StopOutcome::Completed(final_text) => {
            report.outcome = if matches.is_empty() {
                OutcomeKind::PassThrough
            } else {
                OutcomeKind::AutoApplied
            };
            report.final_text = Some(final_text);
        }
        StopOutcome::AwaitingConfirmation(payload) => {
            let decision = match decision {
                Some(decision) => decision,
                None => prompt_decision(&payload)?,
            };
            report.final_text = Some(session.confirm(decision)?);
            report.outcome = match decision {
                Decision::Accept => OutcomeKind::Accepted,
                Decision::Reject => OutcomeKind::Rejected,
            };
            report.suggestion = Some(payload);
        }
    }

    Ok(report)
}

fn prompt_decision(payload: &SuggestionPayload) -> Result<Decision> {
    let stdin = std::io::stdin();

    eprint!("{}", render_suggestion(payload));
    loop {
        eprint!("accept or reject? ");
        std::io::stderr().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read answer")? == 0 {
            anyhow::bail!("No answer given for suggestion");
        }
        match line.trim().parse::<Decision>() {
            Ok(decision) => return Ok(decision),
            Err(e) => eprintln!("{}", e),
        }
    }
}
