use std::{
    fmt::Display,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use tubelens_core::{
    AnalysisClient, AnalysisKind, AnalysisRequest, FileStore, GeminiBackend, HistoryStore,
    ModelConfig, PlaybackRate, QuestionCount, RequestOptions, SpeechSession, default_data_dir,
    format::{format_quiz_question, format_quiz_review, format_typed},
    format_history, format_result_readable, format_suggestions, speakable_text,
    types::QuizResult,
    validate::{TypedResult, parse_quiz},
};

use crate::speech::CommandSpeechEngine;

mod speech;

fn format_duration(d: Duration) -> String {
    if d.as_secs() < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", d.as_secs() / 60, d.as_secs() % 60)
    }
}

/// CLI wrapper for AnalysisKind (needed for clap ValueEnum)
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliKind {
    #[default]
    Summary,
    Transcript,
    Timestamps,
    Scene,
    Clips,
    KeyPoints,
    Quiz,
    ContentIdea,
    DeepDive,
}

impl From<CliKind> for AnalysisKind {
    fn from(cli: CliKind) -> Self {
        match cli {
            CliKind::Summary => AnalysisKind::Summary,
            CliKind::Transcript => AnalysisKind::Transcript,
            CliKind::Timestamps => AnalysisKind::Timestamps,
            CliKind::Scene => AnalysisKind::Scene,
            CliKind::Clips => AnalysisKind::Clips,
            CliKind::KeyPoints => AnalysisKind::KeyPoints,
            CliKind::Quiz => AnalysisKind::Quiz,
            CliKind::ContentIdea => AnalysisKind::ContentIdea,
            CliKind::DeepDive => AnalysisKind::DeepDive,
        }
    }
}

#[derive(Parser)]
#[command(name = "tubelens")]
#[command(about = "Summarize, transcribe and quiz YouTube videos with a hosted multimodal model")]
struct Cli {
    /// Model identifier (defaults to gemini-2.5-flash)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Directory where history is kept
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a YouTube video
    Analyze {
        /// Video URL (watch, youtu.be or Shorts link)
        url: String,

        /// What to produce
        #[arg(short, long, default_value = "summary")]
        kind: CliKind,

        /// Number of quiz questions (quiz only)
        #[arg(short, long, default_value_t = QuestionCount::DEFAULT,
              value_parser = clap::value_parser!(u32).range(QuestionCount::MIN as i64..=QuestionCount::MAX as i64))]
        questions: u32,

        /// Print the raw model output instead of the formatted view
        #[arg(long, conflicts_with = "interactive")]
        raw: bool,

        /// Take the quiz: answers stay hidden until every question is answered
        #[arg(short, long)]
        interactive: bool,
    },

    /// Find videos about a topic
    Find {
        /// Topic to search for
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
    },

    /// List, show or clear past analyses
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Read a past result aloud
    Speak {
        /// History index, as shown by `tubelens history`
        index: usize,

        /// Playback rate: 0.5, 1, 1.5 or 2
        #[arg(short, long, default_value_t = 1.0)]
        rate: f32,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List past analyses, newest first
    List,
    /// Show one past result
    Show { index: usize },
    /// Take a past quiz interactively
    Quiz { index: usize },
    /// Remove all past analyses
    Clear,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(err: impl Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), err);
    std::process::exit(1);
}

/// Option index for a letter (`a`, `B`) or a 1-based number. Anything else,
/// including an empty line, is a skipped question.
fn parse_choice(input: &str, options: usize) -> Option<usize> {
    let input = input.trim();
    let index = match input.parse::<usize>() {
        Ok(n) => n.checked_sub(1)?,
        Err(_) => {
            let mut chars = input.chars();
            let letter = chars.next()?.to_ascii_uppercase();
            if chars.next().is_some() || !letter.is_ascii_uppercase() {
                return None;
            }
            (letter as u8 - b'A') as usize
        }
    };
    (index < options).then_some(index)
}

fn run_quiz(quiz: &QuizResult) -> Result<()> {
    let term = Term::stdout();
    loop {
        let mut answers = Vec::with_capacity(quiz.questions.len());
        for (i, question) in quiz.questions.iter().enumerate() {
            println!("{}", format_quiz_question(i, question));
            let last = (b'A' + question.options.len().clamp(1, 26) as u8 - 1) as char;
            term.write_str(&format!(
                "{} ",
                style(format!("Your answer (A-{}, Enter to skip):", last)).cyan()
            ))?;
            answers.push(parse_choice(&term.read_line()?, question.options.len()));
            println!();
        }

        println!("{}", style("─".repeat(60)).dim());
        println!("{}", format_quiz_review(quiz, &answers));

        term.write_str("Try again? [y/N] ")?;
        if !term.read_line()?.trim().eq_ignore_ascii_case("y") {
            return Ok(());
        }
        println!();
    }
}

fn print_banner() {
    println!(
        "\n{}  {}\n",
        style("tubelens").cyan().bold(),
        style("Video Analyzer").dim()
    );
}

/// Build the model client, validating the API key before anything else.
fn connect(model: Option<String>) -> AnalysisClient<GeminiBackend> {
    let mut config = ModelConfig::default();
    if let Some(model) = model {
        config = config.with_model(model);
    }
    match GeminiBackend::from_env(config) {
        Ok(backend) => AnalysisClient::new(backend),
        Err(e) => fail(e),
    }
}

async fn run_analyze(
    client: AnalysisClient<GeminiBackend>,
    history: &mut HistoryStore<FileStore>,
    request: AnalysisRequest,
    raw: bool,
    interactive: bool,
) -> Result<()> {
    print_banner();
    let start = Instant::now();
    let spinner = create_spinner(&format!(
        "Generating {} with {}...",
        request.kind.label(),
        client.model()
    ));

    let outcome =
        match tubelens_core::analyze_and_record(&client, history, &request, Utc::now()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                spinner.finish_and_clear();
                fail(e);
            }
        };

    spinner.finish_with_message(format!(
        "{} {} ready {}",
        style("✓").green().bold(),
        request.kind.label(),
        style(format!("[{}]", format_duration(start.elapsed()))).dim()
    ));
    if !outcome.recorded {
        eprintln!(
            "{} result was not saved to history",
            style("Warning:").yellow().bold()
        );
    }
    println!("{}", style("─".repeat(60)).dim());

    if interactive {
        match &outcome.typed {
            Some(TypedResult::Quiz(quiz)) => return run_quiz(quiz),
            _ => eprintln!(
                "{} the quiz did not validate; showing the raw output",
                style("Warning:").yellow().bold()
            ),
        }
    }

    let body = match (&outcome.typed, raw) {
        (Some(typed), false) => format_typed(typed),
        _ if raw => outcome.result.text.clone(),
        _ => format_result_readable(request.kind, &outcome.result.text),
    };
    println!("{}", body);

    println!(
        "{} {}",
        style("Tokens:").dim(),
        style(format!("~{} (approximate)", outcome.result.approx_tokens)).cyan()
    );
    Ok(())
}

async fn run_find(client: AnalysisClient<GeminiBackend>, topic: &str) {
    if topic.trim().is_empty() {
        fail("Please enter a topic to search for.");
    }

    print_banner();
    let spinner = create_spinner("Searching for videos...");
    let videos = match client.find_videos(topic).await {
        Ok(videos) => videos,
        Err(e) => {
            spinner.finish_and_clear();
            fail(e);
        }
    };
    spinner.finish_with_message(format!(
        "{} Found {} videos",
        style("✓").green().bold(),
        videos.len()
    ));
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", format_suggestions(&videos));
    println!(
        "{}",
        style("Run `tubelens analyze <URL>` on any of them.").dim()
    );
}

fn run_history(history: &mut HistoryStore<FileStore>, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => print!("{}", format_history(history.items())),
        HistoryAction::Show { index } => {
            let Some(item) = history.get(index) else {
                fail(format!("No history entry at index {}", index));
            };
            println!(
                "{} {} | {}",
                style(item.prompt_type.label()).cyan().bold(),
                item.youtube_url,
                style(&item.timestamp).dim()
            );
            println!("{}", style("─".repeat(60)).dim());
            println!("{}", format_result_readable(item.prompt_type, &item.result));
        }
        HistoryAction::Quiz { index } => {
            let Some(item) = history.get(index) else {
                fail(format!("No history entry at index {}", index));
            };
            if item.prompt_type != AnalysisKind::Quiz {
                fail(format!(
                    "History entry {} is a {}, not a quiz",
                    index,
                    item.prompt_type.label()
                ));
            }
            let Some(quiz) = parse_quiz(&item.result) else {
                fail(format!("History entry {} does not hold a valid quiz", index));
            };
            run_quiz(&quiz)?;
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("{} History cleared", style("✓").green().bold());
        }
    }
    Ok(())
}

async fn run_speak(history: &HistoryStore<FileStore>, index: usize, rate: f32) -> Result<()> {
    let Some(item) = history.get(index) else {
        fail(format!("No history entry at index {}", index));
    };
    let Some(rate) = PlaybackRate::from_factor(rate) else {
        fail(format!("Unsupported rate {}; use 0.5, 1, 1.5 or 2", rate));
    };
    let text = speakable_text(item.prompt_type, &item.result);

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut session = SpeechSession::new(CommandSpeechEngine::detect()?);
        session.set_rate(rate)?;
        session.set_text(&text)?;
        session.toggle()?;
        session.playback_ended();
        Ok(())
    })
    .await?
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let mut history = HistoryStore::open(FileStore::new(data_dir));

    match cli.command {
        Command::Analyze {
            url,
            kind,
            questions,
            raw,
            interactive,
        } => {
            let kind = AnalysisKind::from(kind);
            if interactive && kind != AnalysisKind::Quiz {
                fail("--interactive only applies to --kind quiz");
            }
            let client = connect(cli.model);
            let request =
                AnalysisRequest::new(url, kind, RequestOptions::with_questions(questions));
            run_analyze(client, &mut history, request, raw, interactive).await?;
        }
        Command::Find { topic } => {
            let client = connect(cli.model);
            run_find(client, &topic.join(" ")).await;
        }
        Command::History { action } => {
            run_history(&mut history, action.unwrap_or(HistoryAction::List))?;
        }
        Command::Speak { index, rate } => {
            if let Err(e) = run_speak(&history, index, rate).await {
                fail(e);
            }
        }
    }

    Ok(())
}
