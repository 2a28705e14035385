use std::fmt;
use std::io::{BufRead, Write as _};
use std::sync::Arc;

use assess_core::model::{AssessmentRun, LevelTally, SkillSummary};
use assess_core::session::AssessmentSession;
use services::{AppServices, AssessmentService, Clock, SaveOutcome, StaticCatalogSource};

mod catalog_data;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- run     [--db <sqlite_url>] [--domain <name>]");
    eprintln!("  cargo run -p app -- history [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- compare [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- clear-history [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:assess.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASSESS_DB_URL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    History,
    Compare,
    ClearHistory,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "history" => Some(Self::History),
            "compare" => Some(Self::Compare),
            "clear-history" => Some(Self::ClearHistory),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    domain: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ASSESS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://assess.sqlite3".into(), normalize_sqlite_url);
        let mut domain = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--domain" => {
                    domain = Some(require_value(args, "--domain")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, domain })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Run,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Run,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let source = StaticCatalogSource::new(catalog_data::entries());
    let app =
        AppServices::new_sqlite(&parsed.db_url, Clock::default_clock(), &source).await?;

    match cmd {
        Command::Run => run_assessment(&app, parsed.domain.as_deref()).await,
        Command::History => show_history(&app).await,
        Command::Compare => show_comparison(&app).await,
        Command::ClearHistory => {
            app.assessment().clear_all_history().await?;
            println!("History cleared.");
            Ok(())
        }
    }
}

async fn run_assessment(
    app: &AppServices,
    domain: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = app.assessment();

    if app.is_first_launch().await? {
        println!("Welcome. Answer y/n for each skill; b to go back, s to save and quit.");
        app.mark_launch_complete().await?;
    }

    let mut session = match domain {
        Some(domain) => service.start_domain(domain).await?,
        None => match maybe_resume(&service).await? {
            Some(resumed) => resumed,
            None => service.start_full().await,
        },
    };

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.is_complete() {
        if session.showing_break() {
            if let Some(finished) = session.finished_domain() {
                println!();
                println!("── {finished} finished. Take a short break. ──");
            }
            prompt("Press Enter to continue")?;
            lines.next().transpose()?;
            session.acknowledge_break();
        }

        let Some(skill) = session.current_skill() else {
            break;
        };
        println!();
        println!(
            "[{}/{} · {}%] {} / {} ({})",
            session.current_index() + 1,
            session.total_skills(),
            session.progress_percent(),
            skill.domain(),
            skill.item(),
            skill.level(),
        );
        println!("  {}", skill.name());
        if let Some(description) = skill.description() {
            println!("  {description}");
        }
        prompt("Do you have this skill? [y/n/b/s/q]")?;

        let Some(line) = lines.next().transpose()? else {
            // stdin closed; treat like quit without saving
            return Ok(());
        };
        let id = skill.id();
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => {
                session.answer(id, true)?;
                session.advance();
            }
            "n" | "no" => {
                session.answer(id, false)?;
                session.advance();
            }
            "b" | "back" => session.retreat(),
            "s" | "save" => {
                service.save_progress(&session).await?;
                println!("Progress saved. Run again to resume.");
                return Ok(());
            }
            "q" | "quit" => return Ok(()),
            other => println!("Unrecognized input: {other:?}"),
        }
    }

    println!();
    println!("Assessment complete.");
    print_summaries(&session.summaries());

    match service.commit_result(&mut session).await? {
        SaveOutcome::Saved(id) => println!("Result saved to history ({id})."),
        SaveOutcome::SkippedPartial => {
            println!("Domain runs are not recorded in history.");
        }
        SaveOutcome::AlreadySaved | SaveOutcome::AlreadyInFlight => {}
    }

    Ok(())
}

async fn maybe_resume(
    service: &Arc<AssessmentService>,
) -> Result<Option<AssessmentSession>, Box<dyn std::error::Error>> {
    if !service.has_saved_progress().await? {
        return Ok(None);
    }

    prompt("Saved progress found. Resume? [y/N]")?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    if line.trim().eq_ignore_ascii_case("y") {
        return Ok(service.resume_saved().await?);
    }
    Ok(None)
}

async fn show_history(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let mut runs = app.assessment().history().await?;
    if runs.is_empty() {
        println!("No completed assessments yet.");
        return Ok(());
    }
    runs.sort_by_key(AssessmentRun::completed_at);

    for run in &runs {
        let counts = run.level_counts();
        println!(
            "{}  {}  {:.0}% answered  beginner {}/{}  intermediate {}/{}  advanced {}/{}",
            run.id(),
            run.completed_at().format("%Y-%m-%d %H:%M"),
            run.completion_rate(),
            counts.beginner.acquired,
            counts.beginner.total,
            counts.intermediate.acquired,
            counts.intermediate.total,
            counts.advanced.acquired,
            counts.advanced.total,
        );
    }
    Ok(())
}

async fn show_comparison(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let comparisons = app.assessment().compare_latest_two().await?;
    if comparisons.is_empty() {
        println!("Need at least two completed assessments to compare.");
        return Ok(());
    }

    for c in &comparisons {
        let marker = if c.is_improved { "+" } else { " " };
        println!(
            "{marker} {} / {}: {} -> {} ({:+})",
            c.category, c.item, c.previous_total, c.current_total, c.improvement,
        );
    }
    Ok(())
}

fn print_summaries(summaries: &[SkillSummary]) {
    fn tally(label: &str, t: LevelTally) -> String {
        format!("{label} {}/{}", t.acquired, t.total)
    }

    for summary in summaries {
        println!(
            "  {} / {}: {}  {}  {}",
            summary.category,
            summary.item,
            tally("beginner", summary.beginner),
            tally("intermediate", summary.intermediate),
            tally("advanced", summary.advanced),
        );
    }
}

fn prompt(message: &str) -> std::io::Result<()> {
    print!("{message} > ");
    std::io::stdout().flush()
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
