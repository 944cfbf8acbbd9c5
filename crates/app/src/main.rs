use std::fmt;
use std::io::Read;
use std::sync::Arc;

use ascetic_core::engine::CompletionPolicy;
use ascetic_core::model::{DayNumber, Theme, UserId, WeekNumber};
use services::{AppServices, Clock, ProgressService, SyncStatus};
use storage::remote::RemoteConfig;

#[derive(Debug)]
enum ArgsError {
    MissingValue { what: &'static str },
    InvalidDay { raw: String },
    InvalidWeek { raw: String },
    InvalidTheme { raw: String },
    InvalidUserId { raw: String },
    InvalidDbUrl { raw: String },
    UnknownCommand(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { what } => write!(f, "{what} is required"),
            ArgsError::InvalidDay { raw } => {
                write!(f, "invalid day '{raw}': expected a number in 1..=84")
            }
            ArgsError::InvalidWeek { raw } => {
                write!(f, "invalid week '{raw}': expected a number in 1..=12")
            }
            ArgsError::InvalidTheme { raw } => {
                write!(f, "invalid theme '{raw}': expected light, dark, or monastic")
            }
            ArgsError::InvalidUserId { raw } => write!(f, "invalid ASCETIC_USER_ID value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- status");
    eprintln!("  cargo run -p app -- start");
    eprintln!("  cargo run -p app -- day <1-84>");
    eprintln!("  cargo run -p app -- complete <1-84>");
    eprintln!("  cargo run -p app -- journal <1-84> <text...>   # '-' reads stdin");
    eprintln!("  cargo run -p app -- toggle <1-84> <1-12>");
    eprintln!("  cargo run -p app -- theme <light|dark|monastic>");
    eprintln!("  cargo run -p app -- reset");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASCETIC_DB_URL              local store (default sqlite://ascetic.sqlite3)");
    eprintln!("  ASCETIC_SUPABASE_URL        hosted backend base URL");
    eprintln!("  ASCETIC_SUPABASE_ANON_KEY   hosted backend project key");
    eprintln!("  ASCETIC_ACCESS_TOKEN        session token for the hosted backend");
    eprintln!("  ASCETIC_USER_ID             user UUID (required with a hosted backend)");
    eprintln!("  ASCETIC_COMPLETION_POLICY   journal (default) or practices");
}

#[derive(Debug, Clone)]
enum Command {
    Status,
    Start,
    Day(DayNumber),
    Complete(DayNumber),
    Journal(DayNumber, String),
    Toggle(DayNumber, WeekNumber),
    Theme(Theme),
    Reset,
}

fn parse_day(raw: &str) -> Result<DayNumber, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidDay { raw: raw.to_string() })
}

fn parse_command(mut args: impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let Some(first) = args.next() else {
        return Ok(Command::Status);
    };

    match first.as_str() {
        "status" => Ok(Command::Status),
        "start" => Ok(Command::Start),
        "reset" => Ok(Command::Reset),
        "day" => {
            let raw = args.next().ok_or(ArgsError::MissingValue { what: "day" })?;
            Ok(Command::Day(parse_day(&raw)?))
        }
        "complete" => {
            let raw = args.next().ok_or(ArgsError::MissingValue { what: "day" })?;
            Ok(Command::Complete(parse_day(&raw)?))
        }
        "journal" => {
            let raw = args.next().ok_or(ArgsError::MissingValue { what: "day" })?;
            let day = parse_day(&raw)?;
            let rest: Vec<String> = args.collect();
            if rest.is_empty() {
                return Err(ArgsError::MissingValue { what: "journal text" });
            }
            let text = if rest.len() == 1 && rest[0] == "-" {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|_| ArgsError::MissingValue { what: "journal text" })?;
                buffer
            } else {
                rest.join(" ")
            };
            Ok(Command::Journal(day, text))
        }
        "toggle" => {
            let raw_day = args.next().ok_or(ArgsError::MissingValue { what: "day" })?;
            let raw_week = args.next().ok_or(ArgsError::MissingValue { what: "week" })?;
            let week = raw_week
                .parse()
                .map_err(|_| ArgsError::InvalidWeek { raw: raw_week.clone() })?;
            Ok(Command::Toggle(parse_day(&raw_day)?, week))
        }
        "theme" => {
            let raw = args.next().ok_or(ArgsError::MissingValue { what: "theme" })?;
            let theme = raw
                .parse()
                .map_err(|_| ArgsError::InvalidTheme { raw: raw.clone() })?;
            Ok(Command::Theme(theme))
        }
        "--help" | "-h" => {
            print_usage();
            std::process::exit(0);
        }
        other => Err(ArgsError::UnknownCommand(other.to_string())),
    }
}

fn completion_policy_from_env() -> CompletionPolicy {
    match std::env::var("ASCETIC_COMPLETION_POLICY").as_deref() {
        Ok("practices") => CompletionPolicy::PracticesAndJournal,
        _ => CompletionPolicy::JournalOrFlag,
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

async fn build_services(clock: Clock) -> Result<AppServices, Box<dyn std::error::Error>> {
    let policy = completion_policy_from_env();

    if let Some(config) = RemoteConfig::from_env() {
        let raw = std::env::var("ASCETIC_USER_ID")
            .map_err(|_| ArgsError::MissingValue { what: "ASCETIC_USER_ID" })?;
        let user_id: UserId = raw
            .parse()
            .map_err(|_| ArgsError::InvalidUserId { raw })?;
        return Ok(AppServices::new_remote(config, clock, user_id, policy).await?);
    }

    // Degraded mode: no hosted session, keep everything in the local file.
    let db_url = std::env::var("ASCETIC_DB_URL")
        .ok()
        .map_or_else(|| "sqlite://ascetic.sqlite3".into(), normalize_sqlite_url);
    let user_id = std::env::var("ASCETIC_USER_ID")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(UserId::local);

    prepare_sqlite_file(&db_url)?;
    Ok(AppServices::new_sqlite(&db_url, clock, user_id, policy).await?)
}

fn print_status(progress: &ProgressService) {
    let current = progress.current_day();
    match progress.start_date() {
        Some(start) => println!("Journey started {start}"),
        None => println!("Journey not started — run `start` to begin day 1"),
    }
    println!("Current day: {current} (week {})", current.week());

    let completed = DayNumber::all()
        .filter(|d| progress.is_day_complete(*d))
        .count();
    println!("Days complete: {completed}/84");

    for week in WeekNumber::all() {
        if week > current.week() {
            break;
        }
        let marks: String = (0..7_u8)
            .map(|offset| {
                let day = DayNumber::new(week.first_day().value() + offset)
                    .unwrap_or(DayNumber::LAST);
                if !progress.is_day_available(day) {
                    '.'
                } else if progress.is_day_complete(day) {
                    'x'
                } else {
                    'o'
                }
            })
            .collect();
        println!("  week {:>2}  {marks}", week.value());
    }
}

fn print_day(progress: &ProgressService, day: DayNumber) {
    if !progress.is_day_available(day) {
        println!(
            "Day {day} is locked — the calendar has unlocked up to day {}",
            progress.current_day()
        );
        return;
    }

    let status = progress.completion_status(day);
    println!("Day {day} (week {})", day.week());
    println!(
        "  practices: {}/{} checked",
        status.practices_completed, status.practices_total
    );
    println!("  journal:   {}", if status.has_journal { "yes" } else { "no" });
    println!(
        "  complete:  {}",
        if progress.is_day_complete(day) { "yes" } else { "no" }
    );

    let text = progress.journal_entry(day);
    if !text.is_empty() {
        println!();
        println!("{text}");
    }
}

fn warn_if_dirty(progress: &ProgressService) {
    if progress.sync_status() == SyncStatus::Dirty {
        eprintln!("warning: the last change could not be saved and exists only locally");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let command = parse_command(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let services = build_services(Clock::default_clock()).await?;
    let progress: Arc<ProgressService> = services.progress();

    match command {
        Command::Status => print_status(&progress),
        Command::Day(day) => print_day(&progress, day),
        Command::Start => {
            if progress.start_journey().await {
                println!("Journey started — welcome to day 1.");
            } else {
                println!(
                    "Already under way (started {}).",
                    progress
                        .start_date()
                        .map_or_else(|| "earlier".to_string(), |d| d.to_string())
                );
            }
            warn_if_dirty(&progress);
        }
        Command::Complete(day) => {
            progress.complete_day(day).await;
            println!("Day {day} marked complete.");
            warn_if_dirty(&progress);
        }
        Command::Journal(day, text) => {
            progress.set_journal_entry(day, &text).await?;
            if progress.is_day_complete(day) {
                println!("Journal saved for day {day}; day marked complete.");
            } else {
                println!("Journal saved for day {day}.");
            }
            warn_if_dirty(&progress);
        }
        Command::Toggle(day, week) => {
            let checked = progress.toggle_practice(day, week).await;
            println!(
                "Week {week} practice on day {day}: {}",
                if checked { "checked" } else { "unchecked" }
            );
            warn_if_dirty(&progress);
        }
        Command::Theme(theme) => {
            progress.set_theme(theme).await;
            println!("Theme set to {theme}.");
            warn_if_dirty(&progress);
        }
        Command::Reset => {
            progress.reset_journey().await;
            println!("Journey reset — all progress and journals cleared.");
            warn_if_dirty(&progress);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
