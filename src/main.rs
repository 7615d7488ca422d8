mod app;

use anyhow::Result;
use app::{LocalApp, Outcome, RemoteApp};
use clap::{Parser, Subcommand};
use hifz_app::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hifz", about = "Quran memorization and revision scheduler", version)]
struct Cli {
    /// Configuration file (default: <config dir>/hifz/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User whose memorizations are used
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the next revision date for a mastery level and success streak
    Schedule {
        #[arg(long, allow_hyphen_values = true)]
        mastery: i32,
        #[arg(long, allow_hyphen_values = true)]
        streak: i32,
    },

    /// Start memorizing a verse
    Start {
        #[arg(long)]
        surah: u32,
        #[arg(long)]
        verse: u32,
        /// Verse id on the server (defaults to "surah:verse")
        #[arg(long)]
        verse_id: Option<String>,
    },

    /// List verses in memorization
    List,

    /// List verses due for revision
    Due,

    /// Record the outcome of a revision
    Review { id: String, outcome: Outcome },

    /// Revise all due verses interactively
    Session,

    /// Show memorization statistics
    Summary,

    /// Move the practice date one day forward
    AdvanceDay,

    /// Stop memorizing a verse
    Delete { id: String },

    /// Save memorizations to a JSON file
    Export { path: PathBuf },

    /// Restore memorizations from a JSON file
    Import { path: PathBuf },

    /// Work against the remote API
    #[command(subcommand)]
    Remote(RemoteCommand),
}

#[derive(Subcommand)]
enum RemoteCommand {
    Due,
    Review { id: String, outcome: Outcome },
    Session,
    Summary,
    Surahs,
    QuizStats,
    /// Answer quiz questions for a surah
    Quiz {
        surah: u32,
        /// Questions not answered before instead of the daily quiz
        #[arg(long)]
        new: bool,
    },
    /// Show the last reading position
    Position,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(user) = cli.user {
        config.user_id = Some(user);
    }

    match cli.command {
        Command::Schedule { mastery, streak } => {
            app::schedule(mastery, streak);
            Ok(())
        }
        Command::Remote(command) => {
            let remote = RemoteApp::connect(&config)?;
            match command {
                RemoteCommand::Due => remote.due(),
                RemoteCommand::Review { id, outcome } => remote.review(&id, outcome),
                RemoteCommand::Session => remote.session(),
                RemoteCommand::Summary => remote.summary(),
                RemoteCommand::Surahs => remote.surahs(),
                RemoteCommand::QuizStats => remote.quiz_stats(),
                RemoteCommand::Quiz { surah, new } => remote.quiz(surah, new),
                RemoteCommand::Position => remote.position(),
            }
        }
        Command::Start {
            surah,
            verse,
            verse_id,
        } => LocalApp::open(&config)?.start(surah, verse, verse_id),
        Command::List => LocalApp::open(&config)?.list(),
        Command::Due => LocalApp::open(&config)?.due(),
        Command::Review { id, outcome } => LocalApp::open(&config)?.review(&id, outcome),
        Command::Session => LocalApp::open(&config)?.session(),
        Command::Summary => LocalApp::open(&config)?.summary(),
        Command::AdvanceDay => LocalApp::open(&config)?.advance_day(),
        Command::Delete { id } => LocalApp::open(&config)?.delete(&id),
        Command::Export { path } => LocalApp::open(&config)?.export(&path),
        Command::Import { path } => LocalApp::open(&config)?.import(&path),
    }
}
