//! Command handlers of the `hifz` CLI.
//! Local commands work on the SQLite database, `remote` commands on the REST API.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, Utc};
use hifz_app::api::{ApiClient, MemorizationApi, ProgressApi, QuizApi, QuranApi, RemoteStore};
use hifz_app::config::Config;
use hifz_app::database::{LocalStore, db};
use hifz_app::export::json::{export_json_to_path, import_json};
use hifz_app::models::{
    MemorizationRecord, MemorizationStore, MemorizationSummary, NewMemorization, QuizRound,
    RevisionSession, scheduler,
};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// User id used for local records when none is configured
pub const LOCAL_USER: &str = "local";

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Outcome {
    Recalled,
    Missed,
}

/// Formats a date as YYYY-MM-DD in local time
fn format_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn print_record(record: &MemorizationRecord) {
    println!(
        "{:<38} {:>7}  {:<9} mastery {:>3}%  streak {:>2}  next {}",
        record.id,
        record.reference(),
        record.status,
        record.mastery_level,
        record.consecutive_success_count,
        record
            .next_revision
            .map(format_date)
            .unwrap_or_else(|| "now".to_string())
    );
}

pub fn schedule(mastery: i32, streak: i32) {
    let days = scheduler::revision_interval_days(mastery, streak);
    let date = scheduler::compute_next_revision_date(mastery, streak);
    println!("{} (in {} days)", date.format("%Y-%m-%d"), days);
}

pub struct LocalApp {
    conn: Arc<Mutex<Connection>>,
    user_id: String,
}

impl LocalApp {
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.database_path()?;
        let conn = db::init_database(&path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            user_id: config
                .user_id
                .clone()
                .unwrap_or_else(|| LOCAL_USER.to_string()),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))?;
        f(&conn)
    }

    pub fn start(&self, surah: u32, verse: u32, verse_id: Option<String>) -> Result<()> {
        let new = NewMemorization {
            verse_id: verse_id.unwrap_or_else(|| format!("{}:{}", surah, verse)),
            surah_number: surah,
            verse_number: verse,
        };
        let record = self.with_conn(|conn| Ok(db::start_memorization(&self.user_id, &new, conn)?))?;
        print_record(&record);
        Ok(())
    }

    pub fn list(&self) -> Result<()> {
        let records = self.with_conn(|conn| Ok(db::list_memorizations(&self.user_id, conn)?))?;
        if records.is_empty() {
            println!("No verses in memorization yet.");
        }
        records.iter().for_each(print_record);
        Ok(())
    }

    pub fn due(&self) -> Result<()> {
        let records = self.with_conn(|conn| {
            let now = db::get_current_date(conn)?;
            Ok(db::get_due_for_revision(&self.user_id, now, conn)?)
        })?;
        println!("{} verses due for revision", records.len());
        records.iter().for_each(print_record);
        Ok(())
    }

    pub fn review(&self, id: &str, outcome: Outcome) -> Result<()> {
        let record = self.with_conn(|conn| {
            let mut record = db::get_memorization(id, conn)?;
            if record.user_id != self.user_id {
                bail!("Memorization {} belongs to another user", id);
            }
            let now = db::get_current_date(conn)?;
            match outcome {
                Outcome::Recalled => record.record_success(now),
                Outcome::Missed => record.record_failure(now),
            }
            db::update_memorization(&record, conn)?;
            Ok(record)
        })?;
        print_record(&record);
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| Ok(db::delete_memorization(&self.user_id, id, conn)?))
    }

    pub fn session(&self) -> Result<()> {
        let now = self.with_conn(|conn| Ok(db::get_current_date(conn)?))?;
        let store = LocalStore::new(Arc::clone(&self.conn), self.user_id.clone());
        run_session(&store, now)
    }

    pub fn summary(&self) -> Result<()> {
        let records = self.with_conn(|conn| Ok(db::list_memorizations(&self.user_id, conn)?))?;
        print_summary(&MemorizationSummary::from_records(&records));
        Ok(())
    }

    pub fn advance_day(&self) -> Result<()> {
        let date = self.with_conn(|conn| Ok(db::advance_day(conn)?))?;
        println!("Practice date is now {}", format_date(date));
        Ok(())
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        let records = self.with_conn(|conn| Ok(db::list_memorizations(&self.user_id, conn)?))?;
        export_json_to_path(&records, path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        println!("Exported {} memorizations", records.len());
        Ok(())
    }

    pub fn import(&self, path: &Path) -> Result<()> {
        let records = import_json(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        let count =
            self.with_conn(|conn| Ok(db::import_memorizations(&self.user_id, &records, conn)?))?;
        println!("Imported {} memorizations", count);
        Ok(())
    }
}

fn print_summary(summary: &MemorizationSummary) {
    println!("Verses:          {}", summary.total);
    println!("  memorized:     {}", summary.memorized);
    println!("  in progress:   {}", summary.in_progress);
    println!("  to revise:     {}", summary.needs_revision);
    println!("Average mastery: {}%", summary.average_mastery);
    println!(
        "Exercises:       {}/{}",
        summary.exercises_succeeded, summary.exercises_total
    );
}

/// Walks the due verses interactively, reading y/n answers from stdin.
fn run_session<S: MemorizationStore + ?Sized>(store: &S, now: DateTime<Utc>) -> Result<()> {
    let mut session = RevisionSession::start(store, now)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut round = 0;

    while !session.is_completed() {
        if session.round_number != round {
            round = session.round_number;
            println!("{}", session.phase_message());
        }
        let Some(card) = session.current_card() else {
            break;
        };

        print!("Verse {} - recalled? [y/n/q] ", card.record.reference());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match line?.trim() {
            "y" | "Y" => session.grade_current_card(true)?,
            "n" | "N" => session.grade_current_card(false)?,
            "q" | "Q" => break,
            _ => {
                println!("Please answer y, n or q");
                continue;
            }
        }
        session.next_card();
    }

    if session.is_completed() {
        println!("Revision complete.");
    } else {
        println!("{} verses left in this round.", session.remaining_count());
    }
    Ok(())
}

pub struct RemoteApp {
    client: ApiClient,
    user_id: String,
}

impl RemoteApp {
    pub fn connect(config: &Config) -> Result<Self> {
        let client = ApiClient::from_config(&config.api)?;
        let user_id = config
            .user_id
            .clone()
            .context("A user id is required for remote commands (--user or HIFZ_USER_ID)")?;
        if !client.has_token() {
            log::warn!("No API token configured, requests are sent unauthenticated");
        }
        Ok(Self { client, user_id })
    }

    pub fn due(&self) -> Result<()> {
        let store = RemoteStore::new(&self.client, self.user_id.clone());
        let records = store.due_for_revision(Utc::now())?;
        println!("{} verses due for revision", records.len());
        records.iter().for_each(print_record);
        Ok(())
    }

    pub fn review(&self, id: &str, outcome: Outcome) -> Result<()> {
        let mut record = MemorizationApi::new(&self.client).get(&self.user_id, id)?;
        let now = Utc::now();
        match outcome {
            Outcome::Recalled => record.record_success(now),
            Outcome::Missed => record.record_failure(now),
        }
        RemoteStore::new(&self.client, self.user_id.clone()).save_revision(&record)?;
        print_record(&record);
        Ok(())
    }

    pub fn session(&self) -> Result<()> {
        let store = RemoteStore::new(&self.client, self.user_id.clone());
        run_session(&store, Utc::now())
    }

    pub fn summary(&self) -> Result<()> {
        let records = MemorizationApi::new(&self.client).list(&self.user_id)?;
        print_summary(&MemorizationSummary::from_records(&records));
        Ok(())
    }

    pub fn surahs(&self) -> Result<()> {
        for surah in QuranApi::new(&self.client).surahs()? {
            println!(
                "{:>3}  {:<24} {:<20} {:>3} verses",
                surah.number, surah.transliterated_name, surah.arabic_name, surah.verse_count
            );
        }
        Ok(())
    }

    pub fn quiz_stats(&self) -> Result<()> {
        for stats in QuizApi::new(&self.client).stats(&self.user_id)? {
            println!(
                "Surah {:>3}: {}/{} correct ({:.0}%), {} daily questions left",
                stats.surah_number,
                stats.correct_answers,
                stats.questions_answered,
                stats.accuracy_percent(),
                stats.daily_questions_remaining
            );
        }
        Ok(())
    }

    /// Plays a quiz for a surah, submitting each answer to the server.
    pub fn quiz(&self, surah_number: u32, new_questions: bool) -> Result<()> {
        let api = QuizApi::new(&self.client);
        let questions = if new_questions {
            api.new_questions(&self.user_id, surah_number, None)?
        } else {
            api.daily_quiz(&self.user_id, surah_number)?
        };
        let mut round = QuizRound::new(questions);
        if round.is_completed() {
            println!("No questions available for surah {}.", surah_number);
            return Ok(());
        }

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        while let Some(question) = round.current_question().cloned() {
            println!("\nVerse {}: {}", question.verse_number, question.text_with_blank);
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}. {}", i + 1, option);
            }
            print!("Answer: ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let choice = line?
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| question.options.get(i));
            let Some(choice) = choice else {
                println!("Please pick an option between 1 and {}", question.options.len());
                continue;
            };

            if round.answer(choice) == Some(true) {
                println!("Correct!");
            } else {
                println!("The answer was: {}", question.correct_answer);
            }
            if let Err(e) = api.submit_answer(&self.user_id, &question.id, choice) {
                log::warn!("Answer to {} not recorded: {}", question.id, e);
            }
            round.advance();
        }

        println!("\nScore: {}/{}", round.score(), round.question_count());
        Ok(())
    }

    pub fn position(&self) -> Result<()> {
        match ProgressApi::new(&self.client).reading_position(&self.user_id)? {
            Some(position) => println!(
                "Last read {}:{} on {}",
                position.surah_number,
                position.verse_number,
                format_date(position.last_read_at)
            ),
            None => println!("No reading position saved yet."),
        }
        Ok(())
    }
}
