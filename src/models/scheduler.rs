//! Revision scheduling for memorized verses.
//!
//! A simplified spaced repetition curve decides when a verse comes back for revision:
//! - The consecutive-success streak picks a base interval (1 → 3 → 7 → 14 → 30 days)
//! - A streak of 0, or any value without its own step, falls back to 1 day
//! - Mastery of 80 or more doubles the interval, mastery below 50 halves it (never below 1 day)
//! - There is no upper cap: a long streak with high mastery yields 60 days
//!
//! Inputs are taken as they come. Mastery levels outside 0-100 go through the same
//! comparisons, so 150 doubles and -10 halves.

use chrono::{DateTime, Days, Duration, Local, TimeZone};

/// Mastery level at or above which the interval is doubled.
pub const HIGH_MASTERY: i32 = 80;
/// Mastery level below which the interval is halved.
pub const LOW_MASTERY: i32 = 50;

/// Base interval in days for a consecutive-success streak.
pub fn base_interval_days(consecutive_success_count: i32) -> u32 {
    match consecutive_success_count {
        1 => 1,
        2 => 3,
        3 => 7,
        4 => 14,
        n if n >= 5 => 30,
        // 0 and negative streaks have no step of their own
        _ => 1,
    }
}

/// Interval in days after adjusting the streak interval by mastery level.
pub fn revision_interval_days(mastery_level: i32, consecutive_success_count: i32) -> u32 {
    let interval = base_interval_days(consecutive_success_count);

    if mastery_level >= HIGH_MASTERY {
        interval * 2
    } else if mastery_level < LOW_MASTERY {
        (interval / 2).max(1)
    } else {
        interval
    }
}

/// Next revision date counted from `now`.
///
/// Days are added on the calendar, so the wall-clock time is kept and month/year
/// boundaries roll over naturally. When the target local time does not exist
/// (a DST gap) the same number of 24h days is added instead.
pub fn next_revision_date_from<Tz: TimeZone>(
    now: DateTime<Tz>,
    mastery_level: i32,
    consecutive_success_count: i32,
) -> DateTime<Tz> {
    let days = revision_interval_days(mastery_level, consecutive_success_count);

    match now.clone().checked_add_days(Days::new(u64::from(days))) {
        Some(date) => date,
        None => now + Duration::days(i64::from(days)),
    }
}

/// Next revision date for a verse, counted from the current local time.
pub fn compute_next_revision_date(
    mastery_level: i32,
    consecutive_success_count: i32,
) -> DateTime<Local> {
    next_revision_date_from(Local::now(), mastery_level, consecutive_success_count)
}
