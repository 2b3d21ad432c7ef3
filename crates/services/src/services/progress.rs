//! Pure progress evaluation over a habit's completion history.
//!
//! Everything here is a function of `(habit, completions, today)`. The caller
//! computes `today` once per request and threads it through, so a single
//! evaluation pass can never observe two different "now"s, and tests can pin
//! the clock to any date.
//!
//! Week convention: weeks start on Monday and run through Sunday, inclusive.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};
use db::models::{
    habit::{Frequency, Habit},
    habit_completion::HabitCompletion,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Derived, recomputed-on-read progress values for one habit. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct HabitProgress {
    /// Whether the habit is satisfied for the period containing `today`.
    pub completed_current_period: bool,
    /// Consecutive satisfied periods (days or weeks) ending at or just before
    /// the current period.
    pub streak: u32,
    /// Actual vs. expected completions since creation, as a percentage in
    /// [0, 100].
    pub completion_rate: u8,
}

/// Evaluate a habit against its full completion history.
pub fn evaluate(habit: &Habit, completions: &[HabitCompletion], today: NaiveDate) -> HabitProgress {
    let dates: BTreeSet<NaiveDate> = completions.iter().map(|c| c.completion_date).collect();

    HabitProgress {
        completed_current_period: completed_current_period(habit.frequency, &dates, today),
        streak: streak(habit.frequency, &dates, today),
        completion_rate: completion_rate(
            habit.frequency,
            habit.created_at.date_naive(),
            completions.len() as u64,
            today,
        ),
    }
}

/// Monday of the week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Whether the habit is done for the period containing `today`.
pub fn completed_current_period(
    frequency: Frequency,
    dates: &BTreeSet<NaiveDate>,
    today: NaiveDate,
) -> bool {
    match frequency {
        Frequency::Daily => dates.contains(&today),
        Frequency::Weekly => {
            let start = week_start(today);
            let end = start + Days::new(6);
            dates.range(start..=end).next().is_some()
        }
    }
}

/// Length of the maximal run of consecutive satisfied periods ending at the
/// current period, or at the previous one when the current period has no
/// completion yet (one-period grace: an unfinished "today" does not break the
/// run, a fully skipped period does).
pub fn streak(frequency: Frequency, dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    match frequency {
        Frequency::Daily => run_length(dates, today, 1),
        Frequency::Weekly => {
            let weeks: BTreeSet<NaiveDate> = dates.iter().map(|d| week_start(*d)).collect();
            run_length(&weeks, week_start(today), 7)
        }
    }
}

fn run_length(periods: &BTreeSet<NaiveDate>, current: NaiveDate, step_days: u64) -> u32 {
    let mut cursor = if periods.contains(&current) {
        current
    } else {
        current - Days::new(step_days)
    };

    let mut count = 0;
    while periods.contains(&cursor) {
        count += 1;
        cursor = cursor - Days::new(step_days);
    }
    count
}

/// Actual completions over expected completions since the habit was created,
/// rounded to a whole percentage and capped at 100.
///
/// Expected completions count every elapsed day including the creation day;
/// weekly habits expect one per (possibly partial) week. The cap absorbs data
/// anomalies such as back-filled dates predating the dedup constraint.
pub fn completion_rate(
    frequency: Frequency,
    created_on: NaiveDate,
    completions: u64,
    today: NaiveDate,
) -> u8 {
    let elapsed_days = (today - created_on).num_days().max(0) as u64 + 1;
    let expected = match frequency {
        Frequency::Daily => elapsed_days,
        Frequency::Weekly => elapsed_days.div_ceil(7),
    }
    .max(1);

    let rate = ((completions as f64) * 100.0 / (expected as f64)).round() as u64;
    rate.min(100) as u8
}
