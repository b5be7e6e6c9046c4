use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Months, NaiveDate};
use colored::Colorize;
use gymtracker::{
    OutputFmt, emit,
    models::WorkoutSession,
    stats::{DateWindow, session_volume},
    storage::Store,
    utils::{format_kg, format_minutes},
};

use super::{paint_type, warn};

pub fn month_window(year: i32, month: u32) -> Option<DateWindow> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some(DateWindow { start, end })
}

pub async fn handle(store: &Store, year: Option<i32>, month: Option<u32>, fmt: OutputFmt) -> Result<()> {
    let now = Local::now();
    let year = year.unwrap_or(now.year());
    let month = month.unwrap_or(now.month());

    if !(1..=12).contains(&month) {
        warn("month must be between 1 and 12");
        return Ok(());
    }
    let window = month_window(year, month).context("Date out of range")?;

    let state = store.load_state().await;
    let mut sessions: Vec<&WorkoutSession> = state.workouts.iter().filter(|s| window.contains(s.date)).collect();
    sessions.sort_by_key(|s| (s.date, s.timestamp.unwrap_or(0)));

    let trained_days: BTreeSet<u32> = sessions.iter().map(|s| s.date.day()).collect();

    emit(fmt, &sessions, || {
        println!("\n{}", window.start.format("%B %Y").to_string().bold().cyan());
        println!("{}", "Mo Tu We Th Fr Sa Su".dimmed());

        let first_weekday = window.start.weekday().num_days_from_monday() as usize;
        print!("{}", "   ".repeat(first_weekday));

        for day in 1..=window.end.day() {
            if trained_days.contains(&day) {
                print!("{} ", format!("{:2}", day).green().bold());
            } else {
                print!("{:2} ", day);
            }

            if (first_weekday + day as usize) % 7 == 0 {
                println!();
            }
        }
        println!("\n");

        if sessions.is_empty() {
            return;
        }

        println!("{}", "Sessions:".bold().cyan());
        for s in &sessions {
            println!(
                "  {} {} ({}) | {} exercises, {}",
                s.date.format("%a %b %d").to_string().green(),
                paint_type(&s.workout_type, &state.available_types),
                format_minutes(s.duration.unwrap_or(0)),
                s.exercises.len(),
                format_kg(session_volume(s))
            );
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds() {
        let feb = month_window(2024, 2).unwrap();
        assert_eq!(feb.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let dec = month_window(2023, 12).unwrap();
        assert_eq!(dec.end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert!(month_window(2024, 13).is_none());
    }
}
