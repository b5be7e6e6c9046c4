use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use gymtracker::{
    OutputFmt, emit,
    stats::{DateWindow, PeriodSummary, period_window, shift_reference, summarize},
    storage::Store,
    types::Period,
    utils::{format_kg, format_minutes},
};
use serde::Serialize;

use super::paint_type;

#[derive(Serialize)]
struct SummaryJson<'a> {
    period: Period,
    window: DateWindow,
    #[serde(flatten)]
    summary: &'a PeriodSummary,
}

fn window_title(period: Period, window: DateWindow) -> String {
    match period {
        Period::Week => format!(
            "Week {} – {}",
            window.start.format("%d %b"),
            window.end.format("%d %b %Y")
        ),
        Period::Month => window.start.format("%B %Y").to_string(),
        Period::Year => window.start.format("%Y").to_string(),
    }
}

pub async fn handle(store: &Store, period: Period, date: Option<NaiveDate>, shift: i32, fmt: OutputFmt) -> Result<()> {
    let state = store.load_state().await;
    let window = shift_reference(period, date.unwrap_or_else(|| Local::now().date_naive()), shift)
        .and_then(|reference| period_window(period, reference))
        .context("Date out of range")?;
    let summary = summarize(&state.workouts, window);

    let json = SummaryJson {
        period,
        window,
        summary: &summary,
    };
    emit(fmt, &json, || {
        println!("{}", window_title(period, window).cyan().bold());
        println!("  {:<10} {}", "sessions".dimmed(), summary.count.to_string().bold());
        println!("  {:<10} {}", "time".dimmed(), format_minutes(summary.duration).bold());
        println!("  {:<10} {}", "volume".dimmed(), format_kg(summary.volume).bold());

        if summary.distribution.is_empty() {
            return;
        }

        println!();
        println!("{}", "By type:".cyan().bold());
        let label_w = summary.distribution.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        for (label, count) in &summary.distribution {
            let pad = " ".repeat(label_w - label.chars().count());
            println!(
                "  {}{} {} {}",
                paint_type(label, &state.available_types),
                pad,
                "■".repeat(*count).green(),
                count
            );
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_follow_the_period() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(window_title(Period::Month, period_window(Period::Month, d).unwrap()), "June 2024");
        assert_eq!(window_title(Period::Year, period_window(Period::Year, d).unwrap()), "2024");
        assert_eq!(window_title(Period::Week, period_window(Period::Week, d).unwrap()), "Week 03 Jun – 09 Jun 2024");
    }
}
