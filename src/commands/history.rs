use anyhow::Result;
use colored::Colorize;
use gymtracker::{
    OutputFmt, emit,
    models::WorkoutSession,
    stats::session_volume,
    storage::{Collection, Store},
    utils::{format_kg, format_minutes},
};
use serde::Serialize;

use super::{ok, paint_type, pick, print_aligned, session::print_exercises};
use crate::cli::HistoryCmd;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRow<'a> {
    idx: usize,
    #[serde(flatten)]
    session: &'a WorkoutSession,
    volume: f64,
}

pub async fn handle(cmd: HistoryCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let mut state = store.load_state().await;

    match cmd {
        HistoryCmd::List { limit } => {
            let rows: Vec<HistoryRow> = state
                .workouts
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .enumerate()
                .map(|(i, s)| HistoryRow {
                    idx: i + 1,
                    session: s,
                    volume: session_volume(s),
                })
                .collect();

            emit(fmt, &rows, || {
                println!("{}", "History:".cyan().bold());
                if rows.is_empty() {
                    println!("{}", "  (no sessions yet)".dimmed());
                    return;
                }

                let idx_w = rows.len().to_string().len();
                let lines = rows
                    .iter()
                    .map(|r| {
                        let left = format!(
                            " {} • {} {}",
                            format!("{:>width$}", r.idx, width = idx_w).yellow(),
                            r.session.date.format("%a %d %b %Y"),
                            paint_type(&r.session.workout_type, &state.available_types)
                        );
                        let right = format!(
                            "{} exercises, {} sets, {}, {}",
                            r.session.exercises.len(),
                            r.session.set_count(),
                            format_kg(r.volume),
                            format_minutes(r.session.duration.unwrap_or(0))
                        )
                        .dimmed()
                        .to_string();
                        (left, right)
                    })
                    .collect();
                print_aligned(lines);
            })?;
        }

        HistoryCmd::Show { session } => {
            let s = pick(&state.workouts, session, "session")?;
            let volume = session_volume(s);

            let row = HistoryRow {
                idx: session,
                session: s,
                volume,
            };
            emit(fmt, &row, || {
                println!(
                    "{} {} on {} ({})",
                    "Session:".cyan().bold(),
                    paint_type(&s.workout_type, &state.available_types),
                    s.date.format("%A %d %B %Y"),
                    format_minutes(s.duration.unwrap_or(0))
                );
                print_exercises(&s.exercises);
                println!("{} {} sets, {} volume", "Total:".cyan().bold(), s.set_count(), format_kg(volume));
            })?;
        }

        HistoryCmd::Delete { session } => {
            let id = pick(&state.workouts, session, "session")?.id.clone();
            let Some(removed) = state.delete_workout(&id) else {
                return Ok(());
            };
            store.save(&state, Collection::Workouts).await?;

            emit(fmt, &removed, || {
                ok(format!(
                    "deleted {} session of {}",
                    removed.workout_type.bold(),
                    removed.date.format("%Y-%m-%d")
                ))
            })?;
        }
    }

    Ok(())
}
