use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use gymtracker::{
    OutputFmt, emit,
    stats::{PersonalRecords, SeriesPoint, exercise_names, personal_records, series_for},
    storage::Store,
    types::{StatsMode, closest_label},
    utils::{create_ascii_graph, format_kg, graph_dimensions},
};
use serde::Serialize;

use super::{print_aligned, warn};
use crate::cli::StatsCmd;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseStats<'a> {
    exercise: &'a str,
    records: PersonalRecords,
    series: &'a [SeriesPoint],
}

fn plotted(series: &[SeriesPoint], mode: StatsMode) -> Vec<(NaiveDate, f64)> {
    series
        .iter()
        .map(|p| {
            let value = match mode {
                StatsMode::Weight if p.is_bodyweight => p.best_reps as f64,
                StatsMode::Weight => p.best_weight,
                StatsMode::OneRm => p.estimated_one_rm,
                StatsMode::Volume => p.total_volume,
            };
            (p.date, value)
        })
        .collect()
}

fn best_label(p: &SeriesPoint) -> String {
    if p.is_bodyweight {
        format!("BW x {}", p.best_reps)
    } else {
        format!("{} x {}", format_kg(p.best_weight), p.best_reps)
    }
}

pub async fn handle(cmd: StatsCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let state = store.load_state().await;
    let names = exercise_names(&state.workouts);

    match cmd {
        StatsCmd::List => {
            emit(fmt, &names, || {
                println!("{}", "Tracked exercises:".cyan().bold());
                if names.is_empty() {
                    println!("{}", "  (finish a session to see stats)".dimmed());
                }
                let w = names.len().to_string().len();
                for (i, name) in names.iter().enumerate() {
                    println!(" {} • {}", format!("{:>w$}", i + 1).yellow(), name.bold());
                }
            })?;
        }

        StatsCmd::Exercise { mode, graph, exercise } => {
            let query = exercise.join(" ");
            let name = match query.trim().parse::<usize>() {
                Ok(n) => super::pick(&names, n, "exercise")?.clone(),
                Err(_) => query.trim().to_string(),
            };

            let series = series_for(&state.workouts, &name);
            if series.is_empty() {
                match closest_label(&name, &names) {
                    Some(sug) => warn(format!("no history for `{}` -- did you mean: `{}`?", name, sug.green())),
                    None => warn(format!("no history for `{}`", name)),
                }
                return Ok(());
            }

            let records = personal_records(&series);
            let report = ExerciseStats {
                exercise: &name,
                records,
                series: &series,
            };
            emit(fmt, &report, || {
                println!("{} {}", "Exercise:".cyan().bold(), name.bold());
                println!(
                    "  {} {}   {} {}   {} {}",
                    "best:".dimmed(),
                    format_kg(records.best_weight).green().bold(),
                    "e1RM:".dimmed(),
                    format_kg(records.best_one_rm).green().bold(),
                    "sessions:".dimmed(),
                    series.len()
                );
                println!();

                if graph {
                    let (width, height) = graph_dimensions();
                    let title = match mode {
                        StatsMode::Weight => "Best set",
                        StatsMode::OneRm => "Estimated 1RM",
                        StatsMode::Volume => "Volume",
                    };
                    for line in create_ascii_graph(&plotted(&series, mode), width, height, title) {
                        println!("{}", line);
                    }
                    return;
                }

                let rows = series
                    .iter()
                    .map(|p| {
                        let left = format!(" {}  {}", p.date.format("%Y-%m-%d").to_string().dimmed(), best_label(p).bold());
                        let right = format!("e1RM {:<7} vol {}", format_kg(p.estimated_one_rm), format_kg(p.total_volume));
                        (left, right)
                    })
                    .collect();
                print_aligned(rows);
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(bw: bool) -> SeriesPoint {
        SeriesPoint {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            best_weight: 80.0,
            best_reps: 12,
            estimated_one_rm: 112.0,
            total_volume: 2000.0,
            is_bodyweight: bw,
        }
    }

    #[test]
    fn bodyweight_points_plot_reps() {
        let series = [point(true), point(false)];
        let values: Vec<f64> = plotted(&series, StatsMode::Weight).into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![12.0, 80.0]);
        assert_eq!(plotted(&series, StatsMode::Volume)[0].1, 2000.0);
    }
}
