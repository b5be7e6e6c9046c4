use anyhow::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;
use gymtracker::{
    OutputFmt, emit,
    models::DailyGoal,
    stats::{BodyMetrics, body_metrics, last_seven_days, weight_history},
    storage::Store,
    types::WeightRange,
    utils::{create_ascii_graph, format_elapsed, format_kg, graph_dimensions},
};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayJson {
    date: NaiveDate,
    trained: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusJson<'a> {
    last_seven_days: Vec<DayJson>,
    active_session: Option<&'a str>,
    elapsed_seconds: Option<i64>,
    goals: &'a [DailyGoal],
    metrics: BodyMetrics,
    weight_history: &'a [(NaiveDate, f64)],
}

pub async fn handle(store: &Store, range: WeightRange, graph: bool, fmt: OutputFmt) -> Result<()> {
    let state = store.load_state().await;
    let manager = store.load_active().await;
    let now = Local::now();
    let today = now.date_naive();

    let week = last_seven_days(&state.workouts, today);
    let metrics = body_metrics(&state.user_profile);
    let weights = weight_history(&state.weight_log, range, today, state.user_profile.weight);
    let active = manager.active();

    let json = StatusJson {
        last_seven_days: week.iter().map(|(date, trained)| DayJson { date: *date, trained: *trained }).collect(),
        active_session: active.map(|a| a.session.workout_type.as_str()),
        elapsed_seconds: active.map(|a| a.elapsed_seconds(now)),
        goals: &state.daily_goals,
        metrics,
        weight_history: &weights,
    };

    emit(fmt, &json, || {
        println!("{}", "Training Status".cyan().bold());
        println!();

        let header: Vec<String> = week.iter().map(|(d, _)| format!("{:<3}", d.format("%a"))).collect();
        let marks: Vec<String> = week
            .iter()
            .map(|(_, trained)| {
                if *trained {
                    format!("{:<3}", "●").green().to_string()
                } else {
                    format!("{:<3}", "·").dimmed().to_string()
                }
            })
            .collect();
        let trained = week.iter().filter(|(_, t)| *t).count();
        println!("  {}", header.join(" ").dimmed());
        println!("  {}  {}", marks.join(" "), format!("{trained}/7 days").dimmed());

        if let Some(a) = active {
            println!(
                "\n{}: {} ({})",
                "In progress".cyan().bold(),
                a.session.workout_type.bold(),
                format_elapsed(a.elapsed_seconds(now))
            );
        }

        if !state.daily_goals.is_empty() {
            let done = state.daily_goals.iter().filter(|g| g.completed).count();
            println!("\n{} ({}/{})", "Daily goals".cyan().bold(), done, state.daily_goals.len());
            for g in &state.daily_goals {
                let mark = if g.completed { "✓".green() } else { "○".dimmed() };
                println!("  {} {}", mark, g.label);
            }
        }

        println!();
        println!("{}: {:.1}", "BMI".cyan().bold(), metrics.bmi);
        println!("{}: {:.0} kcal/day", "BMR".cyan().bold(), metrics.bmr);

        if let (Some((_, first)), Some((_, last))) = (weights.first(), weights.last()) {
            let delta = last - first;
            let arrow = if delta > 0.0 {
                "▲".yellow()
            } else if delta < 0.0 {
                "▼".green()
            } else {
                "=".dimmed()
            };
            println!("{}: {} {} {:+.1} kg", "Weight".cyan().bold(), format_kg(*last), arrow, delta);
        }

        if graph {
            let (width, height) = graph_dimensions();
            for line in create_ascii_graph(&weights, width, height, "Body weight") {
                println!("{}", line);
            }
        }
    })?;

    Ok(())
}
