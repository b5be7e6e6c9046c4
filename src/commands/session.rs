use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use gymtracker::{
    OutputFmt, emit,
    error::SessionError,
    models::{ExerciseEntry, WorkoutSession, WorkoutTypePreset, same_label},
    session::{SessionManager, SetField},
    stats::session_volume,
    storage::{Collection, Store},
    types::closest_label,
    utils::{estimated_1rm, format_elapsed, format_kg, format_minutes},
};
use serde::Serialize;
use tracing::debug;

use super::{info, ok, paint_type, pick, warn};
use crate::cli::SessionCmd;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveJson<'a> {
    session: &'a WorkoutSession,
    started_at: DateTime<Local>,
    elapsed_seconds: i64,
    volume: f64,
}

/// Exercise and set ids addressed by their 1-based positions.
fn resolve(manager: &SessionManager, exercise: usize, set: Option<usize>) -> Result<(String, Option<String>)> {
    let active = manager.active().ok_or(SessionError::NoActiveSession)?;
    let entry = pick(&active.session.exercises, exercise, "exercise")?;
    let set_id = match set {
        Some(idx) => Some(pick(&entry.sets, idx, "set")?.id.clone()),
        None => None,
    };

    Ok((entry.id.clone(), set_id))
}

fn resolve_set(manager: &SessionManager, exercise: usize, set: usize) -> Result<(String, String)> {
    let (exercise_id, set_id) = resolve(manager, exercise, Some(set))?;
    Ok((exercise_id, set_id.unwrap_or_default()))
}

pub async fn handle(cmd: SessionCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let mut manager = store.load_active().await;

    match cmd {
        SessionCmd::Start { workout_type } => {
            let state = store.load_state().await;
            let session = match manager.start(&workout_type, Local::now()) {
                Err(SessionError::BlankName) => {
                    warn("workout type must not be blank, nothing started");
                    return Ok(());
                }
                other => other?.clone(),
            };
            store.save_active(&manager).await?;

            emit(fmt, &session, || {
                ok(format!(
                    "started {} session",
                    paint_type(&session.workout_type, &state.available_types)
                ));
                if !state.available_types.iter().any(|t| same_label(&t.label, &session.workout_type)) {
                    let labels = type_labels(&state.available_types);
                    match closest_label(&session.workout_type, &labels) {
                        Some(sug) => warn(format!("`{}` is not a known type -- did you mean `{}`?", session.workout_type, sug.green())),
                        None => info(format!("`{}` is not a known type, see `type add`", session.workout_type)),
                    }
                }
            })?;
        }

        SessionCmd::AddEx { category, name } => {
            let mut state = store.load_state().await;
            let name = name.join(" ");

            let added = match manager.add_exercise(&name, category, &mut state.suggested_exercises) {
                Err(SessionError::BlankName) => {
                    warn("exercise name must not be blank, nothing added");
                    return Ok(());
                }
                other => other?,
            };
            let catalog: &[Collection] = if added.catalogued.is_some() { &[Collection::Exercises] } else { &[] };
            store.save_with_active(&state, catalog, &manager).await?;

            let idx = manager.active().map(|a| a.session.exercises.len()).unwrap_or(0);
            let json = serde_json::json!({
                "index": idx,
                "exerciseId": added.exercise_id,
                "setId": added.set_id,
                "catalogued": added.catalogued,
            });
            emit(fmt, &json, || {
                ok(format!("added {} as exercise #{}", name.trim().bold(), idx));
                if let Some(cat) = added.catalogued {
                    info(format!("`{}` added to the catalog ({})", name.trim(), cat.to_string().yellow()));
                }
            })?;
        }

        SessionCmd::AddSet { exercise } => {
            let (exercise_id, _) = resolve(&manager, exercise, None)?;
            manager.add_set(&exercise_id)?;
            store.save_active(&manager).await?;

            let count = manager
                .active()
                .and_then(|a| a.session.exercise(&exercise_id))
                .map(|e| e.sets.len())
                .unwrap_or(0);
            emit(fmt, &serde_json::json!({ "exercise": exercise, "set": count }), || {
                ok(format!("added set #{} to exercise #{}", count, exercise))
            })?;
        }

        SessionCmd::Edit { exercise, set, reps, weight } => {
            if reps.is_none() && weight.is_none() {
                warn("nothing to change, pass --reps and/or --weight");
                return Ok(());
            }

            let (exercise_id, set_id) = resolve_set(&manager, exercise, set)?;
            if let Some(w) = weight {
                manager.update_set(&exercise_id, &set_id, SetField::Weight(w))?;
            }
            if let Some(r) = reps {
                manager.update_set(&exercise_id, &set_id, SetField::Reps(r))?;
            }
            store.save_active(&manager).await?;

            let updated = manager
                .active()
                .and_then(|a| a.session.exercise(&exercise_id))
                .and_then(|e| e.sets.iter().find(|s| s.id == set_id));
            emit(fmt, &updated, || {
                if let Some(s) = updated {
                    ok(format!("set {}.{} → {} x {}", exercise, set, load_label(s.weight, s.is_bodyweight), s.reps));
                }
            })?;
        }

        SessionCmd::Bw { exercise, set } => {
            let (exercise_id, set_id) = resolve_set(&manager, exercise, set)?;
            let bodyweight = manager.toggle_bodyweight(&exercise_id, &set_id)?;
            store.save_active(&manager).await?;

            emit(fmt, &serde_json::json!({ "isBodyweight": bodyweight }), || {
                let state = if bodyweight { "bodyweight" } else { "weighted" };
                ok(format!("set {}.{} is now {}", exercise, set, state.bold()))
            })?;
        }

        SessionCmd::Done { exercise, set } => {
            let (exercise_id, set_id) = resolve_set(&manager, exercise, set)?;
            let completed = manager.toggle_set_complete(&exercise_id, &set_id)?;
            store.save_active(&manager).await?;

            emit(fmt, &serde_json::json!({ "completed": completed }), || {
                if completed {
                    ok(format!("set {}.{} {}", exercise, set, "done".green()))
                } else {
                    ok(format!("set {}.{} {}", exercise, set, "reopened".yellow()))
                }
            })?;
        }

        SessionCmd::RmEx { exercise } => {
            let (exercise_id, _) = resolve(&manager, exercise, None)?;
            let removed = manager.remove_exercise(&exercise_id)?;
            store.save_active(&manager).await?;

            emit(fmt, &removed, || ok(format!("removed {} from the session", removed.name.bold())))?;
        }

        SessionCmd::Show => {
            let Some(active) = manager.active() else {
                emit(fmt, &Option::<()>::None, || warn("no active session, start one with `session start <TYPE>`"))?;
                return Ok(());
            };
            let state = store.load_state().await;
            let elapsed = active.elapsed_seconds(Local::now());

            let json = ActiveJson {
                session: &active.session,
                started_at: active.started_at,
                elapsed_seconds: elapsed,
                volume: session_volume(&active.session),
            };
            emit(fmt, &json, || {
                println!(
                    "{} {} (started {}, elapsed {})",
                    "Session:".cyan().bold(),
                    paint_type(&active.session.workout_type, &state.available_types),
                    active.started_at.format("%Y-%m-%d %H:%M"),
                    format_elapsed(elapsed).bold()
                );
                print_exercises(&active.session.exercises);
                println!(
                    "{} {} sets, {} volume",
                    "Total:".cyan().bold(),
                    active.session.set_count(),
                    format_kg(json.volume)
                );
            })?;
        }

        SessionCmd::Watch => watch(store, &manager, fmt).await?,

        SessionCmd::Finish => {
            let mut state = store.load_state().await;
            let finished = manager.finish(&mut state.workouts, Local::now())?.clone();
            store
                .save_with_active(&state, &[Collection::Workouts], &manager)
                .await?;

            emit(fmt, &finished, || {
                ok(format!(
                    "{} session saved -- {} exercises, {} sets, {} volume in {}",
                    paint_type(&finished.workout_type, &state.available_types),
                    finished.exercises.len(),
                    finished.set_count(),
                    format_kg(session_volume(&finished)),
                    format_minutes(finished.duration.unwrap_or(0))
                ))
            })?;
        }

        SessionCmd::Cancel => match manager.cancel() {
            Some(dropped) => {
                store.save_active(&manager).await?;
                emit(fmt, &dropped, || {
                    ok(format!("cancelled {} session, nothing recorded", dropped.workout_type.bold()))
                })?;
            }
            None => emit(fmt, &Option::<()>::None, || warn("no active session"))?,
        },
    }

    Ok(())
}

/// Redraws the elapsed time once per second until the session ends
/// (here or from another terminal) or Ctrl-C.
async fn watch(store: &Store, manager: &SessionManager, fmt: OutputFmt) -> Result<()> {
    let Some(watched) = manager.active() else {
        warn("no active session");
        return Ok(());
    };
    let id = watched.session.id.clone();

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let current = store.load_active().await;
                let Some(active) = current.active().filter(|a| a.session.id == id) else {
                    if fmt == OutputFmt::Pretty {
                        println!();
                        info("session is no longer active");
                    }
                    break;
                };

                let elapsed = active.elapsed_seconds(Local::now());
                match fmt {
                    OutputFmt::Json => println!("{}", serde_json::json!({ "elapsedSeconds": elapsed })),
                    OutputFmt::Pretty => {
                        print!(
                            "\r{} {} {}  {} sets done ",
                            "⏱".cyan(),
                            active.session.workout_type.bold(),
                            format_elapsed(elapsed).bold(),
                            active.session.exercises.iter().flat_map(|e| &e.sets).filter(|s| s.completed).count()
                        );
                        std::io::stdout().flush()?;
                    }
                }
            }
            res = &mut ctrl_c => {
                res?;
                debug!("watch interrupted");
                if fmt == OutputFmt::Pretty {
                    println!();
                }
                break;
            }
        }
    }

    Ok(())
}

fn load_label(weight: f64, bodyweight: bool) -> String {
    if bodyweight { "BW".to_string() } else { format_kg(weight) }
}

pub fn print_exercises(exercises: &[ExerciseEntry]) {
    if exercises.is_empty() {
        println!("{}", "  (no exercises yet)".dimmed());
        return;
    }

    for (i, ex) in exercises.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).yellow(), ex.name.bold());
        for (j, set) in ex.sets.iter().enumerate() {
            let mark = if set.completed { "✓".green() } else { "·".dimmed() };
            let one_rm = estimated_1rm(set.effective_weight(), set.reps);
            let rm = if one_rm > 0.0 {
                format!("e1RM {}", format_kg(one_rm)).dimmed().to_string()
            } else {
                String::new()
            };
            println!(
                "     {} {} {:>7} x {:<3} {}",
                mark,
                format!("{}.{}", i + 1, j + 1).dimmed(),
                load_label(set.weight, set.is_bodyweight),
                set.reps,
                rm
            );
        }
    }
}

fn type_labels(presets: &[WorkoutTypePreset]) -> Vec<String> {
    presets.iter().map(|t| t.label.clone()).collect()
}
