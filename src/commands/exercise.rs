use anyhow::Result;
use colored::Colorize;
use gymtracker::{
    OutputFmt, emit,
    models::ExerciseCatalogEntry,
    stats::filter_catalog,
    storage::{Collection, Store},
    types::{CategoryFilter, closest_label},
};
use serde::Serialize;

use super::{ok, position_of, print_aligned, warn};
use crate::cli::ExerciseCmd;

#[derive(Serialize)]
struct ExJson<'a> {
    idx: usize,
    #[serde(flatten)]
    entry: &'a ExerciseCatalogEntry,
}

pub async fn handle(cmd: ExerciseCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let mut state = store.load_state().await;

    match cmd {
        ExerciseCmd::List { category } => {
            // Indices always refer to the unfiltered catalog so `ex delete` agrees.
            let rows: Vec<ExJson> = filter_catalog(&state.suggested_exercises, category)
                .into_iter()
                .map(|(i, entry)| ExJson { idx: i + 1, entry })
                .collect();

            emit(fmt, &rows, || {
                match category {
                    CategoryFilter::All => println!("{}", "Exercises:".cyan().bold()),
                    other => println!(
                        "{} {}",
                        "Exercises:".cyan().bold(),
                        format!("({:?})", other).to_lowercase().dimmed()
                    ),
                }

                let idx_w = rows.iter().map(|r| r.idx.to_string().len()).max().unwrap_or(1);
                let lines = rows
                    .iter()
                    .map(|r| {
                        (
                            format!(" {} • {}", format!("{:>idx_w$}", r.idx).yellow(), r.entry.name.bold()),
                            r.entry.category.to_string().yellow().to_string(),
                        )
                    })
                    .collect();
                print_aligned(lines);

                if rows.is_empty() {
                    println!("{}", "  (no exercises found)".dimmed());
                }
            })?;
        }

        ExerciseCmd::Delete { exercise } => {
            let query = exercise.join(" ");
            let Some(idx) = position_of(&state.suggested_exercises, &query, |e| e.name.as_str()) else {
                let names: Vec<String> = state.suggested_exercises.iter().map(|e| e.name.clone()).collect();
                match closest_label(&query, &names) {
                    Some(sug) => warn(format!("no such exercise `{}` -- did you mean: `{}`?", query, sug.green())),
                    None => warn(format!("no such exercise `{}`", query)),
                }
                return Ok(());
            };

            let name = state.suggested_exercises[idx].name.clone();
            state.delete_catalog_entry(&name);
            store.save(&state, Collection::Exercises).await?;

            emit(fmt, &serde_json::json!({ "deleted": name }), || {
                ok(format!("deleted exercise `{}` (past sessions keep it)", name))
            })?;
        }
    }

    Ok(())
}
