use anyhow::Result;
use colored::Colorize;
use gymtracker::{
    OutputFmt,
    collections::TypeRemoval,
    emit,
    storage::{Collection, Store},
};

use super::{ok, paint_type, position_of, warn};
use crate::cli::TypeCmd;

pub async fn handle(cmd: TypeCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let mut state = store.load_state().await;

    match cmd {
        TypeCmd::List => {
            emit(fmt, &state.available_types, || {
                println!("{}", "Workout types:".cyan().bold());
                for (i, t) in state.available_types.iter().enumerate() {
                    let tag = if t.is_custom { "custom" } else { "built-in" };
                    println!(
                        " {} • {} {}",
                        (i + 1).to_string().yellow(),
                        paint_type(&t.label, &state.available_types),
                        tag.dimmed()
                    );
                }
            })?;
        }

        TypeCmd::Add { label } => {
            let Some(created) = state.add_custom_type(&label).cloned() else {
                if label.trim().is_empty() {
                    warn("type label must not be blank");
                } else {
                    warn(format!("type `{}` already exists", label.trim()));
                }
                return Ok(());
            };
            store.save(&state, Collection::Types).await?;

            emit(fmt, &created, || ok(format!("added type {}", created.label.bold())))?;
        }

        TypeCmd::Delete { workout_type } => {
            let Some(idx) = position_of(&state.available_types, &workout_type, |t| t.label.as_str()) else {
                warn(format!("no such type `{}`", workout_type));
                return Ok(());
            };
            let label = state.available_types[idx].label.clone();

            match state.delete_type(&label) {
                TypeRemoval::Removed => {
                    store.save(&state, Collection::Types).await?;
                    emit(fmt, &serde_json::json!({ "deleted": label }), || {
                        ok(format!("deleted type `{}` (past sessions keep their label)", label))
                    })?;
                }
                TypeRemoval::BuiltIn => warn(format!("`{}` is a built-in type and cannot be deleted", label)),
                TypeRemoval::NotFound => warn(format!("no such type `{}`", label)),
            }
        }
    }

    Ok(())
}
