use anyhow::{Context, Result};
use chrono::{Local, Utc};
use colored::Colorize;
use gymtracker::{
    OutputFmt,
    config::Config,
    emit,
    storage::{Store, backup_file_name, render_backup},
};

use super::{info, ok};
use crate::cli::DbCmd;

pub async fn handle(cmd: DbCmd, store: &Store, cfg: &Config, fmt: OutputFmt) -> Result<()> {
    match cmd {
        DbCmd::Export { file } => {
            let state = store.load_state().await;
            let path = file.unwrap_or_else(|| cfg.export_dir().join(backup_file_name(Local::now().date_naive())));

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            let doc = render_backup(&state, Utc::now())?;
            tokio::fs::write(&path, doc)
                .await
                .with_context(|| format!("Failed to write backup to {}", path.display()))?;

            let json = serde_json::json!({
                "file": path.display().to_string(),
                "workouts": state.workouts.len(),
            });
            emit(fmt, &json, || {
                ok(format!(
                    "exported {} sessions to {}",
                    state.workouts.len(),
                    path.display().to_string().green()
                ))
            })?;
        }

        DbCmd::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Could not read file: `{}`", file.display()))?;

            let mut state = store.load_state().await;
            let replaced = store
                .import(&mut state, &raw)
                .await
                .context("Import aborted, nothing was changed")?;

            let fields: Vec<&str> = replaced.iter().map(|c| c.backup_field()).collect();
            emit(fmt, &serde_json::json!({ "replaced": fields }), || {
                if fields.is_empty() {
                    info("backup contained no known collections, nothing changed");
                } else {
                    ok(format!("imported {}", fields.join(", ").bold()));
                    println!(
                        "  {} sessions, {} types, {} exercises, {} goals",
                        state.workouts.len(),
                        state.available_types.len(),
                        state.suggested_exercises.len(),
                        state.daily_goals.len()
                    );
                }
            })?;
        }
    }

    Ok(())
}
