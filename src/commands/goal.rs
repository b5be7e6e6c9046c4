use anyhow::Result;
use colored::Colorize;
use gymtracker::{
    OutputFmt, emit,
    storage::{Collection, Store},
};

use super::{ok, pick, warn};
use crate::cli::GoalCmd;

pub async fn handle(cmd: GoalCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let mut state = store.load_state().await;

    match cmd {
        GoalCmd::List => {
            emit(fmt, &state.daily_goals, || {
                let done = state.daily_goals.iter().filter(|g| g.completed).count();
                println!("{} ({}/{})", "Daily goals:".cyan().bold(), done, state.daily_goals.len());
                if state.daily_goals.is_empty() {
                    println!("{}", "  (no goals, add one with `goal add`)".dimmed());
                }
                for (i, g) in state.daily_goals.iter().enumerate() {
                    let mark = if g.completed { "✓".green() } else { "○".dimmed() };
                    let label = if g.completed { g.label.dimmed() } else { g.label.normal() };
                    println!(" {} {} {}", (i + 1).to_string().yellow(), mark, label);
                }
            })?;
        }

        GoalCmd::Add { label } => {
            let label = label.join(" ");
            let Some(goal) = state.add_goal(&label).cloned() else {
                warn("goal label must not be blank");
                return Ok(());
            };
            store.save(&state, Collection::Goals).await?;

            emit(fmt, &goal, || ok(format!("added goal {}", goal.label.bold())))?;
        }

        GoalCmd::Toggle { goal } => {
            let id = pick(&state.daily_goals, goal, "goal")?.id.clone();
            let Some(completed) = state.toggle_goal(&id) else {
                return Ok(());
            };
            store.save(&state, Collection::Goals).await?;

            emit(fmt, &serde_json::json!({ "goal": goal, "completed": completed }), || {
                let label = &state.daily_goals[goal - 1].label;
                if completed {
                    ok(format!("{} {}", "✓".green(), label))
                } else {
                    ok(format!("{} unchecked", label))
                }
            })?;
        }

        GoalCmd::Delete { goal } => {
            let id = pick(&state.daily_goals, goal, "goal")?.id.clone();
            let Some(removed) = state.delete_goal(&id) else {
                return Ok(());
            };
            store.save(&state, Collection::Goals).await?;

            emit(fmt, &removed, || ok(format!("deleted goal `{}`", removed.label)))?;
        }
    }

    Ok(())
}
