use anyhow::{Result, bail};
use chrono::Local;
use colored::Colorize;
use gymtracker::{
    OutputFmt,
    collections::ProfileUpdate,
    emit,
    models::UserProfile,
    stats::{BodyMetrics, body_metrics},
    storage::{Collection, Store},
    utils::format_kg,
};
use serde::Serialize;

use super::{ok, warn};
use crate::cli::ProfileCmd;

#[derive(Serialize)]
struct ProfileJson<'a> {
    #[serde(flatten)]
    profile: &'a UserProfile,
    #[serde(flatten)]
    metrics: BodyMetrics,
}

fn print_profile(profile: &UserProfile, metrics: BodyMetrics) {
    println!("{}", "Profile:".cyan().bold());
    println!("  {:<8} {}", "gender".dimmed(), profile.gender);
    println!("  {:<8} {}", "age".dimmed(), profile.age);
    println!("  {:<8} {}", "weight".dimmed(), format_kg(profile.weight));
    println!("  {:<8} {} cm", "height".dimmed(), profile.height);
    println!();
    println!("{}: {:.1}", "BMI".cyan().bold(), metrics.bmi);
    println!("{}: {:.0} kcal/day", "BMR".cyan().bold(), metrics.bmr);
}

pub async fn handle(cmd: ProfileCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let mut state = store.load_state().await;

    match cmd {
        ProfileCmd::Show => {
            let metrics = body_metrics(&state.user_profile);
            let json = ProfileJson {
                profile: &state.user_profile,
                metrics,
            };
            emit(fmt, &json, || print_profile(&state.user_profile, metrics))?;
        }

        ProfileCmd::Set { gender, age, weight, height } => {
            let update = ProfileUpdate { gender, age, weight, height };
            if update.is_empty() {
                warn("nothing to change, pass at least one of --gender, --age, --weight, --height");
                return Ok(());
            }
            if !update.has_valid_measures() {
                bail!("weight and height must be finite, non-negative numbers");
            }

            let logged = state.update_profile(update, Local::now().date_naive());
            if logged {
                store.save_many(&state, &[Collection::Profile, Collection::WeightLog]).await?;
            } else {
                store.save(&state, Collection::Profile).await?;
            }

            let metrics = body_metrics(&state.user_profile);
            let json = ProfileJson {
                profile: &state.user_profile,
                metrics,
            };
            emit(fmt, &json, || {
                ok("profile updated");
                if logged {
                    ok(format!("weight {} logged for today", format_kg(state.user_profile.weight)));
                }
                println!();
                print_profile(&state.user_profile, metrics);
            })?;
        }
    }

    Ok(())
}
