use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use gymtracker::{OutputFmt, config::Config, emit};

use super::{info, warn};
use crate::cli::ConfigCmd;

pub fn handle(cmd: ConfigCmd, mut cfg: Config, config_path: &Path, fmt: OutputFmt) -> Result<()> {
    match cmd {
        ConfigCmd::List => {
            emit(fmt, &cfg.map, || {
                if cfg.map.is_empty() {
                    println!("{}", "(no config set)".dimmed());
                } else {
                    println!("{}", "Config:".cyan().bold());
                    for (k, v) in &cfg.map {
                        println!("  {} = {}", k.green(), v);
                    }
                }
            })?;
        }

        ConfigCmd::Get { key } => match cfg.map.get(&key) {
            Some(val) => emit(fmt, val, || println!("{}", val))?,
            None => warn(format!("key `{}` not found", key)),
        },

        ConfigCmd::Set { key, val } => {
            cfg.map.insert(key.clone(), val.clone());
            cfg.save(config_path)?;
            info(format!("set `{}` = `{}`", key.green(), val));
        }

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(config_path)?;
                info(format!("removed `{}`", key.green()));
            } else {
                warn(format!("key `{}` not found", key));
            }
        }
    }

    Ok(())
}
