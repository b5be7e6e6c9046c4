use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use gymtracker::{
    OutputFmt,
    config::{self, Config},
    db,
    storage::Store,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                let error_json = serde_json::json!({
                    "error": true,
                    "message": format!("{e:#}"),
                });
                println!("{}", serde_json::to_string(&error_json).unwrap_or_default());
            } else {
                eprintln!("{} {:#}", "error:".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let fmt = if cli.json { OutputFmt::Json } else { OutputFmt::Pretty };
    let config_path = config::config_path()?;
    let cfg = Config::load(&config_path)?;

    if let Commands::Config(cmd) = cli.cmd {
        return commands::config::handle(cmd, cfg, &config_path, fmt);
    }

    let db_path = cfg.db_path(cli.db.as_deref())?;
    let store = Store::new(db::open(&db_path).await?);

    match cli.cmd {
        Commands::Session(cmd) => commands::session::handle(cmd, &store, fmt).await?,
        Commands::History(cmd) => commands::history::handle(cmd, &store, fmt).await?,
        Commands::Stats(cmd) => commands::stats::handle(cmd, &store, fmt).await?,
        Commands::Summary { period, date, shift } => {
            commands::summary::handle(&store, period, date, shift, fmt).await?
        }
        Commands::Status { range, graph } => commands::status::handle(&store, range, graph, fmt).await?,
        Commands::Calendar { year, month } => commands::calendar::handle(&store, year, month, fmt).await?,
        Commands::Exercise(cmd) => commands::exercise::handle(cmd, &store, fmt).await?,
        Commands::Type(cmd) => commands::types::handle(cmd, &store, fmt).await?,
        Commands::Goal(cmd) => commands::goal::handle(cmd, &store, fmt).await?,
        Commands::Profile(cmd) => commands::profile::handle(cmd, &store, fmt).await?,
        Commands::Db(cmd) => commands::db::handle(cmd, &store, &cfg, fmt).await?,
        Commands::Config(_) => {}
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn,gymtracker=info",
        1 => "info,gymtracker=debug",
        2 => "debug,gymtracker=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
