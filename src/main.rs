mod app;
mod features;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use app::App;
use cmdpanel_config::Config;
use cmdpanel_logger::{self as logger, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "cmdpanel", version, about = "Command registry, palette and menu host")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the in-memory log after the command finishes
    #[arg(long, global = true)]
    show_log: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List palette items grouped by category
    List,
    /// Search the palette
    Search {
        /// Search terms; every term must match
        query: Vec<String>,
    },
    /// Print the menu bar
    Menu,
    /// Execute commands in order
    Exec {
        /// Command ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Arguments passed to every command, as JSON
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };
    init_logger(&config);

    let mut app = App::new(config);
    app.activate_configured_features()?;
    logger::debug(format!(
        "Active features: {}",
        app.active_features().join(", ")
    ));

    let result = run(&app, cli.command.unwrap_or(Commands::List));

    if cli.show_log {
        for entry in logger::get_entries() {
            eprintln!(
                "[{}] {}: {}",
                entry.timestamp,
                entry.level.to_str(),
                entry.message
            );
        }
    }
    result
}

fn init_logger(config: &Config) {
    let settings = &config.logging;
    let file_path = match &settings.file_path {
        Some(path) => Some(PathBuf::from(path)),
        None => Config::default_log_file_path().ok(),
    };
    let min_level = settings.min_level.parse().unwrap_or(LogLevel::Info);

    logger::init(file_path, settings.max_entries, min_level);
    logger::debug(format!("Logger initialized at {:?}", min_level));
}

fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::List => print!("{}", app.palette_listing()),
        Commands::Search { query } => print!("{}", app.search_listing(&query.join(" "))),
        Commands::Menu => print!("{}", app.menu_listing()),
        Commands::Exec { ids, args } => {
            let args: Value = serde_json::from_str(&args).context("Invalid --args JSON")?;
            for id in ids {
                let result = app.execute(&id, &args)?;
                if !result.is_null() {
                    println!("{}: {}", id, result);
                }
            }
            let panels = app.panel_listing();
            if !panels.is_empty() {
                println!("Open panels:");
                print!("{}", panels);
            }
        }
    }
    Ok(())
}
