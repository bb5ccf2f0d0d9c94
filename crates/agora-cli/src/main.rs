// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

use agora_core::auth::{Anonymous, StaticToken, SyncOutcome, TokenProvider, UserSync};
use agora_core::route::{self, DiscoverRoute};
use agora_core::{view, ApiError, Config, ConfigManager, DiscoverController, LotFilter};
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the Agora API
    #[arg(long, env = "AGORA_API_URL")]
    api_url: Option<String>,

    /// Alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List parking lots with the current selection
    Discover {
        /// all, available or underutilized
        #[arg(short, long, default_value = "all")]
        filter: LotFilter,
        /// Select a lot from the filtered list
        #[arg(short, long)]
        select: Option<i64>,
        /// Also print the map markers
        #[arg(long)]
        markers: bool,
    },
    /// Show one parking lot and its project
    Show { id: String },
    /// Request a crowdfunding project for a parking lot
    RequestProject { id: String },
    /// Link the signed-in wallet identity to a backend user
    SyncUser {
        /// Bearer token from the auth provider
        #[arg(long, env = "AGORA_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// Print the resolved configuration
    Config {
        /// Write the defaults to the config file if it does not exist
        #[arg(long)]
        init: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let manager = match &cli.config {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::default(),
    };
    let mut config = manager.load()?;
    config.apply_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    match cli.command {
        Commands::Discover {
            filter,
            select,
            markers,
        } => discover(&config, filter, select, markers),
        Commands::Show { id } => show(&config, &id),
        Commands::RequestProject { id } => request_project(&config, &id),
        Commands::SyncUser { token } => sync_user(&config, token),
        Commands::Config { init } => {
            if init && !manager.path().exists() {
                manager.save(&Config::default())?;
                println!("Wrote default config to {}", manager.path().display());
            }
            println!("# {}", manager.path().display());
            println!("{}", config.to_display_json()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn fail(err: &ApiError) -> Result<ExitCode> {
    log::error!("{}", err);
    eprint!("{}", view::render_error(&err.user_message()));
    Ok(ExitCode::FAILURE)
}

fn discover(config: &Config, filter: LotFilter, select: Option<i64>, markers: bool) -> Result<ExitCode> {
    let client = agora_core::connect(config)?;
    let lots = match client.parking_lots() {
        Ok(lots) => lots,
        Err(e) => return fail(&e),
    };

    let mut controller = DiscoverController::new(lots.to_vec(), filter, config.underutilized);
    if let Some(id) = select {
        if let Err(e) = controller.select_lot(id) {
            eprintln!("{}", e);
        }
    }

    let snapshot = controller.snapshot();
    println!("{}", DiscoverRoute { filter }.path());
    print!("{}", view::render_discover(&snapshot));
    if markers {
        println!("\nMap markers:");
        print!("{}", view::render_markers(&snapshot));
    }
    Ok(ExitCode::SUCCESS)
}

fn show(config: &Config, raw_id: &str) -> Result<ExitCode> {
    let id = match route::parse_lot_id(raw_id) {
        Ok(id) => id,
        Err(e) => {
            eprint!("{}", view::render_error(e.user_message()));
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = agora_core::connect(config)?;
    let detail = match client.parking_lot(id) {
        Ok(detail) => detail,
        Err(e) => return fail(&e),
    };
    let project = match client.project_for_parking_lot(id) {
        Ok(project) => project,
        Err(e) => return fail(&e),
    };

    print!("{}", view::render_detail(&detail, (*project).as_ref()));
    Ok(ExitCode::SUCCESS)
}

fn request_project(config: &Config, raw_id: &str) -> Result<ExitCode> {
    let id = match route::parse_lot_id(raw_id) {
        Ok(id) => id,
        Err(e) => {
            eprint!("{}", view::render_error(e.user_message()));
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = agora_core::connect(config)?;
    if let Err(e) = client.request_project(id) {
        return fail(&e);
    }
    match client.project_for_parking_lot(id) {
        Ok(project) => {
            println!("Project requested for parking lot {}.", id);
            if let Some(project) = (*project).as_ref() {
                println!(
                    "{} — status: {}",
                    project.name,
                    project.status.as_deref().unwrap_or("pending")
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => fail(&e),
    }
}

fn sync_user(config: &Config, token: Option<String>) -> Result<ExitCode> {
    let client = agora_core::connect(config)?;
    let provider: Box<dyn TokenProvider> = match token.or_else(|| config.access_token.clone()) {
        Some(token) => Box::new(StaticToken::new(token)),
        None => Box::new(Anonymous),
    };

    let mut sync = UserSync::new();
    match sync.sync(client.api(), provider.as_ref()) {
        SyncOutcome::Synced | SyncOutcome::AlreadySynced => {
            println!("User synced to backend.");
            Ok(ExitCode::SUCCESS)
        }
        SyncOutcome::SignedOut | SyncOutcome::NoToken => {
            eprintln!("Not signed in. Pass --token or set AGORA_ACCESS_TOKEN.");
            Ok(ExitCode::FAILURE)
        }
        SyncOutcome::Failed => {
            eprintln!("Could not sync user to backend; see log output.");
            Ok(ExitCode::FAILURE)
        }
    }
}
