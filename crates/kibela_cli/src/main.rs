//! Kibela sync CLI
//!
//! Keeps a directory of Markdown files in sync with Kibela notes.
//!
//! # Commands
//!
//! - `pull` - Write every note to the sync directory
//! - `push` - Send a pulled file back as an update
//! - `publish` - Create a new note from a file or stdin
//! - `version` - Show version information

mod commands;
mod config;
mod error;

use clap::{Parser, Subcommand};
use config::{Options, API_KEY_VAR, DEFAULT_DIR};
use error::CliResult;
use kibela_sync_engine::SyncEngine;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Sync Kibela notes with local Markdown files.
#[derive(Parser)]
#[command(name = "kibela")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Team name (the subdomain of <team>.kibe.la)
    #[arg(global = true, long, env = "KIBELA_TEAM")]
    team: Option<String>,

    /// Access token
    #[arg(global = true, long, env = "KIBELA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory holding the synced files
    #[arg(global = true, short, long, env = "KIBELA_DIR", default_value = DEFAULT_DIR)]
    dir: PathBuf,

    /// Notes requested per page
    #[arg(global = true, long)]
    page_size: Option<u32>,

    /// Request timeout in seconds
    #[arg(global = true, long)]
    timeout: Option<u64>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every remote note into the sync directory
    Pull,

    /// Update a note from a previously pulled file
    Push {
        /// File to push
        file: PathBuf,
    },

    /// Create a new note
    Publish {
        /// Read the note from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Pull => "pull",
            Commands::Push { .. } => "push",
            Commands::Publish { .. } => "publish",
            Commands::Version => "version",
        }
    }
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            team: self.team.clone(),
            token: self.token.clone(),
            api_key: std::env::var(API_KEY_VAR).ok(),
            dir: self.dir.clone(),
            page_size: self.page_size,
            timeout_secs: self.timeout,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", e.render());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut out = io::stdout().lock();

    if let Commands::Version = cli.command {
        writeln!(out, "kibela v{}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "kibela_sync_engine v{}", kibela_sync_engine::VERSION)?;
        return Ok(());
    }

    // Validate input before touching credentials or the network.
    let content = match &cli.command {
        Commands::Publish { file } => Some(commands::publish::read_input(
            file.as_deref(),
            io::stdin().lock(),
        )?),
        _ => None,
    };

    let config = cli.options().resolve()?;
    debug!(?config, "resolved configuration");
    info!(
        command = cli.command.name(),
        team = %config.team,
        directory = %config.directory().display(),
        "running command"
    );
    let engine = SyncEngine::connect(config)?;
    match cli.command {
        Commands::Pull => commands::pull::run(&engine, &mut out),
        Commands::Push { file } => commands::push::run(&engine, &file, &mut out),
        Commands::Publish { .. } => {
            commands::publish::run(&engine, content.as_deref().unwrap_or_default(), &mut out)
        }
        Commands::Version => Ok(()),
    }
}
