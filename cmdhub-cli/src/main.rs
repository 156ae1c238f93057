//! cmdhub CLI — builtin commands plus commands from installed packages.
//!
//! Builtins are handled in-process; any other command name is looked up in
//! the registry and dispatched to the package that provides it.

mod commands;
mod dispatch;
mod presenter;
mod update;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// cmdhub: one entry point for your command packages
#[derive(Parser, Debug)]
#[command(name = "cmdhub", version, about, long_about = None, disable_help_subcommand = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Displays help information
    Help {
        /// Command to describe
        command: Option<String>,
        /// Sub-command to describe
        sub_command: Option<String>,
    },
    /// Displays available commands
    List {
        /// Print the command registry as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Install packages from local package directories
    #[command(alias = "get")]
    Install {
        /// Package directories
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
        /// Add the directory even if it does not contain a valid package
        #[arg(long)]
        force: bool,
    },
    /// Search installed commands by name, alias, or description
    Search {
        /// Keywords to match
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Uninstall package containing <command>
    Uninstall {
        /// Commands whose packages should be removed
        #[arg(required = true)]
        commands: Vec<String>,
    },
    /// Update one or more commands. If no command is specified, all commands are updated
    Update {
        /// Commands whose packages should be updated
        commands: Vec<String>,
        /// Continue updating remaining packages when one fails
        #[arg(long)]
        force: bool,
    },
    /// Upgrade cmdhub to the latest version
    #[command(hide = true)]
    Upgrade,
    /// Commands provided by installed packages
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print a setting
    Get {
        /// Setting as <section>.<key>
        setting: String,
    },
    /// Change a setting
    Set {
        /// Setting as <section>.<key>
        setting: String,
        /// New value
        value: String,
    },
    /// List settings
    List {
        /// Only list this section
        section: Option<String>,
    },
    /// Remove a setting
    #[command(alias = "rm")]
    Unset {
        /// Setting as <section>.<key>
        setting: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "cmdhub", "cmdhub")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "cmdhub.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let command = match cli.command {
        Some(Commands::Config { action }) => {
            return commands::handle_config_command(cli.config.as_deref(), action);
        }
        other => other,
    };

    let app = commands::App::load(cli.config, !cli.no_color)?;

    match command {
        Some(command) => commands::handle_command(command, &app),
        None => {
            commands::handle_command(Commands::Help { command: None, sub_command: None }, &app)
        }
    }
}
