use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chessgen::cli::{self, Context, GenerateArgs};
use chessgen::config;

#[derive(Debug, Parser)]
#[command(name = "chessgen")]
#[command(about = "Generate chess positions within an evaluation range")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate one position and show it
    Generate {
        /// Lower bound of the evaluation range, in centipawns
        #[arg(long, allow_hyphen_values = true)]
        min: Option<String>,
        /// Upper bound of the evaluation range, in centipawns
        #[arg(long, allow_hyphen_values = true)]
        max: Option<String>,
        /// Maximum number of random positions tried by the backend
        #[arg(long)]
        attempts: Option<String>,
        /// Copy the FEN to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Generate several positions and write them to a JSON file
    Batch {
        /// Number of positions to generate
        #[arg(long, default_value = "50")]
        count: usize,
        /// Output file
        #[arg(long, default_value = "positions.json")]
        output: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        min: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        max: Option<String>,
        #[arg(long)]
        attempts: Option<String>,
    },
    /// List previously generated positions
    History {
        /// Number of entries to show, newest first
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the navigation bar for a page
    Nav {
        /// Location path of the page
        #[arg(long, default_value = "/index.html")]
        path: String,
    },
    /// Log in with a username or email
    Login {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and clear local state
    Logout {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Show account statistics, or change the email or password
    Profile {
        /// New email address
        #[arg(long)]
        email: Option<String>,
        /// Change the password (prompts for the current and new one)
        #[arg(long)]
        password: bool,
    },
    /// Check the backend and local setup
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.chessgen/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `display.locale en`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

fn main() -> Result<ExitCode> {
    let app = App::parse();
    let loaded = config::load();

    init_tracing(&loaded.config.logging.level);
    loaded.log_skipped();
    let cfg = loaded.config;
    if !cfg.display.color {
        colored::control::set_override(false);
    }

    if let Commands::Config { action } = &app.command {
        match action {
            ConfigAction::Show => cli::run_config_show()?,
            ConfigAction::Init { force } => cli::run_config_init(*force)?,
            ConfigAction::Set { key, value } => cli::run_config_set(key, value)?,
            ConfigAction::Reset => cli::run_config_reset()?,
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut ctx = Context::new(cfg)?;

    match app.command {
        Commands::Generate {
            min,
            max,
            attempts,
            copy,
        } => {
            let args = GenerateArgs {
                target_min: min,
                target_max: max,
                max_attempts: attempts,
            };
            cli::run_generate(&ctx, &args, copy)
        }
        Commands::Batch {
            count,
            output,
            min,
            max,
            attempts,
        } => {
            let args = GenerateArgs {
                target_min: min,
                target_max: max,
                max_attempts: attempts,
            };
            cli::run_batch(&ctx, &args, count, &output)
        }
        Commands::History { limit, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(&ctx, limit, fmt)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Nav { path } => cli::run_nav(&ctx, &path),
        Commands::Login { username, password } => cli::run_login(&mut ctx, username, password),
        Commands::Register {
            username,
            email,
            password,
        } => cli::run_register(&mut ctx, username, email, password),
        Commands::Logout { yes } => cli::run_logout(&mut ctx, yes),
        Commands::Profile { email, password } => cli::run_profile(&mut ctx, email, password),
        Commands::Status => cli::run_status(&ctx),
        Commands::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

/// Diagnostics go to stderr. `RUST_LOG` wins, then `CHESSGEN_LOG`, then the
/// configured level.
fn init_tracing(configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("CHESSGEN_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(configured));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
