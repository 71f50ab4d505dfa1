//! Glucolink CLI - LibreLinkUp glucose readings from the terminal.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::Context;
use glucolink_config_and_utils::{init_logging, Config, Paths};
use std::path::PathBuf;
use tracing::debug;

/// Glucolink CLI - Sign in to LibreLinkUp and read shared glucose data.
#[derive(Parser)]
#[command(name = "glucolink")]
#[command(about = "LibreLinkUp client for authentication and glucose readings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the config value
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory for config, preferences and logs
    #[arg(long, env = "GLUCOLINK_HOME", global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login {
        /// Region to try first (e.g. eu, us, de); the server may redirect
        #[arg(short, long)]
        region: Option<String>,
        /// Do not keep the email and password in the secure store
        #[arg(long, conflicts_with = "saved")]
        no_remember: bool,
        /// Log in again with the saved email and password
        #[arg(long, conflicts_with = "region")]
        saved: bool,
    },

    /// Logout and clear session
    Logout {
        /// Also delete saved email and password
        #[arg(long)]
        forget: bool,
    },

    /// Check authentication status
    Status,

    /// Show the active patient connection
    Connection,

    /// Show the latest glucose reading
    Glucose,

    /// Manage local preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
}

#[derive(Subcommand)]
enum PrefsCommands {
    /// Show a preference
    Get {
        key: String,
    },
    /// Set a preference (JSON values are stored typed)
    Set {
        key: String,
        value: String,
    },
    /// Delete a preference
    Delete {
        key: String,
    },
    /// List preferences
    List,
    /// Remove every preference
    Clear,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = match cli.base_dir {
        Some(dir) => Paths::with_base_dir(dir),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level);
    debug!(base_dir = %paths.base_dir().display(), "cli starting");

    let ctx = Context {
        paths,
        config,
        format: cli.format,
    };

    match cli.command {
        Commands::Login {
            region,
            no_remember,
            saved,
        } => commands::login(&ctx, region.as_deref(), !no_remember, saved).await,
        Commands::Logout { forget } => commands::logout(&ctx, forget).await,
        Commands::Status => commands::status(&ctx).await,
        Commands::Connection => commands::connection(&ctx).await,
        Commands::Glucose => commands::glucose(&ctx).await,
        Commands::Prefs { command } => match command {
            PrefsCommands::Get { key } => commands::prefs_get(&ctx, &key).await,
            PrefsCommands::Set { key, value } => commands::prefs_set(&ctx, &key, &value).await,
            PrefsCommands::Delete { key } => commands::prefs_delete(&ctx, &key).await,
            PrefsCommands::List => commands::prefs_list(&ctx).await,
            PrefsCommands::Clear => commands::prefs_clear(&ctx).await,
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e), &format);
        std::process::exit(1);
    }
}
