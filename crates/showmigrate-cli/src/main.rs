use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, migrate};
use showmigrate_config::{Config, PathManager};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "showmigrate")]
#[command(about = "Migrate your watched TV history from Trakt to Serializd")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy watched shows from Trakt to Serializd
    #[command(long_about = "Read every watched show from Trakt and log it on Serializd. Fully watched seasons are marked watched as a whole; partially watched seasons have their episodes logged individually.")]
    Migrate {
        /// Plan the migration without writing anything to Serializd.
        /// The plan is written as JSON to PATH, or to the data directory if no path is given.
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        dry_run: Option<Option<PathBuf>>,

        /// Don't ask for confirmation before writing
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,

        /// Pause between requests in milliseconds (overrides the configured value)
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,

        /// Write the migration log to this file instead of the default location
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,
    },
    /// Configure credentials and settings
    #[command(long_about = "Manage configuration and credentials for showmigrate. Use subcommands to view or modify settings for Trakt, Serializd, and migration pacing.")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear stored credentials or logs
    #[command(long_about = "Clear stored credentials or migration logs. Use --credentials to remove saved tokens and passwords, --logs to remove the migration log, or --all to clear both.")]
    Clear {
        /// Clear credentials and logs
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["credentials", "logs"])]
        all: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,

        /// Clear migration logs
        #[arg(long, action = ArgAction::SetTrue)]
        logs: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    #[command(long_about = "Display the current configuration. Client secrets and stored credentials are masked unless --full is given.")]
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure Trakt (device authorization)
    #[command(long_about = "Configure Trakt API credentials and authorize this device. You'll need to create a Trakt API application at https://trakt.tv/oauth/applications first.")]
    Trakt {
        /// Trakt Client ID (if not provided, will prompt)
        #[arg(long)]
        client_id: Option<String>,

        /// Trakt Client Secret (if not provided, will prompt)
        #[arg(long)]
        client_secret: Option<String>,
    },

    /// Configure Serializd credentials
    #[command(long_about = "Configure the Serializd account email and password. The password is stored in the credentials file and verified with a login.")]
    Serializd {
        /// Serializd account email (if not provided, will prompt)
        #[arg(long)]
        email: Option<String>,
    },

    /// Configure migration pacing
    Migration {
        /// Pause between requests in milliseconds (if not provided, will prompt)
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

/// The migrate flag wins, then the configured path, then the default log directory
fn resolve_log_file(cli_log_file: Option<PathBuf>) -> PathBuf {
    let path_manager = PathManager::default();
    cli_log_file
        .or_else(|| {
            Config::load_or_default(&path_manager.config_file())
                .ok()
                .and_then(|c| c.migration.log_file)
        })
        .unwrap_or_else(|| path_manager.migration_log_file())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Migrate { log_file, .. } => resolve_log_file(log_file.clone()),
        _ => resolve_log_file(None),
    };
    let _log_guard = logging::init_logging(cli.verbose, cli.quiet, &log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let command = async {
        match cli.command {
            Commands::Migrate { dry_run, yes, delay_ms, log_file: _ } => {
                let args = migrate::MigrateArgs {
                    dry_run: dry_run.is_some(),
                    plan_file: dry_run.flatten(),
                    yes,
                    delay_ms,
                };
                migrate::run_migrate(args, &output).await
            }
            Commands::Config { cmd } => config::run_config(cmd, &output).await,
            Commands::Clear { all, credentials, logs } => clear::run_clear(all, credentials, logs, &log_file, &output),
        }
    };

    tokio::select! {
        result = command => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted by user");
            output.warn("Migration cancelled by user.");
            Ok(())
        }
    }
}
