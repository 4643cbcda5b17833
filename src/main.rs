//! Paperboy - Hacker News reply notifier.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paperboy::commands::{self, App, CommandError};
use paperboy::config::ConfigLoader;
use paperboy::display;

#[derive(Parser)]
#[command(
    name = "paperboy",
    about = "Notifies you of replies to your Hacker News posts",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the notifier daemon until Ctrl-C.
    Run,
    /// Set the tracked username and refresh.
    User {
        /// Hacker News username.
        name: String,
    },
    /// Check for new replies now.
    Refresh,
    /// List stored replies.
    List,
    /// Dismiss one reply, or all of them.
    Clear {
        /// Id of the reply to dismiss.
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        post_id: Option<u64>,
        /// Dismiss every reply.
        #[arg(long)]
        all: bool,
    },
    /// Print daemon events as they happen.
    Watch,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn execute(app: &App, command: Commands) -> Result<(), CommandError> {
    match command {
        Commands::Run => commands::run_daemon(app).await,
        Commands::User { name } => commands::set_user(app, &name).await,
        Commands::Refresh => commands::refresh(app).await,
        Commands::List => commands::list(app).await,
        Commands::Clear { post_id, all } => {
            commands::clear(app, if all { None } else { post_id }).await
        }
        Commands::Watch => commands::watch(app).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loader = cli
        .config
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            display::print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, "Configuration loaded");

    let app = App::new(config);
    match execute(&app, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
