//! Notifier CLI.

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "notifier")]
#[command(about = "Push notification targeting and dispatch", long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults are used when omitted)
    #[arg(long, env = "NOTIFIER_CONFIG")]
    config: Option<String>,

    /// Database URL, overrides the configuration file
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single scheduling pass now
    RunOnce,
    /// Run scheduling passes on the configured cadence
    Serve,
    /// Deliver queued notifications
    Worker,
    /// Apply database migrations
    Migrate,
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "notifier.kdl")]
        path: String,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Commands::Validate { path } = &cli.command {
        return commands::validate(path);
    }

    let config = commands::load_config(cli.config.as_deref(), cli.database_url)?;

    match cli.command {
        Commands::RunOnce => commands::schedule::run_once(&config).await?,
        Commands::Serve => commands::schedule::serve(&config).await?,
        Commands::Worker => commands::worker::run(&config).await?,
        Commands::Migrate => commands::migrate(&config).await?,
        Commands::Validate { .. } => {}
    }

    Ok(())
}
