use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use newswire::web::AppState;
use newswire::{Config, Database, IngestionOrchestrator, NewswireError, WebServer};

#[derive(Parser, Debug)]
#[command(name = "newswire")]
#[command(about = "Ingests public channel preview pages into a deduplicated news store")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Run one ingestion pass and print the summary as JSON
    Ingest {
        /// Most recent posts to take per source (defaults to the configured window)
        #[arg(short, long)]
        window: Option<usize>,
    },
}

fn load_config(path: &Path) -> Result<Config, NewswireError> {
    match Config::load_with_env(path) {
        Ok(config) => Ok(config),
        Err(NewswireError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!(
                "Config file {} not found, using default configuration.",
                path.display()
            );
            let mut config = Config::default();
            config.apply_env_overrides();
            Ok(config)
        }
        Err(e) => Err(e),
    }
}

async fn run(command: Command, config: Config) -> Result<(), NewswireError> {
    config.validate()?;
    let db = Database::open(&config.database.path).await?;

    match command {
        Command::Serve => {
            let state = AppState::from_config(db, &config.ingest)?;
            let server = WebServer::new(&config.web, state)?;
            info!(
                "Serving {} channel(s) on {}",
                config.ingest.sources.len(),
                server.addr()
            );
            server.run().await?;
        }
        Command::Ingest { window } => {
            let window = window
                .map(|w| config.ingest.check_window(w))
                .transpose()?;
            let orchestrator = IngestionOrchestrator::from_config(db, &config.ingest)?;
            let summary = orchestrator.run_pass(window).await;
            let json = serde_json::to_string_pretty(&summary)
                .map_err(|e| NewswireError::Validation(format!("summary encoding: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = newswire::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        newswire::logging::init_console_only(&config.logging.level);
    }

    info!("newswire {}", env!("CARGO_PKG_VERSION"));

    match run(cli.command.unwrap_or(Command::Serve), config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
