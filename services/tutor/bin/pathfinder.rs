//! Main Entrypoint for the PathFinder Tutor
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and command line.
//! 2. Initializing logging.
//! 3. Running the tutoring session on the terminal.
//! 4. Turning every fatal startup failure into a message and a clean exit.

use clap::Parser;
use pathfinder_core::console::{ConsoleError, StdConsole};
use pathfinder_tutor::{
    app::{self, StartupError},
    cli::Cli,
    config::{Config, ConfigError},
};
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(ConfigError::MissingVar(var)) => {
            println!("Error: The {var} environment variable is not set.");
            println!("Please ensure your key is correctly configured and restart your terminal.");
            return;
        }
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };
    cli.apply(&mut config);

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        lenient_errors = config.lenient_errors,
        "Configuration loaded"
    );

    // --- 3. Run ---
    let mut console = StdConsole::new();
    match app::run(&config, cli.subject.clone(), &mut console).await {
        Ok(score) => info!(%score, "Run finished"),
        Err(StartupError::Roadmap(e)) => {
            warn!(error = %e, "Roadmap generation failed");
            println!("\n--- Error in Roadmap Generation ---");
            println!("The API returned an error. Please try again. ({e})");
        }
        Err(StartupError::Console(ConsoleError::Closed)) => {
            info!("Input closed");
            println!("\nInput closed. Goodbye!");
        }
        Err(e) => println!("{e}"),
    }
}
