mod config;
mod database;
mod entities;
mod error;
mod http_server;
mod logging;
mod ports;
mod repositories;
mod services;
mod stripe;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config, database::Database, http_server::state::AppState,
    logging::init_tracing, services::mailer::build_mailer,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "TUNEHUB_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Tracing filter, e.g. `info` or `tunehub=debug,tower_http=debug`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// Also write logs to this file
    #[arg(long, env = "TUNEHUB_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// OTLP gRPC endpoint to export spans to
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// The port to run the server on, overriding the config file
        #[arg(short, long, env = "TUNEHUB_HTTP_PORT")]
        port: Option<u16>,
    },
    /// Create an administrator account
    CreateAdmin {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "TUNEHUB_ADMIN_PASSWORD")]
        password: String,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .wrap_err("Failed to load tunehub config")
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        "tunehub",
        args.otlp_endpoint.as_deref(),
        &args.log_level,
        args.log_file.as_deref(),
    )?;

    let result = run(args).await;

    if let Some(provider) = tracer_provider
        && let Err(e) = provider.shutdown()
    {
        eprintln!("Failed to shut down tracer provider: {e}");
    }

    result
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Config(ConfigCommands::CreateDefault) => {
            let path = Config::create_default(args.config.as_deref())?;
            tracing::info!(path = %path.display(), "Default config ready");
        }
        Commands::Config(ConfigCommands::Path) => {
            match args.config.clone().or_else(Config::config_path) {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            }
        }
        Commands::CreateAdmin {
            username,
            email,
            password,
        } => {
            let config = load_config(args.config.as_ref())?;
            let database = Arc::new(Database::open(&config.database_path()).await?);
            let mailer = build_mailer(&config.mail)?;
            let state = AppState::new(database, config, mailer)?;

            let admin = state
                .auth_service()
                .create_admin(&username, &email, &password)
                .await
                .wrap_err("Failed to create administrator")?;
            tracing::info!(user_id = admin.id, username = %admin.username, "Administrator created");
        }
        Commands::Serve { port } => {
            let config = load_config(args.config.as_ref())?;
            let port = port.unwrap_or(config.server.port);

            let database = Arc::new(Database::open(&config.database_path()).await?);
            let mailer = build_mailer(&config.mail)?;
            let state = Arc::new(AppState::new(database, config, mailer)?);

            tracing::info!(port, "Starting HTTP server");
            http_server::app::start(port, state).await?;
        }
    }

    Ok(())
}
