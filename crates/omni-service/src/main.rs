use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use omni_config::{AppConfig, ConfigLoader, LogFormat};
use omni_storage::implementations::file::FileStorage;
use omni_storage::ConnectionStorage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "omni-connect")]
#[command(about = "Inspect omni-connect configuration and persisted sessions", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(short, long, value_name = "FILE", env = "OMNI_CONFIG", default_value = "config/omni.toml")]
	config: PathBuf,

	/// Overrides the configured log level
	#[arg(long, env = "OMNI_LOG_LEVEL")]
	log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Validate the configuration file
	Validate,
	/// List the normalized networks
	Networks,
	/// Show the persisted session
	Session,
	/// Clear the persisted session
	Forget,
	/// Resume the persisted session offline and report each namespace
	Status,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.with_env_prefix("OMNI_")
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

	let level = cli
		.log_level
		.clone()
		.unwrap_or_else(|| config.logging.level.clone());
	setup_tracing(&level, config.logging.format)?;
	info!("Configuration loaded from {:?}", cli.config);

	let lines = match cli.command {
		Some(Commands::Validate) | None => commands::validate(&config),
		Some(Commands::Networks) => commands::networks(&config),
		Some(Commands::Session) => commands::session(&open_storage(&config)).await?,
		Some(Commands::Forget) => commands::forget(&open_storage(&config)).await?,
		Some(Commands::Status) => commands::status(&config, &open_storage(&config)).await?,
	};

	for line in lines {
		println!("{}", line);
	}
	Ok(())
}

fn open_storage(config: &AppConfig) -> ConnectionStorage {
	info!("Using session storage at {:?}", config.storage.path);
	ConnectionStorage::new(Arc::new(FileStorage::new(&config.storage.path)))
}

fn setup_tracing(log_level: &str, format: LogFormat) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	let registry = tracing_subscriber::registry().with(env_filter);
	match format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.try_init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.try_init(),
	}
	.context("Failed to initialize tracing")?;

	Ok(())
}
