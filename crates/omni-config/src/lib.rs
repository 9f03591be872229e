// omni-config/src/lib.rs

use omni_types::{caip_network_id, ChainNamespace};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub mod types;

pub use types::{AppConfig, LogFormat, LoggingConfig, StorageConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
#[derive(Debug)]
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "OMNI_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<AppConfig, ConfigError> {
		let Some(file_path) = &self.file_path else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		let mut config = self.load_from_file(file_path).await?;
		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &Path) -> Result<AppConfig, ConfigError> {
		let content = match tokio::fs::read_to_string(file_path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(ConfigError::FileNotFound(file_path.display().to_string()))
			}
			Err(e) => return Err(e.into()),
		};

		let substituted = substitute_env_vars(&content)?;

		match file_path.extension().and_then(|ext| ext.to_str()) {
			Some("json") => {
				serde_json::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))
			}
			Some("yaml") | Some("yml") => {
				serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))
			}
			_ => toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string())),
		}
	}

	fn apply_env_overrides(&self, config: &mut AppConfig) -> Result<(), ConfigError> {
		if let Ok(project_id) = env::var(format!("{}PROJECT_ID", self.env_prefix)) {
			debug!("Overriding project id from environment");
			config.client.project_id = Some(project_id);
		}

		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			config.logging.level = log_level;
		}

		if let Ok(storage_path) = env::var(format!("{}STORAGE_PATH", self.env_prefix)) {
			config.storage.path = PathBuf::from(storage_path);
		}

		Ok(())
	}
}

/// Replaces `${VAR_NAME}` placeholders with environment values.
pub fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

/// Checks the invariants the client relies on at construction.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
	let client = &config.client;

	if client.networks.is_empty() {
		return Err(ConfigError::ValidationError(
			"At least one network must be configured".to_string(),
		));
	}

	if client.project_id.as_deref() == Some("") {
		return Err(ConfigError::ValidationError(
			"project_id must not be empty".to_string(),
		));
	}

	let mut seen: HashSet<(ChainNamespace, String)> = HashSet::new();
	for network in &client.networks {
		if !seen.insert((network.chain_namespace, network.id.to_string())) {
			return Err(ConfigError::ValidationError(format!(
				"Network {} is configured more than once",
				caip_network_id(network.chain_namespace, &network.id)
			)));
		}

		if network.rpc_urls.is_empty() && client.project_id.is_none() {
			return Err(ConfigError::ValidationError(format!(
				"Network {} has no rpc url and no project_id is set",
				caip_network_id(network.chain_namespace, &network.id)
			)));
		}
	}

	if let Some(default_network) = &client.default_network {
		let configured = client.networks.iter().any(|network| {
			network
				.caip_network_id
				.clone()
				.unwrap_or_else(|| caip_network_id(network.chain_namespace, &network.id))
				== *default_network
		});
		if !configured {
			return Err(ConfigError::ValidationError(format!(
				"Default network {} is not configured",
				default_network
			)));
		}
	}

	Ok(())
}
