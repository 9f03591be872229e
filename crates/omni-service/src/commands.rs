//! Command implementations. Each returns the lines to print.

use anyhow::{Context, Result};
use omni_config::AppConfig;
use omni_core::ClientBuilder;
use omni_storage::implementations::memory::MemoryStorage;
use omni_storage::{ConnectionStorage, StorageInterface};
use omni_types::{normalize_networks, ChainNamespace};
use std::sync::Arc;
use tracing::{info, warn};

pub fn validate(config: &AppConfig) -> Vec<String> {
	let client = &config.client;
	let mut lines = vec!["Configuration is valid".to_string()];
	lines.push(format!(
		"Project id: {}",
		if client.project_id.is_some() { "set" } else { "not set" }
	));
	lines.push(format!("Networks: {}", client.networks.len()));
	if let Some(default) = &client.default_network {
		lines.push(format!("Default network: {}", default));
	}
	if client.features.needs_auth_provider() {
		lines.push("Email/social login: enabled".to_string());
	}
	lines
}

pub fn networks(config: &AppConfig) -> Vec<String> {
	normalize_networks(&config.client.networks, config.client.project_id.as_deref())
		.into_iter()
		.map(|network| {
			format!(
				"{:<48} {:<20} {}{}",
				network.caip_network_id,
				network.name,
				network.rpc_url().unwrap_or("-"),
				if network.testnet { " (testnet)" } else { "" }
			)
		})
		.collect()
}

pub async fn session(storage: &ConnectionStorage) -> Result<Vec<String>> {
	let mut lines = Vec::new();

	let status = storage
		.connection_status()
		.await
		.context("Failed to read connection status")?;
	lines.push(format!("Status: {}", status));

	if let Some(network) = storage
		.active_caip_network_id()
		.await
		.context("Failed to read active network")?
	{
		lines.push(format!("Active network: {}", network));
	}

	for namespace in ChainNamespace::ALL {
		if let Some(connection) = storage
			.connection(namespace)
			.await
			.with_context(|| format!("Failed to read connection for {}", namespace))?
		{
			lines.push(format!(
				"{}: {} (since {})",
				namespace,
				connection.connector_id,
				connection.connected_at.format("%Y-%m-%d %H:%M:%S UTC")
			));
		}
	}

	Ok(lines)
}

pub async fn forget(storage: &ConnectionStorage) -> Result<Vec<String>> {
	storage
		.clear(&ChainNamespace::ALL)
		.await
		.context("Failed to clear persisted session")?;
	info!("Persisted session cleared");
	Ok(vec!["Session cleared".to_string()])
}

/// Runs the client's silent resume against a copy of the persisted session.
///
/// No wallet transport is available offline, so WalletConnect connections
/// always resolve as disconnected. The persisted session is left untouched.
pub async fn status(config: &AppConfig, storage: &ConnectionStorage) -> Result<Vec<String>> {
	let backend: Arc<dyn StorageInterface> = Arc::new(MemoryStorage::new());
	let snapshot = ConnectionStorage::new(backend.clone());
	let mut persisted = Vec::new();
	for namespace in ChainNamespace::ALL {
		if let Some(connector_id) = storage
			.connected_connector_id(namespace)
			.await
			.with_context(|| format!("Failed to read connector for {}", namespace))?
		{
			snapshot
				.set_connected_connector_id(namespace, &connector_id)
				.await?;
			persisted.push((namespace, connector_id));
		}
	}
	if let Some(network) = storage.active_caip_network_id().await? {
		snapshot.set_active_caip_network_id(&network).await?;
	}

	let client = ClientBuilder::new(config.client.clone())
		.with_storage(backend)
		.build()
		.await
		.context("Failed to build client")?;

	let mut lines = vec![format!(
		"Active network: {}",
		client
			.get_caip_network()
			.map(|n| n.caip_network_id)
			.unwrap_or_else(|| "none".to_string())
	)];
	for namespace in client.namespaces() {
		let connector = persisted
			.iter()
			.find(|(ns, _)| *ns == namespace)
			.map(|(_, id)| id.as_str())
			.unwrap_or("-");
		lines.push(format!(
			"{}: {} (persisted connector {})",
			namespace,
			client.get_status(namespace),
			connector
		));
	}
	if persisted.iter().any(|(ns, _)| !client.namespaces().contains(ns)) {
		warn!("Persisted session names namespaces that are no longer configured");
	}
	Ok(lines)
}
