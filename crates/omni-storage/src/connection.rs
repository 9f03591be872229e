//! Typed access to the persisted connection keys.

use crate::{StorageError, StorageInterface};
use chrono::{DateTime, Utc};
use omni_types::{ChainNamespace, ConnectionStatus};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const CONNECTOR: &str = "connector";
const SELECTION: &str = "selection";
const SESSION: &str = "session";

const ACTIVE_NAMESPACE: &str = "active_namespace";
const ACTIVE_CAIP_NETWORK_ID: &str = "active_caip_network_id";
const CONNECTED_NAMESPACES: &str = "connected_namespaces";
const CONNECTION_STATUS: &str = "connection_status";

/// Durable record of which connector a namespace was connected with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConnection {
	pub connector_id: String,
	pub namespace: ChainNamespace,
	pub connected_at: DateTime<Utc>,
}

/// Connection-state persistence over any [`StorageInterface`] backend.
pub struct ConnectionStorage {
	backend: Arc<dyn StorageInterface>,
	/// Serializes read-modify-write updates of the connected namespace set.
	namespaces_lock: Mutex<()>,
}

impl std::fmt::Debug for ConnectionStorage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConnectionStorage").finish_non_exhaustive()
	}
}

impl ConnectionStorage {
	pub fn new(backend: Arc<dyn StorageInterface>) -> Self {
		Self {
			backend,
			namespaces_lock: Mutex::new(()),
		}
	}

	/// Stores a serializable value under `namespace:id`.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Retrieves a value, mapping a missing key to `None`.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<Option<T>, StorageError> {
		let key = format!("{}:{}", namespace, id);
		match self.backend.get_bytes(&key).await {
			Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
				warn!("Persisted value under {} is unreadable: {}", key, e);
				StorageError::Serialization(e.to_string())
			}),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		debug!("Removing persisted {}", key);
		self.backend.delete(&key).await
	}

	pub async fn connection(
		&self,
		namespace: ChainNamespace,
	) -> Result<Option<PersistedConnection>, StorageError> {
		self.retrieve(CONNECTOR, namespace.as_str()).await
	}

	pub async fn connected_connector_id(
		&self,
		namespace: ChainNamespace,
	) -> Result<Option<String>, StorageError> {
		Ok(self
			.connection(namespace)
			.await?
			.map(|connection| connection.connector_id))
	}

	pub async fn set_connected_connector_id(
		&self,
		namespace: ChainNamespace,
		connector_id: &str,
	) -> Result<(), StorageError> {
		let record = PersistedConnection {
			connector_id: connector_id.to_string(),
			namespace,
			connected_at: Utc::now(),
		};
		self.store(CONNECTOR, namespace.as_str(), &record).await
	}

	pub async fn delete_connected_connector_id(
		&self,
		namespace: ChainNamespace,
	) -> Result<(), StorageError> {
		self.remove(CONNECTOR, namespace.as_str()).await
	}

	pub async fn connected_namespaces(&self) -> Result<Vec<ChainNamespace>, StorageError> {
		Ok(self
			.retrieve(SESSION, CONNECTED_NAMESPACES)
			.await?
			.unwrap_or_default())
	}

	pub async fn add_connected_namespace(
		&self,
		namespace: ChainNamespace,
	) -> Result<(), StorageError> {
		let _guard = self.namespaces_lock.lock().await;
		let mut namespaces = self.connected_namespaces().await?;
		if !namespaces.contains(&namespace) {
			namespaces.push(namespace);
			self.store(SESSION, CONNECTED_NAMESPACES, &namespaces).await?;
		}
		Ok(())
	}

	pub async fn remove_connected_namespace(
		&self,
		namespace: ChainNamespace,
	) -> Result<(), StorageError> {
		let _guard = self.namespaces_lock.lock().await;
		let mut namespaces = self.connected_namespaces().await?;
		let before = namespaces.len();
		namespaces.retain(|ns| *ns != namespace);
		if namespaces.len() != before {
			self.store(SESSION, CONNECTED_NAMESPACES, &namespaces).await?;
		}
		Ok(())
	}

	pub async fn active_namespace(&self) -> Result<Option<ChainNamespace>, StorageError> {
		self.retrieve(SELECTION, ACTIVE_NAMESPACE).await
	}

	pub async fn set_active_namespace(&self, namespace: ChainNamespace) -> Result<(), StorageError> {
		self.store(SELECTION, ACTIVE_NAMESPACE, &namespace).await
	}

	pub async fn active_caip_network_id(&self) -> Result<Option<String>, StorageError> {
		self.retrieve(SELECTION, ACTIVE_CAIP_NETWORK_ID).await
	}

	pub async fn set_active_caip_network_id(
		&self,
		caip_network_id: &str,
	) -> Result<(), StorageError> {
		self.store(SELECTION, ACTIVE_CAIP_NETWORK_ID, &caip_network_id)
			.await
	}

	pub async fn connection_status(&self) -> Result<ConnectionStatus, StorageError> {
		Ok(self
			.retrieve(SESSION, CONNECTION_STATUS)
			.await?
			.unwrap_or_default())
	}

	pub async fn set_connection_status(&self, status: ConnectionStatus) -> Result<(), StorageError> {
		self.store(SESSION, CONNECTION_STATUS, &status).await
	}

	/// Removes every persisted key for the given namespaces plus the selection.
	pub async fn clear(&self, namespaces: &[ChainNamespace]) -> Result<(), StorageError> {
		for namespace in namespaces {
			self.delete_connected_connector_id(*namespace).await?;
		}
		self.remove(SESSION, CONNECTED_NAMESPACES).await?;
		self.remove(SESSION, CONNECTION_STATUS).await?;
		self.remove(SELECTION, ACTIVE_NAMESPACE).await?;
		self.remove(SELECTION, ACTIVE_CAIP_NETWORK_ID).await
	}
}
