//! Persistence for connection state.
//!
//! The client reads persisted connector ids, the active namespace and the
//! active network before any network call at startup, and writes them back as
//! connections come and go. Backends only move bytes; [`ConnectionStorage`]
//! knows the keys and the JSON encoding.

use async_trait::async_trait;
use thiserror::Error;

pub mod connection;

/// Bundled backends.
pub mod implementations {
	pub mod file;
	pub mod memory;
}

pub use connection::{ConnectionStorage, PersistedConnection};

#[derive(Debug, Error)]
pub enum StorageError {
	/// The key holds no value.
	#[error("Not found")]
	NotFound,
	/// A stored value could not be encoded or decoded as JSON.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The backend itself failed (I/O, permissions).
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Low-level key/value backend.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Raw bytes under `key`, [`StorageError::NotFound`] when absent.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key. Missing keys are not an error.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}
