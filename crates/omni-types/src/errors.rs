//! Error types shared by adapters and providers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

/// Failure to interpret a CAIP identifier or namespace tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
	#[error("Unknown chain namespace: {0}")]
	UnknownNamespace(String),

	#[error("Invalid CAIP-2 network id: {0}")]
	InvalidCaipNetworkId(String),

	#[error("Invalid CAIP-10 address: {0}")]
	InvalidCaipAddress(String),
}

/// Errors raised by wallet transports (universal, auth or injected providers).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
	#[error("User rejected the request")]
	UserRejected,

	#[error("Transport error: {0}")]
	Transport(String),

	#[error("Request failed: {0}")]
	Request(String),
}

/// Errors raised by chain adapters.
///
/// Adapters reject with these for anything that should abort the caller's
/// action. Whether a failure is fatal is decided by the orchestrator.
#[derive(Error, Debug)]
pub enum AdapterError {
	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Connector not found: {0}")]
	ConnectorNotFound(String),

	#[error("Provider unavailable: {0}")]
	ProviderUnavailable(String),

	#[error("Not connected: {0}")]
	NotConnected(String),

	#[error(transparent)]
	Parse(#[from] ParseError),

	#[error(transparent)]
	Provider(#[from] ProviderError),
}

impl AdapterError {
	/// True when the wallet (or its user) declined the request.
	pub fn is_user_rejection(&self) -> bool {
		matches!(self, AdapterError::Provider(ProviderError::UserRejected))
	}
}
