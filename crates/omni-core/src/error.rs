// omni-core/src/error.rs

use omni_types::{AdapterError, ChainNamespace};
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Adapter for namespace {0} doesn't exist")]
	AdapterNotFound(ChainNamespace),

	#[error("Network with ID {0} not found")]
	NetworkNotFound(String),

	#[error("Network belongs to {requested}, active namespace is {active}")]
	NamespaceMismatch {
		active: ChainNamespace,
		requested: ChainNamespace,
	},

	#[error("No active namespace")]
	NoActiveNamespace,

	#[error("Connector not found: {0}")]
	ConnectorNotFound(String),

	#[error("Namespace {0} is not connected")]
	NotConnected(ChainNamespace),

	#[error("Namespace {0} has an active session")]
	ActiveSession(ChainNamespace),

	#[error("Wallet approval timed out after {0:?}")]
	ApprovalTimeout(Duration),

	#[error("Adapter error: {0}")]
	Adapter(#[from] AdapterError),
}

impl ClientError {
	/// True when the wallet (or its user) declined the request.
	pub fn is_user_rejection(&self) -> bool {
		matches!(self, ClientError::Adapter(e) if e.is_user_rejection())
	}
}
