//! Connection methods and the canonical connect result.

use crate::{
	namespace::{ChainId, ChainNamespace},
	provider::ProviderHandle,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known connector ids.
pub mod connector_id {
	pub const WALLET_CONNECT: &str = "walletConnect";
	pub const AUTH: &str = "ID_AUTH";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectorType {
	WalletConnect,
	Injected,
	Announced,
	Auth,
	External,
}

impl fmt::Display for ConnectorType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ConnectorType::WalletConnect => "WALLET_CONNECT",
			ConnectorType::Injected => "INJECTED",
			ConnectorType::Announced => "ANNOUNCED",
			ConnectorType::Auth => "AUTH",
			ConnectorType::External => "EXTERNAL",
		};
		f.write_str(name)
	}
}

/// One way of connecting a wallet in a namespace.
#[derive(Debug, Clone)]
pub struct Connector {
	pub id: String,
	pub connector_type: ConnectorType,
	pub name: String,
	pub chain: ChainNamespace,
	pub image_url: Option<String>,
	pub provider: Option<ProviderHandle>,
}

impl Connector {
	pub fn new(
		id: impl Into<String>,
		connector_type: ConnectorType,
		name: impl Into<String>,
		chain: ChainNamespace,
	) -> Self {
		Self {
			id: id.into(),
			connector_type,
			name: name.into(),
			chain,
			image_url: None,
			provider: None,
		}
	}

	pub fn with_provider(mut self, provider: ProviderHandle) -> Self {
		self.provider = Some(provider);
		self
	}

	pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
		self.image_url = Some(url.into());
		self
	}

	pub fn is_auth(&self) -> bool {
		self.id == connector_id::AUTH
	}
}

/// Outcome of connect, reconnect and sync operations.
#[derive(Debug, Clone)]
pub struct ConnectionResult {
	pub connector_id: String,
	pub connector_type: ConnectorType,
	pub provider: ProviderHandle,
	pub chain_id: ChainId,
	pub address: String,
}
