//! Network descriptors.
//!
//! Integrators describe networks with [`NetworkConfig`]; the client turns each
//! one into an immutable, fully populated [`CaipNetwork`] before anything else
//! looks at it.

use crate::namespace::{caip_network_id, ChainId, ChainNamespace};
use serde::{Deserialize, Serialize};

/// Base URL of the default JSON-RPC proxy used when a network lists no rpc url.
pub const DEFAULT_RPC_PROXY_URL: &str = "https://rpc.walletconnect.org";

/// Solana clusters whose wallets may still advertise the legacy CAIP-2 id.
const DEPRECATED_SOLANA_IDS: [(&str, &str); 2] = [
	(
		"solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
		"solana:4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ",
	),
	(
		"solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
		"solana:8E9rvCKLFQia2Y35HXjjpWzj8weVo44K",
	),
];

/// Legacy CAIP-2 id still used by some wallets for the given network id.
pub fn deprecated_caip_network_id(caip_network_id: &str) -> Option<&'static str> {
	DEPRECATED_SOLANA_IDS
		.iter()
		.find(|(current, _)| *current == caip_network_id)
		.map(|(_, deprecated)| *deprecated)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
}

impl Default for NativeCurrency {
	fn default() -> Self {
		Self {
			name: "Ether".to_string(),
			symbol: "ETH".to_string(),
			decimals: 18,
		}
	}
}

/// Caller-supplied network description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
	pub id: ChainId,
	#[serde(default = "default_namespace")]
	pub chain_namespace: ChainNamespace,
	pub name: String,
	#[serde(default)]
	pub native_currency: NativeCurrency,
	#[serde(default)]
	pub rpc_urls: Vec<String>,
	#[serde(default)]
	pub block_explorer: Option<String>,
	#[serde(default)]
	pub testnet: bool,
	#[serde(default)]
	pub caip_network_id: Option<String>,
}

fn default_namespace() -> ChainNamespace {
	ChainNamespace::Eip155
}

impl NetworkConfig {
	pub fn new(chain_namespace: ChainNamespace, id: impl Into<ChainId>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			chain_namespace,
			name: name.into(),
			native_currency: NativeCurrency::default(),
			rpc_urls: Vec::new(),
			block_explorer: None,
			testnet: false,
			caip_network_id: None,
		}
	}

	pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
		self.rpc_urls.push(url.into());
		self
	}

	pub fn with_native_currency(mut self, currency: NativeCurrency) -> Self {
		self.native_currency = currency;
		self
	}

	pub fn testnet(mut self) -> Self {
		self.testnet = true;
		self
	}
}

/// Normalized network descriptor within a namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaipNetwork {
	pub id: ChainId,
	pub caip_network_id: String,
	pub chain_namespace: ChainNamespace,
	pub name: String,
	pub native_currency: NativeCurrency,
	pub rpc_urls: Vec<String>,
	pub block_explorer: Option<String>,
	pub testnet: bool,
	pub deprecated_caip_network_id: Option<String>,
}

impl CaipNetwork {
	/// Builds the normalized record for `config`.
	///
	/// Networks without rpc urls fall back to the default proxy when a
	/// project id is known.
	pub fn from_config(config: &NetworkConfig, project_id: Option<&str>) -> Self {
		let caip_network_id = config
			.caip_network_id
			.clone()
			.unwrap_or_else(|| caip_network_id(config.chain_namespace, &config.id));

		let mut rpc_urls = config.rpc_urls.clone();
		if rpc_urls.is_empty() {
			if let Some(project_id) = project_id {
				rpc_urls.push(format!(
					"{}/v1/?chainId={}&projectId={}",
					DEFAULT_RPC_PROXY_URL, caip_network_id, project_id
				));
			}
		}

		Self {
			id: config.id.clone(),
			deprecated_caip_network_id: deprecated_caip_network_id(&caip_network_id)
				.map(str::to_string),
			caip_network_id,
			chain_namespace: config.chain_namespace,
			name: config.name.clone(),
			native_currency: config.native_currency.clone(),
			rpc_urls,
			block_explorer: config.block_explorer.clone(),
			testnet: config.testnet,
		}
	}

	pub fn rpc_url(&self) -> Option<&str> {
		self.rpc_urls.first().map(String::as_str)
	}

	/// Whether this network is the one a wallet refers to as `chain`.
	///
	/// `chain` may be a bare chain id (`137`) or a CAIP-2 id, including the
	/// deprecated Solana ids.
	pub fn matches(&self, chain: &str) -> bool {
		self.id.to_string() == chain
			|| self.caip_network_id == chain
			|| self.deprecated_caip_network_id.as_deref() == Some(chain)
	}
}

/// Normalizes every configured network.
pub fn normalize_networks(configs: &[NetworkConfig], project_id: Option<&str>) -> Vec<CaipNetwork> {
	configs
		.iter()
		.map(|config| CaipNetwork::from_config(config, project_id))
		.collect()
}
