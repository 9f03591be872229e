//! Options the client is constructed from.

use crate::network::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DappMetadata {
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub icons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
	#[default]
	Dark,
	Light,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThemeSettings {
	#[serde(default)]
	pub mode: ThemeMode,
	#[serde(default)]
	pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Features {
	#[serde(default)]
	pub email: bool,
	#[serde(default)]
	pub socials: Vec<String>,
}

impl Features {
	/// The auth provider is only needed for email or social login.
	pub fn needs_auth_provider(&self) -> bool {
		self.email || !self.socials.is_empty()
	}
}

/// Replacements for the derived WalletConnect optional namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamespaceOverrides {
	#[serde(default)]
	pub methods: BTreeMap<String, Vec<String>>,
	#[serde(default)]
	pub chains: BTreeMap<String, Vec<String>>,
	#[serde(default)]
	pub events: BTreeMap<String, Vec<String>>,
	/// Keyed by CAIP-2 network id.
	#[serde(default)]
	pub rpc_map: BTreeMap<String, String>,
}

impl NamespaceOverrides {
	pub fn is_empty(&self) -> bool {
		self.methods.is_empty()
			&& self.chains.is_empty()
			&& self.events.is_empty()
			&& self.rpc_map.is_empty()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
	#[serde(default)]
	pub project_id: Option<String>,
	pub networks: Vec<NetworkConfig>,
	/// CAIP-2 id of the network to start on.
	#[serde(default)]
	pub default_network: Option<String>,
	#[serde(default)]
	pub metadata: Option<DappMetadata>,
	#[serde(default)]
	pub features: Features,
	#[serde(default)]
	pub theme: ThemeSettings,
	#[serde(default)]
	pub namespace_overrides: NamespaceOverrides,
	#[serde(default = "default_sdk_version")]
	pub sdk_version: String,
}

fn default_sdk_version() -> String {
	format!("omni-connect-{}", env!("CARGO_PKG_VERSION"))
}

impl ClientOptions {
	pub fn new(networks: Vec<NetworkConfig>) -> Self {
		Self {
			project_id: None,
			networks,
			default_network: None,
			metadata: None,
			features: Features::default(),
			theme: ThemeSettings::default(),
			namespace_overrides: NamespaceOverrides::default(),
			sdk_version: default_sdk_version(),
		}
	}

	pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
		self.project_id = Some(project_id.into());
		self
	}

	pub fn with_default_network(mut self, caip_network_id: impl Into<String>) -> Self {
		self.default_network = Some(caip_network_id.into());
		self
	}

	pub fn with_features(mut self, features: Features) -> Self {
		self.features = features;
		self
	}

	pub fn with_metadata(mut self, metadata: DappMetadata) -> Self {
		self.metadata = Some(metadata);
		self
	}
}
