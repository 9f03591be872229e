//! Wallet transports consumed by adapters and the client.
//!
//! None of these are implemented in this workspace. The universal provider is
//! the WalletConnect session transport (one pairing, many namespaces), the
//! auth provider backs email/social login, and [`WalletProvider`] stands for
//! any injected or integrator-specific wallet.

use crate::{
	account::AccountType,
	config::{DappMetadata, ThemeSettings},
	errors::ProviderError,
	namespace::{ChainId, ChainNamespace},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

/// Event names a universal provider emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
	DisplayUri,
	Disconnect,
	ChainChanged,
	AccountsChanged,
	Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
	/// Pairing URI to show to the user.
	DisplayUri(String),
	Disconnect { reason: Option<String> },
	/// Chain reference or CAIP-2 id the wallet switched to.
	ChainChanged(String),
	/// CAIP-10 account ids now exposed by the session.
	AccountsChanged(Vec<String>),
	/// Transport-level failure, usually a socket close reason.
	Error(String),
}

impl ProviderEvent {
	pub fn kind(&self) -> ProviderEventKind {
		match self {
			ProviderEvent::DisplayUri(_) => ProviderEventKind::DisplayUri,
			ProviderEvent::Disconnect { .. } => ProviderEventKind::Disconnect,
			ProviderEvent::ChainChanged(_) => ProviderEventKind::ChainChanged,
			ProviderEvent::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
			ProviderEvent::Error(_) => ProviderEventKind::Error,
		}
	}
}

pub type ProviderListener = Arc<dyn Fn(&ProviderEvent) + Send + Sync>;

/// Requested scope for one namespace of a WalletConnect session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceRequest {
	pub methods: Vec<String>,
	pub chains: Vec<String>,
	pub events: Vec<String>,
	pub rpc_map: BTreeMap<String, String>,
}

/// Optional namespaces keyed by namespace tag (`eip155`, `solana`, ...).
pub type NamespaceConfig = BTreeMap<String, NamespaceRequest>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingRequest {
	pub optional_namespaces: NamespaceConfig,
	pub pairing_topic: Option<String>,
}

/// Approved scope of one namespace inside a live session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionNamespace {
	/// CAIP-10 account ids.
	pub accounts: Vec<String>,
	#[serde(default)]
	pub chains: Vec<String>,
	#[serde(default)]
	pub methods: Vec<String>,
	#[serde(default)]
	pub events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerMetadata {
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub icons: Vec<String>,
}

/// Live WalletConnect session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
	pub topic: String,
	pub namespaces: HashMap<String, SessionNamespace>,
	pub peer: PeerMetadata,
}

impl Session {
	pub fn namespace(&self, namespace: ChainNamespace) -> Option<&SessionNamespace> {
		self.namespaces.get(namespace.as_str())
	}

	/// CAIP-2 ids approved by the session, from both `chains` and accounts.
	pub fn approved_chains(&self) -> Vec<String> {
		let mut chains = Vec::new();
		for namespace in self.namespaces.values() {
			let from_accounts = namespace.accounts.iter().filter_map(|account| {
				let mut parts = account.splitn(3, ':');
				match (parts.next(), parts.next()) {
					(Some(ns), Some(chain)) => Some(format!("{}:{}", ns, chain)),
					_ => None,
				}
			});
			for chain in namespace.chains.iter().cloned().chain(from_accounts) {
				if !chains.contains(&chain) {
					chains.push(chain);
				}
			}
		}
		chains
	}
}

/// WalletConnect universal provider.
#[async_trait]
pub trait UniversalProvider: Send + Sync + Debug {
	/// Starts pairing and resolves once the wallet approves.
	///
	/// No timeout is applied here; resolution depends entirely on the wallet.
	async fn connect(&self, request: PairingRequest) -> Result<Session, ProviderError>;

	async fn disconnect(&self) -> Result<(), ProviderError>;

	/// Selects the chain subsequent requests are routed to (CAIP-2 id).
	fn set_default_chain(&self, chain: &str, rpc_url: Option<&str>);

	fn session(&self) -> Option<Session>;

	fn on(&self, kind: ProviderEventKind, listener: ProviderListener);

	/// Like [`UniversalProvider::on`] but the listener fires at most once.
	fn once(&self, kind: ProviderEventKind, listener: ProviderListener);

	async fn request(
		&self,
		chain: &str,
		method: &str,
		params: serde_json::Value,
	) -> Result<serde_json::Value, ProviderError>;
}

/// Dapp data pushed into the auth provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappData {
	pub metadata: Option<DappMetadata>,
	pub project_id: Option<String>,
	pub sdk_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
	pub address: String,
	pub chain_id: ChainId,
	pub account_type: Option<AccountType>,
}

/// Email/social login provider.
#[async_trait]
pub trait AuthProvider: Send + Sync + Debug {
	fn sync_dapp_data(&self, data: &DappData);

	fn sync_theme(&self, theme: &ThemeSettings);

	/// True while an email login is pending user confirmation.
	fn is_login_email_used(&self) -> bool;

	async fn is_connected(&self) -> Result<bool, ProviderError>;

	async fn connect(&self, chain_id: Option<&ChainId>) -> Result<AuthUser, ProviderError>;

	async fn switch_network(&self, chain_id: &ChainId) -> Result<AuthUser, ProviderError>;

	async fn disconnect(&self) -> Result<(), ProviderError>;
}

/// Injected or integrator-specific wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync + Debug {
	fn name(&self) -> &str;

	async fn request(
		&self,
		method: &str,
		params: serde_json::Value,
	) -> Result<serde_json::Value, ProviderError>;
}

/// Reference to whichever transport backs a connection.
#[derive(Debug, Clone)]
pub enum ProviderHandle {
	Universal(Arc<dyn UniversalProvider>),
	Auth(Arc<dyn AuthProvider>),
	Wallet(Arc<dyn WalletProvider>),
}

impl ProviderHandle {
	pub fn as_universal(&self) -> Option<&Arc<dyn UniversalProvider>> {
		match self {
			ProviderHandle::Universal(provider) => Some(provider),
			_ => None,
		}
	}

	pub fn as_auth(&self) -> Option<&Arc<dyn AuthProvider>> {
		match self {
			ProviderHandle::Auth(provider) => Some(provider),
			_ => None,
		}
	}

	/// Identity comparison; two handles are equal when they share the instance.
	pub fn same_instance(&self, other: &ProviderHandle) -> bool {
		match (self, other) {
			(ProviderHandle::Universal(a), ProviderHandle::Universal(b)) => {
				std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
			}
			(ProviderHandle::Auth(a), ProviderHandle::Auth(b)) => {
				std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
			}
			(ProviderHandle::Wallet(a), ProviderHandle::Wallet(b)) => {
				std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
			}
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_session_approved_chains() {
		let mut session = Session::default();
		session.namespaces.insert(
			"eip155".to_string(),
			SessionNamespace {
				accounts: vec!["eip155:1:0xabc".to_string(), "eip155:137:0xabc".to_string()],
				chains: vec!["eip155:1".to_string()],
				..Default::default()
			},
		);

		let chains = session.approved_chains();
		assert_eq!(chains, vec!["eip155:1".to_string(), "eip155:137".to_string()]);
		assert!(session.namespace(ChainNamespace::Eip155).is_some());
		assert!(session.namespace(ChainNamespace::Solana).is_none());
	}
}
