//! Per-namespace account state and the global active selection.

use crate::{
	namespace::{CaipAddress, ChainNamespace},
	network::CaipNetwork,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountType {
	Eoa,
	SmartAccount,
	Payment,
	Ordinal,
}

impl AccountType {
	pub fn as_str(&self) -> &'static str {
		match self {
			AccountType::Eoa => "eoa",
			AccountType::SmartAccount => "smartAccount",
			AccountType::Payment => "payment",
			AccountType::Ordinal => "ordinal",
		}
	}
}

impl fmt::Display for AccountType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Connection lifecycle of one namespace.
///
/// The only legal order is `Disconnected -> Connecting -> Connected ->
/// Disconnected`; a failed attempt may fall back from `Connecting` to
/// `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
	#[default]
	Disconnected,
	Connecting,
	Connected,
}

impl ConnectionStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ConnectionStatus::Disconnected => "disconnected",
			ConnectionStatus::Connecting => "connecting",
			ConnectionStatus::Connected => "connected",
		}
	}

	/// Whether moving from `self` to `next` follows the lifecycle.
	pub fn can_transition_to(&self, next: ConnectionStatus) -> bool {
		use ConnectionStatus::*;
		matches!(
			(self, next),
			(Disconnected, Connecting)
				| (Connecting, Connected)
				| (Connecting, Disconnected)
				| (Connected, Disconnected)
		) || *self == next
	}
}

impl fmt::Display for ConnectionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ConnectionStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"disconnected" => Ok(ConnectionStatus::Disconnected),
			"connecting" => Ok(ConnectionStatus::Connecting),
			"connected" => Ok(ConnectionStatus::Connected),
			other => Err(format!("unknown connection status: {}", other)),
		}
	}
}

/// One address a wallet exposes in a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEntry {
	pub namespace: ChainNamespace,
	pub address: String,
	pub account_type: AccountType,
}

impl AccountEntry {
	pub fn new(namespace: ChainNamespace, address: impl Into<String>, account_type: AccountType) -> Self {
		Self {
			namespace,
			address: address.into(),
			account_type,
		}
	}
}

/// Display information about the wallet behind a connection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletInfo {
	pub name: String,
	pub icon: Option<String>,
}

/// Derived account state of one namespace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
	pub address: Option<String>,
	pub caip_address: Option<CaipAddress>,
	pub balance: Option<String>,
	pub balance_symbol: Option<String>,
	pub profile_name: Option<String>,
	pub profile_image: Option<String>,
	pub preferred_account_type: Option<AccountType>,
	pub status: ConnectionStatus,
	pub all_accounts: Vec<AccountEntry>,
	pub connected_wallet: Option<WalletInfo>,
}

impl AccountState {
	pub fn is_connected(&self) -> bool {
		self.status == ConnectionStatus::Connected && self.address.is_some()
	}
}

/// Global pointer to the namespace and network the user is working in.
///
/// The namespace is derived from the network whenever one is set, so the two
/// cannot disagree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSelection {
	active_namespace: Option<ChainNamespace>,
	active_caip_network: Option<CaipNetwork>,
}

impl ActiveSelection {
	pub fn new(network: CaipNetwork) -> Self {
		Self {
			active_namespace: Some(network.chain_namespace),
			active_caip_network: Some(network),
		}
	}

	pub fn namespace(&self) -> Option<ChainNamespace> {
		self.active_namespace
	}

	pub fn network(&self) -> Option<&CaipNetwork> {
		self.active_caip_network.as_ref()
	}
}
