//! Chain namespaces and CAIP identifiers.
//!
//! Namespaces segment adapters, networks and accounts. Chain ids within a
//! namespace are either numeric (eip155) or opaque references (solana genesis
//! hashes, bip122 block hashes), and both appear in CAIP-2 network ids and
//! CAIP-10 account ids.

use crate::{account::AccountType, errors::ParseError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Blockchain ecosystem tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainNamespace {
	Eip155,
	Solana,
	Bip122,
	Polkadot,
	Cosmos,
	Sui,
}

const SOLANA_METHODS: &[&str] = &[
	"solana_signMessage",
	"solana_signTransaction",
	"solana_requestAccounts",
	"solana_getAccounts",
	"solana_signAllTransactions",
	"solana_signAndSendTransaction",
];

const EIP155_METHODS: &[&str] = &[
	"eth_accounts",
	"eth_requestAccounts",
	"eth_sendRawTransaction",
	"eth_sign",
	"eth_signTransaction",
	"eth_signTypedData",
	"eth_signTypedData_v3",
	"eth_signTypedData_v4",
	"eth_sendTransaction",
	"personal_sign",
	"wallet_switchEthereumChain",
	"wallet_addEthereumChain",
	"wallet_getPermissions",
	"wallet_requestPermissions",
	"wallet_registerOnboarding",
	"wallet_watchAsset",
	"wallet_scanQRCode",
	// EIP-5792
	"wallet_getCallsStatus",
	"wallet_showCallsStatus",
	"wallet_sendCalls",
	"wallet_getCapabilities",
	// EIP-7715
	"wallet_grantPermissions",
	"wallet_revokePermissions",
	// EIP-7811
	"wallet_getAssets",
];

const BIP122_METHODS: &[&str] = &["sendTransfer", "signMessage", "signPsbt", "getAccountAddresses"];

impl ChainNamespace {
	pub const ALL: [ChainNamespace; 6] = [
		ChainNamespace::Eip155,
		ChainNamespace::Solana,
		ChainNamespace::Bip122,
		ChainNamespace::Polkadot,
		ChainNamespace::Cosmos,
		ChainNamespace::Sui,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			ChainNamespace::Eip155 => "eip155",
			ChainNamespace::Solana => "solana",
			ChainNamespace::Bip122 => "bip122",
			ChainNamespace::Polkadot => "polkadot",
			ChainNamespace::Cosmos => "cosmos",
			ChainNamespace::Sui => "sui",
		}
	}

	/// JSON-RPC methods requested for this namespace when pairing over
	/// WalletConnect. Namespaces without a table request none.
	pub fn default_walletconnect_methods(&self) -> &'static [&'static str] {
		match self {
			ChainNamespace::Eip155 => EIP155_METHODS,
			ChainNamespace::Solana => SOLANA_METHODS,
			ChainNamespace::Bip122 => BIP122_METHODS,
			_ => &[],
		}
	}

	/// Account type assumed when nothing better is known.
	///
	/// Bitcoin-like namespaces hand out payment addresses, everything else
	/// an externally owned account.
	pub fn default_account_type(&self) -> AccountType {
		match self {
			ChainNamespace::Bip122 => AccountType::Payment,
			_ => AccountType::Eoa,
		}
	}
}

impl fmt::Display for ChainNamespace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ChainNamespace {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ChainNamespace::ALL
			.into_iter()
			.find(|ns| ns.as_str() == s)
			.ok_or_else(|| ParseError::UnknownNamespace(s.to_string()))
	}
}

/// Chain reference inside a namespace.
///
/// Numeric strings are always normalized to [`ChainId::Number`] so that
/// `"137"` read from storage and `137` read from configuration compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawChainId")]
pub enum ChainId {
	Number(u64),
	Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChainId {
	Number(u64),
	Text(String),
}

impl From<RawChainId> for ChainId {
	fn from(raw: RawChainId) -> Self {
		match raw {
			RawChainId::Number(n) => ChainId::Number(n),
			RawChainId::Text(s) => ChainId::from(s.as_str()),
		}
	}
}

impl Serialize for ChainId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			ChainId::Number(n) => serializer.serialize_u64(*n),
			ChainId::Text(s) => serializer.serialize_str(s),
		}
	}
}

impl From<u64> for ChainId {
	fn from(id: u64) -> Self {
		ChainId::Number(id)
	}
}

impl From<&str> for ChainId {
	fn from(id: &str) -> Self {
		match id.parse::<u64>() {
			Ok(n) => ChainId::Number(n),
			Err(_) => ChainId::Text(id.to_string()),
		}
	}
}

impl From<String> for ChainId {
	fn from(id: String) -> Self {
		ChainId::from(id.as_str())
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChainId::Number(n) => write!(f, "{}", n),
			ChainId::Text(s) => f.write_str(s),
		}
	}
}

/// Formats a CAIP-2 network id.
pub fn caip_network_id(namespace: ChainNamespace, chain_id: &ChainId) -> String {
	format!("{}:{}", namespace, chain_id)
}

/// Splits a CAIP-2 network id such as `eip155:1` into its parts.
pub fn parse_caip_network_id(value: &str) -> Result<(ChainNamespace, ChainId), ParseError> {
	let (namespace, reference) = value
		.split_once(':')
		.ok_or_else(|| ParseError::InvalidCaipNetworkId(value.to_string()))?;

	if reference.is_empty() || reference.contains(':') {
		return Err(ParseError::InvalidCaipNetworkId(value.to_string()));
	}

	Ok((namespace.parse()?, ChainId::from(reference)))
}

/// CAIP-10 account id: `namespace:chainId:address`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaipAddress {
	pub namespace: ChainNamespace,
	pub chain_id: ChainId,
	pub address: String,
}

impl CaipAddress {
	pub fn new(namespace: ChainNamespace, chain_id: ChainId, address: impl Into<String>) -> Self {
		Self {
			namespace,
			chain_id,
			address: address.into(),
		}
	}

	pub fn caip_network_id(&self) -> String {
		caip_network_id(self.namespace, &self.chain_id)
	}
}

impl fmt::Display for CaipAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.namespace, self.chain_id, self.address)
	}
}

impl FromStr for CaipAddress {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut parts = s.splitn(3, ':');
		let (Some(namespace), Some(chain_id), Some(address)) =
			(parts.next(), parts.next(), parts.next())
		else {
			return Err(ParseError::InvalidCaipAddress(s.to_string()));
		};

		if chain_id.is_empty() || address.is_empty() {
			return Err(ParseError::InvalidCaipAddress(s.to_string()));
		}

		Ok(CaipAddress {
			namespace: namespace.parse()?,
			chain_id: ChainId::from(chain_id),
			address: address.to_string(),
		})
	}
}

impl Serialize for CaipAddress {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for CaipAddress {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = String::deserialize(deserializer)?;
		value.parse().map_err(serde::de::Error::custom)
	}
}
