//! WalletConnect-only fallback adapter.
//!
//! Used for every namespace without a specialized adapter. Everything it
//! knows comes from the universal provider's session; chain-specific writes
//! return zero values and are left to specialized adapters.

use crate::blueprint::*;
use crate::base::AdapterCore;
use crate::namespaces::create_namespaces;
use async_trait::async_trait;
use omni_types::{
	connector_id, AccountEntry, AdapterError, CaipAddress, ChainId, ChainNamespace,
	ConnectionResult, ConnectorType, NamespaceOverrides, PairingRequest, ProviderEvent,
	ProviderEventKind, ProviderHandle, Result, UniversalProvider,
};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct UniversalAdapter {
	core: AdapterCore,
	overrides: NamespaceOverrides,
}

impl UniversalAdapter {
	pub fn new(namespace: ChainNamespace) -> Self {
		Self {
			core: AdapterCore::new(namespace),
			overrides: NamespaceOverrides::default(),
		}
	}

	pub fn with_namespace_overrides(mut self, overrides: NamespaceOverrides) -> Self {
		self.overrides = overrides;
		self
	}

	fn provider(&self, handle: Option<&ProviderHandle>) -> Result<Arc<dyn UniversalProvider>> {
		handle
			.and_then(ProviderHandle::as_universal)
			.cloned()
			.or_else(|| self.core.universal_provider())
			.ok_or_else(|| {
				AdapterError::ProviderUnavailable(format!(
					"No universal provider for {}",
					self.namespace()
				))
			})
	}

	/// CAIP-10 accounts the session exposes for this namespace.
	fn session_addresses(&self, provider: &Arc<dyn UniversalProvider>) -> Vec<CaipAddress> {
		let Some(session) = provider.session() else {
			return Vec::new();
		};
		let Some(namespace) = session.namespace(self.namespace()) else {
			return Vec::new();
		};

		namespace
			.accounts
			.iter()
			.filter_map(|account| account.parse::<CaipAddress>().ok())
			.collect()
	}

	fn connection_from_session(
		&self,
		provider: Arc<dyn UniversalProvider>,
		chain_id: Option<&ChainId>,
	) -> Option<ConnectionResult> {
		let accounts = self.session_addresses(&provider);
		let account = chain_id
			.and_then(|chain_id| accounts.iter().find(|a| &a.chain_id == chain_id))
			.or_else(|| accounts.first())?;

		Some(ConnectionResult {
			connector_id: connector_id::WALLET_CONNECT.to_string(),
			connector_type: ConnectorType::WalletConnect,
			provider: ProviderHandle::Universal(provider),
			chain_id: account.chain_id.clone(),
			address: account.address.clone(),
		})
	}
}

#[async_trait]
impl ChainAdapter for UniversalAdapter {
	fn adapter_type(&self) -> &'static str {
		"universal"
	}

	fn core(&self) -> &AdapterCore {
		&self.core
	}

	async fn switch_network(&self, params: SwitchNetworkParams) -> Result<()> {
		let provider = self.provider(params.provider.as_ref())?;
		let network = &params.caip_network;
		provider.set_default_chain(&network.caip_network_id, network.rpc_url());
		Ok(())
	}

	async fn connect_walletconnect(
		&self,
		on_uri: UriCallback,
		_chain_id: Option<ChainId>,
	) -> Result<()> {
		let connector = self
			.core
			.connectors()
			.into_iter()
			.find(|c| c.connector_type == ConnectorType::WalletConnect)
			.ok_or_else(|| {
				AdapterError::ConnectorNotFound(format!(
					"No WalletConnect connector for {}",
					self.namespace()
				))
			})?;
		let provider = self.provider(connector.provider.as_ref())?;

		let networks = self.core.networks();
		if networks.is_empty() {
			return Err(AdapterError::Config(
				"No networks configured for WalletConnect".to_string(),
			));
		}

		provider.once(
			ProviderEventKind::DisplayUri,
			Arc::new(move |event| {
				if let ProviderEvent::DisplayUri(uri) = event {
					on_uri(uri.clone());
				}
			}),
		);

		let request = PairingRequest {
			optional_namespaces: create_namespaces(&networks, &self.overrides),
			pairing_topic: None,
		};
		debug!(
			"Requesting WalletConnect session for namespaces {:?}",
			request.optional_namespaces.keys().collect::<Vec<_>>()
		);

		let session = provider.connect(request).await?;
		info!("WalletConnect session {} approved", session.topic);
		Ok(())
	}

	async fn connect(&self, params: ConnectParams) -> Result<ConnectionResult> {
		let provider = self.provider(params.provider.as_ref())?;
		self.connection_from_session(provider, params.chain_id.as_ref())
			.ok_or_else(|| {
				AdapterError::NotConnected(format!(
					"WalletConnect session has no {} account",
					self.namespace()
				))
			})
	}

	async fn disconnect(&self, params: DisconnectParams) -> Result<()> {
		let provider = self.provider(params.provider.as_ref())?;
		provider.disconnect().await?;
		Ok(())
	}

	async fn get_accounts(&self, _params: GetAccountsParams) -> Result<Vec<AccountEntry>> {
		let provider = self.provider(None)?;
		let account_type = self.namespace().default_account_type();

		let mut entries: Vec<AccountEntry> = Vec::new();
		for account in self.session_addresses(&provider) {
			if !entries.iter().any(|e| e.address == account.address) {
				entries.push(AccountEntry::new(
					self.namespace(),
					account.address,
					account_type,
				));
			}
		}
		Ok(entries)
	}

	async fn get_balance(&self, params: GetBalanceParams) -> Result<Balance> {
		let symbol = params
			.caip_network
			.or_else(|| {
				self.core
					.namespace_networks()
					.into_iter()
					.find(|n| n.id == params.chain_id)
			})
			.map(|n| n.native_currency.symbol)
			.unwrap_or_default();

		Ok(Balance {
			balance: "0".to_string(),
			symbol,
		})
	}

	async fn get_profile(&self, _params: GetProfileParams) -> Result<Profile> {
		Ok(Profile::default())
	}

	async fn sign_message(&self, _params: SignMessageParams) -> Result<String> {
		Ok(String::new())
	}

	async fn send_transaction(&self, _params: SendTransactionParams) -> Result<String> {
		Ok(String::new())
	}

	async fn write_contract(&self, _params: WriteContractParams) -> Result<String> {
		Ok(String::new())
	}

	async fn estimate_gas(&self, _params: EstimateGasParams) -> Result<u64> {
		Ok(0)
	}

	async fn sync_connectors(&self, _options: SyncConnectorsOptions) -> Result<()> {
		Ok(())
	}

	async fn sync_connection(&self, params: SyncConnectionParams) -> Result<Option<ConnectionResult>> {
		let Some(provider) = self.core.universal_provider() else {
			return Ok(None);
		};
		Ok(self.connection_from_session(provider, params.chain_id.as_ref()))
	}
}
