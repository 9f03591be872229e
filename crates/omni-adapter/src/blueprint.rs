// omni-adapter/src/blueprint.rs

use crate::base::{AdapterCore, DappContext};
use crate::emitter::EventListener;
use async_trait::async_trait;
use omni_types::{
	AccountEntry, AdapterEventKind, AuthProvider, CaipNetwork, ChainId, ChainNamespace, Connector,
	ConnectionResult, ConnectorType, ProviderHandle, Result, UniversalProvider,
};
use std::fmt::Debug;
use std::sync::Arc;

/// Receives the pairing URI while a WalletConnect approval is pending.
pub type UriCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ConnectParams {
	pub connector_id: String,
	pub connector_type: ConnectorType,
	pub provider: Option<ProviderHandle>,
	pub chain_id: Option<ChainId>,
}

#[derive(Debug, Clone, Default)]
pub struct DisconnectParams {
	pub provider: Option<ProviderHandle>,
	pub provider_type: Option<ConnectorType>,
}

#[derive(Debug, Clone)]
pub struct SwitchNetworkParams {
	pub caip_network: CaipNetwork,
	pub provider: Option<ProviderHandle>,
	pub provider_type: Option<ConnectorType>,
}

#[derive(Debug, Clone)]
pub struct GetAccountsParams {
	pub connector_id: String,
	pub namespace: ChainNamespace,
}

#[derive(Debug, Clone)]
pub struct GetBalanceParams {
	pub address: String,
	pub chain_id: ChainId,
	pub caip_network: Option<CaipNetwork>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Balance {
	pub balance: String,
	pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct GetProfileParams {
	pub address: String,
	pub chain_id: ChainId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
	pub name: Option<String>,
	pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignMessageParams {
	pub message: String,
	pub address: String,
	pub provider: ProviderHandle,
}

#[derive(Debug, Clone)]
pub struct SendTransactionParams {
	pub address: String,
	pub to: String,
	pub value: String,
	pub data: Option<String>,
	pub gas: Option<u64>,
	pub caip_network: Option<CaipNetwork>,
	pub provider: ProviderHandle,
}

#[derive(Debug, Clone)]
pub struct WriteContractParams {
	pub address: String,
	pub contract_address: String,
	pub method: String,
	pub args: Vec<serde_json::Value>,
	pub abi: serde_json::Value,
	pub caip_network: Option<CaipNetwork>,
	pub provider: ProviderHandle,
}

#[derive(Debug, Clone)]
pub struct EstimateGasParams {
	pub address: String,
	pub to: String,
	pub data: Option<String>,
	pub caip_network: Option<CaipNetwork>,
	pub provider: ProviderHandle,
}

#[derive(Debug, Clone, Default)]
pub struct SyncConnectorsOptions {
	pub project_id: Option<String>,
	pub networks: Vec<CaipNetwork>,
}

#[derive(Debug, Clone)]
pub struct SyncConnectionParams {
	pub connector_id: String,
	pub namespace: ChainNamespace,
	pub chain_id: Option<ChainId>,
	pub rpc_url: Option<String>,
}

/// Capability contract every namespace implementation satisfies.
///
/// Implementors embed an [`AdapterCore`] and return it from
/// [`ChainAdapter::core`]; connector bookkeeping, events, provider injection
/// and the default network switch come for free. Operations reject on
/// failure and never swallow errors, the client decides what is fatal.
#[async_trait]
pub trait ChainAdapter: Send + Sync + Debug {
	/// Short name of the implementation, used in logs.
	fn adapter_type(&self) -> &'static str;

	/// Shared bookkeeping of this adapter
	fn core(&self) -> &AdapterCore;

	fn namespace(&self) -> ChainNamespace {
		self.core().namespace()
	}

	fn connectors(&self) -> Vec<Connector> {
		self.core().connectors()
	}

	/// Registers connectors. Same id replaces the earlier registration.
	fn add_connector(&self, connectors: Vec<Connector>) {
		self.core().add_connectors(connectors)
	}

	/// Subscribes to an adapter event. Registering the same listener twice is a no-op.
	fn on(&self, kind: AdapterEventKind, listener: EventListener) -> bool {
		self.core().emitter().on(kind, listener)
	}

	fn off(&self, kind: AdapterEventKind, listener: &EventListener) -> bool {
		self.core().emitter().off(kind, listener)
	}

	fn set_networks(&self, networks: Vec<CaipNetwork>) {
		self.core().set_networks(networks)
	}

	fn set_dapp_context(&self, context: DappContext) {
		self.core().set_dapp_context(context)
	}

	fn set_universal_provider(&self, provider: Arc<dyn UniversalProvider>) {
		self.core().set_universal_provider(provider)
	}

	fn set_auth_provider(&self, provider: Arc<dyn AuthProvider>) {
		self.core().set_auth_provider(provider)
	}

	/// Moves the wallet to another network of this namespace.
	async fn switch_network(&self, params: SwitchNetworkParams) -> Result<()> {
		self.core().switch_network(params).await
	}

	/// Pairs through WalletConnect.
	///
	/// `on_uri` receives the pairing URI before the approval settles. No
	/// timeout is applied while waiting for the wallet.
	async fn connect_walletconnect(
		&self,
		on_uri: UriCallback,
		chain_id: Option<ChainId>,
	) -> Result<()>;

	async fn connect(&self, params: ConnectParams) -> Result<ConnectionResult>;

	async fn disconnect(&self, params: DisconnectParams) -> Result<()>;

	async fn get_accounts(&self, params: GetAccountsParams) -> Result<Vec<AccountEntry>>;

	async fn get_balance(&self, params: GetBalanceParams) -> Result<Balance>;

	async fn get_profile(&self, params: GetProfileParams) -> Result<Profile>;

	async fn sign_message(&self, params: SignMessageParams) -> Result<String>;

	async fn send_transaction(&self, params: SendTransactionParams) -> Result<String>;

	async fn write_contract(&self, params: WriteContractParams) -> Result<String>;

	async fn estimate_gas(&self, params: EstimateGasParams) -> Result<u64>;

	/// Rediscovers the connectors available in this namespace.
	async fn sync_connectors(&self, options: SyncConnectorsOptions) -> Result<()>;

	/// Silent reconnection with a persisted connector id.
	///
	/// `Ok(None)` means the wallet no longer exposes an account.
	async fn sync_connection(&self, params: SyncConnectionParams) -> Result<Option<ConnectionResult>>;
}
