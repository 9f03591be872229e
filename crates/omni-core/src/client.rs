//! The client orchestrator.
//!
//! [`Client`] is the only caller of adapter methods and the only writer of
//! the published account, network, provider and selection state. It is
//! cheap to clone; every clone drives the same instance.

use crate::alerts::{Alert, AlertReporter};
use crate::builder::ClientBuilder;
use crate::error::{ClientError, Result};
use crate::events::QueuedEvent;
use crate::providers::SharedProviders;
use crate::registry::{AdapterRegistry, ConnectorRegistry};
use crate::state::{ActiveProvider, ClientState};
use arc_swap::ArcSwap;
use omni_adapter::{
	ChainAdapter, ConnectParams, DappContext, DisconnectParams, SignMessageParams,
	SwitchNetworkParams, SyncConnectorsOptions, UriCallback,
};
use omni_storage::ConnectionStorage;
use omni_types::{
	caip_network_id, AccountState, ActiveSelection, CaipAddress, CaipNetwork, ChainId,
	ChainNamespace, ClientOptions, ConnectionResult, ConnectionStatus, Connector, ConnectorType,
	DappData, IdentityResolver, ModalView, NetworkConfig,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// State shared by every [`Client`] clone and the event loop.
pub(crate) struct ClientInner {
	pub(crate) options: ClientOptions,
	pub(crate) networks: ArcSwap<Vec<CaipNetwork>>,
	pub(crate) adapters: AdapterRegistry,
	pub(crate) connectors: ConnectorRegistry,
	pub(crate) state: ClientState,
	pub(crate) storage: ConnectionStorage,
	pub(crate) providers: SharedProviders,
	pub(crate) alerts: AlertReporter,
	pub(crate) identity: Option<Arc<dyn IdentityResolver>>,
	pub(crate) modal: Option<Arc<dyn ModalView>>,
	pub(crate) modal_open: AtomicBool,
	pub(crate) approval_timeout: Option<Duration>,
	pub(crate) events: mpsc::UnboundedSender<QueuedEvent>,
}

impl ClientInner {
	pub(crate) fn networks(&self) -> Vec<CaipNetwork> {
		self.networks.load().as_ref().clone()
	}

	pub(crate) fn namespace_networks(&self, namespace: ChainNamespace) -> Vec<CaipNetwork> {
		self.networks
			.load()
			.iter()
			.filter(|n| n.chain_namespace == namespace)
			.cloned()
			.collect()
	}

	/// Configured network of `namespace` a wallet refers to as `chain`.
	pub(crate) fn find_network(&self, namespace: ChainNamespace, chain: &str) -> Option<CaipNetwork> {
		self.networks
			.load()
			.iter()
			.find(|n| n.chain_namespace == namespace && n.matches(chain))
			.cloned()
	}

	pub(crate) fn network_by_caip_id(&self, caip_network_id: &str) -> Option<CaipNetwork> {
		self.networks
			.load()
			.iter()
			.find(|n| n.caip_network_id == caip_network_id)
			.cloned()
	}

	/// Last network used in `namespace`, else its first configured one.
	pub(crate) fn current_network(&self, namespace: ChainNamespace) -> Option<CaipNetwork> {
		self.state
			.networks
			.get(namespace)
			.or_else(|| self.namespace_networks(namespace).into_iter().next())
	}

	pub(crate) fn dapp_context(&self) -> DappContext {
		DappContext {
			data: DappData {
				metadata: self.options.metadata.clone(),
				project_id: self.options.project_id.clone(),
				sdk_version: self.options.sdk_version.clone(),
			},
			theme: self.options.theme.clone(),
		}
	}

	/// Injects shared providers and networks into `adapter`, registers it
	/// and starts listening to it.
	pub(crate) async fn attach_adapter(&self, adapter: Arc<dyn ChainAdapter>) -> Result<()> {
		let namespace = adapter.namespace();

		adapter.set_networks(self.networks());
		adapter.set_dapp_context(self.dapp_context());
		if let Some(provider) = self.providers.universal_provider() {
			adapter.set_universal_provider(provider);
		}
		if let Some(provider) = self.providers.auth_provider() {
			adapter.set_auth_provider(provider);
		}

		self.adapters.register(adapter.clone())?;
		self.listen_adapter(&adapter);

		let options = SyncConnectorsOptions {
			project_id: self.options.project_id.clone(),
			networks: self.namespace_networks(namespace),
		};
		if let Err(e) = adapter.sync_connectors(options).await {
			warn!("Connector discovery for {} failed: {}", namespace, e);
		}
		self.connectors.set(namespace, adapter.connectors());

		if self.state.networks.get(namespace).is_none() {
			if let Some(first) = self.namespace_networks(namespace).into_iter().next() {
				self.state.networks.set(namespace, Some(first));
			}
		}

		info!(
			"Registered {} adapter for {} ({} connectors)",
			adapter.adapter_type(),
			namespace,
			adapter.connectors().len()
		);
		Ok(())
	}

	pub(crate) fn refresh_adapter_networks(&self) {
		let networks = self.networks();
		for namespace in self.adapters.namespaces() {
			if let Some(adapter) = self.adapters.get(namespace) {
				adapter.set_networks(networks.clone());
			}
		}
	}

	/// Bounds a wallet approval wait by the configured policy.
	pub(crate) async fn approve<T>(
		&self,
		operation: impl Future<Output = omni_types::Result<T>>,
	) -> Result<T> {
		match self.approval_timeout {
			Some(limit) => tokio::time::timeout(limit, operation)
				.await
				.map_err(|_| ClientError::ApprovalTimeout(limit))?
				.map_err(ClientError::from),
			None => operation.await.map_err(ClientError::from),
		}
	}

	pub(crate) async fn persist_selection(&self, network: &CaipNetwork) {
		if let Err(e) = self
			.storage
			.set_active_namespace(network.chain_namespace)
			.await
		{
			warn!("Cannot persist active namespace: {}", e);
		}
		if let Err(e) = self
			.storage
			.set_active_caip_network_id(&network.caip_network_id)
			.await
		{
			warn!("Cannot persist active network: {}", e);
		}
	}

	pub(crate) async fn persist_connection(&self, namespace: ChainNamespace, connector_id: &str) {
		if let Err(e) = self
			.storage
			.set_connected_connector_id(namespace, connector_id)
			.await
		{
			warn!("Cannot persist connector for {}: {}", namespace, e);
		}
		if let Err(e) = self.storage.add_connected_namespace(namespace).await {
			warn!("Cannot persist connected namespace {}: {}", namespace, e);
		}
		if let Err(e) = self
			.storage
			.set_connection_status(ConnectionStatus::Connected)
			.await
		{
			warn!("Cannot persist connection status: {}", e);
		}
	}

	/// Forgets everything about `namespace`'s connection.
	pub(crate) async fn reset_namespace(&self, namespace: ChainNamespace) {
		self.state.accounts.reset(namespace);
		self.state.providers.reset(namespace);
		if let Err(e) = self.storage.delete_connected_connector_id(namespace).await {
			warn!("Cannot clear persisted connector for {}: {}", namespace, e);
		}
		if let Err(e) = self.storage.remove_connected_namespace(namespace).await {
			warn!("Cannot clear connected namespace {}: {}", namespace, e);
		}
	}

	pub(crate) async fn reset_all(&self) {
		for namespace in self.adapters.namespaces() {
			self.reset_namespace(namespace).await;
		}
		if let Err(e) = self
			.storage
			.set_connection_status(ConnectionStatus::Disconnected)
			.await
		{
			warn!("Cannot persist connection status: {}", e);
		}
		self.state.pairing_uri.send_replace(None);
	}

	/// Disconnects every connected namespace's wallet, then tears down every
	/// namespace regardless of the outcome.
	///
	/// A WalletConnect session shared by several namespaces is ended once.
	/// The first adapter error is returned.
	pub(crate) async fn disconnect(&self) -> Result<()> {
		let mut result = Ok(());
		let mut walletconnect_done = false;
		for namespace in self.adapters.namespaces() {
			let (Some(adapter), Some(provider)) =
				(self.adapters.get(namespace), self.state.providers.get(namespace))
			else {
				continue;
			};
			if provider.provider_type == ConnectorType::WalletConnect {
				if walletconnect_done {
					continue;
				}
				walletconnect_done = true;
			}

			let params = DisconnectParams {
				provider: Some(provider.provider),
				provider_type: Some(provider.provider_type),
			};
			if let Err(e) = adapter.disconnect(params).await {
				warn!("Disconnecting {} failed: {}", namespace, e);
				if result.is_ok() {
					result = Err(e);
				}
			}
		}

		self.reset_all().await;
		info!("Disconnected all namespaces");
		result.map_err(ClientError::from)
	}

	fn connection_of(&self, namespace: ChainNamespace) -> Option<ConnectionResult> {
		let provider = self.state.providers.get(namespace)?;
		let caip = self.state.accounts.get(namespace).caip_address?;
		Some(ConnectionResult {
			connector_id: provider.connector_id,
			connector_type: provider.provider_type,
			provider: provider.provider,
			chain_id: caip.chain_id,
			address: caip.address,
		})
	}

	/// Marks `namespace` as connecting unless it already is past that.
	fn begin_connecting(&self, namespace: ChainNamespace) {
		if self.state.accounts.get(namespace).status == ConnectionStatus::Disconnected {
			self.state
				.accounts
				.set_status(namespace, ConnectionStatus::Connecting);
		}
	}

	fn abort_connecting(&self, namespace: ChainNamespace) {
		if self.state.accounts.get(namespace).status == ConnectionStatus::Connecting {
			self.state
				.accounts
				.set_status(namespace, ConnectionStatus::Disconnected);
		}
	}
}

impl std::fmt::Debug for ClientInner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClientInner")
			.field("adapters", &self.adapters)
			.field("networks", &self.networks.load().len())
			.field("selection", &self.state.selection())
			.field("providers", &self.providers)
			.finish()
	}
}

/// Multi-namespace wallet connection client.
#[derive(Debug, Clone)]
pub struct Client {
	pub(crate) inner: Arc<ClientInner>,
}

impl Client {
	pub fn builder(options: ClientOptions) -> ClientBuilder {
		ClientBuilder::new(options)
	}

	/// Shows the modal. Does nothing when it is already open.
	pub fn open(&self, view: Option<&str>) {
		if self.inner.modal_open.swap(true, Ordering::SeqCst) {
			return;
		}
		if let Some(modal) = &self.inner.modal {
			modal.open(view);
		}
	}

	pub fn close(&self) {
		if !self.inner.modal_open.swap(false, Ordering::SeqCst) {
			return;
		}
		if let Some(modal) = &self.inner.modal {
			modal.close();
		}
	}

	pub fn is_open(&self) -> bool {
		self.inner.modal_open.load(Ordering::SeqCst)
	}

	/// Pairs a wallet over WalletConnect.
	///
	/// The pairing uri is published while the wallet approves. Once the
	/// session is established every namespace it carries accounts for is
	/// connected, not only the active one.
	pub async fn connect_walletconnect(&self) -> Result<()> {
		let inner = &self.inner;
		let namespace = inner
			.state
			.active_namespace()
			.or_else(|| inner.adapters.namespaces().first().copied())
			.ok_or(ClientError::NoActiveNamespace)?;
		let adapter = inner.adapters.require(namespace)?;
		let chain_id = inner.current_network(namespace).map(|n| n.id);

		let weak = Arc::downgrade(&self.inner);
		let on_uri: UriCallback = Arc::new(move |uri: String| {
			if let Some(inner) = weak.upgrade() {
				inner.state.pairing_uri.send_replace(Some(uri));
			}
		});

		inner.begin_connecting(namespace);
		if let Err(e) = inner
			.approve(adapter.connect_walletconnect(on_uri, chain_id))
			.await
		{
			inner.abort_connecting(namespace);
			return Err(e);
		}

		info!("WalletConnect session approved");
		inner.sync_walletconnect_accounts().await;
		inner.abort_connecting(namespace);
		self.close();
		Ok(())
	}

	/// Connects through a specific connector.
	///
	/// With `namespace` the connector is looked up there only; otherwise the
	/// active namespace is searched first. Connecting makes the connector's
	/// namespace active.
	pub async fn connect_external(
		&self,
		connector_id: &str,
		namespace: Option<ChainNamespace>,
	) -> Result<ConnectionResult> {
		let inner = &self.inner;
		let connector = self.find_connector(connector_id, namespace)?;
		let namespace = connector.chain;

		if connector.connector_type == ConnectorType::WalletConnect {
			if inner.state.active_namespace() != Some(namespace) {
				self.activate_namespace(namespace).await;
			}
			self.connect_walletconnect().await?;
			return inner
				.connection_of(namespace)
				.ok_or(ClientError::NotConnected(namespace));
		}

		let adapter = inner.adapters.require(namespace)?;
		if inner.state.active_namespace() != Some(namespace) {
			self.activate_namespace(namespace).await;
		}

		let params = ConnectParams {
			connector_id: connector.id.clone(),
			connector_type: connector.connector_type,
			provider: connector.provider.clone(),
			chain_id: inner.current_network(namespace).map(|n| n.id),
		};

		inner.begin_connecting(namespace);
		let connection = match inner.approve(adapter.connect(params)).await {
			Ok(connection) => connection,
			Err(e) => {
				inner.abort_connecting(namespace);
				return Err(e);
			}
		};

		info!(
			"Connected {} via {} as {}",
			namespace, connection.connector_id, connection.address
		);
		inner.apply_connection(namespace, connection.clone()).await;
		self.close();
		Ok(connection)
	}

	fn find_connector(&self, connector_id: &str, namespace: Option<ChainNamespace>) -> Result<Connector> {
		let inner = &self.inner;
		let found = match namespace {
			Some(namespace) => inner
				.connectors
				.namespace(namespace)
				.into_iter()
				.find(|c| c.id == connector_id),
			None => inner
				.connectors
				.find(connector_id, inner.state.active_namespace()),
		};
		found.ok_or_else(|| ClientError::ConnectorNotFound(connector_id.to_string()))
	}

	async fn activate_namespace(&self, namespace: ChainNamespace) {
		if let Some(network) = self.inner.current_network(namespace) {
			self.inner.state.set_active_network(network.clone());
			self.inner.persist_selection(&network).await;
		}
	}

	/// Switches the active network within the active namespace.
	///
	/// A connected wallet is asked to follow and the account is re-synced
	/// on the new chain with its current address.
	pub async fn switch_network(&self, network: &CaipNetwork) -> Result<()> {
		let inner = &self.inner;
		let target = inner
			.network_by_caip_id(&network.caip_network_id)
			.ok_or_else(|| ClientError::NetworkNotFound(network.caip_network_id.clone()))?;

		let namespace = target.chain_namespace;
		if let Some(active) = inner.state.active_namespace() {
			if active != namespace {
				return Err(ClientError::NamespaceMismatch {
					active,
					requested: namespace,
				});
			}
		}
		let adapter = inner.adapters.require(namespace)?;

		let account = inner.state.accounts.get(namespace);
		let provider = inner.state.providers.get(namespace);
		if let (Some(address), Some(provider)) = (account.address.clone(), provider) {
			let params = SwitchNetworkParams {
				caip_network: target.clone(),
				provider: Some(provider.provider),
				provider_type: Some(provider.provider_type),
			};
			inner.approve(adapter.switch_network(params)).await?;

			inner.state.set_active_network(target.clone());
			inner.persist_selection(&target).await;
			inner
				.sync_account(namespace, &address, Some(target.id.clone()))
				.await;
		} else {
			inner.state.set_active_network(target.clone());
			inner.persist_selection(&target).await;
		}

		info!("Switched to {}", target.caip_network_id);
		Ok(())
	}

	/// Disconnects every namespace.
	///
	/// Local state is cleared even when the wallet fails to disconnect; the
	/// wallet's error is still returned.
	pub async fn disconnect(&self) -> Result<()> {
		self.inner.disconnect().await
	}

	/// Signs `message` with the active namespace's account.
	pub async fn sign_message(&self, message: &str) -> Result<String> {
		let inner = &self.inner;
		let namespace = inner
			.state
			.active_namespace()
			.ok_or(ClientError::NoActiveNamespace)?;
		let adapter = inner.adapters.require(namespace)?;
		let address = inner
			.state
			.accounts
			.get(namespace)
			.address
			.ok_or(ClientError::NotConnected(namespace))?;
		let provider = inner
			.state
			.providers
			.get(namespace)
			.ok_or(ClientError::NotConnected(namespace))?;

		let params = SignMessageParams {
			message: message.to_string(),
			address,
			provider: provider.provider,
		};
		inner.approve(adapter.sign_message(params)).await
	}

	/// Address in `namespace`, or the active namespace when `None`.
	pub fn get_address(&self, namespace: Option<ChainNamespace>) -> Option<String> {
		let namespace = namespace.or_else(|| self.inner.state.active_namespace())?;
		self.inner.state.accounts.get(namespace).address
	}

	pub fn get_caip_address(&self, namespace: Option<ChainNamespace>) -> Option<CaipAddress> {
		let namespace = namespace.or_else(|| self.inner.state.active_namespace())?;
		self.inner.state.accounts.get(namespace).caip_address
	}

	pub fn get_caip_network(&self) -> Option<CaipNetwork> {
		self.inner.state.selection().network().cloned()
	}

	pub fn get_active_namespace(&self) -> Option<ChainNamespace> {
		self.inner.state.active_namespace()
	}

	pub fn get_account_state(&self, namespace: ChainNamespace) -> AccountState {
		self.inner.state.accounts.get(namespace)
	}

	pub fn get_status(&self, namespace: ChainNamespace) -> ConnectionStatus {
		self.inner.state.accounts.get(namespace).status
	}

	pub fn get_provider(&self, namespace: ChainNamespace) -> Option<ActiveProvider> {
		self.inner.state.providers.get(namespace)
	}

	pub fn get_pairing_uri(&self) -> Option<String> {
		self.inner.state.pairing_uri.borrow().clone()
	}

	pub fn get_connectors(&self) -> Vec<Connector> {
		self.inner.connectors.all()
	}

	pub fn get_caip_networks(&self) -> Vec<CaipNetwork> {
		self.inner.networks()
	}

	/// Registered namespaces in registration order.
	pub fn namespaces(&self) -> Vec<ChainNamespace> {
		self.inner.adapters.namespaces()
	}

	pub fn adapter(&self, namespace: ChainNamespace) -> Option<Arc<dyn ChainAdapter>> {
		self.inner.adapters.get(namespace)
	}

	pub fn subscribe_account(&self, namespace: ChainNamespace) -> watch::Receiver<AccountState> {
		self.inner.state.accounts.subscribe(namespace)
	}

	pub fn subscribe_selection(&self) -> watch::Receiver<ActiveSelection> {
		self.inner.state.selection.subscribe()
	}

	pub fn subscribe_network(&self, namespace: ChainNamespace) -> watch::Receiver<Option<CaipNetwork>> {
		self.inner.state.networks.subscribe(namespace)
	}

	pub fn subscribe_provider(
		&self,
		namespace: ChainNamespace,
	) -> watch::Receiver<Option<ActiveProvider>> {
		self.inner.state.providers.subscribe(namespace)
	}

	pub fn subscribe_pairing_uri(&self) -> watch::Receiver<Option<String>> {
		self.inner.state.pairing_uri.subscribe()
	}

	pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
		self.inner.alerts.subscribe()
	}

	/// Waits until every adapter and provider event received so far has
	/// been applied.
	pub async fn flush_events(&self) {
		let (ack, done) = oneshot::channel();
		if self.inner.events.send(QueuedEvent::Flush(ack)).is_err() {
			return;
		}
		let _ = done.await;
	}

	/// Registers an adapter for a namespace that has none yet.
	///
	/// `networks` are added to the configured networks; the namespace must
	/// end up with at least one.
	pub async fn add_adapter(
		&self,
		adapter: Arc<dyn ChainAdapter>,
		networks: Vec<NetworkConfig>,
	) -> Result<()> {
		let inner = &self.inner;
		let namespace = adapter.namespace();
		if inner.adapters.contains(namespace) {
			return Err(ClientError::Config(format!(
				"Adapter for namespace {} already exists",
				namespace
			)));
		}
		if let Some(foreign) = networks.iter().find(|n| n.chain_namespace != namespace) {
			return Err(ClientError::Config(format!(
				"Network {} does not belong to namespace {}",
				foreign.name, namespace
			)));
		}

		let added = omni_types::normalize_networks(&networks, inner.options.project_id.as_deref());
		inner.networks.rcu(|current| {
			let mut merged = current.as_ref().clone();
			for network in &added {
				if !merged.iter().any(|n| n.caip_network_id == network.caip_network_id) {
					merged.push(network.clone());
				}
			}
			merged
		});
		if inner.namespace_networks(namespace).is_empty() {
			return Err(ClientError::Config(format!(
				"Namespace {} needs at least one network",
				namespace
			)));
		}

		inner.refresh_adapter_networks();
		inner.attach_adapter(adapter).await?;

		if inner.state.active_namespace().is_none() {
			self.activate_namespace(namespace).await;
		}
		Ok(())
	}

	/// Unregisters a namespace's adapter together with its networks and
	/// connectors.
	pub async fn remove_adapter(&self, namespace: ChainNamespace) -> Result<()> {
		let inner = &self.inner;
		let adapter = inner.adapters.require(namespace)?;

		let account = inner.state.accounts.get(namespace);
		if account.address.is_some() && account.status != ConnectionStatus::Disconnected {
			return Err(ClientError::ActiveSession(namespace));
		}

		adapter.core().emitter().remove_all_listeners();
		inner.adapters.remove(namespace);
		inner.connectors.remove(namespace);
		inner.state.accounts.remove(namespace);
		inner.state.providers.remove(namespace);
		inner.state.networks.remove(namespace);
		inner.networks.rcu(|current| {
			current
				.iter()
				.filter(|n| n.chain_namespace != namespace)
				.cloned()
				.collect::<Vec<_>>()
		});
		inner.refresh_adapter_networks();

		if inner.state.active_namespace() == Some(namespace) {
			match inner.networks().into_iter().next() {
				Some(next) => {
					inner.state.set_active_network(next.clone());
					inner.persist_selection(&next).await;
				}
				None => inner.state.clear_selection(),
			}
		}

		info!("Removed adapter for {}", namespace);
		Ok(())
	}

	/// Adds a network to a registered namespace. Known ids are ignored.
	pub async fn add_network(&self, namespace: ChainNamespace, network: NetworkConfig) -> Result<()> {
		let inner = &self.inner;
		inner.adapters.require(namespace)?;
		if network.chain_namespace != namespace {
			return Err(ClientError::Config(format!(
				"Network {} does not belong to namespace {}",
				network.name, namespace
			)));
		}

		let network = CaipNetwork::from_config(&network, inner.options.project_id.as_deref());
		if inner.network_by_caip_id(&network.caip_network_id).is_some() {
			debug!("Network {} already configured", network.caip_network_id);
			return Ok(());
		}

		let id = network.caip_network_id.clone();
		inner.networks.rcu(|current| {
			let mut networks = current.as_ref().clone();
			networks.push(network.clone());
			networks
		});
		inner.refresh_adapter_networks();
		info!("Added network {}", id);
		Ok(())
	}

	/// Removes a network from a namespace, never its last one.
	pub async fn remove_network(&self, namespace: ChainNamespace, id: &ChainId) -> Result<()> {
		let inner = &self.inner;
		inner.adapters.require(namespace)?;

		let networks = inner.namespace_networks(namespace);
		let target = networks
			.iter()
			.find(|n| n.id == *id)
			.cloned()
			.ok_or_else(|| ClientError::NetworkNotFound(caip_network_id(namespace, id)))?;
		if networks.len() == 1 {
			return Err(ClientError::Config(
				"Cannot remove last network for a namespace".to_string(),
			));
		}

		inner.networks.rcu(|current| {
			current
				.iter()
				.filter(|n| n.caip_network_id != target.caip_network_id)
				.cloned()
				.collect::<Vec<_>>()
		});
		inner.refresh_adapter_networks();

		let fallback = inner.namespace_networks(namespace).into_iter().next();
		if inner.state.networks.get(namespace).as_ref() == Some(&target) {
			inner.state.networks.set(namespace, fallback.clone());
		}
		if inner.state.selection().network() == Some(&target) {
			if let Some(next) = fallback {
				inner.state.set_active_network(next.clone());
				inner.persist_selection(&next).await;
			}
		}

		info!("Removed network {}", target.caip_network_id);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::alerts::AlertKind;
	use crate::testing::{
		evm, session, solana, MockAdapter, MockFactory, MockIdentityResolver, MockModal,
		MockUniversalProvider, SOLANA_MAINNET,
	};
	use omni_storage::implementations::memory::MemoryStorage;
	use omni_storage::StorageInterface;
	use omni_types::{
		connector_id, AccountEntry, AccountType, AdapterEvent, ProviderEvent, UniversalProvider,
	};

	fn evm_options() -> ClientOptions {
		ClientOptions::new(vec![evm(1, "Ethereum"), evm(137, "Polygon")]).with_project_id("pid")
	}

	fn network(client: &Client, caip_network_id: &str) -> CaipNetwork {
		client
			.get_caip_networks()
			.into_iter()
			.find(|n| n.caip_network_id == caip_network_id)
			.unwrap()
	}

	async fn evm_client(adapter: Arc<MockAdapter>) -> Client {
		ClientBuilder::new(evm_options())
			.with_adapter(adapter)
			.build()
			.await
			.unwrap()
	}

	/// Client with universal adapters for eip155 and solana sharing one
	/// WalletConnect session.
	async fn walletconnect_client() -> (Client, Arc<MockUniversalProvider>) {
		let solana_account = format!("solana:{}:SoLAddr111", SOLANA_MAINNET);
		let provider = MockUniversalProvider::approving(session(&[
			("eip155", &["eip155:1:0xabc"]),
			("solana", &[solana_account.as_str()]),
		]));
		let options =
			ClientOptions::new(vec![evm(1, "Ethereum"), evm(137, "Polygon"), solana()])
				.with_project_id("pid");
		let client = ClientBuilder::new(options)
			.with_provider_factory(Arc::new(MockFactory::new(provider.clone())))
			.build()
			.await
			.unwrap();
		(client, provider)
	}

	#[tokio::test]
	async fn test_connect_then_switch_network() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64),
		);
		let client = evm_client(adapter.clone()).await;

		let connection = client.connect_external("X", None).await.unwrap();
		assert_eq!(connection.address, "0xabc");
		assert_eq!(
			client.get_caip_address(None).unwrap().to_string(),
			"eip155:1:0xabc"
		);
		assert_eq!(
			client.get_status(ChainNamespace::Eip155),
			ConnectionStatus::Connected
		);

		let polygon = network(&client, "eip155:137");
		client.switch_network(&polygon).await.unwrap();

		assert_eq!(
			client.get_caip_address(None).unwrap().to_string(),
			"eip155:137:0xabc"
		);
		assert_eq!(client.get_caip_network().unwrap().id, ChainId::Number(137));
		assert_eq!(client.get_active_namespace(), Some(ChainNamespace::Eip155));
		assert!(adapter.calls().contains(&"switch:eip155:137".to_string()));
	}

	#[tokio::test]
	async fn test_connect_syncs_balance_accounts_and_wallet_info() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64)
				.with_profile("alice.eth"),
		);
		let client = evm_client(adapter).await;
		client.connect_external("X", None).await.unwrap();

		let account = client.get_account_state(ChainNamespace::Eip155);
		assert_eq!(account.balance.as_deref(), Some("1.5"));
		assert_eq!(account.balance_symbol.as_deref(), Some("ETH"));
		assert_eq!(account.profile_name.as_deref(), Some("alice.eth"));
		assert_eq!(account.all_accounts.len(), 1);
		assert_eq!(account.all_accounts[0].address, "0xabc");
		assert_eq!(account.connected_wallet.unwrap().name, "Mock Wallet");
		assert_eq!(
			client.get_provider(ChainNamespace::Eip155).unwrap().connector_id,
			"X"
		);
	}

	#[tokio::test]
	async fn test_connect_persists_connection() {
		let backend: Arc<dyn StorageInterface> = Arc::new(MemoryStorage::new());
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 137u64),
		);
		let client = ClientBuilder::new(evm_options())
			.with_adapter(adapter)
			.with_storage(backend.clone())
			.build()
			.await
			.unwrap();
		client.connect_external("X", None).await.unwrap();

		let storage = ConnectionStorage::new(backend);
		assert_eq!(
			storage
				.connected_connector_id(ChainNamespace::Eip155)
				.await
				.unwrap()
				.as_deref(),
			Some("X")
		);
		assert_eq!(
			storage.active_caip_network_id().await.unwrap().as_deref(),
			Some("eip155:137")
		);
		assert_eq!(
			storage.connection_status().await.unwrap(),
			ConnectionStatus::Connected
		);
	}

	#[tokio::test]
	async fn test_rejected_connect_returns_to_disconnected() {
		let adapter = Arc::new(MockAdapter::new(ChainNamespace::Eip155).with_connector("X"));
		let client = evm_client(adapter).await;

		let err = client.connect_external("X", None).await.unwrap_err();
		assert!(err.is_user_rejection());
		assert_eq!(
			client.get_status(ChainNamespace::Eip155),
			ConnectionStatus::Disconnected
		);
		assert!(matches!(
			client.connect_external("missing", None).await,
			Err(ClientError::ConnectorNotFound(_))
		));
	}

	#[tokio::test]
	async fn test_approval_timeout() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64)
				.with_connect_delay(Duration::from_secs(30)),
		);
		let client = ClientBuilder::new(evm_options())
			.with_adapter(adapter)
			.with_approval_timeout(Duration::from_millis(20))
			.build()
			.await
			.unwrap();

		assert!(matches!(
			client.connect_external("X", None).await,
			Err(ClientError::ApprovalTimeout(_))
		));
		assert_eq!(
			client.get_status(ChainNamespace::Eip155),
			ConnectionStatus::Disconnected
		);
	}

	#[tokio::test]
	async fn test_switch_network_never_changes_namespace() {
		let adapter = Arc::new(MockAdapter::new(ChainNamespace::Eip155));
		let options = ClientOptions::new(vec![evm(1, "Ethereum"), solana()]).with_project_id("pid");
		let client = ClientBuilder::new(options)
			.with_adapter(adapter)
			.with_adapter(Arc::new(MockAdapter::new(ChainNamespace::Solana)))
			.build()
			.await
			.unwrap();
		assert_eq!(client.get_active_namespace(), Some(ChainNamespace::Eip155));

		let mainnet = network(&client, &format!("solana:{}", SOLANA_MAINNET));
		assert!(matches!(
			client.switch_network(&mainnet).await,
			Err(ClientError::NamespaceMismatch {
				active: ChainNamespace::Eip155,
				requested: ChainNamespace::Solana,
			})
		));
		assert_eq!(client.get_active_namespace(), Some(ChainNamespace::Eip155));

		let unknown = CaipNetwork::from_config(&evm(10, "Optimism"), None);
		assert!(matches!(
			client.switch_network(&unknown).await,
			Err(ClientError::NetworkNotFound(_))
		));
	}

	#[tokio::test]
	async fn test_walletconnect_connects_every_namespace() {
		let (client, provider) = walletconnect_client().await;
		let mut uri = client.subscribe_pairing_uri();

		client.connect_walletconnect().await.unwrap();

		assert!(uri.has_changed().unwrap());
		assert_eq!(uri.borrow_and_update().as_deref(), Some("wc:pairing@2"));
		assert_eq!(
			client.get_status(ChainNamespace::Eip155),
			ConnectionStatus::Connected
		);
		assert_eq!(
			client.get_status(ChainNamespace::Solana),
			ConnectionStatus::Connected
		);
		assert_eq!(
			client
				.get_caip_address(Some(ChainNamespace::Solana))
				.unwrap()
				.address,
			"SoLAddr111"
		);
		let wallet = client
			.get_account_state(ChainNamespace::Eip155)
			.connected_wallet
			.unwrap();
		assert_eq!(wallet.name, "Test Wallet");
		assert_eq!(
			client.get_provider(ChainNamespace::Solana).unwrap().connector_id,
			connector_id::WALLET_CONNECT
		);
		assert_eq!(provider.disconnects(), 0);
	}

	#[tokio::test]
	async fn test_disconnect_is_global() {
		let backend: Arc<dyn StorageInterface> = Arc::new(MemoryStorage::new());
		let solana_account = format!("solana:{}:SoLAddr111", SOLANA_MAINNET);
		let provider = MockUniversalProvider::approving(session(&[
			("eip155", &["eip155:1:0xabc"]),
			("solana", &[solana_account.as_str()]),
		]));
		let options =
			ClientOptions::new(vec![evm(1, "Ethereum"), solana()]).with_project_id("pid");
		let client = ClientBuilder::new(options)
			.with_provider_factory(Arc::new(MockFactory::new(provider.clone())))
			.with_storage(backend.clone())
			.build()
			.await
			.unwrap();
		client.connect_walletconnect().await.unwrap();

		client.disconnect().await.unwrap();

		for namespace in [ChainNamespace::Eip155, ChainNamespace::Solana] {
			assert_eq!(client.get_status(namespace), ConnectionStatus::Disconnected);
			assert!(client.get_address(Some(namespace)).is_none());
		}
		assert_eq!(provider.disconnects(), 1);

		let storage = ConnectionStorage::new(backend);
		assert!(storage
			.connected_connector_id(ChainNamespace::Eip155)
			.await
			.unwrap()
			.is_none());
		assert!(storage
			.connected_connector_id(ChainNamespace::Solana)
			.await
			.unwrap()
			.is_none());
		assert!(storage.connected_namespaces().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_disconnect_ends_session_held_by_another_namespace() {
		let solana_account = format!("solana:{}:SoLAddr111", SOLANA_MAINNET);
		let provider = MockUniversalProvider::approving(session(&[(
			"solana",
			&[solana_account.as_str()],
		)]));
		let options =
			ClientOptions::new(vec![evm(1, "Ethereum"), solana()]).with_project_id("pid");
		let client = ClientBuilder::new(options)
			.with_provider_factory(Arc::new(MockFactory::new(provider.clone())))
			.build()
			.await
			.unwrap();
		client.connect_walletconnect().await.unwrap();

		assert_eq!(client.get_active_namespace(), Some(ChainNamespace::Eip155));
		assert_eq!(
			client.get_status(ChainNamespace::Eip155),
			ConnectionStatus::Disconnected
		);
		assert_eq!(
			client.get_status(ChainNamespace::Solana),
			ConnectionStatus::Connected
		);

		client.disconnect().await.unwrap();

		assert_eq!(provider.disconnects(), 1);
		assert!(provider.session().is_none());
		assert_eq!(
			client.get_status(ChainNamespace::Solana),
			ConnectionStatus::Disconnected
		);
		assert!(client.get_provider(ChainNamespace::Solana).is_none());
	}

	#[tokio::test]
	async fn test_disconnect_clears_state_when_wallet_fails() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64)
				.failing_disconnect(),
		);
		let client = evm_client(adapter).await;
		client.connect_external("X", None).await.unwrap();

		assert!(client.disconnect().await.is_err());
		assert_eq!(
			client.get_status(ChainNamespace::Eip155),
			ConnectionStatus::Disconnected
		);
		assert!(client.get_provider(ChainNamespace::Eip155).is_none());
	}

	#[tokio::test]
	async fn test_identity_lookup_error_is_not_fatal() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64),
		);
		let resolver = Arc::new(MockIdentityResolver::failing());
		let client = ClientBuilder::new(evm_options())
			.with_adapter(adapter)
			.with_identity_resolver(resolver.clone())
			.build()
			.await
			.unwrap();

		client.connect_external("X", None).await.unwrap();

		let account = client.get_account_state(ChainNamespace::Eip155);
		assert_eq!(resolver.calls(), 1);
		assert!(account.profile_name.is_none());
		assert!(account.profile_image.is_none());
		assert_eq!(account.status, ConnectionStatus::Connected);
	}

	#[tokio::test]
	async fn test_identity_prefers_name_service() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64)
				.with_profile("adapter-name"),
		);
		let client = ClientBuilder::new(evm_options())
			.with_adapter(adapter)
			.with_identity_resolver(Arc::new(MockIdentityResolver::named("vitalik")))
			.build()
			.await
			.unwrap();

		client.connect_external("X", None).await.unwrap();

		let account = client.get_account_state(ChainNamespace::Eip155);
		assert_eq!(account.profile_name.as_deref(), Some("vitalik"));
		assert!(account.profile_image.unwrap().contains("vitalik"));
	}

	#[tokio::test]
	async fn test_identity_falls_back_to_adapter_profile() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64)
				.with_profile("adapter-name"),
		);
		let resolver = Arc::new(MockIdentityResolver::empty());
		let client = ClientBuilder::new(evm_options())
			.with_adapter(adapter)
			.with_identity_resolver(resolver.clone())
			.build()
			.await
			.unwrap();

		client.connect_external("X", None).await.unwrap();

		let account = client.get_account_state(ChainNamespace::Eip155);
		assert_eq!(resolver.calls(), 1);
		assert_eq!(account.profile_name.as_deref(), Some("adapter-name"));
	}

	#[tokio::test]
	async fn test_account_change_clears_previous_profile() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64)
				.with_profile("alice.eth"),
		);
		let client = evm_client(adapter.clone()).await;
		client.connect_external("X", None).await.unwrap();
		assert_eq!(
			client
				.get_account_state(ChainNamespace::Eip155)
				.profile_name
				.as_deref(),
			Some("alice.eth")
		);

		adapter.set_profile(None);
		adapter.emit(AdapterEvent::AccountChanged {
			address: "0xdef".to_string(),
			chain_id: None,
		});
		client.flush_events().await;

		let account = client.get_account_state(ChainNamespace::Eip155);
		assert_eq!(account.address.as_deref(), Some("0xdef"));
		assert!(account.profile_name.is_none());
	}

	#[tokio::test]
	async fn test_all_accounts_are_deduplicated() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64)
				.with_accounts(vec![
					AccountEntry::new(ChainNamespace::Eip155, "0xabc", AccountType::Eoa),
					AccountEntry::new(ChainNamespace::Eip155, "0xABC", AccountType::Eoa),
					AccountEntry::new(ChainNamespace::Eip155, "0xdef", AccountType::Eoa),
				]),
		);
		let client = evm_client(adapter).await;
		client.connect_external("X", None).await.unwrap();

		let addresses: Vec<_> = client
			.get_account_state(ChainNamespace::Eip155)
			.all_accounts
			.into_iter()
			.map(|entry| entry.address)
			.collect();
		assert_eq!(addresses, vec!["0xabc".to_string(), "0xdef".to_string()]);
	}

	#[tokio::test]
	async fn test_walletconnect_switch_sets_default_chain() {
		let (client, provider) = walletconnect_client().await;
		client.connect_walletconnect().await.unwrap();

		let polygon = network(&client, "eip155:137");
		client.switch_network(&polygon).await.unwrap();

		assert_eq!(
			provider.default_chains().last().map(String::as_str),
			Some("eip155:137")
		);
		assert_eq!(
			client.get_caip_address(None).unwrap().to_string(),
			"eip155:137:0xabc"
		);
	}

	#[tokio::test]
	async fn test_wallet_switch_to_unconfigured_chain_resyncs_account() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64),
		);
		let client = evm_client(adapter.clone()).await;
		client.connect_external("X", None).await.unwrap();

		adapter.emit(AdapterEvent::SwitchNetwork {
			address: None,
			chain_id: ChainId::Number(10),
		});
		client.flush_events().await;

		assert_eq!(
			client.get_caip_address(None).unwrap().to_string(),
			"eip155:10:0xabc"
		);
		assert_eq!(client.get_caip_network().unwrap().caip_network_id, "eip155:1");
	}

	#[tokio::test]
	async fn test_balance_failure_leaves_balance_unset() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64)
				.failing_balance(),
		);
		let client = evm_client(adapter).await;

		client.connect_external("X", None).await.unwrap();

		let account = client.get_account_state(ChainNamespace::Eip155);
		assert!(account.balance.is_none());
		assert_eq!(account.status, ConnectionStatus::Connected);
	}

	#[tokio::test]
	async fn test_unconfigured_chain_keeps_selection() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 10u64),
		);
		let client = evm_client(adapter).await;

		client.connect_external("X", None).await.unwrap();

		assert_eq!(
			client.get_caip_address(None).unwrap().to_string(),
			"eip155:10:0xabc"
		);
		assert_eq!(client.get_caip_network().unwrap().caip_network_id, "eip155:1");
	}

	#[tokio::test]
	async fn test_adapter_events_resync_the_account() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64),
		);
		let client = evm_client(adapter.clone()).await;
		client.connect_external("X", None).await.unwrap();

		adapter.emit(AdapterEvent::AccountChanged {
			address: "0xdef".to_string(),
			chain_id: None,
		});
		client.flush_events().await;
		assert_eq!(
			client.get_caip_address(None).unwrap().to_string(),
			"eip155:1:0xdef"
		);

		adapter.emit(AdapterEvent::SwitchNetwork {
			address: None,
			chain_id: ChainId::Number(137),
		});
		client.flush_events().await;
		assert_eq!(
			client.get_caip_address(None).unwrap().to_string(),
			"eip155:137:0xdef"
		);
		assert_eq!(client.get_caip_network().unwrap().caip_network_id, "eip155:137");

		adapter.emit(AdapterEvent::Disconnect);
		client.flush_events().await;
		assert_eq!(
			client.get_status(ChainNamespace::Eip155),
			ConnectionStatus::Disconnected
		);
		assert!(adapter.calls().contains(&"disconnect".to_string()));
	}

	#[tokio::test]
	async fn test_connectors_changed_refreshes_registry() {
		let adapter = Arc::new(MockAdapter::new(ChainNamespace::Eip155).with_connector("X"));
		let client = evm_client(adapter.clone()).await;
		assert_eq!(client.get_connectors().len(), 1);

		adapter.add_connector(vec![Connector::new(
			"Y",
			ConnectorType::Announced,
			"Other Wallet",
			ChainNamespace::Eip155,
		)]);
		client.flush_events().await;

		let ids: Vec<_> = client.get_connectors().into_iter().map(|c| c.id).collect();
		assert_eq!(ids.len(), 2);
		assert!(ids.contains(&"Y".to_string()));
	}

	#[tokio::test]
	async fn test_universal_provider_events() {
		let (client, provider) = walletconnect_client().await;
		let mut alerts = client.subscribe_alerts();
		client.connect_walletconnect().await.unwrap();

		provider.emit(ProviderEvent::ChainChanged("eip155:137".to_string()));
		client.flush_events().await;
		assert_eq!(client.get_caip_network().unwrap().caip_network_id, "eip155:137");
		assert_eq!(
			client.get_caip_address(None).unwrap().to_string(),
			"eip155:137:0xabc"
		);

		provider.emit(ProviderEvent::ChainChanged("eip155:9999".to_string()));
		client.flush_events().await;
		assert_eq!(client.get_caip_network().unwrap().caip_network_id, "eip155:137");
		assert_eq!(
			client.get_caip_address(None).unwrap().to_string(),
			"eip155:9999:0xabc"
		);

		provider.emit(ProviderEvent::Error("Unauthorized: invalid key".to_string()));
		client.flush_events().await;
		assert_eq!(alerts.try_recv().unwrap().kind, AlertKind::InvalidProjectId);

		provider.emit(ProviderEvent::Disconnect { reason: None });
		client.flush_events().await;
		assert_eq!(
			client.get_status(ChainNamespace::Eip155),
			ConnectionStatus::Disconnected
		);
		assert_eq!(
			client.get_status(ChainNamespace::Solana),
			ConnectionStatus::Disconnected
		);
	}

	#[tokio::test]
	async fn test_sign_message_needs_connection() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64),
		);
		let client = evm_client(adapter).await;

		assert!(matches!(
			client.sign_message("hello").await,
			Err(ClientError::NotConnected(ChainNamespace::Eip155))
		));

		client.connect_external("X", None).await.unwrap();
		assert_eq!(client.sign_message("hello").await.unwrap(), "0xsigned:0xabc");
	}

	#[tokio::test]
	async fn test_open_and_close_are_idempotent() {
		let modal = Arc::new(MockModal::default());
		let client = ClientBuilder::new(evm_options())
			.with_adapter(Arc::new(MockAdapter::new(ChainNamespace::Eip155)))
			.with_modal(modal.clone())
			.build()
			.await
			.unwrap();

		client.open(None);
		client.open(Some("Networks"));
		assert!(client.is_open());
		client.close();
		client.close();
		assert!(!client.is_open());

		assert_eq!(modal.opened.load(Ordering::SeqCst), 1);
		assert_eq!(modal.closed.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_remove_adapter_refuses_active_session() {
		let adapter = Arc::new(
			MockAdapter::new(ChainNamespace::Eip155)
				.with_connector("X")
				.connecting_as("0xabc", 1u64),
		);
		let client = evm_client(adapter).await;
		client
			.add_adapter(
				Arc::new(MockAdapter::new(ChainNamespace::Solana)),
				vec![solana()],
			)
			.await
			.unwrap();
		assert_eq!(
			client.namespaces(),
			vec![ChainNamespace::Eip155, ChainNamespace::Solana]
		);

		client.connect_external("X", None).await.unwrap();
		assert!(matches!(
			client.remove_adapter(ChainNamespace::Eip155).await,
			Err(ClientError::ActiveSession(ChainNamespace::Eip155))
		));

		client.remove_adapter(ChainNamespace::Solana).await.unwrap();
		assert_eq!(client.namespaces(), vec![ChainNamespace::Eip155]);
		assert!(client
			.get_caip_networks()
			.iter()
			.all(|n| n.chain_namespace == ChainNamespace::Eip155));
		assert!(matches!(
			client.remove_adapter(ChainNamespace::Solana).await,
			Err(ClientError::AdapterNotFound(ChainNamespace::Solana))
		));
	}

	#[tokio::test]
	async fn test_add_adapter_rejects_duplicates_and_foreign_networks() {
		let client = evm_client(Arc::new(MockAdapter::new(ChainNamespace::Eip155))).await;

		assert!(matches!(
			client
				.add_adapter(Arc::new(MockAdapter::new(ChainNamespace::Eip155)), vec![])
				.await,
			Err(ClientError::Config(_))
		));
		assert!(matches!(
			client
				.add_adapter(
					Arc::new(MockAdapter::new(ChainNamespace::Solana)),
					vec![evm(10, "Optimism")]
				)
				.await,
			Err(ClientError::Config(_))
		));
	}

	#[tokio::test]
	async fn test_add_and_remove_networks() {
		let adapter = Arc::new(MockAdapter::new(ChainNamespace::Eip155));
		let client = evm_client(adapter.clone()).await;

		client
			.add_network(ChainNamespace::Eip155, evm(10, "Optimism"))
			.await
			.unwrap();
		client
			.add_network(ChainNamespace::Eip155, evm(10, "Optimism"))
			.await
			.unwrap();
		assert_eq!(client.get_caip_networks().len(), 3);
		assert_eq!(adapter.core().namespace_networks().len(), 3);
		assert!(matches!(
			client.add_network(ChainNamespace::Solana, solana()).await,
			Err(ClientError::AdapterNotFound(ChainNamespace::Solana))
		));

		// Removing the active network falls back to the first remaining one
		client
			.remove_network(ChainNamespace::Eip155, &ChainId::Number(1))
			.await
			.unwrap();
		assert_eq!(client.get_caip_network().unwrap().caip_network_id, "eip155:137");
		assert!(matches!(
			client
				.remove_network(ChainNamespace::Eip155, &ChainId::Number(1))
				.await,
			Err(ClientError::NetworkNotFound(_))
		));

		client
			.remove_network(ChainNamespace::Eip155, &ChainId::Number(10))
			.await
			.unwrap();
		let err = client
			.remove_network(ChainNamespace::Eip155, &ChainId::Number(137))
			.await
			.unwrap_err();
		assert_eq!(
			err.to_string(),
			"Configuration error: Cannot remove last network for a namespace"
		);
	}
}
