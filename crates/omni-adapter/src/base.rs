//! Bookkeeping every adapter shares.
//!
//! Adapters embed an [`AdapterCore`] and expose it through
//! [`crate::ChainAdapter::core`]; the trait's provided methods route the
//! connector registry, event emitter, provider injection and the default
//! network switch through it.

use crate::{emitter::EventEmitter, SwitchNetworkParams};
use arc_swap::ArcSwap;
use omni_types::{
	connector_id, AdapterEvent, AuthProvider, CaipNetwork, ChainNamespace, Connector,
	ConnectorType, DappData, ProviderHandle, Result, ThemeSettings, UniversalProvider,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Dapp metadata and theme pushed into the auth provider.
#[derive(Debug, Clone, Default)]
pub struct DappContext {
	pub data: DappData,
	pub theme: ThemeSettings,
}

pub struct AdapterCore {
	namespace: ChainNamespace,
	connectors: ArcSwap<Vec<Connector>>,
	networks: ArcSwap<Vec<CaipNetwork>>,
	dapp: ArcSwap<DappContext>,
	universal_provider: OnceLock<Arc<dyn UniversalProvider>>,
	auth_provider: OnceLock<Arc<dyn AuthProvider>>,
	auth_synced: AtomicBool,
	emitter: EventEmitter,
}

impl AdapterCore {
	pub fn new(namespace: ChainNamespace) -> Self {
		Self {
			namespace,
			connectors: ArcSwap::from_pointee(Vec::new()),
			networks: ArcSwap::from_pointee(Vec::new()),
			dapp: ArcSwap::from_pointee(DappContext::default()),
			universal_provider: OnceLock::new(),
			auth_provider: OnceLock::new(),
			auth_synced: AtomicBool::new(false),
			emitter: EventEmitter::new(),
		}
	}

	pub fn namespace(&self) -> ChainNamespace {
		self.namespace
	}

	pub fn emitter(&self) -> &EventEmitter {
		&self.emitter
	}

	pub fn emit(&self, event: AdapterEvent) {
		self.emitter.emit(&event);
	}

	pub fn connectors(&self) -> Vec<Connector> {
		self.connectors.load().as_ref().clone()
	}

	pub fn connector(&self, id: &str) -> Option<Connector> {
		self.connectors.load().iter().find(|c| c.id == id).cloned()
	}

	/// Registers connectors, replacing any with the same id.
	///
	/// The first time an auth connector carrying its provider shows up the
	/// current dapp data and theme are pushed into that provider.
	pub fn add_connectors(&self, added: Vec<Connector>) {
		if added.is_empty() {
			return;
		}

		if let Some(auth) = added
			.iter()
			.find(|c| c.is_auth())
			.and_then(|c| c.provider.as_ref())
			.and_then(ProviderHandle::as_auth)
		{
			if !self.auth_synced.swap(true, Ordering::SeqCst) {
				let dapp = self.dapp.load();
				auth.sync_dapp_data(&dapp.data);
				auth.sync_theme(&dapp.theme);
				debug!("Synced dapp data into auth provider for {}", self.namespace);
			}
		}

		self.connectors.rcu(|current| {
			let mut seen = HashSet::new();
			added
				.iter()
				.chain(current.iter())
				.filter(|connector| seen.insert(connector.id.clone()))
				.cloned()
				.collect::<Vec<_>>()
		});

		self.emit(AdapterEvent::ConnectorsChanged(self.connectors()));
	}

	/// All configured networks, across namespaces.
	pub fn networks(&self) -> Vec<CaipNetwork> {
		self.networks.load().as_ref().clone()
	}

	/// Configured networks of this adapter's namespace.
	pub fn namespace_networks(&self) -> Vec<CaipNetwork> {
		self.networks
			.load()
			.iter()
			.filter(|n| n.chain_namespace == self.namespace)
			.cloned()
			.collect()
	}

	pub fn set_networks(&self, networks: Vec<CaipNetwork>) {
		self.networks.store(Arc::new(networks));
	}

	pub fn set_dapp_context(&self, context: DappContext) {
		self.dapp.store(Arc::new(context));
	}

	/// Injects the shared universal provider and registers the WalletConnect
	/// connector. Later calls are ignored.
	pub fn set_universal_provider(&self, provider: Arc<dyn UniversalProvider>) {
		if self.universal_provider.set(provider.clone()).is_err() {
			debug!("Universal provider already set for {}", self.namespace);
			return;
		}

		self.add_connectors(vec![Connector::new(
			connector_id::WALLET_CONNECT,
			ConnectorType::WalletConnect,
			"WalletConnect",
			self.namespace,
		)
		.with_provider(ProviderHandle::Universal(provider))]);
	}

	/// Injects the shared auth provider and registers the auth connector.
	/// Later calls are ignored.
	pub fn set_auth_provider(&self, provider: Arc<dyn AuthProvider>) {
		if self.auth_provider.set(provider.clone()).is_err() {
			debug!("Auth provider already set for {}", self.namespace);
			return;
		}

		self.add_connectors(vec![Connector::new(
			connector_id::AUTH,
			ConnectorType::Auth,
			"Email Wallet",
			self.namespace,
		)
		.with_provider(ProviderHandle::Auth(provider))]);
	}

	pub fn universal_provider(&self) -> Option<Arc<dyn UniversalProvider>> {
		self.universal_provider.get().cloned()
	}

	pub fn auth_provider(&self) -> Option<Arc<dyn AuthProvider>> {
		self.auth_provider.get().cloned()
	}

	/// Default network switch.
	///
	/// WalletConnect sessions just move their default chain. Auth wallets are
	/// asked to switch and the resulting account is emitted as a
	/// `SwitchNetwork` event. Other providers are left to the adapter.
	pub async fn switch_network(&self, params: SwitchNetworkParams) -> Result<()> {
		let Some(provider) = params.provider else {
			return Ok(());
		};
		let network = &params.caip_network;

		match (params.provider_type, provider) {
			(Some(ConnectorType::WalletConnect), ProviderHandle::Universal(universal)) => {
				universal.set_default_chain(&network.caip_network_id, network.rpc_url());
			}
			(Some(ConnectorType::Auth), ProviderHandle::Auth(auth)) => {
				let user = auth.switch_network(&network.id).await?;
				self.emit(AdapterEvent::SwitchNetwork {
					address: Some(user.address),
					chain_id: user.chain_id,
				});
			}
			_ => {}
		}

		Ok(())
	}
}

impl fmt::Debug for AdapterCore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AdapterCore")
			.field("namespace", &self.namespace)
			.field(
				"connectors",
				&self
					.connectors
					.load()
					.iter()
					.map(|c| c.id.clone())
					.collect::<Vec<_>>(),
			)
			.field("networks", &self.networks.load().len())
			.field("emitter", &self.emitter)
			.finish()
	}
}
