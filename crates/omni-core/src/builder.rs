// omni-core/src/builder.rs

use crate::alerts::AlertReporter;
use crate::client::{Client, ClientInner};
use crate::error::{ClientError, Result};
use crate::events::spawn_event_loop;
use crate::providers::{ProviderFactory, SharedProviders};
use crate::registry::{AdapterRegistry, ConnectorRegistry};
use crate::state::ClientState;
use arc_swap::ArcSwap;
use omni_adapter::{ChainAdapter, UniversalAdapter};
use omni_storage::implementations::memory::MemoryStorage;
use omni_storage::{ConnectionStorage, StorageInterface};
use omni_types::{normalize_networks, ChainNamespace, ClientOptions, IdentityResolver, ModalView};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Assembles a [`Client`] from options and collaborators.
///
/// Namespaces without a supplied adapter get a [`UniversalAdapter`], which
/// requires a project id. Storage defaults to memory.
pub struct ClientBuilder {
	options: ClientOptions,
	adapters: Vec<Arc<dyn ChainAdapter>>,
	storage: Option<Arc<dyn StorageInterface>>,
	provider_factory: Option<Arc<dyn ProviderFactory>>,
	identity_resolver: Option<Arc<dyn IdentityResolver>>,
	modal: Option<Arc<dyn ModalView>>,
	approval_timeout: Option<Duration>,
}

impl ClientBuilder {
	pub fn new(options: ClientOptions) -> Self {
		Self {
			options,
			adapters: Vec::new(),
			storage: None,
			provider_factory: None,
			identity_resolver: None,
			modal: None,
			approval_timeout: None,
		}
	}

	/// Supplies the adapter for its namespace.
	pub fn with_adapter(mut self, adapter: Arc<dyn ChainAdapter>) -> Self {
		self.adapters.push(adapter);
		self
	}

	pub fn with_storage(mut self, storage: Arc<dyn StorageInterface>) -> Self {
		self.storage = Some(storage);
		self
	}

	pub fn with_provider_factory(mut self, factory: Arc<dyn ProviderFactory>) -> Self {
		self.provider_factory = Some(factory);
		self
	}

	pub fn with_identity_resolver(mut self, resolver: Arc<dyn IdentityResolver>) -> Self {
		self.identity_resolver = Some(resolver);
		self
	}

	pub fn with_modal(mut self, modal: Arc<dyn ModalView>) -> Self {
		self.modal = Some(modal);
		self
	}

	/// Bounds every wallet approval wait. Without it waits are unbounded.
	pub fn with_approval_timeout(mut self, timeout: Duration) -> Self {
		self.approval_timeout = Some(timeout);
		self
	}

	/// Validates the configuration, wires every namespace and silently
	/// resumes persisted connections.
	///
	/// Only configuration problems fail the build; a connection that cannot
	/// be resumed leaves its namespace disconnected.
	pub async fn build(self) -> Result<Client> {
		let options = self.options;
		if options.networks.is_empty() {
			return Err(ClientError::Config(
				"At least one network must be configured".to_string(),
			));
		}

		let networks = normalize_networks(&options.networks, options.project_id.as_deref());
		let mut namespaces: Vec<ChainNamespace> = Vec::new();
		for network in &networks {
			if !namespaces.contains(&network.chain_namespace) {
				namespaces.push(network.chain_namespace);
			}
		}

		if let Some(default) = options.default_network.as_deref() {
			if !networks.iter().any(|n| n.caip_network_id == default) {
				return Err(ClientError::Config(format!(
					"Default network {} is not configured",
					default
				)));
			}
		}

		let mut supplied: HashMap<ChainNamespace, Arc<dyn ChainAdapter>> = HashMap::new();
		for adapter in self.adapters {
			let namespace = adapter.namespace();
			if !namespaces.contains(&namespace) {
				return Err(ClientError::Config(format!(
					"Adapter for namespace {} has no configured networks",
					namespace
				)));
			}
			if supplied.insert(namespace, adapter).is_some() {
				return Err(ClientError::Config(format!(
					"More than one adapter supplied for namespace {}",
					namespace
				)));
			}
		}

		let universal_namespaces: Vec<String> = namespaces
			.iter()
			.filter(|ns| !supplied.contains_key(ns))
			.map(|ns| ns.to_string())
			.collect();
		if !universal_namespaces.is_empty() && options.project_id.is_none() {
			return Err(ClientError::Config(format!(
				"A project id is required for namespaces without an adapter: {}",
				universal_namespaces.join(", ")
			)));
		}

		let storage = ConnectionStorage::new(
			self.storage
				.unwrap_or_else(|| Arc::new(MemoryStorage::new())),
		);
		let alerts = AlertReporter::default();
		let providers = SharedProviders::new(self.provider_factory);
		let universal = providers.universal(&options, &alerts).await;
		providers.auth(&options).await;
		if universal.is_none() && !universal_namespaces.is_empty() {
			warn!(
				"No universal provider available, WalletConnect is disabled for {}",
				universal_namespaces.join(", ")
			);
		}

		let (events, receiver) = mpsc::unbounded_channel();
		let inner = Arc::new(ClientInner {
			options,
			networks: ArcSwap::from_pointee(networks),
			adapters: AdapterRegistry::new(),
			connectors: ConnectorRegistry::new(),
			state: ClientState::new(),
			storage,
			providers,
			alerts,
			identity: self.identity_resolver,
			modal: self.modal,
			modal_open: AtomicBool::new(false),
			approval_timeout: self.approval_timeout,
			events,
		});
		spawn_event_loop(Arc::downgrade(&inner), receiver);

		for namespace in namespaces {
			let adapter = match supplied.remove(&namespace) {
				Some(adapter) => adapter,
				None => Arc::new(
					UniversalAdapter::new(namespace)
						.with_namespace_overrides(inner.options.namespace_overrides.clone()),
				),
			};
			inner.attach_adapter(adapter).await?;
		}
		if let Some(provider) = &universal {
			inner.listen_universal_provider(provider);
		}

		restore_selection(&inner).await;
		inner.resume_connections().await;

		info!(
			"Client ready with {} namespaces, active network {}",
			inner.adapters.len(),
			inner
				.state
				.selection()
				.network()
				.map(|n| n.caip_network_id.as_str())
				.unwrap_or("none")
		);
		Ok(Client { inner })
	}
}

/// Activates the persisted network when it is still configured, else the
/// default network, else the first one.
async fn restore_selection(inner: &ClientInner) {
	let persisted = match inner.storage.active_caip_network_id().await {
		Ok(id) => id,
		Err(e) => {
			warn!("Cannot read persisted network: {}", e);
			None
		}
	};

	let network = persisted
		.and_then(|id| inner.network_by_caip_id(&id))
		.or_else(|| {
			inner
				.options
				.default_network
				.as_deref()
				.and_then(|id| inner.network_by_caip_id(id))
		})
		.or_else(|| inner.networks().into_iter().next());

	if let Some(network) = network {
		inner.state.set_active_network(network.clone());
		inner.persist_selection(&network).await;
	}
}
