//! Serialized handling of wallet and transport events.
//!
//! Adapter and universal provider listeners never touch client state
//! directly. They enqueue a [`QueuedEvent`] and a single task drains the
//! queue, so events are applied one at a time in arrival order.

use crate::client::ClientInner;
use omni_adapter::ChainAdapter;
use omni_types::{
	parse_caip_network_id, AdapterEvent, AdapterEventKind, CaipAddress, ChainId, ChainNamespace,
	ConnectionStatus, ProviderEvent, ProviderEventKind, UniversalProvider,
};
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub(crate) enum QueuedEvent {
	Adapter(ChainNamespace, AdapterEvent),
	Provider(ProviderEvent),
	/// Acknowledged once everything queued before it was handled.
	Flush(oneshot::Sender<()>),
}

/// Spawns the task draining the client's event queue.
///
/// The task holds only a weak reference and stops once the client is
/// dropped.
pub(crate) fn spawn_event_loop(
	inner: Weak<ClientInner>,
	mut receiver: mpsc::UnboundedReceiver<QueuedEvent>,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		while let Some(event) = receiver.recv().await {
			if let QueuedEvent::Flush(ack) = event {
				let _ = ack.send(());
				continue;
			}
			let Some(inner) = inner.upgrade() else {
				break;
			};
			inner.handle_event(event).await;
		}
		debug!("Client event loop stopped");
	})
}

impl ClientInner {
	/// Forwards every adapter event kind into the queue.
	pub(crate) fn listen_adapter(&self, adapter: &Arc<dyn ChainAdapter>) {
		let namespace = adapter.namespace();
		for kind in AdapterEventKind::ALL {
			let queue = self.events.clone();
			adapter.on(
				kind,
				Arc::new(move |event: &AdapterEvent| {
					let _ = queue.send(QueuedEvent::Adapter(namespace, event.clone()));
				}),
			);
		}
	}

	pub(crate) fn listen_universal_provider(&self, provider: &Arc<dyn UniversalProvider>) {
		for kind in [
			ProviderEventKind::DisplayUri,
			ProviderEventKind::Disconnect,
			ProviderEventKind::ChainChanged,
			ProviderEventKind::AccountsChanged,
			ProviderEventKind::Error,
		] {
			let queue = self.events.clone();
			provider.on(
				kind,
				Arc::new(move |event: &ProviderEvent| {
					let _ = queue.send(QueuedEvent::Provider(event.clone()));
				}),
			);
		}
	}

	pub(crate) async fn handle_event(&self, event: QueuedEvent) {
		match event {
			QueuedEvent::Adapter(namespace, event) => {
				self.handle_adapter_event(namespace, event).await
			}
			QueuedEvent::Provider(event) => self.handle_provider_event(event).await,
			QueuedEvent::Flush(ack) => {
				let _ = ack.send(());
			}
		}
	}

	async fn handle_adapter_event(&self, namespace: ChainNamespace, event: AdapterEvent) {
		match event {
			AdapterEvent::SwitchNetwork { address, chain_id } => {
				if self.state.active_namespace() != Some(namespace) {
					debug!("Ignoring network switch in inactive namespace {}", namespace);
					return;
				}
				let network = self.find_network(namespace, &chain_id.to_string());
				if network.is_none() {
					warn!("Wallet switched {} to unsupported network {}", namespace, chain_id);
				}
				let chain_id = network.map(|n| n.id).unwrap_or(chain_id);
				let address = address.or_else(|| self.state.accounts.get(namespace).address);
				if let Some(address) = address {
					self.sync_account(namespace, &address, Some(chain_id)).await;
				}
			}
			AdapterEvent::Disconnect => {
				if self.state.accounts.get(namespace).status == ConnectionStatus::Disconnected {
					return;
				}
				if self.state.active_namespace() == Some(namespace) {
					info!("Wallet disconnected {}, disconnecting everywhere", namespace);
					if let Err(e) = self.disconnect().await {
						debug!("Adapter disconnect after wallet disconnect failed: {}", e);
					}
				} else {
					info!("Wallet disconnected {}", namespace);
					self.reset_namespace(namespace).await;
				}
			}
			AdapterEvent::AccountChanged { address, chain_id } => {
				let current = self.state.accounts.get(namespace);
				if current.status == ConnectionStatus::Disconnected {
					debug!("Ignoring account change in disconnected namespace {}", namespace);
					return;
				}
				if same_address(current.address.as_deref(), &address) {
					return;
				}
				let chain_id = chain_id.or_else(|| self.current_network(namespace).map(|n| n.id));
				self.sync_account(namespace, &address, chain_id).await;
			}
			AdapterEvent::ConnectorsChanged(connectors) => {
				debug!("{} connectors for {}", connectors.len(), namespace);
				self.connectors.set(namespace, connectors);
			}
		}
	}

	async fn handle_provider_event(&self, event: ProviderEvent) {
		match event {
			ProviderEvent::DisplayUri(uri) => {
				self.state.pairing_uri.send_replace(Some(uri));
			}
			ProviderEvent::Disconnect { reason } => {
				info!(
					"WalletConnect session ended: {}",
					reason.as_deref().unwrap_or("no reason")
				);
				self.reset_all().await;
			}
			ProviderEvent::ChainChanged(chain) => self.handle_chain_changed(&chain).await,
			ProviderEvent::AccountsChanged(accounts) => {
				let mut seen = HashSet::new();
				for account in accounts {
					let caip = match account.parse::<CaipAddress>() {
						Ok(caip) => caip,
						Err(e) => {
							debug!("Skipping session account: {}", e);
							continue;
						}
					};
					if !self.adapters.contains(caip.namespace) || !seen.insert(caip.namespace) {
						continue;
					}
					let current = self.state.accounts.get(caip.namespace);
					if current.status == ConnectionStatus::Disconnected
						|| same_address(current.address.as_deref(), &caip.address)
					{
						continue;
					}
					self.sync_account(caip.namespace, &caip.address, Some(caip.chain_id))
						.await;
				}
			}
			ProviderEvent::Error(reason) => {
				self.alerts.report(&reason);
			}
		}
	}

	async fn handle_chain_changed(&self, chain: &str) {
		let active = self.state.active_namespace();
		let network = active
			.and_then(|ns| self.namespace_networks(ns).into_iter().find(|n| n.matches(chain)))
			.or_else(|| self.networks().into_iter().find(|n| n.matches(chain)));

		let Some(network) = network else {
			// The account still follows the wallet; the selection stays put
			let parsed = parse_caip_network_id(chain)
				.ok()
				.or_else(|| active.map(|ns| (ns, ChainId::from(chain))));
			match parsed {
				Some((namespace, chain_id)) if Some(namespace) == active => {
					warn!("Wallet switched to unsupported chain {}", chain);
					if let Some(address) = self.state.accounts.get(namespace).address {
						self.sync_account(namespace, &address, Some(chain_id)).await;
					}
				}
				_ => debug!("Ignoring chain change to {} outside the active namespace", chain),
			}
			return;
		};
		if Some(network.chain_namespace) != active {
			debug!("Ignoring chain change to {} outside the active namespace", chain);
			return;
		}
		if self.state.selection().network() == Some(&network) {
			return;
		}

		let namespace = network.chain_namespace;
		self.state.set_active_network(network.clone());
		self.persist_selection(&network).await;
		if let Some(address) = self.state.accounts.get(namespace).address {
			self.sync_account(namespace, &address, Some(network.id)).await;
		}
	}
}

pub(crate) fn same_address(current: Option<&str>, address: &str) -> bool {
	current.is_some_and(|current| current.eq_ignore_ascii_case(address))
}
