//! Versioned state the client derives and publishes.
//!
//! Every store is keyed by namespace and backed by a `watch` channel per key,
//! so consumers can read the latest value or subscribe to changes. The
//! client is the only writer.

use dashmap::DashMap;
use omni_types::{
	AccountState, ActiveSelection, CaipNetwork, ChainNamespace, ConnectionStatus, ConnectorType,
	ProviderHandle,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::debug;

/// Watch channels keyed by namespace.
pub struct NamespaceStore<T> {
	channels: DashMap<ChainNamespace, watch::Sender<T>>,
	version: AtomicU64,
}

impl<T: Clone + Default + Send + Sync + 'static> NamespaceStore<T> {
	pub fn new() -> Self {
		Self {
			channels: DashMap::new(),
			version: AtomicU64::new(0),
		}
	}

	pub fn get(&self, namespace: ChainNamespace) -> T {
		self.channels
			.get(&namespace)
			.map(|sender| sender.borrow().clone())
			.unwrap_or_default()
	}

	/// Applies `f` and notifies subscribers when it reports a change.
	///
	/// `f` runs while the namespace's entry is locked and must not touch
	/// this store.
	pub fn modify(&self, namespace: ChainNamespace, f: impl FnOnce(&mut T) -> bool) -> bool {
		let sender = self
			.channels
			.entry(namespace)
			.or_insert_with(|| watch::channel(T::default()).0);
		let changed = sender.send_if_modified(f);
		if changed {
			self.version.fetch_add(1, Ordering::SeqCst);
		}
		changed
	}

	pub fn set(&self, namespace: ChainNamespace, value: T) {
		self.modify(namespace, |state| {
			*state = value;
			true
		});
	}

	pub fn reset(&self, namespace: ChainNamespace) {
		self.set(namespace, T::default());
	}

	pub fn subscribe(&self, namespace: ChainNamespace) -> watch::Receiver<T> {
		self.channels
			.entry(namespace)
			.or_insert_with(|| watch::channel(T::default()).0)
			.subscribe()
	}

	/// Monotonic count of published changes across all namespaces.
	pub fn version(&self) -> u64 {
		self.version.load(Ordering::SeqCst)
	}

	pub fn remove(&self, namespace: ChainNamespace) {
		self.channels.remove(&namespace);
		self.version.fetch_add(1, Ordering::SeqCst);
	}
}

impl<T: Clone + Default + Send + Sync + 'static> Default for NamespaceStore<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for NamespaceStore<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NamespaceStore")
			.field("namespaces", &self.channels.len())
			.field("version", &self.version.load(Ordering::SeqCst))
			.finish()
	}
}

/// Handed out when an account sync starts.
///
/// Address, balance and identity results are only written while the ticket
/// is still the namespace's latest generation. Connection details (account
/// list, wallet info) only need the namespace not to have been reset since,
/// tracked by `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTicket {
	pub namespace: ChainNamespace,
	pub generation: u64,
	pub epoch: u64,
}

/// Per-namespace account state guarded by generation counters.
#[derive(Debug, Default)]
pub struct AccountStore {
	states: NamespaceStore<AccountState>,
	generations: DashMap<ChainNamespace, u64>,
	epochs: DashMap<ChainNamespace, u64>,
}

impl AccountStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, namespace: ChainNamespace) -> AccountState {
		self.states.get(namespace)
	}

	pub fn subscribe(&self, namespace: ChainNamespace) -> watch::Receiver<AccountState> {
		self.states.subscribe(namespace)
	}

	pub fn version(&self) -> u64 {
		self.states.version()
	}

	fn bump(&self, namespace: ChainNamespace) -> u64 {
		let mut generation = self.generations.entry(namespace).or_insert(0);
		*generation += 1;
		*generation
	}

	fn epoch(&self, namespace: ChainNamespace) -> u64 {
		self.epochs.get(&namespace).map(|epoch| *epoch).unwrap_or(0)
	}

	fn invalidate(&self, namespace: ChainNamespace) {
		self.bump(namespace);
		*self.epochs.entry(namespace).or_insert(0) += 1;
	}

	/// Starts a new generation; earlier tickets become stale.
	pub fn ticket(&self, namespace: ChainNamespace) -> SyncTicket {
		SyncTicket {
			namespace,
			generation: self.bump(namespace),
			epoch: self.epoch(namespace),
		}
	}

	pub fn is_current(&self, ticket: &SyncTicket) -> bool {
		self.generations
			.get(&ticket.namespace)
			.map(|generation| *generation == ticket.generation)
			.unwrap_or(false)
	}

	/// True while the namespace has not been reset since the ticket was
	/// handed out. Newer syncs do not affect it.
	pub fn is_live(&self, ticket: &SyncTicket) -> bool {
		self.epoch(ticket.namespace) == ticket.epoch
	}

	pub fn update(&self, namespace: ChainNamespace, f: impl FnOnce(&mut AccountState)) {
		self.states.modify(namespace, |state| {
			f(state);
			true
		});
	}

	/// Like [`AccountStore::update`] but dropped when the ticket is stale.
	pub fn update_if_current(&self, ticket: &SyncTicket, f: impl FnOnce(&mut AccountState)) -> bool {
		if !self.is_current(ticket) {
			debug!(
				"Dropping stale account write for {} (generation {})",
				ticket.namespace, ticket.generation
			);
			return false;
		}
		self.update(ticket.namespace, f);
		true
	}

	/// Like [`AccountStore::update`] but dropped once the namespace was reset.
	pub fn update_if_live(&self, ticket: &SyncTicket, f: impl FnOnce(&mut AccountState)) -> bool {
		if !self.is_live(ticket) {
			debug!("Dropping account write for reset namespace {}", ticket.namespace);
			return false;
		}
		self.update(ticket.namespace, f);
		true
	}

	/// Moves the namespace's status along the connection lifecycle.
	///
	/// `Disconnected -> Connected` passes through `Connecting`; other illegal
	/// moves are ignored.
	pub fn set_status(&self, namespace: ChainNamespace, next: ConnectionStatus) {
		let current = self.get(namespace).status;
		if current == next {
			return;
		}

		if current == ConnectionStatus::Disconnected && next == ConnectionStatus::Connected {
			self.write_status(namespace, ConnectionStatus::Connecting);
		} else if !current.can_transition_to(next) {
			debug!(
				"Ignoring status change {} -> {} for {}",
				current, next, namespace
			);
			return;
		}

		self.write_status(namespace, next);
	}

	/// [`AccountStore::set_status`] for a sync that may have been superseded.
	pub fn set_status_if_current(&self, ticket: &SyncTicket, next: ConnectionStatus) -> bool {
		if !self.is_current(ticket) {
			return false;
		}
		self.set_status(ticket.namespace, next);
		true
	}

	fn write_status(&self, namespace: ChainNamespace, status: ConnectionStatus) {
		self.states.modify(namespace, |state| {
			state.status = status;
			true
		});
	}

	/// Clears the namespace and invalidates in-flight syncs.
	pub fn reset(&self, namespace: ChainNamespace) {
		self.invalidate(namespace);
		self.states.reset(namespace);
	}

	pub fn remove(&self, namespace: ChainNamespace) {
		self.invalidate(namespace);
		self.states.remove(namespace);
	}
}

/// Provider currently backing a namespace's connection.
#[derive(Debug, Clone)]
pub struct ActiveProvider {
	pub connector_id: String,
	pub provider_type: ConnectorType,
	pub provider: ProviderHandle,
}

/// Everything the client publishes.
#[derive(Debug)]
pub struct ClientState {
	pub accounts: AccountStore,
	/// Last network used in each namespace.
	pub networks: NamespaceStore<Option<CaipNetwork>>,
	pub providers: NamespaceStore<Option<ActiveProvider>>,
	pub selection: watch::Sender<ActiveSelection>,
	pub pairing_uri: watch::Sender<Option<String>>,
}

impl ClientState {
	pub fn new() -> Self {
		Self {
			accounts: AccountStore::new(),
			networks: NamespaceStore::new(),
			providers: NamespaceStore::new(),
			selection: watch::channel(ActiveSelection::default()).0,
			pairing_uri: watch::channel(None).0,
		}
	}

	pub fn selection(&self) -> ActiveSelection {
		self.selection.borrow().clone()
	}

	pub fn active_namespace(&self) -> Option<ChainNamespace> {
		self.selection.borrow().namespace()
	}

	/// Makes `network` active and remembers it for its namespace.
	pub fn set_active_network(&self, network: CaipNetwork) {
		self.networks
			.set(network.chain_namespace, Some(network.clone()));
		self.selection.send_replace(ActiveSelection::new(network));
	}

	pub fn clear_selection(&self) {
		self.selection.send_replace(ActiveSelection::default());
	}
}

impl Default for ClientState {
	fn default() -> Self {
		Self::new()
	}
}
