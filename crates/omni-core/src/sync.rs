//! Account, balance, identity and connection synchronization.
//!
//! These routines derive the published per-namespace state from what
//! adapters and the WalletConnect session report. Every write runs under a
//! [`SyncTicket`] so a slower, older sync never overwrites a newer one and
//! nothing lands in a namespace that was reset meanwhile.

use crate::client::ClientInner;
use crate::events::same_address;
use crate::state::{ActiveProvider, SyncTicket};
use futures::future::join_all;
use omni_adapter::{GetAccountsParams, GetBalanceParams, GetProfileParams, SyncConnectionParams};
use omni_types::{
	connector_id, AccountEntry, CaipAddress, CaipNetwork, ChainId, ChainNamespace,
	ConnectionResult, ConnectionStatus, ConnectorType, Identity, ProviderHandle, Session,
	UniversalProvider, WalletInfo,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl ClientInner {
	/// Publishes `address` on `chain_id` for `namespace` and refreshes the
	/// balance, plus the identity when the address changed.
	///
	/// Without a chain id the namespace's last network is used. A chain that
	/// is not configured leaves the active selection untouched.
	pub(crate) async fn sync_account(
		&self,
		namespace: ChainNamespace,
		address: &str,
		chain_id: Option<ChainId>,
	) {
		let ticket = self.state.accounts.ticket(namespace);
		self.sync_account_with(&ticket, address, chain_id).await;
	}

	async fn sync_account_with(&self, ticket: &SyncTicket, address: &str, chain_id: Option<ChainId>) {
		let namespace = ticket.namespace;
		let previous = self.state.accounts.get(namespace);

		let Some(chain_id) = chain_id.or_else(|| self.current_network(namespace).map(|n| n.id))
		else {
			warn!("No network known for {}, cannot sync account {}", namespace, address);
			return;
		};

		let network = self.find_network(namespace, &chain_id.to_string());
		match &network {
			Some(network) if self.state.active_namespace() == Some(namespace) => {
				if self.state.selection().network() != Some(network) {
					self.state.set_active_network(network.clone());
					self.persist_selection(network).await;
				}
			}
			Some(network) => self.state.networks.set(namespace, Some(network.clone())),
			None => debug!(
				"Chain {} is not configured for {}, keeping the current network",
				chain_id, namespace
			),
		}

		let caip_address = CaipAddress::new(namespace, chain_id.clone(), address);
		let preferred = previous
			.preferred_account_type
			.unwrap_or_else(|| namespace.default_account_type());
		let written = self.state.accounts.update_if_current(ticket, |state| {
			state.preferred_account_type = Some(preferred);
			state.address = Some(address.to_string());
			state.caip_address = Some(caip_address);
		});
		if !written {
			return;
		}
		self.state
			.accounts
			.set_status_if_current(ticket, ConnectionStatus::Connected);

		// A stale sync may have dropped the identity of an unchanged address
		let unresolved = previous.profile_name.is_none() && previous.profile_image.is_none();
		if !same_address(previous.address.as_deref(), address) || unresolved {
			self.sync_identity(ticket, address, &chain_id, network.as_ref())
				.await;
		}
		self.sync_balance(ticket, address, &chain_id, network.as_ref())
			.await;
	}

	async fn sync_balance(
		&self,
		ticket: &SyncTicket,
		address: &str,
		chain_id: &ChainId,
		network: Option<&CaipNetwork>,
	) {
		let Some(adapter) = self.adapters.get(ticket.namespace) else {
			return;
		};

		let params = GetBalanceParams {
			address: address.to_string(),
			chain_id: chain_id.clone(),
			caip_network: network.cloned(),
		};
		match adapter.get_balance(params).await {
			Ok(balance) => {
				self.state.accounts.update_if_current(ticket, |state| {
					state.balance = Some(balance.balance);
					state.balance_symbol = Some(balance.symbol);
				});
			}
			Err(e) => {
				warn!("Balance lookup for {} failed: {}", address, e);
				self.state.accounts.update_if_current(ticket, |state| {
					state.balance = None;
					state.balance_symbol = None;
				});
			}
		}
	}

	/// Resolves a display name and avatar.
	///
	/// The shared name service is asked first (never for testnets), the
	/// namespace's adapter second. Failures count as "no identity".
	async fn sync_identity(
		&self,
		ticket: &SyncTicket,
		address: &str,
		chain_id: &ChainId,
		network: Option<&CaipNetwork>,
	) {
		let mut identity = Identity::default();

		let testnet = network.is_some_and(|n| n.testnet);
		if let Some(resolver) = self.identity.as_ref().filter(|_| !testnet) {
			match resolver.resolve(address).await {
				Ok(Some(found)) => identity = found,
				Ok(None) => {}
				Err(e) => debug!("Identity lookup for {} failed: {}", address, e),
			}
		}

		if identity.name.is_none() {
			if let Some(adapter) = self.adapters.get(ticket.namespace) {
				let params = GetProfileParams {
					address: address.to_string(),
					chain_id: chain_id.clone(),
				};
				match adapter.get_profile(params).await {
					Ok(profile) => {
						identity.name = profile.name;
						identity.avatar = identity.avatar.or(profile.image);
					}
					Err(e) => debug!("Adapter profile lookup for {} failed: {}", address, e),
				}
			}
		}

		self.state.accounts.update_if_current(ticket, |state| {
			state.profile_name = identity.name;
			state.profile_image = identity.avatar;
		});
	}

	/// Records a successful connection for `namespace` and syncs everything
	/// derived from it.
	pub(crate) async fn apply_connection(&self, namespace: ChainNamespace, result: ConnectionResult) {
		let ticket = self.state.accounts.ticket(namespace);
		let active = ActiveProvider {
			connector_id: result.connector_id.clone(),
			provider_type: result.connector_type,
			provider: result.provider.clone(),
		};
		self.state.providers.set(namespace, Some(active.clone()));
		self.persist_connection(namespace, &result.connector_id)
			.await;
		if !self.state.accounts.is_live(&ticket) {
			debug!("{} was reset while connecting, dropping the connection", namespace);
			return;
		}

		self.sync_account_with(&ticket, &result.address, Some(result.chain_id.clone()))
			.await;
		self.sync_all_accounts(&ticket, &result).await;
		self.sync_wallet_info(&ticket, &active);
	}

	async fn sync_all_accounts(&self, ticket: &SyncTicket, result: &ConnectionResult) {
		let namespace = ticket.namespace;
		let account_type = self
			.state
			.accounts
			.get(namespace)
			.preferred_account_type
			.unwrap_or_else(|| namespace.default_account_type());

		let mut entries = match &result.provider {
			ProviderHandle::Universal(provider) if result.connector_type == ConnectorType::WalletConnect => {
				provider
					.session()
					.map(|session| session_accounts(&session, namespace))
					.unwrap_or_default()
					.into_iter()
					.map(|caip| AccountEntry::new(namespace, caip.address, account_type))
					.collect()
			}
			_ => match self.adapters.get(namespace) {
				Some(adapter) => {
					let params = GetAccountsParams {
						connector_id: result.connector_id.clone(),
						namespace,
					};
					adapter.get_accounts(params).await.unwrap_or_else(|e| {
						debug!("Listing {} accounts failed: {}", namespace, e);
						Vec::new()
					})
				}
				None => Vec::new(),
			},
		};

		let mut seen = Vec::<String>::new();
		entries.retain(|entry| {
			let key = entry.address.to_lowercase();
			if seen.contains(&key) {
				return false;
			}
			seen.push(key);
			true
		});
		if entries.is_empty() {
			entries.push(AccountEntry::new(namespace, result.address.clone(), account_type));
		}

		self.state
			.accounts
			.update_if_live(ticket, |state| state.all_accounts = entries);
	}

	fn sync_wallet_info(&self, ticket: &SyncTicket, active: &ActiveProvider) {
		let namespace = ticket.namespace;
		let info = match (&active.provider, active.provider_type) {
			(ProviderHandle::Universal(provider), ConnectorType::WalletConnect) => {
				provider.session().map(|session| WalletInfo {
					name: session.peer.name,
					icon: session.peer.icons.into_iter().next(),
				})
			}
			_ => self
				.connectors
				.find(&active.connector_id, Some(namespace))
				.map(|connector| WalletInfo {
					name: connector.name,
					icon: connector.image_url,
				}),
		};
		self.state
			.accounts
			.update_if_live(ticket, |state| state.connected_wallet = info);
	}

	/// Connects every namespace the current WalletConnect session covers.
	pub(crate) async fn sync_walletconnect_accounts(&self) {
		let Some(provider) = self.providers.universal_provider() else {
			return;
		};
		let Some(session) = provider.session() else {
			debug!("No WalletConnect session to sync");
			return;
		};

		let namespaces = self.adapters.namespaces();
		join_all(
			namespaces
				.iter()
				.map(|ns| self.sync_walletconnect_namespace(*ns, &provider, &session)),
		)
		.await;
	}

	/// Returns false when the session holds no account for `namespace`.
	async fn sync_walletconnect_namespace(
		&self,
		namespace: ChainNamespace,
		provider: &Arc<dyn UniversalProvider>,
		session: &Session,
	) -> bool {
		let accounts = session_accounts(session, namespace);
		let current = self.current_network(namespace);
		let chosen = current
			.and_then(|network| accounts.iter().find(|a| a.chain_id == network.id))
			.or_else(|| accounts.first())
			.cloned();

		let Some(account) = chosen else {
			if self.state.accounts.get(namespace).status == ConnectionStatus::Connecting {
				self.state
					.accounts
					.set_status(namespace, ConnectionStatus::Disconnected);
			}
			return false;
		};

		let result = ConnectionResult {
			connector_id: connector_id::WALLET_CONNECT.to_string(),
			connector_type: ConnectorType::WalletConnect,
			provider: ProviderHandle::Universal(provider.clone()),
			chain_id: account.chain_id,
			address: account.address,
		};
		self.apply_connection(namespace, result).await;
		true
	}

	/// Silent resume of every namespace, run once at startup.
	///
	/// Failures are logged and leave the namespace disconnected; they never
	/// fail the client.
	pub(crate) async fn resume_connections(&self) {
		let namespaces = self.adapters.namespaces();
		join_all(
			namespaces
				.iter()
				.map(|ns| self.sync_namespace_connection(*ns)),
		)
		.await;

		let mut any_connected = false;
		for namespace in namespaces {
			match self.state.accounts.get(namespace).status {
				ConnectionStatus::Connecting => self
					.state
					.accounts
					.set_status(namespace, ConnectionStatus::Disconnected),
				ConnectionStatus::Connected => any_connected = true,
				ConnectionStatus::Disconnected => {}
			}
		}

		let status = if any_connected {
			ConnectionStatus::Connected
		} else {
			ConnectionStatus::Disconnected
		};
		if let Err(e) = self.storage.set_connection_status(status).await {
			warn!("Cannot persist connection status: {}", e);
		}
	}

	async fn sync_namespace_connection(&self, namespace: ChainNamespace) {
		let connector_id = match self.storage.connected_connector_id(namespace).await {
			Ok(id) => id,
			Err(e) => {
				warn!("Cannot read persisted connector for {}: {}", namespace, e);
				None
			}
		};
		let Some(connector_id) = connector_id else {
			return;
		};

		self.state
			.accounts
			.set_status(namespace, ConnectionStatus::Connecting);

		if connector_id == connector_id::WALLET_CONNECT {
			let provider = self.providers.universal_provider();
			let session = provider.as_ref().and_then(|p| p.session());
			let resumed = match (provider, session) {
				(Some(provider), Some(session)) => {
					self.sync_walletconnect_namespace(namespace, &provider, &session)
						.await
				}
				_ => false,
			};
			if !resumed {
				debug!("No WalletConnect session left for {}", namespace);
				self.reset_namespace(namespace).await;
			}
		} else {
			self.sync_adapter_connection(namespace, connector_id).await;
		}
	}

	async fn sync_adapter_connection(&self, namespace: ChainNamespace, connector_id: String) {
		let Some(adapter) = self.adapters.get(namespace) else {
			return;
		};

		let network = self.current_network(namespace);
		let params = SyncConnectionParams {
			connector_id: connector_id.clone(),
			namespace,
			chain_id: network.as_ref().map(|n| n.id.clone()),
			rpc_url: network.as_ref().and_then(|n| n.rpc_url()).map(str::to_string),
		};

		match adapter.sync_connection(params).await {
			Ok(Some(connection)) => {
				info!("Resumed {} connection via {}", namespace, connector_id);
				self.apply_connection(namespace, connection).await;
			}
			Ok(None) => {
				debug!("Connector {} has no connection for {}", connector_id, namespace);
				self.reset_namespace(namespace).await;
			}
			Err(e) => {
				debug!("Silent resume of {} via {} failed: {}", namespace, connector_id, e);
				self.reset_namespace(namespace).await;
			}
		}
	}
}

/// Session accounts for `namespace`, unparseable entries skipped.
pub(crate) fn session_accounts(session: &Session, namespace: ChainNamespace) -> Vec<CaipAddress> {
	session
		.namespace(namespace)
		.map(|ns| {
			ns.accounts
				.iter()
				.filter_map(|account| account.parse::<CaipAddress>().ok())
				.filter(|caip| caip.namespace == namespace)
				.collect()
		})
		.unwrap_or_default()
}
