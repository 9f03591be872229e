//! Scripted collaborators shared by the client tests.

use crate::providers::ProviderFactory;
use async_trait::async_trait;
use omni_adapter::{
	AdapterCore, Balance, ChainAdapter, ConnectParams, DisconnectParams, EstimateGasParams,
	GetAccountsParams, GetBalanceParams, GetProfileParams, Profile, SendTransactionParams,
	SignMessageParams, SwitchNetworkParams, SyncConnectionParams, SyncConnectorsOptions,
	UriCallback, WriteContractParams,
};
use omni_types::{
	AccountEntry, AdapterError, AdapterEvent, AuthProvider, AuthUser, ChainId, ChainNamespace,
	ClientOptions, ConnectionResult, Connector, ConnectorType, DappData, Identity,
	IdentityResolver, ModalView, NetworkConfig, PairingRequest, ProviderError, ProviderEvent,
	ProviderEventKind, ProviderHandle, ProviderListener, Session, SessionNamespace, ThemeSettings,
	UniversalProvider, WalletProvider,
};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn evm(id: u64, name: &str) -> NetworkConfig {
	NetworkConfig::new(ChainNamespace::Eip155, id, name)
		.with_rpc_url(format!("https://rpc.example/{}", id))
}

pub const SOLANA_MAINNET: &str = "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp";

pub fn solana() -> NetworkConfig {
	NetworkConfig::new(ChainNamespace::Solana, SOLANA_MAINNET, "Solana")
		.with_rpc_url("https://rpc.example/solana")
}

/// Builds a session approving `accounts` per namespace tag.
pub fn session(accounts: &[(&str, &[&str])]) -> Session {
	let mut session = Session {
		topic: "topic-1".to_string(),
		..Default::default()
	};
	session.peer.name = "Test Wallet".to_string();
	session.peer.icons = vec!["https://wallet.example/icon.png".to_string()];
	for (namespace, list) in accounts {
		session.namespaces.insert(
			namespace.to_string(),
			SessionNamespace {
				accounts: list.iter().map(|a| a.to_string()).collect(),
				..Default::default()
			},
		);
	}
	session
}

#[derive(Debug, Default)]
pub struct MockWallet;

#[async_trait]
impl WalletProvider for MockWallet {
	fn name(&self) -> &str {
		"Mock Wallet"
	}

	async fn request(
		&self,
		_method: &str,
		_params: serde_json::Value,
	) -> Result<serde_json::Value, ProviderError> {
		Ok(serde_json::Value::Null)
	}
}

#[derive(Debug, Clone)]
pub enum ResumeReply {
	Connected(String, ChainId),
	Nothing,
	Fail,
}

/// Adapter whose wallet answers are set up front.
#[derive(Debug)]
pub struct MockAdapter {
	core: AdapterCore,
	wallet: Arc<MockWallet>,
	connect_reply: Mutex<Option<(String, ChainId)>>,
	connect_delay: Mutex<Option<Duration>>,
	resume_reply: Mutex<ResumeReply>,
	balance: Mutex<Option<Balance>>,
	profile: Mutex<Profile>,
	accounts: Mutex<Vec<AccountEntry>>,
	fail_disconnect: Mutex<bool>,
	calls: Mutex<Vec<String>>,
}

impl MockAdapter {
	pub fn new(namespace: ChainNamespace) -> Self {
		Self {
			core: AdapterCore::new(namespace),
			wallet: Arc::new(MockWallet),
			connect_reply: Mutex::new(None),
			connect_delay: Mutex::new(None),
			resume_reply: Mutex::new(ResumeReply::Nothing),
			balance: Mutex::new(Some(Balance {
				balance: "1.5".to_string(),
				symbol: "ETH".to_string(),
			})),
			profile: Mutex::new(Profile::default()),
			accounts: Mutex::new(Vec::new()),
			fail_disconnect: Mutex::new(false),
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn with_connector(self, id: &str) -> Self {
		let connector = Connector::new(id, ConnectorType::Injected, "Mock Wallet", self.core.namespace())
			.with_image_url("https://wallet.example/mock.png")
			.with_provider(ProviderHandle::Wallet(self.wallet.clone()));
		self.core.add_connectors(vec![connector]);
		self
	}

	pub fn connecting_as(self, address: &str, chain_id: impl Into<ChainId>) -> Self {
		*self.connect_reply.lock().unwrap() = Some((address.to_string(), chain_id.into()));
		self
	}

	pub fn with_connect_delay(self, delay: Duration) -> Self {
		*self.connect_delay.lock().unwrap() = Some(delay);
		self
	}

	pub fn resuming_as(self, address: &str, chain_id: impl Into<ChainId>) -> Self {
		*self.resume_reply.lock().unwrap() = ResumeReply::Connected(address.to_string(), chain_id.into());
		self
	}

	pub fn failing_resume(self) -> Self {
		*self.resume_reply.lock().unwrap() = ResumeReply::Fail;
		self
	}

	pub fn failing_balance(self) -> Self {
		*self.balance.lock().unwrap() = None;
		self
	}

	pub fn failing_disconnect(self) -> Self {
		*self.fail_disconnect.lock().unwrap() = true;
		self
	}

	pub fn with_profile(self, name: &str) -> Self {
		self.set_profile(Some(name));
		self
	}

	/// Changes what later profile lookups return.
	pub fn set_profile(&self, name: Option<&str>) {
		*self.profile.lock().unwrap() = Profile {
			name: name.map(str::to_string),
			image: None,
		};
	}

	pub fn with_accounts(self, accounts: Vec<AccountEntry>) -> Self {
		*self.accounts.lock().unwrap() = accounts;
		self
	}

	/// Simulates a wallet-originated event.
	pub fn emit(&self, event: AdapterEvent) {
		self.core.emit(event);
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().clone()
	}

	fn record(&self, call: String) {
		self.calls.lock().unwrap().push(call);
	}

	fn connection(&self, connector_id: &str, address: String, chain_id: ChainId) -> ConnectionResult {
		ConnectionResult {
			connector_id: connector_id.to_string(),
			connector_type: ConnectorType::Injected,
			provider: ProviderHandle::Wallet(self.wallet.clone()),
			chain_id,
			address,
		}
	}
}

#[async_trait]
impl ChainAdapter for MockAdapter {
	fn adapter_type(&self) -> &'static str {
		"mock"
	}

	fn core(&self) -> &AdapterCore {
		&self.core
	}

	async fn switch_network(&self, params: SwitchNetworkParams) -> omni_types::Result<()> {
		self.record(format!("switch:{}", params.caip_network.caip_network_id));
		self.core.switch_network(params).await
	}

	async fn connect_walletconnect(
		&self,
		_on_uri: UriCallback,
		_chain_id: Option<ChainId>,
	) -> omni_types::Result<()> {
		self.record("connect_walletconnect".to_string());
		Ok(())
	}

	async fn connect(&self, params: ConnectParams) -> omni_types::Result<ConnectionResult> {
		self.record(format!("connect:{}", params.connector_id));
		let delay = *self.connect_delay.lock().unwrap();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}
		let reply = self.connect_reply.lock().unwrap().clone();
		let (address, chain_id) = reply.ok_or(AdapterError::Provider(ProviderError::UserRejected))?;
		Ok(self.connection(&params.connector_id, address, chain_id))
	}

	async fn disconnect(&self, _params: DisconnectParams) -> omni_types::Result<()> {
		self.record("disconnect".to_string());
		if *self.fail_disconnect.lock().unwrap() {
			return Err(AdapterError::Provider(ProviderError::Transport(
				"wallet went away".to_string(),
			)));
		}
		Ok(())
	}

	async fn get_accounts(&self, _params: GetAccountsParams) -> omni_types::Result<Vec<AccountEntry>> {
		Ok(self.accounts.lock().unwrap().clone())
	}

	async fn get_balance(&self, params: GetBalanceParams) -> omni_types::Result<Balance> {
		self.record(format!("balance:{}", params.chain_id));
		self.balance
			.lock()
			.unwrap()
			.clone()
			.ok_or_else(|| AdapterError::Provider(ProviderError::Request("rpc down".to_string())))
	}

	async fn get_profile(&self, _params: GetProfileParams) -> omni_types::Result<Profile> {
		Ok(self.profile.lock().unwrap().clone())
	}

	async fn sign_message(&self, params: SignMessageParams) -> omni_types::Result<String> {
		self.record(format!("sign:{}", params.message));
		Ok(format!("0xsigned:{}", params.address))
	}

	async fn send_transaction(&self, _params: SendTransactionParams) -> omni_types::Result<String> {
		Ok("0xtx".to_string())
	}

	async fn write_contract(&self, _params: WriteContractParams) -> omni_types::Result<String> {
		Ok("0xtx".to_string())
	}

	async fn estimate_gas(&self, _params: EstimateGasParams) -> omni_types::Result<u64> {
		Ok(21_000)
	}

	async fn sync_connectors(&self, _options: SyncConnectorsOptions) -> omni_types::Result<()> {
		Ok(())
	}

	async fn sync_connection(
		&self,
		params: SyncConnectionParams,
	) -> omni_types::Result<Option<ConnectionResult>> {
		self.record(format!("sync_connection:{}", params.connector_id));
		let reply = self.resume_reply.lock().unwrap().clone();
		match reply {
			ResumeReply::Connected(address, chain_id) => {
				Ok(Some(self.connection(&params.connector_id, address, chain_id)))
			}
			ResumeReply::Nothing => Ok(None),
			ResumeReply::Fail => Err(AdapterError::Provider(ProviderError::Transport(
				"wallet locked".to_string(),
			))),
		}
	}
}

/// Universal provider with a scripted session.
#[derive(Default)]
pub struct MockUniversalProvider {
	session: Mutex<Option<Session>>,
	pending: Mutex<Option<Session>>,
	listeners: Mutex<Vec<(ProviderEventKind, bool, ProviderListener)>>,
	default_chains: Mutex<Vec<String>>,
	disconnects: AtomicUsize,
}

impl fmt::Debug for MockUniversalProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MockUniversalProvider").finish_non_exhaustive()
	}
}

impl MockUniversalProvider {
	/// No session and nothing to approve.
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Approves `session` on the next pairing.
	pub fn approving(session: Session) -> Arc<Self> {
		Arc::new(Self {
			pending: Mutex::new(Some(session)),
			..Default::default()
		})
	}

	/// Starts with `session` already established.
	pub fn with_session(session: Session) -> Arc<Self> {
		Arc::new(Self {
			session: Mutex::new(Some(session)),
			..Default::default()
		})
	}

	pub fn emit(&self, event: ProviderEvent) {
		let fired: Vec<ProviderListener> = {
			let mut listeners = self.listeners.lock().unwrap();
			let fired = listeners
				.iter()
				.filter(|(kind, _, _)| *kind == event.kind())
				.map(|(_, _, listener)| listener.clone())
				.collect();
			listeners.retain(|(kind, once, _)| !(*once && *kind == event.kind()));
			fired
		};
		for listener in fired {
			listener(&event);
		}
	}

	pub fn default_chains(&self) -> Vec<String> {
		self.default_chains.lock().unwrap().clone()
	}

	pub fn disconnects(&self) -> usize {
		self.disconnects.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl UniversalProvider for MockUniversalProvider {
	async fn connect(&self, _request: PairingRequest) -> Result<Session, ProviderError> {
		self.emit(ProviderEvent::DisplayUri("wc:pairing@2".to_string()));
		let session = self
			.pending
			.lock()
			.unwrap()
			.take()
			.ok_or(ProviderError::UserRejected)?;
		*self.session.lock().unwrap() = Some(session.clone());
		Ok(session)
	}

	async fn disconnect(&self) -> Result<(), ProviderError> {
		self.disconnects.fetch_add(1, Ordering::SeqCst);
		*self.session.lock().unwrap() = None;
		Ok(())
	}

	fn set_default_chain(&self, chain: &str, _rpc_url: Option<&str>) {
		self.default_chains.lock().unwrap().push(chain.to_string());
	}

	fn session(&self) -> Option<Session> {
		self.session.lock().unwrap().clone()
	}

	fn on(&self, kind: ProviderEventKind, listener: ProviderListener) {
		self.listeners.lock().unwrap().push((kind, false, listener));
	}

	fn once(&self, kind: ProviderEventKind, listener: ProviderListener) {
		self.listeners.lock().unwrap().push((kind, true, listener));
	}

	async fn request(
		&self,
		_chain: &str,
		_method: &str,
		_params: serde_json::Value,
	) -> Result<serde_json::Value, ProviderError> {
		Ok(serde_json::Value::Null)
	}
}

#[derive(Debug, Default)]
pub struct MockAuthProvider {
	synced: AtomicUsize,
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
	fn sync_dapp_data(&self, _data: &DappData) {
		self.synced.fetch_add(1, Ordering::SeqCst);
	}

	fn sync_theme(&self, _theme: &ThemeSettings) {}

	fn is_login_email_used(&self) -> bool {
		false
	}

	async fn is_connected(&self) -> Result<bool, ProviderError> {
		Ok(false)
	}

	async fn connect(&self, chain_id: Option<&ChainId>) -> Result<AuthUser, ProviderError> {
		Ok(AuthUser {
			address: "0xauth".to_string(),
			chain_id: chain_id.cloned().unwrap_or(ChainId::Number(1)),
			account_type: None,
		})
	}

	async fn switch_network(&self, chain_id: &ChainId) -> Result<AuthUser, ProviderError> {
		self.connect(Some(chain_id)).await
	}

	async fn disconnect(&self) -> Result<(), ProviderError> {
		Ok(())
	}
}

#[derive(Debug)]
pub struct MockFactory {
	universal: Option<Arc<MockUniversalProvider>>,
	failure: Option<String>,
	universal_calls: AtomicUsize,
}

impl MockFactory {
	pub fn new(universal: Arc<MockUniversalProvider>) -> Self {
		Self {
			universal: Some(universal),
			failure: None,
			universal_calls: AtomicUsize::new(0),
		}
	}

	pub fn failing(reason: &str) -> Self {
		Self {
			universal: None,
			failure: Some(reason.to_string()),
			universal_calls: AtomicUsize::new(0),
		}
	}

	pub fn universal_calls(&self) -> usize {
		self.universal_calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ProviderFactory for MockFactory {
	async fn create_universal_provider(
		&self,
		_options: &ClientOptions,
	) -> Result<Arc<dyn UniversalProvider>, ProviderError> {
		self.universal_calls.fetch_add(1, Ordering::SeqCst);
		// Give concurrent callers a chance to race
		tokio::task::yield_now().await;
		match (&self.universal, &self.failure) {
			(Some(provider), _) => Ok(provider.clone()),
			(None, Some(reason)) => Err(ProviderError::Transport(reason.clone())),
			(None, None) => Err(ProviderError::Transport("no provider".to_string())),
		}
	}

	async fn create_auth_provider(
		&self,
		_options: &ClientOptions,
	) -> Result<Arc<dyn AuthProvider>, ProviderError> {
		Ok(Arc::new(MockAuthProvider::default()))
	}
}

#[derive(Debug)]
pub struct MockIdentityResolver {
	reply: Mutex<Result<Option<Identity>, ProviderError>>,
	calls: AtomicUsize,
}

impl MockIdentityResolver {
	pub fn named(name: &str) -> Self {
		Self::replying(Ok(Some(Identity {
			name: Some(name.to_string()),
			avatar: Some(format!("https://avatars.example/{}.png", name)),
		})))
	}

	pub fn empty() -> Self {
		Self::replying(Ok(None))
	}

	pub fn failing() -> Self {
		Self::replying(Err(ProviderError::Request("name service unavailable".to_string())))
	}

	fn replying(reply: Result<Option<Identity>, ProviderError>) -> Self {
		Self {
			reply: Mutex::new(reply),
			calls: AtomicUsize::new(0),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl IdentityResolver for MockIdentityResolver {
	async fn resolve(&self, _address: &str) -> Result<Option<Identity>, ProviderError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.reply.lock().unwrap().clone()
	}
}

#[derive(Debug, Default)]
pub struct MockModal {
	pub opened: AtomicUsize,
	pub closed: AtomicUsize,
}

impl ModalView for MockModal {
	fn open(&self, _view: Option<&str>) {
		self.opened.fetch_add(1, Ordering::SeqCst);
	}

	fn close(&self) {
		self.closed.fetch_add(1, Ordering::SeqCst);
	}
}
