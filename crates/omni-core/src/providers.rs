//! Shared provider singletons.
//!
//! At most one universal provider and one auth provider exist per client.
//! Creation goes through an injected [`ProviderFactory`] and is memoized, so
//! concurrent callers converge on the same instance.

use crate::alerts::AlertReporter;
use async_trait::async_trait;
use omni_types::{AuthProvider, ClientOptions, ProviderError, UniversalProvider};
use std::fmt::{self, Debug};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Builds the wallet transports the client shares across adapters.
#[async_trait]
pub trait ProviderFactory: Send + Sync + Debug {
	/// Only called when a project id is configured.
	async fn create_universal_provider(
		&self,
		options: &ClientOptions,
	) -> Result<Arc<dyn UniversalProvider>, ProviderError>;

	/// Only called when email or social login is enabled.
	async fn create_auth_provider(
		&self,
		options: &ClientOptions,
	) -> Result<Arc<dyn AuthProvider>, ProviderError>;
}

pub struct SharedProviders {
	factory: Option<Arc<dyn ProviderFactory>>,
	universal: OnceCell<Option<Arc<dyn UniversalProvider>>>,
	auth: OnceCell<Option<Arc<dyn AuthProvider>>>,
}

impl SharedProviders {
	pub fn new(factory: Option<Arc<dyn ProviderFactory>>) -> Self {
		Self {
			factory,
			universal: OnceCell::new(),
			auth: OnceCell::new(),
		}
	}

	/// Creates the universal provider on first use.
	///
	/// A failed creation is reported as an alert and remembered as "no
	/// provider"; it is not retried.
	pub async fn universal(
		&self,
		options: &ClientOptions,
		alerts: &AlertReporter,
	) -> Option<Arc<dyn UniversalProvider>> {
		if options.project_id.is_none() {
			return None;
		}
		let factory = self.factory.clone()?;

		self.universal
			.get_or_init(|| async move {
				match factory.create_universal_provider(options).await {
					Ok(provider) => {
						info!("Universal provider initialized");
						Some(provider)
					}
					Err(e) => {
						error!("Cannot create universal provider: {}", e);
						alerts.report(&e.to_string());
						None
					}
				}
			})
			.await
			.clone()
	}

	/// Creates the auth provider on first use.
	pub async fn auth(&self, options: &ClientOptions) -> Option<Arc<dyn AuthProvider>> {
		if !options.features.needs_auth_provider() {
			return None;
		}
		let factory = self.factory.clone()?;

		self.auth
			.get_or_init(|| async move {
				match factory.create_auth_provider(options).await {
					Ok(provider) => Some(provider),
					Err(e) => {
						error!("Cannot create auth provider: {}", e);
						None
					}
				}
			})
			.await
			.clone()
	}

	pub fn universal_provider(&self) -> Option<Arc<dyn UniversalProvider>> {
		self.universal.get().cloned().flatten()
	}

	pub fn auth_provider(&self) -> Option<Arc<dyn AuthProvider>> {
		self.auth.get().cloned().flatten()
	}
}

impl fmt::Debug for SharedProviders {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SharedProviders")
			.field("universal", &self.universal_provider().is_some())
			.field("auth", &self.auth_provider().is_some())
			.finish()
	}
}
