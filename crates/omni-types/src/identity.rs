//! Name-service lookup and the modal surface.

use crate::errors::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
	pub name: Option<String>,
	pub avatar: Option<String>,
}

/// Shared name-service lookup (ENS-like).
#[async_trait]
pub trait IdentityResolver: Send + Sync + Debug {
	async fn resolve(&self, address: &str) -> Result<Option<Identity>, ProviderError>;
}

/// Whatever renders the connect modal. Only told to show or hide itself.
pub trait ModalView: Send + Sync + Debug {
	fn open(&self, view: Option<&str>);

	fn close(&self);
}
