//! Client orchestrator for omni-connect.
//!
//! The [`Client`] owns one adapter per configured namespace, the active
//! selection and the per-namespace account, network and provider state. It
//! is the only caller of adapter methods and the only writer of that state;
//! adapters report back through events which the client applies in order.

pub mod alerts;
pub mod builder;
pub mod client;
pub mod error;
pub mod providers;
pub mod registry;
pub mod state;

mod events;
mod sync;

#[cfg(test)]
mod testing;

pub use alerts::{classify, Alert, AlertKind, AlertReporter};
pub use builder::ClientBuilder;
pub use client::Client;
pub use error::{ClientError, Result};
pub use providers::{ProviderFactory, SharedProviders};
pub use registry::{AdapterRegistry, ConnectorRegistry};
pub use state::{AccountStore, ActiveProvider, ClientState, NamespaceStore, SyncTicket};
