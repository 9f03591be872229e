//! Shared vocabulary of the omni-connect workspace.
//!
//! Namespaces, CAIP identifiers, networks, connectors, account state, adapter
//! events, the traits of every external collaborator (wallet transports,
//! name service, modal) and the error enums all crates agree on.

pub mod account;
pub mod config;
pub mod connector;
pub mod errors;
pub mod events;
pub mod identity;
pub mod namespace;
pub mod network;
pub mod provider;

pub use account::*;
pub use config::*;
pub use connector::*;
pub use errors::*;
pub use events::*;
pub use identity::*;
pub use namespace::*;
pub use network::*;
pub use provider::*;
