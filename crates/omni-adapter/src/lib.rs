//! Chain adapters for omni-connect.
//!
//! [`ChainAdapter`] is the contract every namespace implementation satisfies,
//! [`AdapterCore`] the bookkeeping they share and [`UniversalAdapter`] the
//! WalletConnect-only implementation used when no specialized adapter is
//! supplied for a namespace.

pub mod base;
pub mod blueprint;
pub mod emitter;
pub mod namespaces;
pub mod universal;

pub use base::{AdapterCore, DappContext};
pub use blueprint::*;
pub use emitter::{EventEmitter, EventListener};
pub use namespaces::{create_namespaces, DEFAULT_EVENTS};
pub use universal::UniversalAdapter;
