//! Events adapters publish to the orchestrator.

use crate::{connector::Connector, namespace::ChainId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterEventKind {
	Disconnect,
	AccountChanged,
	SwitchNetwork,
	ConnectorsChanged,
}

impl AdapterEventKind {
	pub const ALL: [AdapterEventKind; 4] = [
		AdapterEventKind::Disconnect,
		AdapterEventKind::AccountChanged,
		AdapterEventKind::SwitchNetwork,
		AdapterEventKind::ConnectorsChanged,
	];
}

/// Wallet-originated change reported by an adapter.
#[derive(Debug, Clone)]
pub enum AdapterEvent {
	/// The wallet dropped the connection.
	Disconnect,
	/// The wallet exposes a different address.
	AccountChanged {
		address: String,
		chain_id: Option<ChainId>,
	},
	/// The wallet moved to another chain.
	SwitchNetwork {
		address: Option<String>,
		chain_id: ChainId,
	},
	/// The adapter's connector list changed.
	ConnectorsChanged(Vec<Connector>),
}

impl AdapterEvent {
	pub fn kind(&self) -> AdapterEventKind {
		match self {
			AdapterEvent::Disconnect => AdapterEventKind::Disconnect,
			AdapterEvent::AccountChanged { .. } => AdapterEventKind::AccountChanged,
			AdapterEvent::SwitchNetwork { .. } => AdapterEventKind::SwitchNetwork,
			AdapterEvent::ConnectorsChanged(_) => AdapterEventKind::ConnectorsChanged,
		}
	}
}
