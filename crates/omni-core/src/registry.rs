//! Adapter and connector registries owned by the client.

use crate::error::{ClientError, Result};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use omni_adapter::ChainAdapter;
use omni_types::{ChainNamespace, Connector};
use std::fmt;
use std::sync::Arc;

/// Exactly one adapter per namespace, in registration order.
pub struct AdapterRegistry {
	adapters: DashMap<ChainNamespace, Arc<dyn ChainAdapter>>,
	order: ArcSwap<Vec<ChainNamespace>>,
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self {
			adapters: DashMap::new(),
			order: ArcSwap::from_pointee(Vec::new()),
		}
	}

	/// Register an adapter under its namespace
	pub fn register(&self, adapter: Arc<dyn ChainAdapter>) -> Result<()> {
		let namespace = adapter.namespace();
		if self.adapters.contains_key(&namespace) {
			return Err(ClientError::Config(format!(
				"Adapter for namespace {} already registered",
				namespace
			)));
		}

		self.adapters.insert(namespace, adapter);
		self.order.rcu(|order| {
			let mut order = order.as_ref().clone();
			order.push(namespace);
			order
		});
		Ok(())
	}

	pub fn get(&self, namespace: ChainNamespace) -> Option<Arc<dyn ChainAdapter>> {
		self.adapters.get(&namespace).map(|a| a.value().clone())
	}

	pub fn require(&self, namespace: ChainNamespace) -> Result<Arc<dyn ChainAdapter>> {
		self.get(namespace)
			.ok_or(ClientError::AdapterNotFound(namespace))
	}

	pub fn contains(&self, namespace: ChainNamespace) -> bool {
		self.adapters.contains_key(&namespace)
	}

	pub fn remove(&self, namespace: ChainNamespace) -> Option<Arc<dyn ChainAdapter>> {
		let removed = self.adapters.remove(&namespace).map(|(_, adapter)| adapter);
		self.order.rcu(|order| {
			order
				.iter()
				.copied()
				.filter(|ns| *ns != namespace)
				.collect::<Vec<_>>()
		});
		removed
	}

	/// Registered namespaces in registration order.
	pub fn namespaces(&self) -> Vec<ChainNamespace> {
		self.order.load().as_ref().clone()
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}
}

impl Default for AdapterRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for AdapterRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let adapters: Vec<_> = self
			.namespaces()
			.into_iter()
			.filter_map(|ns| self.get(ns).map(|a| (ns, a.adapter_type())))
			.collect();
		f.debug_struct("AdapterRegistry")
			.field("adapters", &adapters)
			.finish()
	}
}

/// Connectors discovered by every adapter, keyed by namespace.
#[derive(Debug, Default)]
pub struct ConnectorRegistry {
	connectors: DashMap<ChainNamespace, Vec<Connector>>,
}

impl ConnectorRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the namespace's connector list.
	pub fn set(&self, namespace: ChainNamespace, connectors: Vec<Connector>) {
		self.connectors.insert(namespace, connectors);
	}

	pub fn remove(&self, namespace: ChainNamespace) {
		self.connectors.remove(&namespace);
	}

	pub fn namespace(&self, namespace: ChainNamespace) -> Vec<Connector> {
		self.connectors
			.get(&namespace)
			.map(|c| c.value().clone())
			.unwrap_or_default()
	}

	/// Every connector, namespaces in canonical order.
	pub fn all(&self) -> Vec<Connector> {
		ChainNamespace::ALL
			.iter()
			.flat_map(|ns| self.namespace(*ns))
			.collect()
	}

	/// Finds a connector by id, looking in `preferred` first.
	pub fn find(&self, id: &str, preferred: Option<ChainNamespace>) -> Option<Connector> {
		if let Some(connector) = preferred
			.and_then(|ns| self.namespace(ns).into_iter().find(|c| c.id == id))
		{
			return Some(connector);
		}
		self.all().into_iter().find(|c| c.id == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use omni_adapter::UniversalAdapter;
	use omni_types::ConnectorType;

	#[test]
	fn test_one_adapter_per_namespace() {
		let registry = AdapterRegistry::new();
		registry
			.register(Arc::new(UniversalAdapter::new(ChainNamespace::Solana)))
			.unwrap();
		registry
			.register(Arc::new(UniversalAdapter::new(ChainNamespace::Eip155)))
			.unwrap();
		assert!(registry
			.register(Arc::new(UniversalAdapter::new(ChainNamespace::Eip155)))
			.is_err());

		assert_eq!(
			registry.namespaces(),
			vec![ChainNamespace::Solana, ChainNamespace::Eip155]
		);

		assert!(registry.remove(ChainNamespace::Solana).is_some());
		assert_eq!(registry.namespaces(), vec![ChainNamespace::Eip155]);
		assert!(matches!(
			registry.require(ChainNamespace::Solana),
			Err(ClientError::AdapterNotFound(ChainNamespace::Solana))
		));
	}

	#[test]
	fn test_find_prefers_namespace() {
		let registry = ConnectorRegistry::new();
		registry.set(
			ChainNamespace::Eip155,
			vec![Connector::new("walletConnect", ConnectorType::WalletConnect, "WalletConnect", ChainNamespace::Eip155)],
		);
		registry.set(
			ChainNamespace::Solana,
			vec![Connector::new("walletConnect", ConnectorType::WalletConnect, "WalletConnect", ChainNamespace::Solana)],
		);

		let found = registry
			.find("walletConnect", Some(ChainNamespace::Solana))
			.unwrap();
		assert_eq!(found.chain, ChainNamespace::Solana);
		assert_eq!(registry.find("walletConnect", None).unwrap().chain, ChainNamespace::Eip155);
		assert_eq!(registry.all().len(), 2);
		assert!(registry.find("missing", None).is_none());
	}
}
