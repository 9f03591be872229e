//! WalletConnect optional-namespace derivation.
//!
//! One pairing requests every configured network at once, so the request is
//! built from the full network list rather than the adapter's own namespace.

use omni_types::{
	deprecated_caip_network_id, CaipNetwork, ChainNamespace, NamespaceConfig, NamespaceOverrides,
	NamespaceRequest,
};
use std::collections::{BTreeMap, HashSet};

pub const DEFAULT_EVENTS: [&str; 2] = ["accountsChanged", "chainChanged"];

fn default_namespace(namespace: Option<ChainNamespace>) -> NamespaceRequest {
	let methods = namespace
		.map(|ns| ns.default_walletconnect_methods())
		.unwrap_or_default();
	NamespaceRequest {
		methods: methods.iter().map(|m| m.to_string()).collect(),
		chains: Vec::new(),
		events: DEFAULT_EVENTS.iter().map(|e| e.to_string()).collect(),
		rpc_map: BTreeMap::new(),
	}
}

/// Builds the optional namespaces requested when pairing.
pub fn create_namespaces(networks: &[CaipNetwork], overrides: &NamespaceOverrides) -> NamespaceConfig {
	let mut namespaces = NamespaceConfig::new();

	for network in networks {
		let key = network.chain_namespace.as_str();
		let namespace = namespaces
			.entry(key.to_string())
			.or_insert_with(|| default_namespace(Some(network.chain_namespace)));

		namespace.chains.push(network.caip_network_id.clone());
		if let Some(deprecated) = deprecated_caip_network_id(&network.caip_network_id) {
			namespace.chains.push(deprecated.to_string());
		}

		if let Some(rpc_url) = network.rpc_url() {
			namespace
				.rpc_map
				.insert(network.id.to_string(), rpc_url.to_string());
		}
	}

	apply_overrides(namespaces, overrides)
}

fn apply_overrides(mut namespaces: NamespaceConfig, overrides: &NamespaceOverrides) -> NamespaceConfig {
	if overrides.is_empty() {
		return namespaces;
	}

	let named = overrides
		.methods
		.keys()
		.chain(overrides.chains.keys())
		.chain(overrides.events.keys())
		.cloned()
		.chain(
			overrides
				.rpc_map
				.keys()
				.filter_map(|caip_id| caip_id.split_once(':').map(|(ns, _)| ns.to_string())),
		)
		.collect::<Vec<_>>();

	for ns in named {
		namespaces
			.entry(ns.clone())
			.or_insert_with(|| default_namespace(ns.parse().ok()));
	}

	for (ns, methods) in &overrides.methods {
		if let Some(namespace) = namespaces.get_mut(ns) {
			namespace.methods = methods.clone();
		}
	}
	for (ns, chains) in &overrides.chains {
		if let Some(namespace) = namespaces.get_mut(ns) {
			namespace.chains = chains.clone();
		}
	}
	for (ns, events) in &overrides.events {
		if let Some(namespace) = namespaces.get_mut(ns) {
			namespace.events = events.clone();
		}
	}

	// An rpc override replaces the namespace's whole map
	let mut replaced: HashSet<String> = HashSet::new();
	for (caip_id, rpc_url) in &overrides.rpc_map {
		let Some((ns, id)) = caip_id.split_once(':') else {
			continue;
		};
		if id.is_empty() {
			continue;
		}
		if let Some(namespace) = namespaces.get_mut(ns) {
			if replaced.insert(ns.to_string()) {
				namespace.rpc_map.clear();
			}
			namespace.rpc_map.insert(id.to_string(), rpc_url.clone());
		}
	}

	namespaces
}
