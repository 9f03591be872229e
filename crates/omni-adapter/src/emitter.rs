//! Per-adapter publish/subscribe for wallet-originated events.

use dashmap::DashMap;
use omni_types::{AdapterEvent, AdapterEventKind};
use std::fmt;
use std::sync::Arc;

pub type EventListener = Arc<dyn Fn(&AdapterEvent) + Send + Sync>;

/// Listener sets keyed by event kind.
///
/// Registering the same listener twice is a no-op. Listeners run
/// synchronously on the emitting task and must not block.
#[derive(Default)]
pub struct EventEmitter {
	listeners: DashMap<AdapterEventKind, Vec<EventListener>>,
}

impl EventEmitter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `listener` for `kind`. Returns false when it was already registered.
	pub fn on(&self, kind: AdapterEventKind, listener: EventListener) -> bool {
		let mut listeners = self.listeners.entry(kind).or_default();
		if listeners.iter().any(|existing| same_listener(existing, &listener)) {
			return false;
		}
		listeners.push(listener);
		true
	}

	pub fn off(&self, kind: AdapterEventKind, listener: &EventListener) -> bool {
		let Some(mut listeners) = self.listeners.get_mut(&kind) else {
			return false;
		};
		let before = listeners.len();
		listeners.retain(|existing| !same_listener(existing, listener));
		listeners.len() != before
	}

	pub fn emit(&self, event: &AdapterEvent) {
		// Clone the set out so listeners may (un)register without deadlocking
		let listeners = self
			.listeners
			.get(&event.kind())
			.map(|listeners| listeners.value().clone())
			.unwrap_or_default();

		for listener in listeners {
			listener(event);
		}
	}

	pub fn listener_count(&self, kind: AdapterEventKind) -> usize {
		self.listeners.get(&kind).map(|l| l.len()).unwrap_or(0)
	}

	pub fn remove_all_listeners(&self) {
		self.listeners.clear();
	}
}

fn same_listener(a: &EventListener, b: &EventListener) -> bool {
	std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl fmt::Debug for EventEmitter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let counts: Vec<_> = self
			.listeners
			.iter()
			.map(|entry| (*entry.key(), entry.value().len()))
			.collect();
		f.debug_struct("EventEmitter")
			.field("listeners", &counts)
			.finish()
	}
}
