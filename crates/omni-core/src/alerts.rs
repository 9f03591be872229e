//! Transport alert classification.
//!
//! Close reasons reported by the universal provider are matched against
//! known substrings so the application can react to misconfiguration without
//! the client failing.

use dashmap::DashSet;
use std::fmt;
use tokio::sync::broadcast;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
	/// The dapp origin is not allow-listed for the project.
	InvalidAppConfiguration,
	/// The relay rejected the session token, usually clock skew.
	JwtTokenNotValid,
	InvalidProjectId,
}

impl AlertKind {
	const PATTERNS: [(&'static str, AlertKind); 3] = [
		(
			"Unauthorized: origin not allowed",
			AlertKind::InvalidAppConfiguration,
		),
		("JWT validation error", AlertKind::JwtTokenNotValid),
		("Unauthorized: invalid key", AlertKind::InvalidProjectId),
	];

	pub fn short_message(&self) -> &'static str {
		match self {
			AlertKind::InvalidAppConfiguration => "Invalid App Configuration",
			AlertKind::JwtTokenNotValid => "Session Expired",
			AlertKind::InvalidProjectId => "Invalid Project ID",
		}
	}
}

impl fmt::Display for AlertKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.short_message())
	}
}

/// Maps a transport error message to its alert kind.
pub fn classify(reason: &str) -> Option<AlertKind> {
	AlertKind::PATTERNS
		.iter()
		.find(|(pattern, _)| reason.contains(pattern))
		.map(|(_, kind)| *kind)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
	pub kind: AlertKind,
	pub reason: String,
}

/// Publishes each alert kind at most once.
#[derive(Debug)]
pub struct AlertReporter {
	reported: DashSet<AlertKind>,
	sender: broadcast::Sender<Alert>,
}

impl AlertReporter {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self {
			reported: DashSet::new(),
			sender,
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<Alert> {
		self.sender.subscribe()
	}

	/// Classifies `reason` and publishes it unless its kind was already reported.
	pub fn report(&self, reason: &str) -> Option<AlertKind> {
		let Some(kind) = classify(reason) else {
			debug!("Unclassified transport error: {}", reason);
			return None;
		};

		if !self.reported.insert(kind) {
			return None;
		}

		warn!("{}: {}", kind, reason);
		// No subscribers is fine
		let _ = self.sender.send(Alert {
			kind,
			reason: reason.to_string(),
		});
		Some(kind)
	}
}

impl Default for AlertReporter {
	fn default() -> Self {
		Self::new(16)
	}
}
