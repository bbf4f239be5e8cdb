//! Scan configuration: format weights, matching flags, and the action to take

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{DedupeError, DedupeResult};

/// Built-in format weights, highest quality first.
pub const DEFAULT_FORMAT_WEIGHTS: &[(&str, i64)] = &[
	(".flac", 4), // Lossless
	(".wav", 3),  // Lossless but larger
	(".aiff", 3), // Lossless Apple format
	(".alac", 3), // Apple Lossless
	(".m4a", 2),  // AAC
	(".mp3", 1),
	(".wma", 0),
];

/// Mapping from lowercased dotted extension to an integer quality weight.
///
/// The key set doubles as the discovery allow-list: files whose extension is
/// not in the table are ignored entirely, including for grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatPriority(BTreeMap<String, i64>);

impl Default for FormatPriority {
	fn default() -> Self {
		FormatPriority(
			DEFAULT_FORMAT_WEIGHTS
				.iter()
				.map(|(ext, w)| (ext.to_string(), *w))
				.collect(),
		)
	}
}

impl FormatPriority {
	/// Weight for an extension; unknown extensions score 0.
	pub fn weight(&self, extension: &str) -> i64 {
		self.0.get(extension).copied().unwrap_or(0)
	}

	/// Whether the extension participates in discovery.
	pub fn supports(&self, extension: &str) -> bool {
		self.0.contains_key(extension)
	}

	pub fn set(&mut self, extension: impl Into<String>, weight: i64) {
		self.0.insert(extension.into(), weight);
	}

	pub fn extensions(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(|s| s.as_str())
	}
}

/// What to do with the non-keeper members of each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
	Delete,
	Move,
}

/// Immutable configuration snapshot for one scan invocation.
///
/// Callers capture a snapshot at the moment a scan starts; live edits to
/// application settings never affect a scan already in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
	pub format_priority: FormatPriority,
	/// Sub-partition each group by exact byte size, trading recall for
	/// precision.
	pub exact_size_match: bool,
	/// Prefer embedded artist/title tags over filename heuristics.
	pub use_tags: bool,
	/// Reserved for forward compatibility. Grouping is exact-match on the
	/// normalized key and never consults this value; it is only validated
	/// for range and carried through the persisted settings.
	pub similarity_threshold: f64,
	pub action: Action,
	/// Required when `action` is `Move`.
	pub destination: Option<PathBuf>,
}

impl Default for ScanConfig {
	fn default() -> Self {
		ScanConfig {
			format_priority: FormatPriority::default(),
			exact_size_match: false,
			use_tags: true,
			similarity_threshold: 0.85,
			action: Action::Delete,
			destination: None,
		}
	}
}

impl ScanConfig {
	pub fn validate(&self) -> DedupeResult<()> {
		if self.action == Action::Move && self.destination.is_none() {
			return Err(DedupeError::Config(
				"destination directory required when action is move".to_string(),
			));
		}
		if !(0.0..=1.0).contains(&self.similarity_threshold) {
			return Err(DedupeError::Config(format!(
				"similarity threshold {} outside 0.0..=1.0",
				self.similarity_threshold
			)));
		}
		Ok(())
	}
}
