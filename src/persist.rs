//! Persisted application settings (JSON)
//!
//! The settings file belongs to the surrounding application, not the scan
//! engine: the engine only ever receives a validated [`ScanConfig`]
//! snapshot. Missing keys fall back to built-in defaults field by field; a
//! malformed file is an error the caller downgrades to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::{Action, FormatPriority, ScanConfig};
use crate::error::PersistResult;

/// Location of the settings file under the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("refrain").join("config.json"))
}

/// Everything the application remembers between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
	pub source_dir: String,
	pub dest_dir: String,
	pub threshold: f64,
	pub action: Action,
	pub verbose: bool,
	#[serde(rename = "use_id3_tags")]
	pub use_tags: bool,
	pub exact_size_match: bool,
	pub format_priority: FormatPriority,
}

impl Default for AppSettings {
	fn default() -> Self {
		AppSettings {
			source_dir: String::new(),
			dest_dir: String::new(),
			threshold: 0.85,
			action: Action::Move,
			verbose: true,
			use_tags: true,
			exact_size_match: false,
			format_priority: FormatPriority::default(),
		}
	}
}

impl AppSettings {
	pub fn load(path: &Path) -> PersistResult<Self> {
		let bytes = fs::read(path)?;
		Ok(serde_json::from_slice(&bytes)?)
	}

	/// Load, falling back to built-in defaults on a missing or malformed
	/// file. A malformed file is worth a warning; a missing one is not.
	pub fn load_or_default(path: &Path) -> Self {
		match Self::load(path) {
			Ok(settings) => settings,
			Err(crate::error::PersistError::Io(e))
				if e.kind() == std::io::ErrorKind::NotFound =>
			{
				Self::default()
			}
			Err(e) => {
				warn!("Settings: {} unusable ({}); using defaults", path.display(), e);
				Self::default()
			}
		}
	}

	/// Write atomically: temp file in the same directory, then rename.
	pub fn save(&self, path: &Path) -> PersistResult<()> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		let bytes = serde_json::to_vec_pretty(self)?;
		let tmp = path.with_extension("json.tmp");
		fs::write(&tmp, &bytes)?;
		atomic_rename(&tmp, path)?;
		Ok(())
	}

	/// Snapshot the persisted settings into a scan configuration.
	///
	/// A move action without a destination directory cannot be performed, so
	/// it falls back to delete. A fresh install therefore produces a valid
	/// delete configuration; `--move` on the command line reinstates moving.
	pub fn to_scan_config(&self) -> ScanConfig {
		let destination = if self.dest_dir.is_empty() {
			None
		} else {
			Some(PathBuf::from(&self.dest_dir))
		};
		let action = if destination.is_none() {
			Action::Delete
		} else {
			self.action
		};
		ScanConfig {
			format_priority: self.format_priority.clone(),
			exact_size_match: self.exact_size_match,
			use_tags: self.use_tags,
			similarity_threshold: self.threshold,
			action,
			destination,
		}
	}
}

// Cross-platform atomic rename: remove the target first on Windows.
fn atomic_rename(from: &Path, to: &Path) -> std::io::Result<()> {
	#[cfg(windows)]
	{
		if to.exists() {
			fs::remove_file(to)?;
		}
	}
	fs::rename(from, to)
}
