//! Core data structures for scanned files and scan results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Artist/title pair read from embedded metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTags {
	pub artist: String,
	pub title: String,
}

/// A single audio file as discovered on disk.
///
/// Immutable once discovered; owned by the scan invocation that created it.
/// `extension` is lowercased and keeps its leading dot so it can index the
/// format priority table directly. `tags` and `bitrate_kbps` are filled in
/// during the scan when tag reading is enabled and the format supports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFile {
	pub path: PathBuf,
	pub extension: String,
	pub size: u64,
	pub tags: Option<TrackTags>,
	pub bitrate_kbps: Option<u32>,
}

impl AudioFile {
	pub fn new(path: PathBuf, size: u64) -> Self {
		let extension = extension_of(&path);
		AudioFile {
			path,
			extension,
			size,
			tags: None,
			bitrate_kbps: None,
		}
	}

	/// Base file name, including extension.
	pub fn file_name(&self) -> &str {
		self.path
			.file_name()
			.and_then(|n| n.to_str())
			.unwrap_or_default()
	}

	/// Base file name without extension; the input to filename normalization.
	pub fn stem(&self) -> &str {
		self.path
			.file_stem()
			.and_then(|n| n.to_str())
			.unwrap_or_default()
	}

	pub fn size_kib(&self) -> f64 {
		self.size as f64 / 1024.0
	}
}

/// Lowercased extension with leading dot, or the empty string.
pub fn extension_of(path: &Path) -> String {
	path.extension()
		.and_then(|e| e.to_str())
		.map(|e| format!(".{}", e.to_lowercase()))
		.unwrap_or_default()
}

/// A set of files resolved to the same song, with a designated keeper.
///
/// Invariant: `duplicates` is non-empty (a group always has at least two
/// members) and ordered by descending quality score, ties in first-seen
/// order. `scores` retains every member's score for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
	pub key: String,
	pub keeper: AudioFile,
	pub duplicates: Vec<AudioFile>,
	pub scores: HashMap<PathBuf, f64>,
}

impl DuplicateGroup {
	/// Keeper first, then duplicates in descending score order.
	pub fn members(&self) -> impl Iterator<Item = &AudioFile> {
		std::iter::once(&self.keeper).chain(self.duplicates.iter())
	}

	pub fn len(&self) -> usize {
		1 + self.duplicates.len()
	}

	pub fn is_empty(&self) -> bool {
		false // invariant: a group always holds a keeper plus duplicates
	}

	pub fn score_of(&self, file: &AudioFile) -> Option<f64> {
		self.scores.get(&file.path).copied()
	}
}

/// Aggregate counters for one scan invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStats {
	pub started: DateTime<Utc>,
	pub files_discovered: usize,
	pub groups: usize,
	pub duplicates: usize,
}

/// The complete outcome of one scan: duplicate groups keyed by their
/// (possibly size-qualified) normalization key.
///
/// Built fresh per scan and replaced by the next one; nothing here is
/// persisted. Keys are held in a `BTreeMap` so iteration order, and with it
/// report order, is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
	pub groups: BTreeMap<String, DuplicateGroup>,
	pub stats: ScanStats,
}

impl ScanResult {
	pub fn group_count(&self) -> usize {
		self.groups.len()
	}

	pub fn duplicate_count(&self) -> usize {
		self.groups.values().map(|g| g.duplicates.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_extension_lowercased_with_dot() {
		let file = AudioFile::new(PathBuf::from("/music/Track.MP3"), 10);
		assert_eq!(file.extension, ".mp3");
		assert_eq!(file.file_name(), "Track.MP3");
		assert_eq!(file.stem(), "Track");
	}

	#[test]
	fn test_extension_missing() {
		let file = AudioFile::new(PathBuf::from("/music/README"), 10);
		assert_eq!(file.extension, "");
	}

	#[test]
	fn test_size_kib() {
		let file = AudioFile::new(PathBuf::from("/music/a.flac"), 2048);
		assert_eq!(file.size_kib(), 2.0);
	}

	#[test]
	fn test_group_members_order() {
		let keeper = AudioFile::new(PathBuf::from("/a.flac"), 1);
		let dupe = AudioFile::new(PathBuf::from("/a.mp3"), 1);
		let mut scores = HashMap::new();
		scores.insert(keeper.path.clone(), 4000.0);
		scores.insert(dupe.path.clone(), 1000.0);
		let group = DuplicateGroup {
			key: "a".to_string(),
			keeper: keeper.clone(),
			duplicates: vec![dupe.clone()],
			scores,
		};

		let members: Vec<_> = group.members().collect();
		assert_eq!(members, vec![&keeper, &dupe]);
		assert_eq!(group.len(), 2);
		assert_eq!(group.score_of(&keeper), Some(4000.0));
	}
}
