//! Applying delete/move decisions to the non-keeper members of each group

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{Action, ScanConfig};
use crate::data::ScanResult;
use crate::error::DedupeResult;
use crate::scanner::ScanContext;

/// Outcome of processing one duplicate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
	Deleted,
	Moved { to: PathBuf },
	WouldDelete,
	WouldMove { to: PathBuf },
	Failed { reason: String },
}

/// Per-file outcomes plus aggregate counters for one action pass.
#[derive(Debug, Clone, Default)]
pub struct ActionReport {
	pub outcomes: Vec<(PathBuf, FileOutcome)>,
	pub processed: usize,
	pub failed: usize,
}

/// Applies the configured action to each group's duplicates list.
///
/// The keeper is never touched. Files are processed sequentially; a failure
/// on one file is recorded against that file and does not stop the batch.
/// Moves into the destination must stay on one thread so the collision
/// disambiguation below remains correct.
pub struct ActionExecutor {
	action: Action,
	destination: Option<PathBuf>,
	dry_run: bool,
}

impl ActionExecutor {
	pub fn new(config: &ScanConfig, dry_run: bool) -> DedupeResult<Self> {
		config.validate()?;
		Ok(Self {
			action: config.action,
			destination: config.destination.clone(),
			dry_run,
		})
	}

	/// Process every duplicate in the result. Dry-run computes identical
	/// decisions, including move targets, with zero filesystem mutation.
	pub fn apply(&self, result: &ScanResult, ctx: &ScanContext) -> DedupeResult<ActionReport> {
		if !self.dry_run && self.action == Action::Move {
			let destination = self.destination.as_ref().expect("validated by new()");
			fs::create_dir_all(destination)?;
		}

		let mut report = ActionReport::default();
		for group in result.groups.values() {
			for duplicate in &group.duplicates {
				ctx.check_cancelled()?;
				let outcome = self.process_one(&duplicate.path);
				if matches!(outcome, FileOutcome::Failed { .. }) {
					report.failed += 1;
				}
				report.processed += 1;
				report.outcomes.push((duplicate.path.clone(), outcome));
			}
		}

		info!(
			"Executor: {} {} duplicate files ({} failed)",
			if self.dry_run { "would process" } else { "processed" },
			report.processed,
			report.failed
		);
		Ok(report)
	}

	fn process_one(&self, path: &Path) -> FileOutcome {
		match self.action {
			Action::Delete => {
				if self.dry_run {
					return FileOutcome::WouldDelete;
				}
				match fs::remove_file(path) {
					Ok(()) => FileOutcome::Deleted,
					Err(e) => {
						warn!("Executor: failed to delete {}: {}", path.display(), e);
						FileOutcome::Failed {
							reason: e.to_string(),
						}
					}
				}
			}
			Action::Move => {
				let destination = self.destination.as_ref().expect("validated by new()");
				let target = move_target(path, destination);
				if self.dry_run {
					return FileOutcome::WouldMove { to: target };
				}
				match move_file(path, &target) {
					Ok(()) => FileOutcome::Moved { to: target },
					Err(e) => {
						warn!("Executor: failed to move {}: {}", path.display(), e);
						FileOutcome::Failed {
							reason: e.to_string(),
						}
					}
				}
			}
		}
	}
}

/// Destination path for a move, preserving the base file name.
///
/// On a name collision a short hash of the source's full path is inserted
/// before the extension. Resolution is attempted once; a second collision
/// against the disambiguated name is not further resolved.
fn move_target(source: &Path, destination: &Path) -> PathBuf {
	let file_name = source
		.file_name()
		.map(|n| n.to_string_lossy().to_string())
		.unwrap_or_default();
	let target = destination.join(&file_name);
	if !target.exists() {
		return target;
	}

	let digest = format!("{:x}", md5::compute(source.to_string_lossy().as_bytes()));
	let stem = source
		.file_stem()
		.map(|n| n.to_string_lossy().to_string())
		.unwrap_or_default();
	let extension = source
		.extension()
		.map(|e| format!(".{}", e.to_string_lossy()))
		.unwrap_or_default();
	destination.join(format!("{}_{}{}", stem, &digest[..6], extension))
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(source: &Path, target: &Path) -> std::io::Result<()> {
	match fs::rename(source, target) {
		Ok(()) => Ok(()),
		Err(_) => {
			fs::copy(source, target)?;
			fs::remove_file(source)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scanner::{DuplicateScanner, ScanContext};
	use crate::ScanConfig;
	use std::collections::BTreeSet;
	use tempfile::TempDir;

	fn tree_snapshot(root: &Path) -> BTreeSet<PathBuf> {
		walkdir::WalkDir::new(root)
			.into_iter()
			.filter_map(|e| e.ok())
			.filter(|e| e.file_type().is_file())
			.map(|e| e.path().to_path_buf())
			.collect()
	}

	fn scan_fixture(dir: &TempDir, config: &ScanConfig) -> ScanResult {
		let scanner = DuplicateScanner::new(config.clone());
		scanner
			.scan(&[dir.path().to_path_buf()], &ScanContext::new())
			.unwrap()
	}

	fn duplicate_fixture() -> TempDir {
		let temp_dir = TempDir::new().unwrap();
		fs::write(temp_dir.path().join("Song.flac"), vec![0u8; 4096]).unwrap();
		fs::write(temp_dir.path().join("01 - Song.mp3"), vec![0u8; 2048]).unwrap();
		temp_dir
	}

	#[test]
	fn test_dry_run_mutates_nothing() {
		let temp_dir = duplicate_fixture();
		let config = ScanConfig {
			use_tags: false,
			..ScanConfig::default()
		};
		let result = scan_fixture(&temp_dir, &config);
		let before = tree_snapshot(temp_dir.path());

		let executor = ActionExecutor::new(&config, true).unwrap();
		let report = executor.apply(&result, &ScanContext::new()).unwrap();

		assert_eq!(report.processed, 1);
		assert_eq!(report.outcomes[0].1, FileOutcome::WouldDelete);
		assert_eq!(tree_snapshot(temp_dir.path()), before);
	}

	#[test]
	fn test_delete_removes_only_duplicates() {
		let temp_dir = duplicate_fixture();
		let config = ScanConfig {
			use_tags: false,
			..ScanConfig::default()
		};
		let result = scan_fixture(&temp_dir, &config);

		let executor = ActionExecutor::new(&config, false).unwrap();
		let report = executor.apply(&result, &ScanContext::new()).unwrap();

		assert_eq!(report.processed, 1);
		assert_eq!(report.failed, 0);
		assert!(temp_dir.path().join("Song.flac").exists());
		assert!(!temp_dir.path().join("01 - Song.mp3").exists());
	}

	#[test]
	fn test_move_places_duplicate_under_destination() {
		let temp_dir = duplicate_fixture();
		let dest = TempDir::new().unwrap();
		let config = ScanConfig {
			use_tags: false,
			action: Action::Move,
			destination: Some(dest.path().to_path_buf()),
			..ScanConfig::default()
		};
		let result = scan_fixture(&temp_dir, &config);

		let executor = ActionExecutor::new(&config, false).unwrap();
		let report = executor.apply(&result, &ScanContext::new()).unwrap();

		assert_eq!(report.failed, 0);
		assert!(dest.path().join("01 - Song.mp3").exists());
		assert!(!temp_dir.path().join("01 - Song.mp3").exists());
		assert!(temp_dir.path().join("Song.flac").exists());
	}

	#[test]
	fn test_move_collision_disambiguates_once() {
		// destination already holds a file of the same name
		let temp_dir = duplicate_fixture();
		let dest = TempDir::new().unwrap();
		fs::write(dest.path().join("01 - Song.mp3"), b"already here").unwrap();

		let config = ScanConfig {
			use_tags: false,
			action: Action::Move,
			destination: Some(dest.path().to_path_buf()),
			..ScanConfig::default()
		};
		let result = scan_fixture(&temp_dir, &config);
		let executor = ActionExecutor::new(&config, false).unwrap();
		let report = executor.apply(&result, &ScanContext::new()).unwrap();

		assert_eq!(report.failed, 0);
		// pre-existing file untouched
		assert_eq!(
			fs::read(dest.path().join("01 - Song.mp3")).unwrap(),
			b"already here"
		);
		// moved copy renamed with a 6-char suffix derived from its source path
		let source = temp_dir.path().join("01 - Song.mp3");
		let digest = format!("{:x}", md5::compute(source.to_string_lossy().as_bytes()));
		let renamed = dest.path().join(format!("01 - Song_{}.mp3", &digest[..6]));
		assert!(renamed.exists());
	}

	#[test]
	fn test_move_target_is_deterministic() {
		let dest = TempDir::new().unwrap();
		fs::write(dest.path().join("track.mp3"), b"x").unwrap();

		let source = Path::new("/library/track.mp3");
		let first = move_target(source, dest.path());
		let second = move_target(source, dest.path());
		assert_eq!(first, second);
		assert_ne!(first, dest.path().join("track.mp3"));
	}

	#[test_log::test]
	fn test_per_file_failure_does_not_abort_batch() {
		let temp_dir = duplicate_fixture();
		let config = ScanConfig {
			use_tags: false,
			..ScanConfig::default()
		};
		let result = scan_fixture(&temp_dir, &config);

		// vanish the duplicate before the executor runs
		fs::remove_file(temp_dir.path().join("01 - Song.mp3")).unwrap();

		let executor = ActionExecutor::new(&config, false).unwrap();
		let report = executor.apply(&result, &ScanContext::new()).unwrap();

		assert_eq!(report.processed, 1);
		assert_eq!(report.failed, 1);
		assert!(matches!(report.outcomes[0].1, FileOutcome::Failed { .. }));
	}

	#[test]
	fn test_cancelled_context_stops_before_mutation() {
		let temp_dir = duplicate_fixture();
		let config = ScanConfig {
			use_tags: false,
			..ScanConfig::default()
		};
		let result = scan_fixture(&temp_dir, &config);
		let before = tree_snapshot(temp_dir.path());

		let ctx = ScanContext::new();
		ctx.cancel();
		let executor = ActionExecutor::new(&config, false).unwrap();
		assert!(executor.apply(&result, &ctx).is_err());
		assert_eq!(tree_snapshot(temp_dir.path()), before);
	}
}
