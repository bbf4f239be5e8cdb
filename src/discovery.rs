//! File discovery: recursive walk of the scan roots

use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::config::FormatPriority;
use crate::data::{extension_of, AudioFile};
use crate::error::{DedupeError, DedupeResult};
use crate::scanner::{ScanContext, ScanPhase, ScanProgress};

/// Walk the roots and collect supported audio files.
///
/// Every root must be a directory; a bad root aborts the scan before any
/// walking starts, so results from other roots are never partially built.
/// Walk and metadata errors on individual entries are logged and skipped.
/// Files are returned in walk order, which defines the first-seen tie-break
/// order used by keeper resolution.
pub fn discover(
	roots: &[PathBuf],
	priority: &FormatPriority,
	ctx: &ScanContext,
) -> DedupeResult<Vec<AudioFile>> {
	for root in roots {
		if !root.is_dir() {
			return Err(DedupeError::InvalidDirectory { path: root.clone() });
		}
	}

	info!("Discovery: scanning {} roots", roots.len());
	let mut files = Vec::new();
	let mut progress = ScanProgress::new(ScanPhase::Discovery, 0);

	for root in roots {
		debug!("Discovery: walking {}", root.display());
		discover_in_root(root, priority, ctx, &mut progress, &mut files)?;
	}

	Ok(files)
}

fn discover_in_root(
	root: &Path,
	priority: &FormatPriority,
	ctx: &ScanContext,
	progress: &mut ScanProgress,
	files: &mut Vec<AudioFile>,
) -> DedupeResult<()> {
	for (i, entry) in WalkDir::new(root).into_iter().enumerate() {
		if i % 256 == 0 {
			ctx.check_cancelled()?;
		}

		let entry = match entry {
			Ok(e) => e,
			Err(e) => {
				warn!("Discovery walk error: {}", e);
				continue;
			}
		};

		if entry.file_type().is_dir() {
			continue;
		}

		let path = entry.path();
		let extension = extension_of(path);
		if !priority.supports(&extension) {
			continue;
		}

		let metadata = match entry.metadata() {
			Ok(m) => m,
			Err(e) => {
				warn!("Skipping {} (metadata error: {})", path.display(), e);
				continue;
			}
		};

		files.push(AudioFile::new(path.to_path_buf(), metadata.len()));
		trace!("Discovery: found {} ({} bytes)", path.display(), metadata.len());

		progress.update(files.len(), Some(path.to_string_lossy().to_string()));
		ctx.report_progress(progress.clone());
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	fn create_test_directory() -> TempDir {
		let temp_dir = TempDir::new().unwrap();
		let base = temp_dir.path();

		fs::write(base.join("track.mp3"), b"mp3 data").unwrap();
		fs::write(base.join("track.FLAC"), b"flac data").unwrap();
		fs::write(base.join("notes.txt"), b"not audio").unwrap();
		fs::write(base.join("cover.jpg"), b"not audio either").unwrap();

		let sub = base.join("album");
		fs::create_dir(&sub).unwrap();
		fs::write(sub.join("nested.wma"), b"wma data").unwrap();

		temp_dir
	}

	#[test]
	fn test_discovers_only_supported_extensions() {
		let temp_dir = create_test_directory();
		let files = discover(
			&[temp_dir.path().to_path_buf()],
			&FormatPriority::default(),
			&ScanContext::new(),
		)
		.unwrap();

		let mut extensions: Vec<_> = files.iter().map(|f| f.extension.as_str()).collect();
		extensions.sort();
		assert_eq!(extensions, vec![".flac", ".mp3", ".wma"]);
	}

	#[test]
	fn test_extension_match_is_case_insensitive() {
		let temp_dir = create_test_directory();
		let files = discover(
			&[temp_dir.path().to_path_buf()],
			&FormatPriority::default(),
			&ScanContext::new(),
		)
		.unwrap();
		assert!(files.iter().any(|f| f.file_name() == "track.FLAC"));
	}

	#[test]
	fn test_invalid_root_is_an_error() {
		let temp_dir = TempDir::new().unwrap();
		let file_root = temp_dir.path().join("plain.mp3");
		fs::write(&file_root, b"x").unwrap();

		let result = discover(
			&[file_root.clone()],
			&FormatPriority::default(),
			&ScanContext::new(),
		);
		match result {
			Err(DedupeError::InvalidDirectory { path }) => assert_eq!(path, file_root),
			other => panic!("expected InvalidDirectory, got {:?}", other),
		}
	}

	#[test]
	fn test_multiple_roots_concatenate_in_order() {
		let first = create_test_directory();
		let second = TempDir::new().unwrap();
		fs::write(second.path().join("extra.m4a"), b"m4a").unwrap();

		let files = discover(
			&[first.path().to_path_buf(), second.path().to_path_buf()],
			&FormatPriority::default(),
			&ScanContext::new(),
		)
		.unwrap();

		assert_eq!(files.len(), 4);
		assert_eq!(files.last().unwrap().extension, ".m4a");
	}

	#[test]
	fn test_sizes_recorded() {
		let temp_dir = TempDir::new().unwrap();
		fs::write(temp_dir.path().join("sized.mp3"), vec![0u8; 2048]).unwrap();

		let files = discover(
			&[temp_dir.path().to_path_buf()],
			&FormatPriority::default(),
			&ScanContext::new(),
		)
		.unwrap();
		assert_eq!(files[0].size, 2048);
	}
}
