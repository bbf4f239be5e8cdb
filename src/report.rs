//! Human-readable rendering of scan results and action outcomes
//!
//! Pure string-producing functions; printing is left to the caller. Dry-run
//! outcome lines are shaped identically to real ones apart from the
//! `[DRY RUN] Would` marker.

use std::path::Path;

use crate::actions::{ActionReport, FileOutcome};
use crate::data::{AudioFile, DuplicateGroup, ScanResult};

/// Quality annotation for one file: format, size, bitrate when known.
/// For example `"FLAC, 2.9 MB"` or `"MP3, 900 KB, 320 kbps"`.
pub fn quality_annotation(file: &AudioFile) -> String {
	let format = file.extension.trim_start_matches('.').to_uppercase();
	let size_kib = file.size_kib();
	let size = if size_kib > 1024.0 {
		format!("{:.1} MB", size_kib / 1024.0)
	} else {
		format!("{:.0} KB", size_kib)
	};

	let mut parts = vec![format, size];
	if let Some(kbps) = file.bitrate_kbps {
		parts.push(format!("{kbps} kbps"));
	}
	parts.join(", ")
}

fn base_name(path: &Path) -> String {
	path.file_name()
		.map(|n| n.to_string_lossy().to_string())
		.unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Render one duplicate group: identity label, keeper, duplicates.
pub fn render_group(group: &DuplicateGroup, verbose: bool) -> Vec<String> {
	let mut lines = vec![group.key.clone()];
	lines.push(format!(
		"  KEEP: {} [{}]",
		group.keeper.file_name(),
		quality_annotation(&group.keeper)
	));
	for duplicate in &group.duplicates {
		lines.push(format!(
			"  DUPE: {} [{}]",
			duplicate.file_name(),
			quality_annotation(duplicate)
		));
		if verbose {
			lines.push(format!("        Path: {}", duplicate.path.display()));
		}
	}
	lines
}

/// Summary line for the whole result.
pub fn render_summary(result: &ScanResult) -> String {
	format!(
		"Found {} songs with {} duplicate files",
		result.group_count(),
		result.duplicate_count()
	)
}

/// One line per processed file.
pub fn render_outcome(path: &Path, outcome: &FileOutcome) -> String {
	let name = base_name(path);
	match outcome {
		FileOutcome::Deleted => format!("Deleted: {name}"),
		FileOutcome::Moved { to } => format!("Moved: {} -> {}", name, to.display()),
		FileOutcome::WouldDelete => format!("[DRY RUN] Would delete: {name}"),
		FileOutcome::WouldMove { to } => {
			format!("[DRY RUN] Would move: {} -> {}", name, to.display())
		}
		FileOutcome::Failed { reason } => {
			format!("Error processing {}: {}", path.display(), reason)
		}
	}
}

/// Aggregate processed-count line for an action pass.
pub fn render_processed_count(report: &ActionReport, dry_run: bool) -> String {
	if dry_run {
		format!("[DRY RUN] Would process {} duplicate files", report.processed)
	} else {
		format!("Processed {} duplicate files", report.processed)
	}
}
