//! Quality scoring for a single file within one scan

use crate::config::FormatPriority;
use crate::data::AudioFile;

/// Compute the comparable quality value for one file.
///
/// `weight * 1000 + size in KiB`, plus the measured bitrate in kbps for mp3
/// files when tag reading is available. The format weight is the dominant
/// term; the size term is an unscaled tiebreaker, so a sufficiently large
/// file in a lower-weighted format (a lossy file past ~1000 KiB per weight
/// tier) can still outrank a smaller file one tier up. That is the tool's
/// historical behavior and is pinned by tests rather than corrected.
pub fn quality_score(file: &AudioFile, priority: &FormatPriority) -> f64 {
	let mut score = priority.weight(&file.extension) as f64 * 1000.0;
	score += file.size_kib();
	if let Some(kbps) = file.bitrate_kbps {
		score += kbps as f64;
	}
	score
}
