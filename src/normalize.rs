//! Identity normalization: canonical comparison keys for song files

use regex::Regex;
use std::sync::LazyLock;

use crate::data::{AudioFile, TrackTags};

/// Leading track-number prefix like "01 - ", "01. ", or "01_"
static RE_TRACK_PREFIX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\d+[\s.\-_]+").expect("Invalid track prefix regex"));

/// Bracketed quality or edition markers: "(Live ...)", "(Remastered)",
/// mix/version/from parentheticals, and anything in braces or brackets
static RE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)\(Live.*?\)|\(Remaster(?:ed)?.*?\)|\(.*?Mix.*?\)|\(.*?Version.*?\)|\(From.*?\)|\{.*?\}|\[.*?\]",
	)
	.expect("Invalid marker regex")
});

/// Runs of two or more separator characters
static RE_SEPARATOR_RUNS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[-_\s]{2,}").expect("Invalid separator regex"));

/// Normalize a file stem into a comparison key.
///
/// Strips a leading track-number prefix, removes bracketed quality/edition
/// markers, collapses separator runs to a single space, trims, and
/// lowercases. A name that strips down to nothing yields the empty string;
/// such files all collide into one group, which is accepted behavior.
pub fn normalize_name(name: &str) -> String {
	let name = RE_TRACK_PREFIX.replace(name, "");
	let name = RE_MARKERS.replace_all(&name, "");
	let name = RE_SEPARATOR_RUNS.replace_all(&name, " ");
	name.trim().to_lowercase()
}

/// Tag-based key when both artist and title are present and non-empty.
pub fn tag_key(tags: &TrackTags) -> Option<String> {
	if tags.artist.is_empty() || tags.title.is_empty() {
		return None;
	}
	Some(format!(
		"{} - {}",
		tags.artist.to_lowercase(),
		tags.title.to_lowercase()
	))
}

/// The join key used for grouping.
///
/// Prefers the tag-based identity when extracted tags are attached to the
/// file; the tag path skips all filename heuristics. Otherwise falls back to
/// [`normalize_name`] on the file's stem.
pub fn normalization_key(file: &AudioFile) -> String {
	if let Some(tags) = &file.tags {
		if let Some(key) = tag_key(tags) {
			return key;
		}
	}
	normalize_name(file.stem())
}
