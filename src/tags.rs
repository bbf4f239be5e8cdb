//! Best-effort embedded metadata extraction
//!
//! Reads artist/title tags and mp3 bitrate via lofty. Every failure mode
//! (unreadable file, unparseable container, missing fields) collapses to
//! "no tags"; the caller then falls back to filename normalization for that
//! file only. Tag support is a strategy object resolved once at scanner
//! construction, never a per-file capability branch.

use std::path::Path;

use lofty::prelude::*;
use lofty::probe::Probe;
use tracing::debug;

use crate::data::{extension_of, TrackTags};

/// Extensions for which embedded tags are ever consulted.
pub const TAGGED_EXTENSIONS: &[&str] = &[".mp3", ".flac", ".m4a"];

/// Source of embedded metadata, selected once per scan.
pub trait TagSource: Send + Sync {
	/// Artist/title pair, or `None` for any failure or unsupported format.
	fn read_tags(&self, path: &Path) -> Option<TrackTags>;

	/// Measured audio bitrate in kbps, or `None` when unreadable.
	fn bitrate_kbps(&self, path: &Path) -> Option<u32>;
}

/// Lofty-backed reader for mp3/flac/m4a.
pub struct LoftyTagSource;

/// Reader used when tag matching is disabled; never produces tags.
pub struct NullTagSource;

/// Select the concrete strategy for a scan.
pub fn select_source(use_tags: bool) -> Box<dyn TagSource> {
	if use_tags {
		Box::new(LoftyTagSource)
	} else {
		Box::new(NullTagSource)
	}
}

impl TagSource for LoftyTagSource {
	fn read_tags(&self, path: &Path) -> Option<TrackTags> {
		let extension = extension_of(path);
		if !TAGGED_EXTENSIONS.contains(&extension.as_str()) {
			return None;
		}

		let tagged_file = match Probe::open(path).and_then(|p| p.read()) {
			Ok(file) => file,
			Err(e) => {
				debug!("Tag read failed for {}: {}", path.display(), e);
				return None;
			}
		};

		let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag())?;
		let artist = tag.artist()?.to_string();
		let title = tag.title()?.to_string();
		if artist.is_empty() || title.is_empty() {
			return None;
		}

		Some(TrackTags { artist, title })
	}

	fn bitrate_kbps(&self, path: &Path) -> Option<u32> {
		let tagged_file = match Probe::open(path).and_then(|p| p.read()) {
			Ok(file) => file,
			Err(e) => {
				debug!("Bitrate probe failed for {}: {}", path.display(), e);
				return None;
			}
		};
		tagged_file.properties().audio_bitrate()
	}
}

impl TagSource for NullTagSource {
	fn read_tags(&self, _path: &Path) -> Option<TrackTags> {
		None
	}

	fn bitrate_kbps(&self, _path: &Path) -> Option<u32> {
		None
	}
}
