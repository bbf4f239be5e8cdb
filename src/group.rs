//! Grouping, exact-size partitioning, and keeper resolution

use std::collections::{BTreeMap, HashMap};

use crate::data::{AudioFile, DuplicateGroup};

/// Split each key group by exact byte size, keeping only size-subgroups
/// with two or more members.
///
/// Surviving subgroups are re-keyed as `"<key> (<size> bytes)"` so they stay
/// distinct in the result map. Two files sharing a normalized key but
/// differing in size are treated as unrelated songs under this mode.
pub fn partition_by_size(
	groups: BTreeMap<String, Vec<AudioFile>>,
) -> BTreeMap<String, Vec<AudioFile>> {
	let mut partitioned = BTreeMap::new();

	for (key, members) in groups {
		let mut by_size: BTreeMap<u64, Vec<AudioFile>> = BTreeMap::new();
		for member in members {
			by_size.entry(member.size).or_default().push(member);
		}
		for (size, same_size) in by_size {
			if same_size.len() > 1 {
				partitioned.insert(format!("{key} ({size} bytes)"), same_size);
			}
		}
	}

	partitioned
}

/// Order a group's members by descending score and designate the keeper.
///
/// `scores` is parallel to `members`. The sort is stable, so equal scores
/// resolve in first-seen order; determinism here is required, not
/// incidental. The returned group retains every member's score.
pub fn resolve(key: String, members: Vec<AudioFile>, scores: Vec<f64>) -> DuplicateGroup {
	debug_assert_eq!(members.len(), scores.len());

	let score_map: HashMap<_, _> = members
		.iter()
		.map(|m| m.path.clone())
		.zip(scores.iter().copied())
		.collect();

	let mut scored: Vec<(AudioFile, f64)> = members.into_iter().zip(scores).collect();
	scored.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

	let mut ordered = scored.into_iter().map(|(m, _)| m);
	let keeper = ordered.next().expect("group has at least one member");
	let duplicates: Vec<AudioFile> = ordered.collect();

	DuplicateGroup {
		key,
		keeper,
		duplicates,
		scores: score_map,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::PathBuf;

	fn file(path: &str, size: u64) -> AudioFile {
		AudioFile::new(PathBuf::from(path), size)
	}

	#[test]
	fn test_resolve_orders_by_descending_score() {
		let members = vec![file("/a.mp3", 1), file("/b.flac", 1), file("/c.wma", 1)];
		let group = resolve("song".to_string(), members, vec![1000.0, 4000.0, 50.0]);

		assert_eq!(group.keeper.path, PathBuf::from("/b.flac"));
		let dupes: Vec<_> = group.duplicates.iter().map(|f| f.path.clone()).collect();
		assert_eq!(dupes, vec![PathBuf::from("/a.mp3"), PathBuf::from("/c.wma")]);
	}

	#[test]
	fn test_resolve_ties_break_by_first_seen() {
		let members = vec![file("/first.mp3", 1), file("/second.mp3", 1)];
		let group = resolve("song".to_string(), members, vec![1000.0, 1000.0]);

		assert_eq!(group.keeper.path, PathBuf::from("/first.mp3"));
		assert_eq!(group.duplicates[0].path, PathBuf::from("/second.mp3"));
	}

	#[test]
	fn test_resolve_keeps_full_score_map() {
		let members = vec![file("/a.mp3", 1), file("/b.flac", 1)];
		let group = resolve("song".to_string(), members, vec![1000.0, 4000.0]);

		assert_eq!(group.scores.len(), 2);
		assert_eq!(group.scores[&PathBuf::from("/a.mp3")], 1000.0);
		assert_eq!(group.scores[&PathBuf::from("/b.flac")], 4000.0);
	}

	#[test]
	fn test_partition_by_size_splits_and_rekeys() {
		let mut groups = BTreeMap::new();
		groups.insert(
			"song".to_string(),
			vec![
				file("/a.mp3", 100),
				file("/b.mp3", 100),
				file("/c.mp3", 200),
			],
		);

		let partitioned = partition_by_size(groups);
		assert_eq!(partitioned.len(), 1);
		let members = partitioned.get("song (100 bytes)").unwrap();
		assert_eq!(members.len(), 2);
	}

	#[test]
	fn test_partition_drops_singleton_sizes() {
		let mut groups = BTreeMap::new();
		groups.insert(
			"song".to_string(),
			vec![file("/a.mp3", 100), file("/b.mp3", 200)],
		);

		let partitioned = partition_by_size(groups);
		assert!(partitioned.is_empty());
	}

	#[test]
	fn test_partition_preserves_member_order_within_size() {
		let mut groups = BTreeMap::new();
		groups.insert(
			"song".to_string(),
			vec![file("/z.mp3", 100), file("/a.mp3", 100)],
		);

		let partitioned = partition_by_size(groups);
		let members = partitioned.get("song (100 bytes)").unwrap();
		assert_eq!(members[0].path, PathBuf::from("/z.mp3"));
		assert_eq!(members[1].path, PathBuf::from("/a.mp3"));
	}
}
