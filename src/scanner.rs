//! Main API for duplicate scanning
//!
//! [`DuplicateScanner::scan`] is a single synchronous entry point over a
//! point-in-time snapshot of the scanned roots. It mutates no shared state
//! and is callable from any execution context; callers that want a
//! background scan wrap it in [`crate::engine::BackgroundScan`]. No scan may
//! run concurrently with another scan or with an action pass against the
//! same result set; that single-flight guard is owned by the caller.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::ScanConfig;
use crate::data::{AudioFile, ScanResult, ScanStats};
use crate::discovery;
use crate::error::{DedupeError, DedupeResult};
use crate::group;
use crate::normalize;
use crate::score::quality_score;
use crate::tags::{select_source, LoftyTagSource, TagSource};

/// Pipeline phase a progress notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
	Discovery,
	Grouping,
	Scoring,
}

/// Coarse progress notification emitted through the scan context.
#[derive(Debug, Clone)]
pub struct ScanProgress {
	pub phase: ScanPhase,
	pub total_items: usize,
	pub processed_items: usize,
	pub current_item: Option<String>,
}

impl ScanProgress {
	pub fn new(phase: ScanPhase, total_items: usize) -> Self {
		Self {
			phase,
			total_items,
			processed_items: 0,
			current_item: None,
		}
	}

	pub fn update(&mut self, processed: usize, current_item: Option<String>) {
		self.processed_items = processed;
		self.current_item = current_item;
	}

	pub fn progress_ratio(&self) -> f64 {
		if self.total_items == 0 {
			1.0
		} else {
			self.processed_items as f64 / self.total_items as f64
		}
	}
}

/// Execution context for one scan: progress reporting and cancellation.
pub struct ScanContext {
	pub progress_callback: Option<Box<dyn Fn(ScanProgress) + Send + Sync>>,
	pub cancellation_token: Arc<AtomicBool>,
}

impl Default for ScanContext {
	fn default() -> Self {
		Self {
			progress_callback: None,
			cancellation_token: Arc::new(AtomicBool::new(false)),
		}
	}
}

impl ScanContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_progress_callback<F>(mut self, callback: F) -> Self
	where
		F: Fn(ScanProgress) + Send + Sync + 'static,
	{
		self.progress_callback = Some(Box::new(callback));
		self
	}

	pub fn with_cancellation_token(mut self, token: Arc<AtomicBool>) -> Self {
		self.cancellation_token = token;
		self
	}

	pub fn report_progress(&self, progress: ScanProgress) {
		if let Some(ref callback) = self.progress_callback {
			callback(progress);
		}
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancellation_token.load(Ordering::Relaxed)
	}

	pub fn cancel(&self) {
		self.cancellation_token.store(true, Ordering::Relaxed);
	}

	/// Cooperative cancellation check, observed between phases and
	/// periodically inside them.
	pub fn check_cancelled(&self) -> DedupeResult<()> {
		if self.is_cancelled() {
			Err(DedupeError::Cancelled)
		} else {
			Ok(())
		}
	}
}

/// High-level API for finding duplicate songs under a set of roots.
///
/// `DuplicateScanner` owns an immutable [`ScanConfig`] snapshot and the tag
/// reading strategy, and exposes one operation: [`DuplicateScanner::scan`].
///
/// ## Pipeline
///
/// A scan runs these phases in order, reporting progress per phase:
/// 1. **Discovery** — walk every root, collecting files whose extension is
///    in the format priority table
/// 2. **Grouping** — attach tags (when enabled), derive each file's
///    normalization key, and bucket by key in discovery order
/// 3. **Partitioning** — drop singleton buckets; optionally sub-partition
///    by exact byte size
/// 4. **Scoring & resolution** — score every member, order each group by
///    descending score, and designate the keeper
///
/// ## Example
///
/// ```no_run
/// use refrain::{DuplicateScanner, ScanConfig, ScanContext};
/// use std::path::PathBuf;
///
/// # fn main() -> refrain::DedupeResult<()> {
/// let scanner = DuplicateScanner::new(ScanConfig::default());
/// let result = scanner.scan(&[PathBuf::from("./music")], &ScanContext::new())?;
/// for group in result.groups.values() {
///     println!("{}: keep {}", group.key, group.keeper.file_name());
/// }
/// # Ok(())
/// # }
/// ```
pub struct DuplicateScanner {
	config: ScanConfig,
	/// Identity source: `use_tags` selects tag-based or null grouping keys.
	tag_source: Arc<dyn TagSource>,
	/// Bitrate probe. Independent of the identity preference: disabling tag
	/// grouping does not degrade mp3 quality scores.
	bitrate_source: Arc<dyn TagSource>,
}

impl DuplicateScanner {
	pub fn new(config: ScanConfig) -> Self {
		let tag_source: Arc<dyn TagSource> = Arc::from(select_source(config.use_tags));
		Self {
			config,
			tag_source,
			bitrate_source: Arc::new(LoftyTagSource),
		}
	}

	/// Replace both the identity and bitrate source, mainly for tests and
	/// embedders.
	pub fn with_tag_source(config: ScanConfig, tag_source: Arc<dyn TagSource>) -> Self {
		Self {
			config,
			tag_source: tag_source.clone(),
			bitrate_source: tag_source,
		}
	}

	pub fn config(&self) -> &ScanConfig {
		&self.config
	}

	/// Run the full pipeline: discovery, normalization and grouping,
	/// optional exact-size partitioning, scoring, and keeper resolution.
	pub fn scan(&self, roots: &[PathBuf], ctx: &ScanContext) -> DedupeResult<ScanResult> {
		let started = Utc::now();
		let files = discovery::discover(roots, &self.config.format_priority, ctx)?;
		let files_discovered = files.len();
		info!("Scanner: found {} music files to analyze", files_discovered);

		ctx.check_cancelled()?;
		let buckets = self.group_files(files, ctx)?;

		let mut groups: BTreeMap<String, Vec<AudioFile>> = buckets
			.into_iter()
			.filter(|(_, members)| members.len() > 1)
			.collect();
		if self.config.exact_size_match {
			groups = group::partition_by_size(groups);
		}
		info!("Scanner: {} songs with potential duplicates", groups.len());

		ctx.check_cancelled()?;
		let resolved = self.score_and_resolve(groups, ctx)?;

		let stats = ScanStats {
			started,
			files_discovered,
			groups: resolved.len(),
			duplicates: resolved.values().map(|g| g.duplicates.len()).sum(),
		};
		Ok(ScanResult {
			groups: resolved,
			stats,
		})
	}

	/// Attach tags (when available) and bucket files by normalization key.
	/// Bucket membership keeps discovery order, which later serves as the
	/// tie-break order for equal scores.
	fn group_files(
		&self,
		files: Vec<AudioFile>,
		ctx: &ScanContext,
	) -> DedupeResult<HashMap<String, Vec<AudioFile>>> {
		let mut progress = ScanProgress::new(ScanPhase::Grouping, files.len());
		let mut buckets: HashMap<String, Vec<AudioFile>> = HashMap::new();

		for (i, mut file) in files.into_iter().enumerate() {
			if i % 64 == 0 {
				ctx.check_cancelled()?;
			}
			file.tags = self.tag_source.read_tags(&file.path);
			let key = normalize::normalization_key(&file);
			debug!("Scanner: {} -> key {:?}", file.path.display(), key);
			progress.update(i + 1, Some(file.path.to_string_lossy().to_string()));
			ctx.report_progress(progress.clone());
			buckets.entry(key).or_default().push(file);
		}

		Ok(buckets)
	}

	/// Score every member and resolve each group to keeper + duplicates.
	fn score_and_resolve(
		&self,
		groups: BTreeMap<String, Vec<AudioFile>>,
		ctx: &ScanContext,
	) -> DedupeResult<BTreeMap<String, crate::data::DuplicateGroup>> {
		let mut progress = ScanProgress::new(ScanPhase::Scoring, groups.len());
		let mut resolved = BTreeMap::new();

		for (i, (key, mut members)) in groups.into_iter().enumerate() {
			ctx.check_cancelled()?;
			for member in &mut members {
				if member.extension == ".mp3" {
					member.bitrate_kbps = self.bitrate_source.bitrate_kbps(&member.path);
				}
			}
			let scores: Vec<f64> = members
				.iter()
				.map(|m| quality_score(m, &self.config.format_priority))
				.collect();
			let group = group::resolve(key.clone(), members, scores);
			progress.update(i + 1, Some(key.clone()));
			ctx.report_progress(progress.clone());
			resolved.insert(key, group);
		}

		Ok(resolved)
	}
}
