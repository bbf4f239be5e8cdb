//! Error types for the duplicate detection pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a scan or an action pass.
///
/// `DedupeError` covers only the failures that stop a run outright. Per-file
/// failures during tagging, scoring, or action execution are never
/// represented here: tag failures degrade to filename normalization, and
/// action failures are recorded as [`crate::actions::FileOutcome::Failed`]
/// without aborting the batch.
///
/// ## Error Categories
///
/// ### I/O Errors
/// File system operations that the pipeline cannot work around:
/// - Destination directory creation before a move pass
/// - Permission or disk errors surfaced while setting up a phase
///
/// Per-entry walk and metadata errors during discovery are *not* in this
/// category; they are logged and the entry is skipped.
///
/// ### Invalid Input
/// - [`DedupeError::InvalidDirectory`]: a scan root that is not a directory.
///   Roots are validated up front, so no partial results are built.
/// - [`DedupeError::Config`]: a configuration snapshot that fails
///   [`crate::config::ScanConfig::validate`], such as a move action without
///   a destination.
///
/// ### Cancellation
/// [`DedupeError::Cancelled`] reports that the cancellation token was
/// observed at a check point. The scan or action pass stops with no further
/// filesystem mutation; work already performed is not rolled back.
///
/// ### Settings
/// [`DedupeError::Persist`] wraps [`PersistError`] from the settings file
/// layer when a caller chooses to treat a settings failure as fatal rather
/// than falling back to defaults.
///
/// ## Error Handling Patterns
///
/// ```no_run
/// use refrain::{DedupeError, DuplicateScanner, ScanConfig, ScanContext};
/// use std::path::PathBuf;
///
/// let scanner = DuplicateScanner::new(ScanConfig::default());
/// match scanner.scan(&[PathBuf::from("./music")], &ScanContext::new()) {
///     Ok(result) => println!("{} duplicate groups", result.group_count()),
///     Err(DedupeError::InvalidDirectory { path }) => {
///         eprintln!("not a directory: {}", path.display());
///     }
///     Err(DedupeError::Cancelled) => eprintln!("scan cancelled"),
///     Err(e) => eprintln!("scan failed: {e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum DedupeError {
	/// File system I/O errors during discovery or action execution setup
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// A supplied scan root is not a directory
	#[error("Not a directory: {path}")]
	InvalidDirectory { path: PathBuf },

	/// The cancellation token was set between pipeline phases
	#[error("Scan cancelled")]
	Cancelled,

	/// Configuration validation errors with descriptive messages
	#[error("Configuration error: {0}")]
	Config(String),

	/// Persisted settings errors
	#[error("Settings error: {0}")]
	Persist(#[from] PersistError),
}

/// Errors loading or saving the persisted settings file
#[derive(Debug, Error)]
pub enum PersistError {
	#[error("Settings I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Settings JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Convenience alias for results in the detection pipeline.
pub type DedupeResult<T> = Result<T, DedupeError>;

/// Convenience alias for persisted-settings results.
pub type PersistResult<T> = Result<T, PersistError>;
