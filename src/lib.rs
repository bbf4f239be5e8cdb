//! # Duplicate Music Detection and Resolution
//!
//! Finds duplicate audio files across directory trees, scores each copy by
//! format and size, designates the best copy as the keeper, and deletes or
//! relocates the rest. The detection pipeline is a single synchronous
//! computation over a point-in-time snapshot of the scanned roots.

pub mod actions;
pub mod config;
pub mod data;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod group;
pub mod normalize;
pub mod persist;
pub mod report;
pub mod scanner;
pub mod score;
pub mod tags;

// Re-export main API types
pub use actions::{ActionExecutor, ActionReport, FileOutcome};
pub use config::{Action, FormatPriority, ScanConfig};
pub use data::{AudioFile, DuplicateGroup, ScanResult, TrackTags};
pub use engine::{BackgroundScan, ScanEvent};
pub use error::{DedupeError, DedupeResult};
pub use scanner::{DuplicateScanner, ScanContext, ScanPhase, ScanProgress};
