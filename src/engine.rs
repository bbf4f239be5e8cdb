//! Background scan driver
//!
//! Runs [`DuplicateScanner::scan`] on a worker thread and streams progress
//! back over a channel, so interactive frontends can poll without blocking.
//! One [`BackgroundScan`] drives one scan; single-flight across scans and
//! action passes is owned by the caller.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{error, info};

use crate::config::ScanConfig;
use crate::data::ScanResult;
use crate::scanner::{DuplicateScanner, ScanContext, ScanProgress};

/// Events emitted by a running background scan, in order: `Started`, any
/// number of `Progress`, then exactly one of `Completed` or `Failed`.
#[derive(Debug)]
pub enum ScanEvent {
	Started,
	Progress(ScanProgress),
	Completed(Box<ScanResult>),
	Failed(String),
}

pub struct BackgroundScan {
	events: Receiver<ScanEvent>,
	cancellation_token: Arc<AtomicBool>,
	handle: Option<JoinHandle<()>>,
}

impl BackgroundScan {
	/// Spawn a scan of `roots` under `config` on a new thread.
	pub fn spawn(config: ScanConfig, roots: Vec<PathBuf>) -> Self {
		let (tx, rx) = mpsc::channel();
		let cancellation_token = Arc::new(AtomicBool::new(false));
		let token = cancellation_token.clone();

		let handle = std::thread::spawn(move || {
			let _ = tx.send(ScanEvent::Started);
			let progress_tx = tx.clone();
			let ctx = ScanContext::new()
				.with_cancellation_token(token)
				.with_progress_callback(move |p| {
					let _ = progress_tx.send(ScanEvent::Progress(p));
				});

			let scanner = DuplicateScanner::new(config);
			match scanner.scan(&roots, &ctx) {
				Ok(result) => {
					info!(
						"Engine: scan finished, {} duplicate groups",
						result.group_count()
					);
					let _ = tx.send(ScanEvent::Completed(Box::new(result)));
				}
				Err(e) => {
					error!("Engine: scan failed: {}", e);
					let _ = tx.send(ScanEvent::Failed(e.to_string()));
				}
			}
		});

		Self {
			events: rx,
			cancellation_token,
			handle: Some(handle),
		}
	}

	/// Next pending event, if any. Returns `None` both when the scan is
	/// still working and after the final event has been drained.
	pub fn try_next_event(&self) -> Option<ScanEvent> {
		match self.events.try_recv() {
			Ok(event) => Some(event),
			Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
		}
	}

	/// Request cooperative cancellation; the worker notices at its next
	/// check point and emits `Failed`.
	pub fn cancel(&self) {
		self.cancellation_token
			.store(true, std::sync::atomic::Ordering::Relaxed);
	}

	/// Block until the worker exits, draining and returning the final
	/// `Completed`/`Failed` event.
	pub fn join(mut self) -> Option<ScanEvent> {
		if let Some(handle) = self.handle.take() {
			let _ = handle.join();
		}
		let mut last = None;
		while let Ok(event) = self.events.try_recv() {
			if matches!(event, ScanEvent::Completed(_) | ScanEvent::Failed(_)) {
				last = Some(event);
			}
		}
		last
	}
}

impl Drop for BackgroundScan {
	fn drop(&mut self) {
		self.cancel();
		if let Some(handle) = self.handle.take() {
			let _ = handle.join();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	#[test]
	fn test_background_scan_completes() {
		let temp_dir = TempDir::new().unwrap();
		fs::write(temp_dir.path().join("Song.mp3"), vec![0u8; 1024]).unwrap();
		fs::write(temp_dir.path().join("01 - Song.mp3"), vec![0u8; 2048]).unwrap();

		let config = ScanConfig {
			use_tags: false,
			..ScanConfig::default()
		};
		let scan = BackgroundScan::spawn(config, vec![temp_dir.path().to_path_buf()]);

		match scan.join() {
			Some(ScanEvent::Completed(result)) => {
				assert_eq!(result.group_count(), 1);
			}
			other => panic!("expected Completed, got {:?}", other),
		}
	}

	#[test]
	fn test_background_scan_reports_failure() {
		let scan = BackgroundScan::spawn(
			ScanConfig::default(),
			vec![PathBuf::from("/no/such/root")],
		);
		match scan.join() {
			Some(ScanEvent::Failed(message)) => {
				assert!(message.contains("Not a directory"));
			}
			other => panic!("expected Failed, got {:?}", other),
		}
	}

	#[test]
	fn test_cancel_yields_failed_event() {
		let temp_dir = TempDir::new().unwrap();
		fs::write(temp_dir.path().join("Song.mp3"), vec![0u8; 1024]).unwrap();

		let scan = BackgroundScan::spawn(
			ScanConfig::default(),
			vec![temp_dir.path().to_path_buf()],
		);
		scan.cancel();

		// cancellation may land before or after the pipeline finishes
		match scan.join() {
			Some(ScanEvent::Failed(_)) | Some(ScanEvent::Completed(_)) => {}
			other => panic!("expected a terminal event, got {:?}", other),
		}
	}
}
