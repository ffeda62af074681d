//! Diagnostic events raised by rotating files and schedulers
//!
//! The rotation path does not log on its own. Each file and scheduler is
//! handed a [`Diagnostics`] sink at construction and reports what happens
//! through it. [`TracingDiagnostics`] is the default and turns every event
//! into a structured `tracing` record.

use rotlog_core::RotationPolicy;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Something worth reporting about a file stream
#[derive(Debug, Clone, PartialEq)]
pub enum FileEvent {
    Opened {
        policy: RotationPolicy,
        path: PathBuf,
        timer: Option<Duration>,
    },
    RotateStarted {
        policy: RotationPolicy,
        path: PathBuf,
    },
    Rotated {
        policy: RotationPolicy,
        path: PathBuf,
        timer: Option<Duration>,
    },
    Closed {
        path: PathBuf,
    },
    WriteFailed {
        path: Option<PathBuf>,
        error: String,
    },
    RotateFailed {
        path: Option<PathBuf>,
        error: String,
    },
    /// The size probe could not stat the file; rotation is assumed due
    StatFailed {
        path: PathBuf,
        error: String,
    },
    CloseFailed {
        path: PathBuf,
        error: String,
    },
    /// A timer callback returned an error or panicked
    CallbackFailed {
        error: String,
    },
}

/// Receiver for [`FileEvent`]s
pub trait Diagnostics: Send + Sync {
    fn record(&self, event: FileEvent);
}

/// Reports file events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: FileEvent) {
        match event {
            FileEvent::Opened {
                policy,
                path,
                timer,
            } => info!(
                action = "start",
                policy = %policy,
                file = %path.display(),
                timer = ?timer.unwrap_or_default(),
                size_limit = policy.size_limit().unwrap_or_default(),
                "log file opened"
            ),
            FileEvent::RotateStarted { policy, path } => debug!(
                action = "rotate_start",
                policy = %policy,
                file = %path.display(),
                "rotating log file"
            ),
            FileEvent::Rotated {
                policy,
                path,
                timer,
            } => info!(
                action = "rotate_end",
                policy = %policy,
                file = %path.display(),
                timer = ?timer.unwrap_or_default(),
                "log file rotated"
            ),
            FileEvent::Closed { path } => {
                debug!(action = "close", file = %path.display(), "log file closed")
            }
            FileEvent::WriteFailed { path, error } => warn!(
                action = "write",
                file = %display_opt(&path),
                "Failed to write log record: {}",
                error
            ),
            FileEvent::RotateFailed { path, error } => warn!(
                action = "rotate",
                file = %display_opt(&path),
                "Failed to rotate log file: {}",
                error
            ),
            FileEvent::StatFailed { path, error } => warn!(
                action = "rotate_check",
                file = %path.display(),
                "Failed to get log file size, assuming rotation is due: {}",
                error
            ),
            FileEvent::CloseFailed { path, error } => warn!(
                action = "close",
                file = %path.display(),
                "Failed to close log file: {}",
                error
            ),
            FileEvent::CallbackFailed { error } => {
                warn!(action = "timer", "Rotation timer callback failed: {}", error)
            }
        }
    }
}

fn display_opt(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
