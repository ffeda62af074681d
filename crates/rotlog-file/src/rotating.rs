//! Log file with rotation support
//!
//! A [`RotatingFile`] owns exactly one open file and switches to a new one
//! according to its [`RotationPolicy`]:
//!
//! - `None`: `prefix.0001.log`, never rotates on its own
//! - `FileSize`: `prefix.0001.log`, `prefix.0002.log`, ... rotating before the
//!   size limit is reached
//! - `Daily`: `prefix.2024-03-09.log`, rotated at midnight by a [`Scheduler`]
//! - `TimeLimit`: `prefix.2024-03-09T07_05_02.log`, rotated every cycle
//!
//! Writes, rotations and close are serialized by one lock. For size-limited
//! files the size check runs after the write has released the lock, so a
//! concurrent writer can append one more record before the rotation happens.

use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use rotlog_core::{
    Error, FileWriter, LogSink, Result, RotationPolicy, LOG_FILE_MODE, LOG_HIGH_WATER_MARK,
};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::diagnostics::{Diagnostics, FileEvent, TracingDiagnostics};
use crate::naming::{
    clamp_size_limit, daily_filename, next_volume, normalize_record, timed_filename,
    volume_filename,
};
use crate::scheduler::{now_in, Scheduler};

/// Construction options shared by every policy
#[derive(Clone)]
pub struct FileOptions {
    /// Receiver for open/rotate/failure events
    pub diagnostics: Arc<dyn Diagnostics>,
    /// Zone for dated file names and timers; when `None` the local offset
    /// is looked up at each use
    pub zone: Option<FixedOffset>,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            diagnostics: Arc::new(TracingDiagnostics),
            zone: None,
        }
    }
}

impl FileOptions {
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = Some(zone);
        self
    }
}

/// A log file stream that rotates according to a policy
pub struct RotatingFile {
    shared: Arc<Shared>,
}

struct Shared {
    prefix: String,
    policy: RotationPolicy,
    zone: Option<FixedOffset>,
    diagnostics: Arc<dyn Diagnostics>,
    state: Mutex<FileState>,
}

#[derive(Default)]
struct FileState {
    path: Option<PathBuf>,
    handle: Option<File>,
    volume: u32,
    scheduler: Option<Scheduler>,
}

impl RotatingFile {
    /// Open a file that never rotates on its own
    pub fn unrotated(prefix: impl AsRef<Path>) -> Result<Self> {
        Self::open(prefix, RotationPolicy::None, FileOptions::default())
    }

    /// Open a file that moves to a new volume before `size` bytes
    ///
    /// The limit is adjusted by [`clamp_size_limit`].
    pub fn size_limited(prefix: impl AsRef<Path>, size: u64) -> Result<Self> {
        Self::open(prefix, RotationPolicy::FileSize(size), FileOptions::default())
    }

    /// Open a file that rotates at midnight
    pub fn daily(prefix: impl AsRef<Path>) -> Result<Self> {
        Self::open(prefix, RotationPolicy::Daily, FileOptions::default())
    }

    /// Open a file that rotates every `cycle`
    pub fn timed(prefix: impl AsRef<Path>, cycle: Duration) -> Result<Self> {
        Self::open(prefix, RotationPolicy::TimeLimit(cycle), FileOptions::default())
    }

    /// Open a file for any built-in policy
    pub fn open(prefix: impl AsRef<Path>, policy: RotationPolicy, options: FileOptions) -> Result<Self> {
        let prefix = prefix.as_ref().to_string_lossy().into_owned();
        if prefix.is_empty() {
            return Err(Error::invalid("log file prefix must not be empty"));
        }

        let policy = match policy {
            RotationPolicy::FileSize(size) => RotationPolicy::FileSize(clamp_size_limit(size)),
            RotationPolicy::TimeLimit(cycle) if cycle.is_zero() => {
                return Err(Error::invalid("rotation cycle must be greater than zero"));
            }
            RotationPolicy::Custom(_) => {
                return Err(Error::invalid(format!(
                    "{} needs a dedicated writer",
                    policy
                )));
            }
            other => other,
        };

        let shared = Arc::new(Shared {
            prefix,
            policy,
            zone: options.zone,
            diagnostics: options.diagnostics,
            state: Mutex::new(FileState::default()),
        });

        let path = {
            let mut state = shared.state.lock();
            let path = shared.next_filename(&mut state);
            state.handle = Some(open_log_file(&path)?);
            state.path = Some(path.clone());
            path
        };
        let timer = Shared::start_scheduler(&shared)?;

        shared.diagnostics.record(FileEvent::Opened {
            policy,
            path,
            timer,
        });
        Ok(Self { shared })
    }

    /// Append one record
    ///
    /// Newlines inside the payload are replaced with `"; "` and a single
    /// newline is appended. Returns the number of bytes written.
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        let written = match self.shared.append(payload) {
            Ok(n) => n,
            Err(e) => {
                self.shared.diagnostics.record(FileEvent::WriteFailed {
                    path: self.filename(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        if self.shared.policy.is_size_limited() && self.shared.rotate_check() {
            // Failures are reported through diagnostics; the record is stored
            let _ = self.shared.rotate();
        }
        Ok(written)
    }

    /// Check whether the file is due for rotation
    pub fn rotate_check(&self) -> bool {
        self.shared.rotate_check()
    }

    /// Close the current file and continue in the next one
    pub fn rotate(&self) -> Result<bool> {
        self.shared.rotate()
    }

    /// Stop the scheduler and close the file; closing twice is a no-op
    pub fn close(&self) -> Result<()> {
        self.shared.close()
    }

    pub fn filename(&self) -> Option<PathBuf> {
        self.shared.state.lock().path.clone()
    }

    pub fn policy(&self) -> RotationPolicy {
        self.shared.policy
    }

    pub fn prefix(&self) -> &str {
        &self.shared.prefix
    }

    pub fn is_open(&self) -> bool {
        self.shared.state.lock().handle.is_some()
    }

    /// Current volume number for unrotated and size-limited files
    pub fn volume(&self) -> Option<u32> {
        match self.shared.policy {
            RotationPolicy::None | RotationPolicy::FileSize(_) => {
                Some(self.shared.state.lock().volume)
            }
            _ => None,
        }
    }

    /// When the scheduler is next expected to rotate the file
    pub fn trigger_time(&self) -> Option<DateTime<FixedOffset>> {
        self.shared
            .state
            .lock()
            .scheduler
            .as_ref()
            .map(Scheduler::trigger_time)
    }
}

impl Shared {
    fn start_scheduler(shared: &Arc<Self>) -> Result<Option<Duration>> {
        let weak = Arc::downgrade(shared);
        let callback = move || match weak.upgrade() {
            Some(shared) => shared.rotate().map(|_| ()),
            None => Ok(()),
        };
        let diagnostics = Arc::clone(&shared.diagnostics);

        let scheduler = match shared.policy {
            RotationPolicy::Daily => Some(Scheduler::daily_with(
                shared.zone,
                diagnostics,
                callback,
            )?),
            RotationPolicy::TimeLimit(cycle) => Some(Scheduler::start_with(
                cycle,
                shared.zone,
                diagnostics,
                callback,
            )?),
            _ => None,
        };

        let timer = scheduler.as_ref().map(Scheduler::duration);
        shared.state.lock().scheduler = scheduler;
        Ok(timer)
    }

    /// Name of the next file for this policy; the caller holds the lock
    fn next_filename(&self, state: &mut FileState) -> PathBuf {
        match self.policy {
            RotationPolicy::Daily => daily_filename(&self.prefix, now_in(self.zone)),
            RotationPolicy::TimeLimit(_) => timed_filename(&self.prefix, now_in(self.zone)),
            RotationPolicy::None | RotationPolicy::FileSize(_) | RotationPolicy::Custom(_) => {
                state.volume = next_volume(&self.prefix);
                volume_filename(&self.prefix, state.volume)
            }
        }
    }

    fn append(&self, payload: &[u8]) -> Result<usize> {
        let record = normalize_record(payload);
        let mut state = self.state.lock();
        let FileState { path, handle, .. } = &mut *state;

        let (Some(path), Some(file)) = (path.as_ref(), handle.as_mut()) else {
            return Err(Error::Closed(self.prefix.clone()));
        };
        append_record(file, &record).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        Ok(record.len())
    }

    fn rotate_check(&self) -> bool {
        let state = self.state.lock();
        let Some(path) = state.path.as_ref() else {
            return false;
        };

        match self.policy {
            RotationPolicy::FileSize(limit) => match fs::metadata(path) {
                Ok(meta) => meta.len() + LOG_HIGH_WATER_MARK > limit,
                Err(e) => {
                    self.diagnostics.record(FileEvent::StatFailed {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                    true
                }
            },
            RotationPolicy::Daily | RotationPolicy::TimeLimit(_) => state
                .scheduler
                .as_ref()
                .map(|s| s.is_due(now_in(self.zone)))
                .unwrap_or(false),
            RotationPolicy::None | RotationPolicy::Custom(_) => false,
        }
    }

    fn rotate(&self) -> Result<bool> {
        let mut state = self.state.lock();
        let Some(current) = state.path.clone() else {
            return Err(Error::Closed(self.prefix.clone()));
        };
        self.diagnostics.record(FileEvent::RotateStarted {
            policy: self.policy,
            path: current.clone(),
        });

        let next = self.next_filename(&mut state);
        let opened = open_log_file(&next);

        // Re-armed even when the open failed so the next cycle tries again
        if let Some(Err(e)) = state.scheduler.as_ref().map(Scheduler::reset) {
            self.diagnostics.record(FileEvent::RotateFailed {
                path: Some(current.clone()),
                error: e.to_string(),
            });
        }
        let timer = state.scheduler.as_ref().map(Scheduler::duration);

        match opened {
            Ok(file) => {
                // The previous file is closed when its handle drops here
                drop(state.handle.replace(file));
                state.path = Some(next.clone());
                self.diagnostics.record(FileEvent::Rotated {
                    policy: self.policy,
                    path: next,
                    timer,
                });
                Ok(true)
            }
            Err(e) => {
                self.diagnostics.record(FileEvent::RotateFailed {
                    path: Some(current),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(scheduler) = state.scheduler.take() {
            scheduler.stop();
        }
        let Some(file) = state.handle.take() else {
            return Ok(());
        };
        let path = state.path.take().unwrap_or_default();

        if let Err(e) = file.sync_all() {
            self.diagnostics.record(FileEvent::CloseFailed {
                path,
                error: e.to_string(),
            });
            return Err(e.into());
        }
        self.diagnostics.record(FileEvent::Closed { path });
        Ok(())
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        let _ = self.shared.close();
    }
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("prefix", &self.shared.prefix)
            .field("policy", &self.shared.policy)
            .field("path", &self.filename())
            .finish()
    }
}

impl LogSink for RotatingFile {
    fn write(&self, record: &[u8]) -> Result<usize> {
        RotatingFile::write(self, record)
    }

    fn close(&self) -> Result<()> {
        RotatingFile::close(self)
    }
}

impl FileWriter for RotatingFile {
    fn policy(&self) -> RotationPolicy {
        RotatingFile::policy(self)
    }

    fn filename(&self) -> Option<PathBuf> {
        RotatingFile::filename(self)
    }

    fn rotate_check(&self) -> bool {
        RotatingFile::rotate_check(self)
    }

    fn rotate(&self) -> Result<bool> {
        RotatingFile::rotate(self)
    }
}

/// Append one framed record, cutting the file back to its previous length
/// if the write fails part way
fn append_record(file: &mut File, record: &[u8]) -> std::io::Result<()> {
    let start = file.metadata()?.len();
    if let Err(e) = file.write_all(record) {
        // Best effort; the write error is what the caller needs to see
        let _ = file.set_len(start);
        return Err(e);
    }
    Ok(())
}

/// Open (or create) a log file for appending
fn open_log_file(path: &Path) -> Result<File> {
    let open_error = |source| Error::Open {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(open_error)?;
        }
    }

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(LOG_FILE_MODE);
    }
    options.open(path).map_err(open_error)
}
