//! Capabilities a log destination exposes to the log manager

use std::path::PathBuf;

use crate::error::Result;
use crate::policy::RotationPolicy;

/// A destination for formatted log records
pub trait LogSink: Send + Sync {
    /// Write one record, returning the number of bytes stored
    fn write(&self, record: &[u8]) -> Result<usize>;

    /// Release the destination; calling it again must not fail
    fn close(&self) -> Result<()>;
}

/// A file backed sink that rotates according to a policy
pub trait FileWriter: LogSink {
    fn policy(&self) -> RotationPolicy;

    /// Path of the file currently open, `None` once closed
    fn filename(&self) -> Option<PathBuf>;

    /// Check whether the file is due for rotation
    fn rotate_check(&self) -> bool;

    /// Switch to the next file, returning `true` if the file changed
    fn rotate(&self) -> Result<bool>;
}
