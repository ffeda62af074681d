//! Constants and default values for rotlog

use std::path::PathBuf;

/// One kilobyte
pub const KBYTE: u64 = 1024;

/// One megabyte, using the 1000 x KBYTE convention of the log size limits
pub const MBYTE: u64 = 1000 * KBYTE;

/// One gigabyte
pub const GBYTE: u64 = 1000 * MBYTE;

/// Smallest size limit for a size-limited file; limits are multiples of this
pub const LOG_MIN_FILE_SIZE: u64 = MBYTE;

/// Largest size limit for a size-limited file
pub const LOG_MAX_FILE_SIZE: u64 = 500 * MBYTE;

/// Space kept free below the size limit so the next record still fits
pub const LOG_HIGH_WATER_MARK: u64 = 2 * KBYTE;

/// Fixed extension of every log file
pub const LOG_FILENAME_EXTENSION: &str = "log";

/// Date part of a daily log file name
pub const LOG_FILENAME_DAILY_FORMAT: &str = "%Y-%m-%d";

/// Date and time part of a timed log file name (no colons)
pub const LOG_FILENAME_TIME_FORMAT: &str = "%Y-%m-%dT%H_%M_%S";

/// Highest volume number; volumes run 1..=9999 and 0 is reserved
pub const LOG_MAX_VOLUME: u32 = 9999;

/// Permission bits for new log files (u=rw, g=rw, o=none)
pub const LOG_FILE_MODE: u32 = 0o660;

/// Rotation cycle of a daily file
pub const DAILY_CYCLE_SECS: u64 = 24 * 60 * 60;

/// Default field separator of the plain text formatter
pub const DEFAULT_FIELD_SEPARATOR: char = '|';

/// Default rotlog home directory name
pub const ROTLOG_DIR: &str = "rotlog";

/// Default log directory name
pub const LOGS_DIR: &str = "logs";

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "rotlog.toml",
    "rotlog.yaml",
    "rotlog.yml",
    "rotlog.json",
];

/// Get the rotlog home directory
pub fn rotlog_home() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(ROTLOG_DIR))
        .unwrap_or_else(|| PathBuf::from(ROTLOG_DIR))
}

/// Get the default logs directory
pub fn logs_dir() -> PathBuf {
    rotlog_home().join(LOGS_DIR)
}

/// Get the default file prefix for an app
pub fn default_prefix(app_name: &str) -> PathBuf {
    logs_dir().join(app_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_constants() {
        assert_eq!(LOG_MIN_FILE_SIZE, 1_024_000);
        assert_eq!(LOG_MAX_FILE_SIZE, 500 * 1_024_000);
        assert_eq!(LOG_HIGH_WATER_MARK, 2048);
    }

    #[test]
    fn test_default_prefix() {
        let prefix = default_prefix("myapp");
        assert!(prefix.ends_with("logs/myapp"));
        assert!(prefix.to_string_lossy().contains(ROTLOG_DIR));
    }
}
