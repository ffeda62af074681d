//! Log file names, volume numbers and record framing
//!
//! Every file is named `<prefix>.<part>.log`. Unrotated and size-limited
//! files use a four digit volume number as the part, daily files the date
//! and timed files the date and time.

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use rotlog_core::{
    LOG_FILENAME_DAILY_FORMAT, LOG_FILENAME_EXTENSION, LOG_FILENAME_TIME_FORMAT,
    LOG_MAX_FILE_SIZE, LOG_MAX_VOLUME, LOG_MIN_FILE_SIZE,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

static VOLUME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.([0-9]+)\.log$").expect("Invalid volume regex"));

/// Join a prefix and name parts as `prefix.part.part.log`
pub(crate) fn gen_filename(prefix: &str, parts: &[&str]) -> PathBuf {
    let mut name = String::from(prefix);
    for part in parts {
        name.push('.');
        name.push_str(part);
    }
    name.push('.');
    name.push_str(LOG_FILENAME_EXTENSION);
    PathBuf::from(name)
}

pub(crate) fn volume_filename(prefix: &str, volume: u32) -> PathBuf {
    gen_filename(prefix, &[&format!("{:04}", volume)])
}

pub(crate) fn daily_filename(prefix: &str, now: DateTime<FixedOffset>) -> PathBuf {
    gen_filename(prefix, &[&now.format(LOG_FILENAME_DAILY_FORMAT).to_string()])
}

pub(crate) fn timed_filename(prefix: &str, now: DateTime<FixedOffset>) -> PathBuf {
    gen_filename(prefix, &[&now.format(LOG_FILENAME_TIME_FORMAT).to_string()])
}

/// Work out the volume number for the next file of `prefix`
///
/// Looks at the existing `prefix.*.log` volumes and continues after the most
/// recently modified one. Returns 1 when there are none or the directory
/// cannot be listed.
pub(crate) fn next_volume(prefix: &str) -> u32 {
    let pattern = gen_filename(&glob::Pattern::escape(prefix), &["*"]);
    let Ok(paths) = glob::glob(&pattern.to_string_lossy()) else {
        return 1;
    };

    let newest: Option<(SystemTime, u64)> = paths
        .filter_map(|entry| entry.ok())
        .filter_map(|path| {
            let volume = volume_token(&path)?;
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((modified, volume))
        })
        .max();

    newest.map(|(_, volume)| successor(volume)).unwrap_or(1)
}

fn volume_token(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    VOLUME_REGEX.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Volume after `volume`, wrapping from 9999 back to 1
fn successor(volume: u64) -> u32 {
    let next = (volume % u64::from(LOG_MAX_VOLUME)) as u32 + 1;
    if next == 0 {
        1
    } else {
        next
    }
}

/// Effective size limit for a requested limit
///
/// Limits are rounded up to a multiple of [`LOG_MIN_FILE_SIZE`]. Requests at
/// or below the minimum, and requests above [`LOG_MAX_FILE_SIZE`], fall back
/// to the minimum so a bad limit never means unbounded growth.
pub fn clamp_size_limit(requested: u64) -> u64 {
    if requested <= LOG_MIN_FILE_SIZE || requested > LOG_MAX_FILE_SIZE {
        return LOG_MIN_FILE_SIZE;
    }
    match requested % LOG_MIN_FILE_SIZE {
        0 => requested,
        _ => (requested / LOG_MIN_FILE_SIZE + 1) * LOG_MIN_FILE_SIZE,
    }
}

/// Frame a payload as one record: newlines become `"; "`, one trailing newline
pub fn normalize_record(payload: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(payload.len() + 1);
    for &byte in payload {
        if byte == b'\n' {
            record.extend_from_slice(b"; ");
        } else {
            record.push(byte);
        }
    }
    record.push(b'\n');
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rotlog_core::{KBYTE, MBYTE};
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(path: &Path, modified: SystemTime) {
        let file = fs::File::create(path).unwrap();
        file.set_modified(modified).unwrap();
    }

    fn prefix_in(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_gen_filename() {
        assert_eq!(gen_filename("/var/log/app", &["0001"]), PathBuf::from("/var/log/app.0001.log"));
        assert_eq!(gen_filename("app", &["a", "b"]), PathBuf::from("app.a.b.log"));
        assert_eq!(gen_filename("app", &[]), PathBuf::from("app.log"));
    }

    #[test]
    fn test_volume_filename_is_zero_padded() {
        assert_eq!(volume_filename("app", 1), PathBuf::from("app.0001.log"));
        assert_eq!(volume_filename("app", 9999), PathBuf::from("app.9999.log"));
    }

    #[test]
    fn test_dated_filenames() {
        let zone = FixedOffset::east_opt(0).unwrap();
        let now = zone.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
        assert_eq!(daily_filename("app", now), PathBuf::from("app.2024-03-09.log"));
        assert_eq!(
            timed_filename("app", now),
            PathBuf::from("app.2024-03-09T07_05_02.log")
        );
    }

    #[test]
    fn test_next_volume_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_volume(&prefix_in(&dir, "app")), 1);
    }

    #[test]
    fn test_next_volume_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_volume(&prefix_in(&dir, "missing/app")), 1);
    }

    #[test]
    fn test_next_volume_follows_most_recent_file() {
        let dir = TempDir::new().unwrap();
        let prefix = prefix_in(&dir, "app");
        let base = SystemTime::now() - Duration::from_secs(3600);

        touch(&volume_filename(&prefix, 1), base + Duration::from_secs(30));
        touch(&volume_filename(&prefix, 2), base);
        touch(&volume_filename(&prefix, 3), base + Duration::from_secs(10));

        // 0001 was written last, so the sequence continues at 0002
        assert_eq!(next_volume(&prefix), 2);
    }

    #[test]
    fn test_next_volume_wraps() {
        let dir = TempDir::new().unwrap();
        let prefix = prefix_in(&dir, "app");
        let base = SystemTime::now() - Duration::from_secs(3600);

        touch(&volume_filename(&prefix, 9998), base);
        touch(&volume_filename(&prefix, 9999), base + Duration::from_secs(1));

        assert_eq!(next_volume(&prefix), 1);
    }

    #[test]
    fn test_next_volume_ignores_dated_files() {
        let dir = TempDir::new().unwrap();
        let prefix = prefix_in(&dir, "app");
        let base = SystemTime::now() - Duration::from_secs(3600);

        touch(&volume_filename(&prefix, 4), base);
        touch(&gen_filename(&prefix, &["2024-03-09"]), base + Duration::from_secs(5));
        touch(&gen_filename(&prefix, &["2024-03-09T07_05_02"]), base + Duration::from_secs(9));
        touch(&gen_filename(&prefix, &["notes"]), base + Duration::from_secs(9));

        assert_eq!(next_volume(&prefix), 5);
    }

    #[test]
    fn test_next_volume_escapes_prefix() {
        let dir = TempDir::new().unwrap();
        let prefix = prefix_in(&dir, "[app]");
        touch(&volume_filename(&prefix, 7), SystemTime::now());

        assert_eq!(next_volume(&prefix), 8);
    }

    #[test]
    fn test_successor_never_zero() {
        assert_eq!(successor(0), 1);
        assert_eq!(successor(1), 2);
        assert_eq!(successor(9998), 9999);
        assert_eq!(successor(9999), 1);
        assert_eq!(successor(19998), 1);
    }

    #[test]
    fn test_clamp_small_requests_use_minimum() {
        assert_eq!(clamp_size_limit(0), LOG_MIN_FILE_SIZE);
        assert_eq!(clamp_size_limit(3 * KBYTE), LOG_MIN_FILE_SIZE);
        assert_eq!(clamp_size_limit(LOG_MIN_FILE_SIZE), LOG_MIN_FILE_SIZE);
    }

    #[test]
    fn test_clamp_rounds_up_to_unit() {
        assert_eq!(clamp_size_limit(MBYTE + 1), 2 * MBYTE);
        assert_eq!(clamp_size_limit(5 * MBYTE / 2), 3 * MBYTE);
        assert_eq!(clamp_size_limit(7 * MBYTE), 7 * MBYTE);
        assert_eq!(clamp_size_limit(LOG_MAX_FILE_SIZE), LOG_MAX_FILE_SIZE);
    }

    #[test]
    fn test_clamp_above_ceiling_falls_back_to_minimum() {
        // Oversized requests shrink to the minimum, not to the ceiling
        assert_eq!(clamp_size_limit(LOG_MAX_FILE_SIZE + 1), LOG_MIN_FILE_SIZE);
        assert_eq!(clamp_size_limit(u64::MAX), LOG_MIN_FILE_SIZE);
    }

    #[test]
    fn test_normalize_record() {
        assert_eq!(normalize_record(b"line one\nline two"), b"line one; line two\n");
        assert_eq!(normalize_record(b""), b"\n");
        assert_eq!(normalize_record(b"trailing\n"), b"trailing; \n");
    }
}
