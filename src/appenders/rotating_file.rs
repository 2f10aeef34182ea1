//! Rotating file appender
//!
//! Writes encoded lines to a single active file. The file is rolled over when
//! a write would push it past the configured size, or whenever [`rotate`] is
//! called (the daily scheduler does this at local midnight). Rolled-over files
//! are renamed with a UTC timestamp and pruned once they are older than the
//! configured retention.
//!
//! [`rotate`]: RotatingFileAppender::rotate

use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const BACKUP_TIME_PARSE_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.f";
const MEGABYTE: u64 = 1024 * 1024;

/// Size and retention limits for a rotating file
///
/// # Examples
///
/// ```
/// use rust_event_logger::appenders::RotationPolicy;
///
/// // Roll over at 50 MB, keep two weeks of backups
/// let policy = RotationPolicy::new()
///     .with_max_size(50)
///     .with_max_age(14);
/// assert_eq!(policy.max_bytes(), Some(50 * 1024 * 1024));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size threshold in megabytes; 0 disables size-based rollover
    pub max_size_mb: u64,
    /// Retention in days; 0 keeps backups forever
    pub max_age_days: u32,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: 20,
            max_age_days: 15,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.max_size_mb = megabytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    /// Size threshold in bytes, if size-based rollover is enabled
    #[must_use]
    pub fn max_bytes(&self) -> Option<u64> {
        (self.max_size_mb > 0).then(|| self.max_size_mb.saturating_mul(MEGABYTE))
    }
}

/// Rotating file appender
///
/// Cloning yields another handle to the same file, which is how the rotation
/// scheduler reaches the writer the engine appends to.
///
/// # Examples
///
/// ```no_run
/// use rust_event_logger::appenders::{RotatingFileAppender, RotationPolicy};
///
/// let appender = RotatingFileAppender::new("/var/log/app/app.log", RotationPolicy::new()).unwrap();
/// let handle = appender.clone();
/// std::thread::spawn(move || handle.rotate());
/// ```
#[derive(Clone)]
pub struct RotatingFileAppender {
    inner: Arc<Mutex<RotatingFile>>,
}

struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

impl RotatingFileAppender {
    /// Open (or create) the active log file, creating its directory
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = RotatingFile::open(&path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(RotatingFile {
                path,
                policy,
                writer: Some(BufWriter::new(file)),
                current_size,
            })),
        })
    }

    /// Close the active file, rename it to a timestamped backup, open a
    /// fresh one and prune expired backups
    pub fn rotate(&self) -> Result<()> {
        self.inner.lock().rotate()
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.inner.lock().path.clone()
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.inner.lock().current_size
    }

    #[must_use]
    pub fn policy(&self) -> RotationPolicy {
        self.inner.lock().policy.clone()
    }
}

impl RotatingFile {
    fn open(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        Ok((file, size))
    }

    fn rotate(&mut self) -> Result<()> {
        self.rotate_at(Utc::now())
    }

    fn rotate_at(&mut self, at: DateTime<Utc>) -> Result<()> {
        let result = self.roll_over(at);

        // Keep a usable writer even when the rename failed half way.
        if self.writer.is_none() {
            match Self::open(&self.path) {
                Ok((file, size)) => {
                    self.writer = Some(BufWriter::new(file));
                    self.current_size = size;
                }
                Err(reopen_err) => {
                    eprintln!(
                        "[LOGGER ERROR] Failed to reopen log file after rotation failure: {}",
                        reopen_err
                    );
                }
            }
        }

        result
    }

    fn roll_over(&mut self, at: DateTime<Utc>) -> Result<()> {
        // Explicitly drop writer to release file handle before renaming
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.path.exists() {
            let backup = self.backup_path(at);
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to rename to '{}': {}", backup.display(), e),
                )
            })?;
        }

        let (file, size) = Self::open(&self.path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;

        self.prune_expired(at);
        Ok(())
    }

    /// `<stem>-<timestamp>.<ext>` next to the active file
    ///
    /// Two rotations within the same millisecond get `-1`, `-2`, ... appended
    /// to the timestamp so an earlier backup is never overwritten.
    fn backup_path(&self, at: DateTime<Utc>) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let stamp = at.format(BACKUP_TIME_FORMAT).to_string();
        let named = |stamp: &str| {
            let name = match &ext {
                Some(ext) => format!("{}-{}.{}", stem, stamp, ext),
                None => format!("{}-{}", stem, stamp),
            };
            self.path.with_file_name(name)
        };

        let mut candidate = named(&stamp);
        let mut counter = 1u32;
        while candidate.exists() {
            candidate = named(&format!("{}-{}", stamp, counter));
            counter += 1;
        }
        candidate
    }

    fn name_parts(&self) -> (String, Option<String>) {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("app")
            .to_string();
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_string);
        (stem, ext)
    }

    /// Parse the rotation time out of a backup file name
    fn backup_time(&self, file_name: &str) -> Option<DateTime<Utc>> {
        let (stem, ext) = self.name_parts();
        let rest = file_name.strip_prefix(&stem)?.strip_prefix('-')?;
        let stamp = match &ext {
            Some(ext) => rest.strip_suffix(ext.as_str())?.strip_suffix('.')?,
            None => rest,
        };
        let parse = |stamp: &str| {
            NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_PARSE_FORMAT)
                .ok()
                .map(|t| t.and_utc())
        };

        parse(stamp).or_else(|| {
            let (stamp, counter) = stamp.rsplit_once('-')?;
            if counter.is_empty() || !counter.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            parse(stamp)
        })
    }

    fn prune_expired(&self, now: DateTime<Utc>) {
        if self.policy.max_age_days == 0 {
            return;
        }
        let Some(dir) = self.path.parent() else {
            return;
        };
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let cutoff = now - chrono::Duration::days(i64::from(self.policy.max_age_days));

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!(
                    "[LOGGER WARNING] Cannot list '{}' for backup pruning: {}",
                    dir.display(),
                    e
                );
                return;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let expired = self.backup_time(name).is_some_and(|t| t < cutoff);
            if expired {
                if let Err(e) = fs::remove_file(entry.path()) {
                    eprintln!(
                        "[LOGGER WARNING] Failed to remove expired backup {}: {}",
                        entry.path().display(),
                        e
                    );
                }
            }
        }
    }

    fn append(&mut self, line: &[u8]) -> Result<()> {
        let len = line.len() as u64;

        if let Some(max_bytes) = self.policy.max_bytes() {
            if self.current_size > 0 && self.current_size + len > max_bytes {
                if let Err(e) = self.rotate() {
                    // Keep writing to whatever file is open rather than losing the line
                    eprintln!(
                        "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                        e
                    );
                    self.current_size = 0;
                }
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;
        writer.write_all(line).map_err(|e| {
            LoggerError::file_appender(
                self.path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += len;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }
}

impl Appender for RotatingFileAppender {
    fn append(&mut self, line: &[u8]) -> Result<()> {
        self.inner.lock().append(line)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.lock().flush()
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            // Best effort flush - ignore errors during drop
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn backups(dir: &Path, stem: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|n| n.starts_with(&format!("{}-", stem)))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_policy_builder() {
        let policy = RotationPolicy::new().with_max_size(1).with_max_age(3);
        assert_eq!(policy.max_bytes(), Some(1024 * 1024));
        assert_eq!(policy.max_age_days, 3);

        assert_eq!(RotationPolicy::new().with_max_size(0).max_bytes(), None);
    }

    #[test]
    fn test_creates_directory() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("deeper").join("app.log");

        let appender = RotatingFileAppender::new(&log_path, RotationPolicy::new()).unwrap();
        assert!(log_path.exists());
        assert_eq!(appender.path(), log_path);
        assert_eq!(appender.current_size(), 0);
    }

    #[test]
    fn test_manual_rotate_creates_backup() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.log");

        let mut appender = RotatingFileAppender::new(&log_path, RotationPolicy::new()).unwrap();
        appender.append(b"before rotation\n").unwrap();

        appender.rotate().unwrap();
        appender.append(b"after rotation\n").unwrap();
        appender.flush().unwrap();

        let names = backups(dir.path(), "app");
        assert_eq!(names.len(), 1, "{:?}", names);
        assert!(names[0].ends_with(".log"));

        let backup = fs::read_to_string(dir.path().join(&names[0])).unwrap();
        assert_eq!(backup, "before rotation\n");
        assert_eq!(fs::read_to_string(&log_path).unwrap(), "after rotation\n");
    }

    #[test]
    fn test_clone_shares_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("shared.log");

        let mut appender = RotatingFileAppender::new(&log_path, RotationPolicy::new()).unwrap();
        let handle = appender.clone();

        appender.append(b"0123456789\n").unwrap();
        assert_eq!(handle.current_size(), 11);

        handle.rotate().unwrap();
        assert_eq!(appender.current_size(), 0);
    }

    #[test]
    fn test_size_based_rollover() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("big.log");

        let mut appender =
            RotatingFileAppender::new(&log_path, RotationPolicy::new().with_max_size(1)).unwrap();

        let line = vec![b'x'; 600 * 1024];
        appender.append(&line).unwrap();
        assert!(backups(dir.path(), "big").is_empty());

        // Second write would exceed 1 MB
        appender.append(&line).unwrap();
        appender.flush().unwrap();

        assert_eq!(backups(dir.path(), "big").len(), 1);
        assert_eq!(appender.current_size(), line.len() as u64);
    }

    #[test]
    fn test_backup_name_round_trip() {
        let dir = tempdir().unwrap();
        let appender =
            RotatingFileAppender::new(dir.path().join("svc.log"), RotationPolicy::new()).unwrap();
        let file = appender.inner.lock();

        let at = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let backup = file.backup_path(at);
        let name = backup.file_name().unwrap().to_str().unwrap();

        assert_eq!(name, "svc-2024-03-10T00-00-00.000.log");
        assert_eq!(file.backup_time(name), Some(at));
        assert_eq!(file.backup_time("svc.log"), None);
        assert_eq!(file.backup_time("other-2024-03-10T00-00-00.000.log"), None);
    }

    #[test]
    fn test_prunes_expired_backups() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.log");
        let appender =
            RotatingFileAppender::new(&log_path, RotationPolicy::new().with_max_age(7)).unwrap();

        let now = Utc::now();
        let (old, recent) = {
            let file = appender.inner.lock();
            (
                file.backup_path(now - chrono::Duration::days(30)),
                file.backup_path(now - chrono::Duration::days(1)),
            )
        };
        fs::write(&old, "old").unwrap();
        fs::write(&recent, "recent").unwrap();
        fs::write(dir.path().join("unrelated.txt"), "keep").unwrap();

        appender.rotate().unwrap();

        assert!(!old.exists());
        assert!(recent.exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_same_millisecond_rotations_keep_every_backup() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("burst.log");
        let mut appender = RotatingFileAppender::new(&log_path, RotationPolicy::new()).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();

        appender.append(b"first\n").unwrap();
        appender.inner.lock().rotate_at(at).unwrap();
        appender.append(b"second\n").unwrap();
        appender.inner.lock().rotate_at(at).unwrap();

        let names = backups(dir.path(), "burst");
        assert_eq!(
            names,
            ["burst-2024-03-10T00-00-00.000-1.log", "burst-2024-03-10T00-00-00.000.log"]
        );
        assert_eq!(fs::read_to_string(dir.path().join(&names[1])).unwrap(), "first\n");
        assert_eq!(fs::read_to_string(dir.path().join(&names[0])).unwrap(), "second\n");

        let file = appender.inner.lock();
        for name in &names {
            assert_eq!(file.backup_time(name), Some(at), "{}", name);
        }
        assert_eq!(file.backup_time("burst-2024-03-10T00-00-00.000-x.log"), None);
    }
}
