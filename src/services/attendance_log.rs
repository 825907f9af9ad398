// src/services/attendance_log.rs
//! Daily flat-file attendance logs.
//!
//! One file per day, `attendance_<YYYY-MM-DD>.txt`, starting with the
//! header `Name,Time,Distance`. Files are only ever appended to.
use crate::models::attendance::AttendanceRecord;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};

pub const HEADER: &str = "Name,Time,Distance";
pub const TIME_FORMAT: &str = "%H:%M:%S";
const FILE_PREFIX: &str = "attendance_";
const FILE_SUFFIX: &str = ".txt";

pub fn path_for(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{FILE_PREFIX}{}{FILE_SUFFIX}", date.format("%Y-%m-%d")))
}

/// All data rows of a log file in file order. A missing file is an empty log.
pub async fn read_records(path: &Path) -> std::io::Result<Vec<AttendanceRecord>> {
    let contents = match fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    Ok(contents
        .lines()
        .skip(1) // header
        .filter_map(AttendanceRecord::from_line)
        .collect())
}

/// Whether `name` was logged less than `window` before `now`.
///
/// Every row for `name` with a `HH:MM:SS` time is considered, placed on
/// `now`'s date; rows whose time doesn't parse are skipped. An entry
/// exactly `window` old is outside the window. A missing or unreadable
/// file means "not logged".
pub async fn is_within_window(name: &str, path: &Path, now: NaiveDateTime, window: chrono::Duration) -> bool {
    let records = match read_records(path).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Could not read attendance log {}: {}", path.display(), e);
            return false;
        }
    };

    records
        .iter()
        .filter(|r| r.name == name)
        .filter_map(|r| NaiveTime::parse_from_str(&r.time, TIME_FORMAT).ok())
        .any(|logged_at| now - now.date().and_time(logged_at) < window)
}

/// Appends one row, writing the header first when the file is new.
pub async fn append(path: &Path, record: &AttendanceRecord) -> std::io::Result<()> {
    let header_needed = !fs::try_exists(path).await?;
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path).await?;
    let mut chunk = String::new();
    if header_needed {
        chunk.push_str(HEADER);
        chunk.push('\n');
    }
    chunk.push_str(&record.to_line());
    chunk.push('\n');
    file.write_all(chunk.as_bytes()).await?;
    file.flush().await
}

/// Dates that have a log file in `dir`, newest first.
pub async fn list_days(dir: &Path) -> std::io::Result<Vec<NaiveDate>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut days = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(date) = file_name
            .to_str()
            .and_then(|n| n.strip_prefix(FILE_PREFIX))
            .and_then(|n| n.strip_suffix(FILE_SUFFIX))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        days.push(date);
    }
    days.sort_unstable_by(|a, b| b.cmp(a));
    Ok(days)
}

/// The attendance directory plus a lock that keeps the
/// check-then-append sequence atomic inside one process.
#[derive(Debug)]
pub struct AttendanceLog {
    dir: PathBuf,
    window: chrono::Duration,
    write_lock: Mutex<()>,
}

/// What happened to a matched identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    Logged,
    AlreadyLogged,
}

impl AttendanceLog {
    pub fn new(dir: PathBuf, window: std::time::Duration) -> Self {
        let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::hours(1));
        Self { dir, window, write_lock: Mutex::new(()) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends `record` to `now`'s file unless its name is inside the dedup window.
    pub async fn record_unless_recent(
        &self,
        record: &AttendanceRecord,
        now: NaiveDateTime,
    ) -> std::io::Result<LogOutcome> {
        let path = path_for(&self.dir, now.date());
        let _guard = self.write_lock.lock().await;

        if is_within_window(&record.name, &path, now, self.window).await {
            tracing::debug!("{} already logged within the window", record.name);
            return Ok(LogOutcome::AlreadyLogged);
        }
        append(&path, record).await?;
        tracing::info!("Attendance logged: {} at {} ({})", record.name, record.time, path.display());
        Ok(LogOutcome::Logged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("attendance_log_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    fn record(name: &str, time: &str) -> AttendanceRecord {
        AttendanceRecord { name: name.into(), time: time.into(), distance: 0.3 }
    }

    #[test]
    fn test_path_for_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(path_for(Path::new("logs"), date), Path::new("logs/attendance_2025-03-04.txt"));
    }

    #[tokio::test]
    async fn test_append_writes_header_once() {
        let dir = temp_dir();
        let path = dir.join("attendance_2025-03-14.txt");
        append(&path, &record("alice", "09:00:00")).await.unwrap();
        append(&path, &record("bob", "09:05:00")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Name,Time,Distance\nalice,09:00:00,0.3\nbob,09:05:00,0.3\n");
        assert_eq!(read_records(&path).await.unwrap().len(), 2);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_within_window() {
        let dir = temp_dir();
        let path = dir.join("nope.txt");
        assert!(read_records(&path).await.unwrap().is_empty());
        assert!(!is_within_window("alice", &path, at(9, 0, 0), chrono::Duration::hours(1)).await);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_window_boundary_at_exactly_one_hour() {
        let dir = temp_dir();
        let path = dir.join("log.txt");
        append(&path, &record("alice", "09:00:00")).await.unwrap();
        let hour = chrono::Duration::hours(1);

        assert!(is_within_window("alice", &path, at(9, 59, 59), hour).await);
        assert!(!is_within_window("alice", &path, at(10, 0, 0), hour).await);
        assert!(!is_within_window("bob", &path, at(9, 30, 0), hour).await);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_window_checks_every_parsable_entry() {
        let dir = temp_dir();
        let path = dir.join("log.txt");
        append(&path, &record("alice", "morning")).await.unwrap();
        append(&path, &record("alice", "08:00:00")).await.unwrap();
        append(&path, &record("alice", "09:30:00")).await.unwrap();

        assert!(is_within_window("alice", &path, at(9, 45, 0), chrono::Duration::hours(1)).await);
        assert!(!is_within_window("alice", &path, at(10, 30, 0), chrono::Duration::hours(1)).await);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_later_entry_keeps_dedup_after_first_hour() {
        let dir = temp_dir();
        let log = AttendanceLog::new(dir.clone(), std::time::Duration::from_secs(3600));

        let morning = log.record_unless_recent(&record("alice", "09:00:00"), at(9, 0, 0)).await.unwrap();
        let next_hour = log.record_unless_recent(&record("alice", "10:00:00"), at(10, 0, 0)).await.unwrap();
        let repeat = log.record_unless_recent(&record("alice", "10:00:03"), at(10, 0, 3)).await.unwrap();
        let later = log.record_unless_recent(&record("alice", "10:10:00"), at(10, 10, 0)).await.unwrap();

        assert_eq!(morning, LogOutcome::Logged);
        assert_eq!(next_hour, LogOutcome::Logged);
        assert_eq!(repeat, LogOutcome::AlreadyLogged);
        assert_eq!(later, LogOutcome::AlreadyLogged);
        let path = path_for(&dir, at(0, 0, 0).date());
        assert_eq!(read_records(&path).await.unwrap().len(), 2);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_record_unless_recent_dedups() {
        let dir = temp_dir();
        let log = AttendanceLog::new(dir.clone(), std::time::Duration::from_secs(3600));

        let first = log.record_unless_recent(&record("alice", "09:00:00"), at(9, 0, 0)).await.unwrap();
        let second = log.record_unless_recent(&record("alice", "09:20:00"), at(9, 20, 0)).await.unwrap();
        let later = log.record_unless_recent(&record("alice", "10:00:00"), at(10, 0, 0)).await.unwrap();

        assert_eq!(first, LogOutcome::Logged);
        assert_eq!(second, LogOutcome::AlreadyLogged);
        assert_eq!(later, LogOutcome::Logged);
        let path = path_for(&dir, at(0, 0, 0).date());
        assert_eq!(read_records(&path).await.unwrap().len(), 2);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_list_days_newest_first() {
        let dir = temp_dir();
        for name in ["attendance_2025-03-01.txt", "attendance_2025-03-10.txt", "notes.txt"] {
            std::fs::write(dir.join(name), HEADER).unwrap();
        }
        let days = list_days(&dir).await.unwrap();
        assert_eq!(
            days,
            vec![NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()]
        );
        std::fs::remove_dir_all(dir).ok();
    }
}
