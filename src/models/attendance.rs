// src/models/attendance.rs
use serde::{Deserialize, Serialize};

/// One line of a daily attendance file: `Name,Time,Distance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub name: String,
    /// Usually `HH:MM:SS`, but a client supplied time is stored verbatim.
    pub time: String,
    pub distance: f64,
}

impl AttendanceRecord {
    /// Whether `value` can sit in one column without splitting the line.
    pub fn fits_in_field(value: &str) -> bool {
        !value.contains([',', '\r', '\n'])
    }

    pub fn to_line(&self) -> String {
        format!("{},{},{}", self.name, self.time, self.distance)
    }

    /// Parses a data line. Returns `None` for blank or short lines.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        let mut fields = line.splitn(3, ',');
        let name = fields.next()?.to_string();
        let time = fields.next()?.to_string();
        // A missing or garbled distance doesn't hide the row from readers
        let distance = fields
            .next()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN);
        Some(Self { name, time, distance })
    }
}

/// Who a reference image belongs to, taken from its file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub roll: String,
}

/// JSON body returned by `POST /api/recognize`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizeResponse {
    pub success: bool,
    pub name: Option<String>,
    pub roll: Option<String>,
    pub distance: Option<f64>,
    pub message: String,
}

impl RecognizeResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Default::default() }
    }
}

/// Per-day numbers shown on the teacher dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub entries: usize,
    pub students: usize,
}

impl AttendanceStats {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let mut names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        Self { entries: records.len(), students: names.len() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_in_field() {
        assert!(AttendanceRecord::fits_in_field("8:05 AM"));
        assert!(!AttendanceRecord::fits_in_field("09:00,0.1"));
        assert!(!AttendanceRecord::fits_in_field("09:00\nbob"));
    }

    #[test]
    fn test_record_line_format() {
        let record = AttendanceRecord { name: "John_Doe".into(), time: "09:15:00".into(), distance: 0.25 };
        assert_eq!(record.to_line(), "John_Doe,09:15:00,0.25");
        assert_eq!(AttendanceRecord::from_line("John_Doe,09:15:00,0.25\n"), Some(record));
    }

    #[test]
    fn test_from_line_skips_blank_and_short_lines() {
        assert_eq!(AttendanceRecord::from_line("   \n"), None);
        assert_eq!(AttendanceRecord::from_line("only_a_name"), None);
    }

    #[test]
    fn test_from_line_tolerates_bad_distance() {
        let record = AttendanceRecord::from_line("Jane,10:00:00,abc").unwrap();
        assert_eq!(record.name, "Jane");
        assert!(record.distance.is_nan());
    }

    #[test]
    fn test_stats_count_distinct_students() {
        let records = vec![
            AttendanceRecord { name: "a".into(), time: "08:00:00".into(), distance: 0.1 },
            AttendanceRecord { name: "b".into(), time: "08:01:00".into(), distance: 0.2 },
            AttendanceRecord { name: "a".into(), time: "10:00:00".into(), distance: 0.3 },
        ];
        assert_eq!(AttendanceStats::from_records(&records), AttendanceStats { entries: 3, students: 2 });
    }
}
