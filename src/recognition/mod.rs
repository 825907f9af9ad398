// src/recognition/mod.rs
pub mod intake;
pub mod matcher;

use crate::{
    models::attendance::{AttendanceRecord, RecognizeResponse},
    services::{
        attendance_log::{AttendanceLog, LogOutcome, TIME_FORMAT},
        identity::parse_name_roll,
    },
};
use chrono::NaiveDateTime;
use matcher::FaceMatcher;
use std::path::Path;

/// Everything the matching step needs besides the probe itself.
pub struct Recognizer<'a> {
    pub matcher: &'a dyn FaceMatcher,
    pub log: &'a AttendanceLog,
    pub images_dir: &'a Path,
    pub threshold: f64,
}

impl Recognizer<'_> {
    /// Matches a stored probe and logs attendance for a hit outside the
    /// dedup window. Never fails: problems end up in `message`.
    pub async fn recognize(&self, probe: &Path, time: Option<&str>, now: NaiveDateTime) -> RecognizeResponse {
        let candidates = match self.matcher.find(probe, self.images_dir).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Matcher failed for {}: {}", probe.display(), e);
                return RecognizeResponse::failure(format!("Recognition error: {e}"));
            }
        };

        let Some(best) = candidates.first() else {
            return RecognizeResponse::failure("No face detected or no match found.");
        };
        let Some(distance) = best.distance else {
            return RecognizeResponse::failure("No numeric distance found in matcher output.");
        };

        if distance > self.threshold {
            tracing::debug!("Best candidate {} too far: {:.4}", best.identity.display(), distance);
            return RecognizeResponse {
                distance: Some(distance),
                ..RecognizeResponse::failure("No close match (distance too high).")
            };
        }

        let identity = parse_name_roll(&best.identity);
        let record = AttendanceRecord {
            name: identity.name.clone(),
            time: time
                .filter(|t| !t.is_empty() && AttendanceRecord::fits_in_field(t))
                .map_or_else(|| now.format(TIME_FORMAT).to_string(), str::to_string),
            distance,
        };

        let message = match self.log.record_unless_recent(&record, now).await {
            Ok(LogOutcome::Logged) => {
                format!("Matched: {} (roll={}) distance={:.4}", identity.name, identity.roll, distance)
            }
            Ok(LogOutcome::AlreadyLogged) => format!(
                "Already marked within last hour: {} (roll={}) with distance: {:.4}",
                identity.name, identity.roll, distance
            ),
            Err(e) => {
                tracing::error!("Could not write attendance for {}: {}", identity.name, e);
                return RecognizeResponse::failure(format!("Recognition error: {e}"));
            }
        };

        RecognizeResponse {
            success: true,
            name: Some(identity.name),
            roll: Some(identity.roll),
            distance: Some(distance),
            message,
        }
    }
}
