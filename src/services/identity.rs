// src/services/identity.rs
use crate::models::attendance::Identity;
use std::path::Path;

/// Reads `(name, roll)` out of a reference image path such as
/// `images/Student_Name_123.jpg`.
///
/// The last `_`-separated token of the file stem is the roll number and the
/// rest is the name. A stem without `_` is all name, roll `"Unknown"`.
pub fn parse_name_roll(identity_path: &Path) -> Identity {
    let stem = identity_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match stem.rsplit_once('_') {
        Some((name, roll)) => Identity { name: name.to_string(), roll: roll.to_string() },
        None => Identity { name: stem, roll: "Unknown".to_string() },
    }
}
