// src/services/uploads.rs
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Reduces a client supplied file name to something safe to join onto a
/// directory: ASCII letters, digits, `_`, `-` and `.` only, no path parts,
/// whitespace runs become `_`, and no leading or trailing `.`/`_`.
/// May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// True when the name has a png/jpg/jpeg extension (any case).
pub fn allowed_image_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// `YYYYmmddHHMMSS` followed by microseconds, used to keep uploads apart.
pub fn timestamp_prefix(now: NaiveDateTime) -> String {
    now.format("%Y%m%d%H%M%S%6f").to_string()
}

/// Writes `bytes` to `dir/file_name`, creating `dir` when needed.
pub async fn save_upload(dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    tracing::debug!("Stored upload at {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Removes a temporary file, logging rather than failing.
pub async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Could not remove temporary file {}: {}", path.display(), e);
        }
    }
}
