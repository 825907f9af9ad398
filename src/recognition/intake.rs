// src/recognition/intake.rs
//! Getting a probe image out of a request and onto disk.
use crate::{
    error::RecognizeError,
    models::attendance::AttendanceRecord,
    services::uploads::{allowed_image_file, remove_quietly, save_upload, secure_filename, timestamp_prefix},
};
use axum::extract::Multipart;
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Standard alphabet, padding optional, like most browser encoders produce.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A stored probe image plus the optional client supplied time.
#[derive(Debug, Clone)]
pub struct Probe {
    pub path: PathBuf,
    pub time: Option<String>,
}

/// Accepts a data URL (`data:image/jpeg;base64,...`) or bare base64.
pub fn decode_base64_image(data: &str) -> Option<Vec<u8>> {
    let payload = if data.starts_with("data:") {
        data.split_once(',')?.1
    } else {
        data
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT_BASE64.decode(compact).ok()
}

/// The client time, unless it is empty or would break the CSV line.
/// Callers fall back to the server clock on `None`.
pub fn usable_time(time: String) -> Option<String> {
    if time.is_empty() {
        return None;
    }
    if !AttendanceRecord::fits_in_field(&time) {
        tracing::warn!("Ignoring client time with separators: {:?}", time);
        return None;
    }
    Some(time)
}

/// Whether the bytes decode as an image at all.
pub async fn is_decodable_image(bytes: Vec<u8>) -> bool {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).is_ok())
        .await
        .unwrap_or(false)
}

/// Reads the `frame` file part and optional `time` text part.
pub async fn probe_from_multipart(
    mut multipart: Multipart,
    uploads_dir: &Path,
    now: NaiveDateTime,
) -> Result<Probe, RecognizeError> {
    let mut frame: Option<(String, Vec<u8>)> = None;
    let mut time = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Malformed multipart body: {}", e);
                return Err(RecognizeError::NoImage);
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "frame" => {
                // A frame part without a file name counts as "no file selected"
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    tracing::warn!("Could not read frame part: {}", e);
                    RecognizeError::NoImage
                })?;
                frame = Some((file_name, bytes.to_vec()));
            }
            "time" => {
                time = usable_time(field.text().await.unwrap_or_default());
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = frame else {
        return Err(RecognizeError::NoImage);
    };
    if file_name.is_empty() {
        return Err(RecognizeError::EmptyFilename);
    }
    if !allowed_image_file(&file_name) {
        return Err(RecognizeError::FileTypeNotAllowed);
    }

    let saved_name = format!("{}_{}", timestamp_prefix(now), secure_filename(&file_name));
    let path = store_checked(uploads_dir, &saved_name, bytes).await?;
    Ok(Probe { path, time })
}

/// Reads `{"image": "<base64 or data URL>", "time": "..."}`; `frame` is
/// accepted in place of `image`. A body that isn't JSON counts as no image.
pub async fn probe_from_json(body: &[u8], uploads_dir: &Path, now: NaiveDateTime) -> Result<Probe, RecognizeError> {
    let Ok(Value::Object(data)) = serde_json::from_slice::<Value>(body) else {
        return Err(RecognizeError::NoImage);
    };

    let encoded = ["image", "frame"]
        .iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .ok_or(RecognizeError::NoImage)?;
    let bytes = decode_base64_image(encoded).ok_or_else(|| {
        tracing::debug!("Probe is not valid base64");
        RecognizeError::NoImage
    })?;

    let time = match data.get("time") {
        Some(Value::String(s)) => usable_time(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let saved_name = format!("{}.jpg", timestamp_prefix(now));
    let path = store_checked(uploads_dir, &saved_name, bytes).await?;
    Ok(Probe { path, time })
}

/// Saves the upload, then drops it again if it doesn't decode.
async fn store_checked(dir: &Path, file_name: &str, bytes: Vec<u8>) -> Result<PathBuf, RecognizeError> {
    let path = save_upload(dir, file_name, &bytes).await?;
    if !is_decodable_image(bytes).await {
        remove_quietly(&path).await;
        return Err(RecognizeError::NoImage);
    }
    Ok(path)
}
