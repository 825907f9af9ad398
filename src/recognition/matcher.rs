// src/recognition/matcher.rs
use crate::config::MatcherConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// A reference image the matcher considers close to the probe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candidate {
    pub identity: PathBuf,
    /// Lower is closer. Some backends omit it.
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("could not start matcher: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("matcher exited with {status}: {stderr}")]
    Failed { status: std::process::ExitStatus, stderr: String },

    #[error("matcher output is not valid JSON: {0}")]
    BadOutput(#[from] serde_json::Error),
}

/// Face search over a directory of reference images. The embedding
/// model lives behind this trait.
#[async_trait]
pub trait FaceMatcher: Send + Sync {
    /// Candidates for `probe` among the images in `images_dir`, best first.
    async fn find(&self, probe: &Path, images_dir: &Path) -> Result<Vec<Candidate>, MatchError>;
}

/// Runs an external face search program, for example a small wrapper
/// around DeepFace's `find`:
///
/// ```text
/// <command> --img <probe> --db <images_dir> --model ArcFace --detector opencv --metric cosine
/// ```
///
/// The program prints a JSON array of `{"identity": ..., "distance": ...}`
/// sorted best first, and an empty array when no face was found.
#[derive(Debug, Clone)]
pub struct CommandMatcher {
    config: MatcherConfig,
}

impl CommandMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    fn command(&self, probe: &Path, images_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.arg("--img")
            .arg(probe)
            .arg("--db")
            .arg(images_dir)
            .args(["--model", &self.config.model])
            .args(["--detector", &self.config.detector])
            .args(["--metric", &self.config.metric])
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl FaceMatcher for CommandMatcher {
    async fn find(&self, probe: &Path, images_dir: &Path) -> Result<Vec<Candidate>, MatchError> {
        tracing::debug!("Running matcher '{}' for {}", self.config.command, probe.display());
        let output = self.command(probe, images_dir).output().await?;
        if !output.status.success() {
            return Err(MatchError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_candidates(&output.stdout)
    }
}

pub fn parse_candidates(stdout: &[u8]) -> Result<Vec<Candidate>, MatchError> {
    let text = String::from_utf8_lossy(stdout);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(text.trim())?)
}

/// Matcher with canned answers.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FixedMatcher {
    pub candidates: Vec<Candidate>,
    pub fail: bool,
}

#[cfg(test)]
impl FixedMatcher {
    pub fn best(identity: &str, distance: Option<f64>) -> Self {
        Self { candidates: vec![Candidate { identity: identity.into(), distance }], fail: false }
    }
}

#[cfg(test)]
#[async_trait]
impl FaceMatcher for FixedMatcher {
    async fn find(&self, _probe: &Path, _images_dir: &Path) -> Result<Vec<Candidate>, MatchError> {
        if self.fail {
            let bad = serde_json::from_str::<Vec<Candidate>>("not json").unwrap_err();
            return Err(MatchError::BadOutput(bad));
        }
        Ok(self.candidates.clone())
    }
}
