//! Subprocess adapter for the external downloader
//!
//! The downloader fetches and converts the audio for an upload. Its internals
//! are opaque: this module only starts it with positional arguments
//! (`link title artist genre username`) and collects its output.

use crate::models::{DownloadOutcome, DownloadRequest};
use common::AppConfig;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

/// Downloader errors
#[derive(Debug, Error)]
pub enum DownloaderError {
    /// The process could not be started
    #[error("Failed to start downloader: {0}")]
    Spawn(#[source] std::io::Error),

    /// The process exceeded the configured timeout and was killed
    #[error("Downloader timed out after {0:?}")]
    TimedOut(Duration),
}

/// Downloader configuration
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Executable to run
    pub program: String,
    /// Optional script passed before the positional arguments
    pub script: String,
    /// Kill the process after this long
    pub timeout: Option<Duration>,
}

impl DownloaderConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            program: config.downloader_program.clone(),
            script: config.downloader_script.clone(),
            timeout: config.downloader_timeout(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Downloader {
    config: DownloaderConfig,
}

impl Downloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// Run the downloader to completion
    ///
    /// A non-zero exit status is reported through the outcome, not as an error.
    pub async fn run(&self, request: &DownloadRequest) -> Result<DownloadOutcome, DownloaderError> {
        info!(
            "Running downloader for user {}: {}",
            request.username, request.video_link
        );

        let mut command = Command::new(&self.config.program);
        if !self.config.script.is_empty() {
            command.arg(&self.config.script);
        }
        command
            .arg(&request.video_link)
            .arg(&request.title)
            .arg(&request.artist)
            .arg(&request.genre)
            .arg(&request.username)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    warn!("Downloader for user {} timed out", request.username);
                    DownloaderError::TimedOut(limit)
                })?,
            None => command.output().await,
        }
        .map_err(DownloaderError::Spawn)?;

        let outcome = DownloadOutcome {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !outcome.success() {
            warn!(
                "Downloader for user {} exited with {:?}",
                request.username, outcome.status_code
            );
        }

        Ok(outcome)
    }
}
