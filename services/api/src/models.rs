//! API models for request and response payloads

use media::SongMetadata;
use serde::{Deserialize, Serialize};

/// Request for song deletion
#[derive(Debug, Deserialize)]
pub struct DeleteSongRequest {
    #[serde(default)]
    pub filename: String,
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Response for an upload; `stderr` is the downloader's output verbatim
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub stdout: String,
    pub stderr: String,
}

/// One entry of the song listing
#[derive(Debug, Serialize)]
pub struct SongEntry {
    pub filename: String,
    pub metadata: SongMetadata,
    /// Base64-encoded cover image
    pub cover_art: Option<String>,
}

/// Response for song listing
#[derive(Debug, Serialize)]
pub struct SongListResponse {
    pub songs: Vec<SongEntry>,
}

/// File part of an upload
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Multipart form accepted by `/upload`
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub video_link: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
}
