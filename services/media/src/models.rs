use serde::Serialize;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_GENRE: &str = "Unknown Genre";

/// Tags read from a stored song
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongMetadata {
    pub title: String,
    pub artist: String,
    pub genre: String,
    /// Raw bytes of the first embedded picture
    #[serde(skip)]
    pub cover_art: Option<Vec<u8>>,
}

impl Default for SongMetadata {
    fn default() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            genre: UNKNOWN_GENRE.to_string(),
            cover_art: None,
        }
    }
}

/// Arguments handed to the downloader for one upload
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub video_link: String,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub username: String,
}

/// Captured result of a finished downloader run
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// Exit code, `None` when the process was killed by a signal
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl DownloadOutcome {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}
