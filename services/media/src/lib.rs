//! Media handling for the SoundWave backend
//!
//! Tag reading for stored songs and the subprocess adapter that acquires new
//! ones.

pub mod downloader;
pub mod metadata_extractor;
pub mod models;

pub use downloader::{Downloader, DownloaderConfig, DownloaderError};
pub use metadata_extractor::MetadataExtractor;
pub use models::{DownloadOutcome, DownloadRequest, SongMetadata};
