use crate::models::{SongMetadata, UNKNOWN_ARTIST, UNKNOWN_GENRE, UNKNOWN_TITLE};
use id3::{ErrorKind, Tag, TagLike, v1};
use std::path::Path;
use tracing::{debug, warn};

/// Reads ID3 tags from stored songs
///
/// Reading never fails: files without a tag header, unreadable tags and
/// missing frames all fall back to the `Unknown ...` defaults.
#[derive(Debug, Clone, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> SongMetadata {
        match Tag::read_from_path(path) {
            Ok(tag) => Self::from_tag(&tag),
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => Self::read_v1(path),
            Err(e) => match e.partial_tag {
                Some(ref tag) => {
                    warn!("Partially read ID3 tag from {}: {}", path.display(), e.description);
                    Self::from_tag(tag)
                }
                None => {
                    warn!("Failed to read ID3 tag from {}: {}", path.display(), e);
                    SongMetadata::default()
                }
            },
        }
    }

    /// Files without an ID3v2 header may still carry an ID3v1 trailer
    fn read_v1(path: &Path) -> SongMetadata {
        match v1::Tag::read_from_path(path) {
            Ok(tag) => Self::from_tag(&Tag::from(tag)),
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => {
                debug!("No ID3 tag in {}", path.display());
                SongMetadata::default()
            }
            Err(e) => {
                warn!("Failed to read ID3v1 tag from {}: {}", path.display(), e);
                SongMetadata::default()
            }
        }
    }

    fn from_tag(tag: &Tag) -> SongMetadata {
        SongMetadata {
            title: first_value(tag.title(), UNKNOWN_TITLE),
            artist: first_value(tag.artist(), UNKNOWN_ARTIST),
            genre: first_value(tag.genre(), UNKNOWN_GENRE),
            cover_art: tag.pictures().next().map(|picture| picture.data.clone()),
        }
    }
}

/// ID3v2.4 text frames may hold several NUL-separated values; keep the first
fn first_value(text: Option<&str>, default: &str) -> String {
    text.and_then(|text| text.split('\0').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::Version;
    use id3::frame::{Picture, PictureType};
    use tempfile::TempDir;

    const AUDIO: &[u8] = b"\xff\xfb\x90\x44\x00\x00\x00\x00fake frame data";

    fn audio_file(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, AUDIO).unwrap();
        path
    }

    #[test]
    fn test_file_without_tag_header() {
        let dir = TempDir::new().unwrap();
        let path = audio_file(&dir, "plain.mp3");

        let metadata = MetadataExtractor::new().read(&path);

        assert_eq!(metadata, SongMetadata::default());
        assert_eq!(metadata.title, "Unknown Title");
        assert_eq!(metadata.artist, "Unknown Artist");
        assert_eq!(metadata.genre, "Unknown Genre");
        assert!(metadata.cover_art.is_none());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let metadata = MetadataExtractor::new().read(&dir.path().join("gone.mp3"));
        assert_eq!(metadata, SongMetadata::default());
    }

    #[test]
    fn test_full_tag_with_cover_art() {
        let dir = TempDir::new().unwrap();
        let path = audio_file(&dir, "tagged.mp3");

        let mut tag = Tag::new();
        tag.set_title("Blue Monday");
        tag.set_artist("New Order");
        tag.set_genre("Synth-pop");
        tag.add_frame(Picture {
            mime_type: "image/png".to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: vec![0x89, b'P', b'N', b'G'],
        });
        tag.write_to_path(&path, Version::Id3v24).unwrap();

        let metadata = MetadataExtractor::new().read(&path);

        assert_eq!(metadata.title, "Blue Monday");
        assert_eq!(metadata.artist, "New Order");
        assert_eq!(metadata.genre, "Synth-pop");
        assert_eq!(metadata.cover_art, Some(vec![0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_missing_frames_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = audio_file(&dir, "title_only.mp3");

        let mut tag = Tag::new();
        tag.set_title("Untitled #1");
        tag.write_to_path(&path, Version::Id3v24).unwrap();

        let metadata = MetadataExtractor::new().read(&path);

        assert_eq!(metadata.title, "Untitled #1");
        assert_eq!(metadata.artist, UNKNOWN_ARTIST);
        assert_eq!(metadata.genre, UNKNOWN_GENRE);
        assert!(metadata.cover_art.is_none());
    }

    fn v1_field(value: &str, len: usize) -> Vec<u8> {
        let mut field = value.as_bytes().to_vec();
        field.resize(len, 0);
        field
    }

    #[test]
    fn test_id3v1_trailer_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v1.mp3");

        let mut bytes = AUDIO.to_vec();
        bytes.extend_from_slice(b"TAG");
        bytes.extend(v1_field("V1 Title", 30));
        bytes.extend(v1_field("V1 Artist", 30));
        bytes.extend(v1_field("V1 Album", 30));
        bytes.extend(v1_field("1999", 4));
        bytes.extend(v1_field("", 30));
        // Genre 17 is "Rock"
        bytes.push(17);
        std::fs::write(&path, &bytes).unwrap();

        let metadata = MetadataExtractor::new().read(&path);

        assert_eq!(metadata.title, "V1 Title");
        assert_eq!(metadata.artist, "V1 Artist");
        assert_eq!(metadata.genre, "Rock");
        assert!(metadata.cover_art.is_none());
    }

    #[test]
    fn test_first_value() {
        assert_eq!(first_value(Some("A\0B"), "x"), "A");
        assert_eq!(first_value(None, "x"), "x");
        assert_eq!(first_value(Some(""), "x"), "x");
    }
}
