//! Per-user storage namespaces
//!
//! Every user owns exactly one directory below the storage root, named after
//! the username. Files inside it have no database record: the directory is
//! the only source of truth, so listing is a scan and deletion is an unlink.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{NamespaceError, NamespaceResult};

/// Extension of the media files surfaced by [`NamespaceManager::list`]
pub const MEDIA_EXTENSION: &str = "mp3";

/// Reject names that could escape the directory they are joined onto
pub fn validate_filename(name: &str) -> NamespaceResult<()> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || Path::new(name).components().count() != 1;

    if invalid {
        return Err(NamespaceError::InvalidFilename(name.to_string()));
    }

    Ok(())
}

/// Maps usernames to their storage directories
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    root: PathBuf,
}

impl NamespaceManager {
    /// Create a manager rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn user_dir(&self, username: &str) -> NamespaceResult<PathBuf> {
        validate_filename(username)?;
        Ok(self.root.join(username))
    }

    /// Create the user's directory if it is missing
    pub async fn ensure(&self, username: &str) -> NamespaceResult<PathBuf> {
        let dir = self.user_dir(username)?;
        fs::create_dir_all(&dir).await?;
        info!("Namespace ready for user {}: {}", username, dir.display());
        Ok(dir)
    }

    /// Path of an existing namespace
    pub async fn resolve(&self, username: &str) -> NamespaceResult<PathBuf> {
        let dir = self.user_dir(username)?;
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(NamespaceError::NotFound),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(NamespaceError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Media filenames currently in the namespace, sorted by name
    ///
    /// The directory is re-scanned on every call.
    pub async fn list(&self, username: &str) -> NamespaceResult<Vec<String>> {
        let dir = self.resolve(username).await?;
        let mut entries = fs::read_dir(&dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let Ok(name) = entry.file_name().into_string() else {
                debug!("Skipping non UTF-8 filename in {}", dir.display());
                continue;
            };

            if Path::new(&name).extension().is_some_and(|ext| ext == MEDIA_EXTENSION) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Path of an existing file inside the namespace
    pub async fn file_path(&self, username: &str, filename: &str) -> NamespaceResult<PathBuf> {
        validate_filename(filename)?;
        let path = self.resolve(username).await?.join(filename);

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(NamespaceError::FileNotFound),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(NamespaceError::FileNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a single file, leaving its siblings untouched
    pub async fn delete(&self, username: &str, filename: &str) -> NamespaceResult<()> {
        validate_filename(filename)?;
        let path = self.resolve(username).await?.join(filename);

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {} for user {}", filename, username);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(NamespaceError::FileNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a file, replacing any existing file with the same name
    pub async fn write(
        &self,
        username: &str,
        filename: &str,
        bytes: &[u8],
    ) -> NamespaceResult<PathBuf> {
        validate_filename(filename)?;
        let path = self.resolve(username).await?.join(filename);
        fs::write(&path, bytes).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager() -> (TempDir, NamespaceManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = NamespaceManager::new(dir.path());
        (dir, manager)
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("song.mp3").is_ok());
        assert!(validate_filename("My Song (live).mp3").is_ok());

        for name in ["", ".", "..", "../song.mp3", "a/b.mp3", "a\\b.mp3", ".hidden", "nul\0.mp3"] {
            assert!(
                matches!(validate_filename(name), Err(NamespaceError::InvalidFilename(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let (_dir, manager) = manager();

        let first = manager.ensure("alice").await.unwrap();
        let second = manager.ensure("alice").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.resolve("alice").await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_resolve_missing_namespace() {
        let (_dir, manager) = manager();

        assert!(matches!(
            manager.resolve("bob").await,
            Err(NamespaceError::NotFound)
        ));
        assert!(matches!(manager.list("bob").await, Err(NamespaceError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_empty_namespace() {
        let (_dir, manager) = manager();
        manager.ensure("alice").await.unwrap();

        assert!(manager.list("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_media_files() {
        let (_dir, manager) = manager();
        let home = manager.ensure("alice").await.unwrap();

        manager.write("alice", "b.mp3", b"b").await.unwrap();
        manager.write("alice", "a.mp3", b"a").await.unwrap();
        manager.write("alice", "notes.txt", b"n").await.unwrap();
        std::fs::create_dir(home.join("folder.mp3")).unwrap();

        assert_eq!(manager.list("alice").await.unwrap(), vec!["a.mp3", "b.mp3"]);
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let (_dir, manager) = manager();
        manager.ensure("alice").await.unwrap();

        manager.write("alice", "a.mp3", b"first").await.unwrap();
        let path = manager.write("alice", "a.mp3", b"second").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let (_dir, manager) = manager();
        manager.ensure("alice").await.unwrap();
        manager.write("alice", "a.mp3", b"a").await.unwrap();
        manager.write("alice", "b.mp3", b"b").await.unwrap();

        manager.delete("alice", "a.mp3").await.unwrap();

        assert_eq!(manager.list("alice").await.unwrap(), vec!["b.mp3"]);
    }

    #[tokio::test]
    async fn test_delete_missing_file() {
        let (_dir, manager) = manager();
        manager.ensure("alice").await.unwrap();
        manager.write("alice", "b.mp3", b"b").await.unwrap();

        assert!(matches!(
            manager.delete("alice", "a.mp3").await,
            Err(NamespaceError::FileNotFound)
        ));
        assert_eq!(manager.list("alice").await.unwrap(), vec!["b.mp3"]);
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let (dir, manager) = manager();
        manager.ensure("alice").await.unwrap();
        manager.ensure("bob").await.unwrap();
        std::fs::write(dir.path().join("bob").join("secret.mp3"), b"x").unwrap();

        assert!(matches!(
            manager.delete("alice", "../bob/secret.mp3").await,
            Err(NamespaceError::InvalidFilename(_))
        ));
        assert!(matches!(
            manager.file_path("alice", "../bob/secret.mp3").await,
            Err(NamespaceError::InvalidFilename(_))
        ));
        assert!(dir.path().join("bob").join("secret.mp3").exists());
    }

    #[tokio::test]
    async fn test_file_path() {
        let (_dir, manager) = manager();
        manager.ensure("alice").await.unwrap();
        let written = manager.write("alice", "a.mp3", b"a").await.unwrap();

        assert_eq!(manager.file_path("alice", "a.mp3").await.unwrap(), written);
        assert!(matches!(
            manager.file_path("alice", "b.mp3").await,
            Err(NamespaceError::FileNotFound)
        ));
    }
}
