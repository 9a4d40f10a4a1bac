//! Filesystem layout for raw and derived media.
//!
//! Paths are derived deterministically from `(category, sender, file id)`
//! and returned relative to the store root, so catalog rows stay portable
//! across machines.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::warn;

/// Prefix marking a photo that passed face detection.
const ACCEPTED_PHOTO_PREFIX: &str = "face";

/// Media categories and their on-disk directories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    /// Original voice messages as received
    AudioOgg,
    /// Derived 16 kHz renditions
    AudioWav,
    /// Photos (accepted ones only survive ingestion)
    Photo,
}

impl MediaCategory {
    /// Directory name under the store root
    pub fn dir(self) -> &'static str {
        match self {
            Self::AudioOgg => "audio_ogg",
            Self::AudioWav => "audio_wav",
            Self::Photo => "photo",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::AudioOgg | Self::AudioWav => "audio",
            Self::Photo => "photo",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::AudioOgg => "ogg",
            Self::AudioWav => "wav",
            Self::Photo => "jpg",
        }
    }
}

/// Filesystem store for raw and derived media
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative path for a media item: `<dir>/<prefix>_<sender>_<fileId>.<ext>`
    pub fn relative_path(&self, category: MediaCategory, sender: &str, file_id: &str) -> PathBuf {
        PathBuf::from(category.dir()).join(format!(
            "{}_{}_{}.{}",
            category.prefix(),
            sender,
            file_id,
            category.extension()
        ))
    }

    /// Absolute path for a store-relative path
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative.as_ref())
    }

    /// Write a media item, creating the category directory if absent.
    ///
    /// Returns the store-relative path of the written file.
    pub async fn write(
        &self,
        category: MediaCategory,
        sender: &str,
        file_id: &str,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let relative = self.relative_path(category, sender, file_id);
        let absolute = self.resolve(&relative);

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create media directory: {}", parent.display())
            })?;
        }

        fs::write(&absolute, bytes)
            .await
            .with_context(|| format!("Failed to write media file: {}", absolute.display()))?;

        Ok(relative)
    }

    /// Rename a media item within the store
    pub async fn rename(
        &self,
        old_relative: impl AsRef<Path>,
        new_relative: impl AsRef<Path>,
    ) -> Result<()> {
        let old_abs = self.resolve(old_relative);
        let new_abs = self.resolve(new_relative);

        fs::rename(&old_abs, &new_abs).await.with_context(|| {
            format!(
                "Failed to rename {} to {}",
                old_abs.display(),
                new_abs.display()
            )
        })
    }

    /// Delete a media item
    pub async fn delete(&self, relative: impl AsRef<Path>) -> Result<()> {
        let absolute = self.resolve(relative);

        fs::remove_file(&absolute)
            .await
            .with_context(|| format!("Failed to delete media file: {}", absolute.display()))
    }

    /// List a category's files as store-relative paths.
    ///
    /// Returns an empty list when the directory does not exist. Entries
    /// come back in directory order, which is OS-dependent.
    pub async fn list(&self, category: MediaCategory) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(category.dir());
        let mut files = Vec::new();

        if !dir.exists() {
            return Ok(files);
        }

        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("Failed to read media directory: {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(PathBuf::from(category.dir()).join(entry.file_name()));
            }
        }

        Ok(files)
    }

    /// Write a photo under its provisional name and return the guard that
    /// decides its fate. See [`ProvisionalPhoto`].
    pub async fn begin_photo(
        &self,
        sender: &str,
        file_id: &str,
        bytes: &[u8],
    ) -> Result<ProvisionalPhoto> {
        let provisional = self
            .write(MediaCategory::Photo, sender, file_id, bytes)
            .await?;

        let accepted = PathBuf::from(MediaCategory::Photo.dir()).join(format!(
            "{}_{}_{}.{}",
            ACCEPTED_PHOTO_PREFIX,
            sender,
            file_id,
            MediaCategory::Photo.extension()
        ));

        Ok(ProvisionalPhoto {
            store: self.clone(),
            provisional,
            accepted,
            resolved: false,
        })
    }
}

/// A downloaded photo awaiting its classification verdict.
///
/// Exactly one terminal state per photo: [`promote`](Self::promote)
/// renames the file to the accepted `face_` name, [`discard`](Self::discard)
/// deletes it. Dropping an unresolved guard deletes the provisional file,
/// so no exit path leaves a stray file behind.
#[derive(Debug)]
pub struct ProvisionalPhoto {
    store: MediaStore,
    provisional: PathBuf,
    accepted: PathBuf,
    resolved: bool,
}

impl ProvisionalPhoto {
    /// Store-relative path of the provisional file
    pub fn provisional_path(&self) -> &Path {
        &self.provisional
    }

    /// Keep the photo: rename it to the accepted name.
    ///
    /// Returns the store-relative path of the accepted file.
    pub async fn promote(mut self) -> Result<PathBuf> {
        self.store.rename(&self.provisional, &self.accepted).await?;
        self.resolved = true;
        Ok(self.accepted.clone())
    }

    /// Reject the photo: delete the provisional file.
    pub async fn discard(mut self) -> Result<()> {
        self.store.delete(&self.provisional).await?;
        self.resolved = true;
        Ok(())
    }
}

impl Drop for ProvisionalPhoto {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        let absolute = self.store.resolve(&self.provisional);
        if let Err(e) = std::fs::remove_file(&absolute) {
            warn!(
                path = %absolute.display(),
                error = %e,
                "failed to clean up provisional photo"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (MediaStore, TempDir) {
        let temp = TempDir::new().unwrap();
        (MediaStore::new(temp.path()), temp)
    }

    #[test]
    fn test_relative_path_naming() {
        let (store, _temp) = test_store();

        assert_eq!(
            store.relative_path(MediaCategory::AudioOgg, "Ann", "F1"),
            PathBuf::from("audio_ogg/audio_Ann_F1.ogg")
        );
        assert_eq!(
            store.relative_path(MediaCategory::AudioWav, "Ann", "F1"),
            PathBuf::from("audio_wav/audio_Ann_F1.wav")
        );
        assert_eq!(
            store.relative_path(MediaCategory::Photo, "Bob", "F2"),
            PathBuf::from("photo/photo_Bob_F2.jpg")
        );
    }

    #[tokio::test]
    async fn test_write_creates_directory_and_file() {
        let (store, temp) = test_store();

        let rel = store
            .write(MediaCategory::AudioOgg, "Ann", "F1", b"ogg bytes")
            .await
            .unwrap();

        assert_eq!(rel, PathBuf::from("audio_ogg/audio_Ann_F1.ogg"));
        let content = tokio::fs::read(temp.path().join(&rel)).await.unwrap();
        assert_eq!(content, b"ogg bytes");
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let (store, _temp) = test_store();

        let files = store.list(MediaCategory::Photo).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_written_files() {
        let (store, _temp) = test_store();

        store
            .write(MediaCategory::AudioOgg, "Ann", "F1", b"a")
            .await
            .unwrap();
        store
            .write(MediaCategory::AudioOgg, "Bob", "F2", b"b")
            .await
            .unwrap();

        let mut files = store.list(MediaCategory::AudioOgg).await.unwrap();
        files.sort();
        assert_eq!(
            files,
            vec![
                PathBuf::from("audio_ogg/audio_Ann_F1.ogg"),
                PathBuf::from("audio_ogg/audio_Bob_F2.ogg"),
            ]
        );
    }

    #[tokio::test]
    async fn test_promote_renames_to_accepted_name() {
        let (store, temp) = test_store();

        let photo = store.begin_photo("Ann", "F1", b"jpeg").await.unwrap();
        assert!(temp.path().join("photo/photo_Ann_F1.jpg").exists());

        let accepted = photo.promote().await.unwrap();
        assert_eq!(accepted, PathBuf::from("photo/face_Ann_F1.jpg"));
        assert!(temp.path().join("photo/face_Ann_F1.jpg").exists());
        assert!(!temp.path().join("photo/photo_Ann_F1.jpg").exists());
    }

    #[tokio::test]
    async fn test_discard_removes_provisional_file() {
        let (store, temp) = test_store();

        let photo = store.begin_photo("Bob", "F2", b"jpeg").await.unwrap();
        photo.discard().await.unwrap();

        assert!(!temp.path().join("photo/photo_Bob_F2.jpg").exists());
        let files = store.list(MediaCategory::Photo).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_guard_cleans_up() {
        let (store, temp) = test_store();

        {
            let _photo = store.begin_photo("Ann", "F3", b"jpeg").await.unwrap();
            // Dropped without promote/discard, as on a detector error.
        }

        assert!(!temp.path().join("photo/photo_Ann_F3.jpg").exists());
    }
}
