//! Streams stored media back to a requester.
//!
//! Everything saved is returned to any requester; there is no
//! per-sender filtering and no pagination.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::adapters::{ChatRef, ChatSink};
use crate::storage::{AudioCatalog, MediaCategory, MediaStore};

/// Reply when no voice messages are available
pub const NO_AUDIO_TEXT: &str = "No saved voice messages.";

/// Reply when no photos are available
pub const NO_PHOTO_TEXT: &str = "No saved photos.";

/// Serves stored media on request
pub struct Retrieval {
    store: MediaStore,
    catalog: AudioCatalog,
    sink: Arc<dyn ChatSink>,
}

impl Retrieval {
    pub fn new(store: MediaStore, catalog: AudioCatalog, sink: Arc<dyn ChatSink>) -> Self {
        Self {
            store,
            catalog,
            sink,
        }
    }

    /// Send every cataloged voice message, in insertion order.
    ///
    /// A cataloged path missing on disk aborts the remaining batch with
    /// the "nothing saved" reply. Known-coarse behavior, kept as-is from
    /// the original system.
    pub async fn send_audio(&self, chat: ChatRef) -> Result<()> {
        if !self.catalog.exists().await? {
            self.sink.reply(chat, NO_AUDIO_TEXT).await?;
            return Ok(());
        }

        let paths = self.catalog.all_paths().await?;
        if paths.is_empty() {
            self.sink.reply(chat, NO_AUDIO_TEXT).await?;
            return Ok(());
        }

        for relative in paths {
            let absolute = self.store.resolve(&relative);

            if tokio::fs::metadata(&absolute).await.is_err() {
                warn!(
                    path = %absolute.display(),
                    "cataloged audio file missing, aborting batch"
                );
                self.sink.reply(chat, NO_AUDIO_TEXT).await?;
                return Ok(());
            }

            self.sink
                .send_audio(chat, &absolute)
                .await
                .with_context(|| format!("Failed to send audio: {}", absolute.display()))?;
        }

        Ok(())
    }

    /// Send every stored photo, in directory order.
    ///
    /// Only photos that passed face detection are present in the photo
    /// directory.
    pub async fn send_photos(&self, chat: ChatRef) -> Result<()> {
        let photos = self.store.list(MediaCategory::Photo).await?;

        if photos.is_empty() {
            self.sink.reply(chat, NO_PHOTO_TEXT).await?;
            return Ok(());
        }

        for relative in photos {
            let absolute = self.store.resolve(&relative);

            self.sink
                .send_photo(chat, &absolute)
                .await
                .with_context(|| format!("Failed to send photo: {}", absolute.display()))?;
        }

        Ok(())
    }
}
