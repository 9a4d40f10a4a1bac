//! The media ingestion pipeline.
//!
//! Orchestrates one inbound media item: download, classify, persist,
//! record, reply. Voice messages are always kept; photos survive only
//! when face detection finds at least one face.
//!
//! Ordering contract for voice messages: the catalog row is committed
//! before the user-visible acknowledgment, and transcoding runs after
//! it. A transcoding failure therefore never retracts the row or the
//! ack; the original OGG plus its row are the durable state.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::{ChatRef, ChatSink, MediaSource};
use crate::ingest::{FaceDetector, Transcoder};
use crate::storage::{AudioCatalog, MediaCategory, MediaStore};

/// Reply sent after a voice message is saved
pub const VOICE_SAVED_TEXT: &str = "Voice message saved to the database!";

/// Reply sent after a photo with faces is saved
pub const PHOTO_SAVED_TEXT: &str = "Photo with faces saved!";

/// Reply sent when no faces are found on a photo
pub const PHOTO_REJECTED_TEXT: &str = "No faces were detected, so the photo was not saved.";

const VOICE_SOURCE_FORMAT: &str = "ogg";
const VOICE_TARGET_FORMAT: &str = "wav";

/// An inbound voice message
#[derive(Debug, Clone)]
pub struct VoiceEvent {
    pub chat: ChatRef,
    /// Sender display name, used as a path component
    pub sender: String,
    /// Provider-issued file identifier, assumed unique per upload
    pub file_id: String,
}

/// An inbound photo (the highest-resolution variant)
#[derive(Debug, Clone)]
pub struct PhotoEvent {
    pub chat: ChatRef,
    pub sender: String,
    pub file_id: String,
}

/// Paths produced by a successful voice ingestion
#[derive(Debug, Clone)]
pub struct VoiceOutcome {
    /// Store-relative path of the original OGG
    pub original: PathBuf,
    /// Store-relative path of the derived WAV
    pub converted: PathBuf,
}

/// Terminal state of a photo ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoOutcome {
    /// Faces found; holds the accepted file's store-relative path
    Accepted(PathBuf),
    /// No faces found; nothing was kept
    Rejected,
}

/// Orchestrates ingestion of inbound media
pub struct Ingestor {
    store: MediaStore,
    catalog: AudioCatalog,
    source: Arc<dyn MediaSource>,
    sink: Arc<dyn ChatSink>,
    detector: Arc<dyn FaceDetector>,
    transcoder: Arc<dyn Transcoder>,
    sample_rate: u32,
}

impl Ingestor {
    pub fn new(
        store: MediaStore,
        catalog: AudioCatalog,
        source: Arc<dyn MediaSource>,
        sink: Arc<dyn ChatSink>,
        detector: Arc<dyn FaceDetector>,
        transcoder: Arc<dyn Transcoder>,
        sample_rate: u32,
    ) -> Self {
        Self {
            store,
            catalog,
            source,
            sink,
            detector,
            transcoder,
            sample_rate,
        }
    }

    /// Ingest a voice message: store the original, record it in the
    /// catalog, acknowledge, then derive the WAV rendition.
    pub async fn ingest_voice(&self, event: &VoiceEvent) -> Result<VoiceOutcome> {
        let bytes = self
            .source
            .fetch(&event.file_id)
            .await
            .context("Failed to download voice message")?;

        let original = self
            .store
            .write(MediaCategory::AudioOgg, &event.sender, &event.file_id, &bytes)
            .await?;

        // The row must be committed before the user sees the ack.
        self.catalog
            .append(&event.sender, &original.to_string_lossy())
            .await
            .context("Failed to record voice message in catalog")?;

        self.sink.reply(event.chat, VOICE_SAVED_TEXT).await?;

        let wav = self
            .transcoder
            .transcode(
                &bytes,
                VOICE_SOURCE_FORMAT,
                VOICE_TARGET_FORMAT,
                self.sample_rate,
            )
            .await
            .context("Failed to transcode voice message")?;

        let converted = self
            .store
            .write(MediaCategory::AudioWav, &event.sender, &event.file_id, &wav)
            .await?;

        info!(
            sender = %event.sender,
            file_id = %event.file_id,
            "voice message saved"
        );

        Ok(VoiceOutcome {
            original,
            converted,
        })
    }

    /// Ingest a photo: keep it only when the detector finds a face.
    ///
    /// Any number of detected faces ≥1 is treated the same; the count is
    /// not recorded. A detector error propagates with no reply, and the
    /// provisional file is cleaned up by its guard.
    pub async fn ingest_photo(&self, event: &PhotoEvent) -> Result<PhotoOutcome> {
        let bytes = self
            .source
            .fetch(&event.file_id)
            .await
            .context("Failed to download photo")?;

        let provisional = self
            .store
            .begin_photo(&event.sender, &event.file_id, &bytes)
            .await?;

        let faces = self
            .detector
            .detect(&bytes)
            .await
            .context("Face detection failed")?;

        debug!(
            sender = %event.sender,
            faces = faces.len(),
            "face detection finished"
        );

        if faces.is_empty() {
            provisional.discard().await?;
            self.sink.reply(event.chat, PHOTO_REJECTED_TEXT).await?;
            return Ok(PhotoOutcome::Rejected);
        }

        let accepted = provisional.promote().await?;
        self.sink.reply(event.chat, PHOTO_SAVED_TEXT).await?;

        info!(
            sender = %event.sender,
            file_id = %event.file_id,
            "photo with faces saved"
        );

        Ok(PhotoOutcome::Accepted(accepted))
    }
}
