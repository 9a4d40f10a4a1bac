//! Media ingestion pipeline.
//!
//! One inbound media item flows through:
//!
//! 1. **Download**: fetch the raw bytes from the platform
//! 2. **Classify**: always-keep for voice; face detection for photos
//! 3. **Persist**: media store write, catalog row for voice
//! 4. **Reply**: acknowledge or reject
//! 5. **Derive** (voice only): transcode the original to 16 kHz WAV
//!
//! ```text
//! inbound message → Ingestor → MediaStore / AudioCatalog
//!                      ↓
//!                  reply to sender
//! ```
//!
//! Face detection and transcoding are external programs behind the
//! [`FaceDetector`] and [`Transcoder`] traits.

pub mod detector;
pub mod pipeline;
pub mod transcoder;

// Re-export key types
pub use detector::{CommandFaceDetector, FaceDetector, FaceRegion};
pub use pipeline::{
    Ingestor, PhotoEvent, PhotoOutcome, VoiceEvent, VoiceOutcome, PHOTO_REJECTED_TEXT,
    PHOTO_SAVED_TEXT, VOICE_SAVED_TEXT,
};
pub use transcoder::{FfmpegTranscoder, Transcoder};
