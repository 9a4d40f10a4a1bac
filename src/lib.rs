//! mediakeep - Telegram media archiving bot
//!
//! A bot that saves inbound voice messages unconditionally (keeping the
//! original OGG plus a 16 kHz WAV rendition) and saves inbound photos
//! only when face detection finds at least one face. Stored media is
//! streamed back to the requester on demand.
//!
//! # Architecture
//!
//! One inbound message is processed to completion at a time:
//! - Voice: download → write OGG → catalog row → ack → transcode to WAV
//! - Photo: download → provisional write → detect faces → keep or discard
//!
//! Face detection and audio transcoding are external programs behind
//! narrow trait contracts; the bot transport is Telegram long polling.
//!
//! # Modules
//!
//! - `adapters`: transport ports and the Telegram implementation
//! - `ingest`: the ingestion pipeline and its external-tool ports
//! - `storage`: media store (filesystem) and audio catalog (SQLite)
//! - `retrieval`: streams stored media back to a requester
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Start the bot (long polling)
//! TELEGRAM_TOKEN=... mediakeep run
//!
//! # Show resolved configuration
//! mediakeep config
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod retrieval;
pub mod storage;

// Re-export main types at crate root for convenience
pub use adapters::{ChatRef, ChatSink, MediaSource};
pub use config::Config;
pub use ingest::{
    CommandFaceDetector, FaceDetector, FaceRegion, FfmpegTranscoder, Ingestor, PhotoEvent,
    PhotoOutcome, Transcoder, VoiceEvent, VoiceOutcome,
};
pub use retrieval::Retrieval;
pub use storage::{AudioCatalog, CatalogError, MediaCategory, MediaStore, ProvisionalPhoto};
