//! Adapter interfaces for the messaging platform.
//!
//! The pipeline and the retrieval service talk to the platform through
//! two narrow ports: fetching an uploaded file's bytes and delivering
//! replies or attachments to a chat. The Telegram implementation lives
//! in [`telegram`].

pub mod telegram;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

// Re-export the Telegram adapter
pub use telegram::{TelegramSink, TelegramSource};

/// Identifies the chat a reply or attachment goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatRef(pub i64);

/// Fetches an uploaded file's raw bytes by its provider file id
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>>;
}

/// Delivers text replies and media attachments to a chat
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Send a text reply
    async fn reply(&self, chat: ChatRef, text: &str) -> Result<()>;

    /// Send a stored voice message as an audio attachment
    async fn send_audio(&self, chat: ChatRef, path: &Path) -> Result<()>;

    /// Send a stored photo as a photo attachment
    async fn send_photo(&self, chat: ChatRef, path: &Path) -> Result<()>;
}
