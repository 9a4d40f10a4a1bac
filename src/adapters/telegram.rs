//! Telegram Bot API transport.
//!
//! Long polling via teloxide with a single message endpoint: command
//! text goes to the retrieval service, voice and photo messages go to
//! the ingestion pipeline, everything else is ignored. A failure inside
//! one handler is logged and never tears down the dispatcher.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, FileId, InputFile, PhotoSize, Voice};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info};

use crate::adapters::{ChatRef, ChatSink, MediaSource};
use crate::config::Config;
use crate::ingest::{CommandFaceDetector, FfmpegTranscoder, Ingestor, PhotoEvent, VoiceEvent};
use crate::retrieval::Retrieval;
use crate::storage::{AudioCatalog, MediaStore};

/// Usage text for /start
const START_TEXT: &str = "Hi! I am a bot that saves voice messages and photos. \
Send me a voice message or a photo. \
A photo is saved only if faces are detected on it; \
voice messages are always saved. \
To get the saved photos or audio back, \
use the /get_audio or /get_photo commands.";

/// Commands surfaced to users
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "These commands are supported:")]
pub enum Command {
    /// Show usage
    #[command(description = "show usage")]
    Start,

    /// Send back all saved voice messages
    #[command(description = "get the saved voice messages")]
    GetAudio,

    /// Send back all saved photos
    #[command(description = "get the saved photos")]
    GetPhoto,
}

/// Fetches uploaded files through the Bot API
pub struct TelegramSource {
    bot: Bot,
}

impl TelegramSource {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MediaSource for TelegramSource {
    /// `getFile` resolves the server-side path, then the content is
    /// downloaded as bytes.
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_owned()))
            .await
            .context("Failed to resolve file on Telegram")?;

        let mut buf = Vec::new();
        self.bot
            .download_file(&file.path, &mut buf)
            .await
            .context("Failed to download file from Telegram")?;

        debug!(file_id, size = buf.len(), "downloaded file from Telegram");
        Ok(buf)
    }
}

/// Delivers replies and attachments through the Bot API
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatSink for TelegramSink {
    async fn reply(&self, chat: ChatRef, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.0), text)
            .await
            .context("Failed to send Telegram message")?;
        Ok(())
    }

    async fn send_audio(&self, chat: ChatRef, path: &Path) -> Result<()> {
        self.bot
            .send_audio(ChatId(chat.0), InputFile::file(path))
            .await
            .context("Failed to send Telegram audio")?;
        Ok(())
    }

    async fn send_photo(&self, chat: ChatRef, path: &Path) -> Result<()> {
        self.bot
            .send_photo(ChatId(chat.0), InputFile::file(path))
            .await
            .context("Failed to send Telegram photo")?;
        Ok(())
    }
}

/// Start the bot and poll until interrupted.
pub async fn run(config: Config) -> Result<()> {
    let token = config.require_token()?;
    let bot = Bot::new(token);

    // Validates the token before any polling starts
    let me = bot
        .get_me()
        .await
        .context("Failed to reach Telegram; check the token")?;

    info!(username = me.username(), "starting Telegram long polling");

    let store = MediaStore::new(&config.data_dir);
    let catalog = AudioCatalog::new(&config.db_path);
    let sink: Arc<dyn ChatSink> = Arc::new(TelegramSink::new(bot.clone()));

    let ingestor = Arc::new(Ingestor::new(
        store.clone(),
        catalog.clone(),
        Arc::new(TelegramSource::new(bot.clone())),
        sink.clone(),
        Arc::new(CommandFaceDetector::new(&config.detector_program)),
        Arc::new(FfmpegTranscoder::new(&config.ffmpeg_program)),
        config.sample_rate,
    ));
    let retrieval = Arc::new(Retrieval::new(store, catalog, sink.clone()));

    let username = me.username().to_owned();

    let handler = Update::filter_message().endpoint(move |msg: Message| {
        let ingestor = ingestor.clone();
        let retrieval = retrieval.clone();
        let sink = sink.clone();
        let username = username.clone();

        async move {
            if let Err(e) = dispatch(&msg, &username, &ingestor, &retrieval, &sink).await {
                error!(error = ?e, msg_id = msg.id.0, "message handler failed");
            }
            respond(())
        }
    });

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {}) // Silently ignore non-message updates
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Route one inbound message to a command handler or the pipeline.
async fn dispatch(
    msg: &Message,
    bot_username: &str,
    ingestor: &Ingestor,
    retrieval: &Retrieval,
    sink: &Arc<dyn ChatSink>,
) -> Result<()> {
    let chat = ChatRef(msg.chat.id.0);

    // Command message
    if let Some(text) = msg.text() {
        match Command::parse(text, bot_username) {
            Ok(command) => return handle_command(command, chat, retrieval, sink).await,
            Err(_) => {
                debug!(msg_id = msg.id.0, "ignoring non-command text");
                return Ok(());
            }
        }
    }

    // Media messages need a sender name for the storage path.
    let Some(sender) = msg.from.as_ref().map(|u| u.first_name.clone()) else {
        debug!(msg_id = msg.id.0, "ignoring message without a sender");
        return Ok(());
    };

    // Voice message
    if let Some(voice) = msg.voice() {
        let event = voice_event(chat, sender, voice);
        ingestor.ingest_voice(&event).await?;
        return Ok(());
    }

    // Photo message
    if let Some(photos) = msg.photo() {
        let Some(event) = photo_event(chat, sender, photos) else {
            debug!(msg_id = msg.id.0, "ignoring photo message without variants");
            return Ok(());
        };
        ingestor.ingest_photo(&event).await?;
        return Ok(());
    }

    debug!(msg_id = msg.id.0, "ignoring unsupported message type");
    Ok(())
}

async fn handle_command(
    command: Command,
    chat: ChatRef,
    retrieval: &Retrieval,
    sink: &Arc<dyn ChatSink>,
) -> Result<()> {
    match command {
        Command::Start => sink.reply(chat, START_TEXT).await,
        Command::GetAudio => retrieval.send_audio(chat).await,
        Command::GetPhoto => retrieval.send_photos(chat).await,
    }
}

/// Build the ingestion event for a voice message
fn voice_event(chat: ChatRef, sender: String, voice: &Voice) -> VoiceEvent {
    VoiceEvent {
        chat,
        sender,
        file_id: voice.file.id.to_string(),
    }
}

/// Build the ingestion event for a photo message.
///
/// Telegram provides multiple sizes; the last one is the largest.
fn photo_event(chat: ChatRef, sender: String, photos: &[PhotoSize]) -> Option<PhotoEvent> {
    let largest = photos.last()?;

    Some(PhotoEvent {
        chat,
        sender,
        file_id: largest.file.id.to_string(),
    })
}
