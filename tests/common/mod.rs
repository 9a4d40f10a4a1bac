//! Shared test doubles for the pipeline's external ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use mediakeep::{ChatRef, ChatSink, FaceDetector, FaceRegion, MediaSource, Transcoder};

/// In-memory file source keyed by provider file id
pub struct MapSource {
    files: HashMap<String, Vec<u8>>,
}

impl MapSource {
    pub fn empty() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    pub fn new<'a>(files: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Self {
        Self {
            files: files
                .into_iter()
                .map(|(id, bytes)| (id.to_string(), bytes.to_vec()))
                .collect(),
        }
    }
}

#[async_trait]
impl MediaSource for MapSource {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown file id: {file_id}"))
    }
}

/// Detector returning a fixed verdict
pub struct StubDetector {
    regions: Vec<FaceRegion>,
    fail: bool,
}

impl StubDetector {
    /// Always reports the given number of faces
    pub fn faces(count: usize) -> Self {
        let regions = (0..count)
            .map(|i| FaceRegion {
                top: 10 * i as i64,
                right: 90,
                bottom: 10 * i as i64 + 50,
                left: 20,
            })
            .collect();

        Self {
            regions,
            fail: false,
        }
    }

    /// Always errors
    pub fn failing() -> Self {
        Self {
            regions: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl FaceDetector for StubDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<FaceRegion>> {
        if self.fail {
            anyhow::bail!("detector exploded");
        }
        Ok(self.regions.clone())
    }
}

/// Transcoder returning fixed bytes, or failing
pub struct StubTranscoder {
    output: Option<Vec<u8>>,
}

impl StubTranscoder {
    pub fn producing(bytes: &[u8]) -> Self {
        Self {
            output: Some(bytes.to_vec()),
        }
    }

    pub fn failing() -> Self {
        Self { output: None }
    }
}

#[async_trait]
impl Transcoder for StubTranscoder {
    async fn transcode(
        &self,
        _input: &[u8],
        _source_format: &str,
        _target_format: &str,
        _sample_rate: u32,
    ) -> Result<Vec<u8>> {
        match &self.output {
            Some(bytes) => Ok(bytes.clone()),
            None => anyhow::bail!("transcoder exploded"),
        }
    }
}

/// Everything a handler delivered to the chat, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply(i64, String),
    Audio(i64, PathBuf),
    Photo(i64, PathBuf),
}

/// Records outbound traffic instead of talking to a bot API
#[derive(Default)]
pub struct RecordingSink {
    items: Mutex<Vec<Sent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Sent> {
        self.items.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Reply(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn attachment_count(&self) -> usize {
        self.all()
            .iter()
            .filter(|sent| !matches!(sent, Sent::Reply(..)))
            .count()
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn reply(&self, chat: ChatRef, text: &str) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .push(Sent::Reply(chat.0, text.to_string()));
        Ok(())
    }

    async fn send_audio(&self, chat: ChatRef, path: &Path) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .push(Sent::Audio(chat.0, path.to_path_buf()));
        Ok(())
    }

    async fn send_photo(&self, chat: ChatRef, path: &Path) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .push(Sent::Photo(chat.0, path.to_path_buf()));
        Ok(())
    }
}
