//! Audio transcoding backend.
//!
//! Shells out to ffmpeg to produce the derived rendition of a voice
//! message. Formats are named by file extension; ffmpeg infers codecs
//! from them.

use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

/// Converts audio between container formats at a target sample rate
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(
        &self,
        input: &[u8],
        source_format: &str,
        target_format: &str,
        sample_rate: u32,
    ) -> Result<Vec<u8>>;
}

/// Transcode audio using a local ffmpeg binary
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    /// Create a transcoder that runs the given ffmpeg binary
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        input: &[u8],
        source_format: &str,
        target_format: &str,
        sample_rate: u32,
    ) -> Result<Vec<u8>> {
        let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;
        let input_path = temp_dir.path().join(format!("input.{}", source_format));
        let output_path = temp_dir.path().join(format!("output.{}", target_format));

        tokio::fs::write(&input_path, input)
            .await
            .context("Failed to stage audio for transcoding")?;

        let output = Command::new(&self.program)
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
            .arg("-i")
            .arg(&input_path)
            .arg("-ar")
            .arg(sample_rate.to_string())
            .arg(&output_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run ffmpeg: {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg failed: {}", stderr);
        }

        tokio::fs::read(&output_path)
            .await
            .context("Failed to read transcoded audio")
    }
}
