//! Face detection backend.
//!
//! Shells out to an external detector binary for classification. The
//! pipeline only sees the [`FaceDetector`] trait; an empty region list
//! means "no face".

use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// One detected face, in pixel bounds.
///
/// Field order follows the detector contract: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FaceRegion {
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub left: i64,
}

/// Finds face bounding regions in an image
#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<Vec<FaceRegion>>;
}

/// Runs the configured external detector binary.
///
/// The program is invoked as `<program> <image-path>` and must print a
/// JSON array of face regions on stdout, e.g.
/// `[{"top":10,"right":90,"bottom":80,"left":20}]`.
pub struct CommandFaceDetector {
    program: String,
}

impl CommandFaceDetector {
    /// Create a detector that runs the given program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl FaceDetector for CommandFaceDetector {
    async fn detect(&self, image: &[u8]) -> Result<Vec<FaceRegion>> {
        // The detector reads its input from a file, not stdin
        let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;
        let image_path = temp_dir.path().join("input.jpg");

        tokio::fs::write(&image_path, image)
            .await
            .context("Failed to stage image for detection")?;

        let output = Command::new(&self.program)
            .arg(&image_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run face detector: {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Face detector failed: {}", stderr);
        }

        parse_regions(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the detector's stdout (a JSON array of regions)
fn parse_regions(stdout: &str) -> Result<Vec<FaceRegion>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(trimmed).context("Failed to parse face detector output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_regions("").unwrap().is_empty());
        assert!(parse_regions("  \n").unwrap().is_empty());
        assert!(parse_regions("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_regions() {
        let regions = parse_regions(
            r#"[{"top":10,"right":90,"bottom":80,"left":20},
                {"top":5,"right":40,"bottom":35,"left":12}]"#,
        )
        .unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(
            regions[0],
            FaceRegion {
                top: 10,
                right: 90,
                bottom: 80,
                left: 20
            }
        );
    }

    #[test]
    fn test_parse_malformed_output_is_an_error() {
        assert!(parse_regions("not json").is_err());
        assert!(parse_regions(r#"{"top":1}"#).is_err());
    }
}
