//! Configuration for mediakeep.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags
//! 2. Environment variables (TELEGRAM_TOKEN, MEDIAKEEP_HOME,
//!    FFMPEG_PATH, FACE_DETECTOR_PATH)
//! 3. Config file (<data-dir>/mediakeep.yaml)
//! 4. Defaults
//!
//! The resolved value is an immutable [`Config`] constructed once at
//! startup and passed explicitly to the components that need it. There
//! is no process-global configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Sample rate of the derived WAV rendition.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

const CONFIG_FILE_NAME: &str = "mediakeep.yaml";
const DB_FILE_NAME: &str = "audio_messages.db";
const DEFAULT_FFMPEG: &str = "ffmpeg";
const DEFAULT_DETECTOR: &str = "face-detector";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Catalog database file (relative to the data directory)
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    pub ffmpeg: Option<String>,
    pub face_detector: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: Option<u32>,
}

/// Values supplied on the command line, applied over env/file/defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// Resolved configuration with absolute precedence already applied
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot authentication token; absence is fatal at `run` time only
    pub token: Option<String>,
    /// Directory holding the media subdirectories and the catalog db
    pub data_dir: PathBuf,
    /// Path to the catalog database
    pub db_path: PathBuf,
    /// Transcoder binary
    pub ffmpeg_program: String,
    /// Face detector binary
    pub detector_program: String,
    /// Target sample rate for the WAV rendition
    pub sample_rate: u32,
}

impl Config {
    /// Load configuration from all sources.
    pub fn load(overrides: Overrides) -> Result<Self> {
        let data_dir = overrides
            .data_dir
            .or_else(|| std::env::var("MEDIAKEEP_HOME").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let file = {
            let path = data_dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                load_config_file(&path)?
            } else {
                ConfigFile::default()
            }
        };

        let token = overrides
            .token
            .or_else(|| std::env::var("TELEGRAM_TOKEN").ok())
            .filter(|t| !t.is_empty());

        let db_path = match file.paths.database {
            Some(ref db) => resolve_path(&data_dir, db),
            None => data_dir.join(DB_FILE_NAME),
        };

        let ffmpeg_program = std::env::var("FFMPEG_PATH")
            .ok()
            .or(file.tools.ffmpeg)
            .unwrap_or_else(|| DEFAULT_FFMPEG.to_string());

        let detector_program = std::env::var("FACE_DETECTOR_PATH")
            .ok()
            .or(file.tools.face_detector)
            .unwrap_or_else(|| DEFAULT_DETECTOR.to_string());

        let sample_rate = file.audio.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);

        Ok(Self {
            token,
            data_dir,
            db_path,
            ffmpeg_program,
            detector_program,
            sample_rate,
        })
    }

    /// The token is the one required setting: refuse to start without it.
    pub fn require_token(&self) -> Result<&str> {
        match self.token.as_deref() {
            Some(token) => Ok(token),
            None => {
                tracing::error!("missing token: TELEGRAM_TOKEN");
                anyhow::bail!("TELEGRAM_TOKEN is not set; export it or pass --token")
            }
        }
    }
}

/// Load and parse a config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the data directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
paths:
  database: catalog.db
tools:
  ffmpeg: /usr/local/bin/ffmpeg
  face_detector: detect-faces
audio:
  sample_rate: 8000
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.paths.database, Some("catalog.db".to_string()));
        assert_eq!(config.tools.ffmpeg, Some("/usr/local/bin/ffmpeg".to_string()));
        assert_eq!(config.audio.sample_rate, Some(8000));
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Overrides {
            token: Some("123:abc".into()),
            data_dir: Some(temp.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(config.db_path, temp.path().join(DB_FILE_NAME));
        assert_eq!(config.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(config.token.as_deref(), Some("123:abc"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, "paths:\n  database: nested/media.db\naudio:\n  sample_rate: 22050\n").unwrap();

        let config = Config::load(Overrides {
            token: None,
            data_dir: Some(temp.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(config.db_path, temp.path().join("nested/media.db"));
        assert_eq!(config.sample_rate, 22050);
    }

    #[test]
    fn test_require_token() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::load(Overrides {
            token: Some("123:abc".into()),
            data_dir: Some(temp.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(config.require_token().unwrap(), "123:abc");

        config.token = None;
        assert!(config.require_token().is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/srv/mediakeep");

        assert_eq!(
            resolve_path(&base, "catalog.db"),
            PathBuf::from("/srv/mediakeep/catalog.db")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path.db"),
            PathBuf::from("/absolute/path.db")
        );
    }
}
