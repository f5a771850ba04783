use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::BatchError;

const LOCAL_CONFIG_FILE: &str = "mp3-batch.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External downloader settings
    pub downloader: DownloaderConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Downloader executable (resolved on PATH)
    pub command: String,

    /// Transcoder executable; only checked for presence, yt-dlp invokes it
    pub transcoder: String,

    /// Target audio format passed to `--audio-format`
    pub audio_format: String,

    /// Audio quality passed to `--audio-quality` (0 = best)
    pub audio_quality: String,

    /// Network retries passed to `--retries`
    pub retries: u32,

    /// Fragment retries passed to `--fragment-retries`
    pub fragment_retries: u32,

    /// Number of items downloaded from a mix playlist
    pub mix_item_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// File with one URL per line
    pub input_file: PathBuf,

    /// Root folder for downloads
    pub output_dir: PathBuf,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            command: "yt-dlp".to_string(),
            transcoder: "ffmpeg".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "0".to_string(),
            retries: 5,
            fragment_retries: 5,
            mix_item_limit: 50,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("urls.txt"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, the first config file found, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(BatchError::Configuration(format!(
                        "Config file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                Some(path.to_path_buf())
            }
            None => Self::discover(),
        };

        let config = match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).map_err(|e| {
            BatchError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            BatchError::Configuration(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
            .into()
        })
    }

    /// First existing config file: working directory, then the user config dir
    fn discover() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        Self::user_config_path().ok().filter(|path| path.exists())
    }

    /// Path of the per-user config file
    pub fn user_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("mp3-batch").join("config.yaml"))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> {
            Err(BatchError::Configuration(format!("Invalid configuration: {}", msg)).into())
        };

        if self.downloader.command.trim().is_empty() {
            return invalid("downloader command must not be empty");
        }
        if self.downloader.transcoder.trim().is_empty() {
            return invalid("transcoder command must not be empty");
        }
        if self.downloader.audio_format.trim().is_empty() {
            return invalid("audio format must not be empty");
        }
        if self.downloader.mix_item_limit == 0 {
            return invalid("mix item limit must be at least 1");
        }

        Ok(())
    }

    /// Executables that must be resolvable before any download starts
    pub fn required_executables(&self) -> Vec<&str> {
        vec![
            self.downloader.command.as_str(),
            self.downloader.transcoder.as_str(),
        ]
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Downloader: {}", self.downloader.command);
        println!("  Transcoder: {}", self.downloader.transcoder);
        println!(
            "  Audio: {} (quality {})",
            self.downloader.audio_format, self.downloader.audio_quality
        );
        println!(
            "  Retries: {} (fragments: {})",
            self.downloader.retries, self.downloader.fragment_retries
        );
        println!("  Mix Item Limit: {}", self.downloader.mix_item_limit);
        println!("  Input File: {}", self.app.input_file.display());
        println!("  Output Directory: {}", self.app.output_dir.display());
    }
}
