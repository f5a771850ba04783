use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod ytdlp;

pub use ytdlp::YtDlpDownloader;

use crate::command::CommandSpec;

/// Title used when playlist metadata cannot be fetched
pub const UNKNOWN_PLAYLIST_TITLE: &str = "Unknown_Playlist";

/// Playlist metadata from a flat-playlist query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    /// Human-readable playlist title (unsanitized)
    pub title: String,

    /// Number of entries reported by the downloader
    pub item_count: usize,
}

impl PlaylistInfo {
    pub fn new(title: impl Into<String>, item_count: usize) -> Self {
        Self {
            title: title.into(),
            item_count,
        }
    }

    /// Placeholder used when the metadata query fails
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_PLAYLIST_TITLE, 0)
    }
}

/// Errors from invoking the external downloader
#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", describe_exit(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("downloader output is not valid UTF-8")]
    InvalidOutput(#[from] std::string::FromUtf8Error),

    #[error("failed to parse playlist metadata: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DownloadError {
    /// Exit code of the failed process, if it exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DownloadError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// The two operations the batch needs from the external downloader
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Query playlist title and item count without downloading anything
    async fn fetch_metadata(&self, url: &str) -> Result<PlaylistInfo, DownloadError>;

    /// Run a download command to completion, streaming its output
    async fn run_download(&self, command: &CommandSpec) -> Result<(), DownloadError>;
}
