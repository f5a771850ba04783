//! mp3-batch - A Rust CLI tool for batch-downloading audio as MP3
//!
//! This library reads a list of URLs, classifies each one (mix playlist, regular
//! playlist, single video or unknown), and drives `yt-dlp` (which in turn drives
//! `ffmpeg`) with the argument set matching that classification.

pub mod batch;
pub mod classify;
pub mod cli;
pub mod command;
pub mod config;
pub mod downloader;
pub mod input;
pub mod output;
pub mod utils;

pub use batch::{BatchReport, BatchRunner, OutcomeStatus, UrlOutcome};
pub use classify::{classify, UrlCategory};
pub use cli::{Cli, Commands, ReportFormat};
pub use command::{CommandBuilder, CommandSpec, OutputTarget, PreparedDownload};
pub use config::Config;
pub use downloader::{DownloadError, MediaDownloader, PlaylistInfo, YtDlpDownloader};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Fatal pre-flight errors; everything else is handled per URL
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("{0}")]
    Configuration(String),

    #[error("Missing executables: {}", .0.join(", "))]
    MissingDependency(Vec<String>),
}

impl BatchError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BatchError::Configuration(_) => 1,
            BatchError::MissingDependency(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(BatchError::Configuration("x".into()).exit_code(), 1);
        assert_eq!(BatchError::MissingDependency(vec![]).exit_code(), 2);
    }

    #[test]
    fn test_missing_dependency_lists_all_names() {
        let err = BatchError::MissingDependency(vec!["yt-dlp".into(), "ffmpeg".into()]);
        assert_eq!(err.to_string(), "Missing executables: yt-dlp, ffmpeg");
    }
}
