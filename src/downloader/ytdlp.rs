use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

use super::{DownloadError, MediaDownloader, PlaylistInfo, UNKNOWN_PLAYLIST_TITLE};
use crate::command::CommandSpec;
use crate::config::DownloaderConfig;

/// Subset of `--dump-single-json --flat-playlist` output we care about
#[derive(Debug, Deserialize)]
struct FlatPlaylist {
    title: Option<String>,
    entries: Option<Vec<Value>>,
}

/// Parse flat-playlist JSON into `PlaylistInfo`
pub fn parse_flat_playlist(json: &str) -> Result<PlaylistInfo, DownloadError> {
    let playlist: FlatPlaylist = serde_json::from_str(json)?;

    Ok(PlaylistInfo {
        title: playlist
            .title
            .unwrap_or_else(|| UNKNOWN_PLAYLIST_TITLE.to_string()),
        item_count: playlist.entries.map_or(0, |entries| entries.len()),
    })
}

/// Downloader backed by the `yt-dlp` executable
pub struct YtDlpDownloader {
    yt_dlp_path: String,
}

impl YtDlpDownloader {
    pub fn new(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
        }
    }

    pub fn from_config(config: &DownloaderConfig) -> Self {
        Self::new(config.command.clone())
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    async fn fetch_metadata(&self, url: &str) -> Result<PlaylistInfo, DownloadError> {
        tracing::debug!("Fetching playlist info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-single-json", "--flat-playlist", url])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| DownloadError::Spawn {
                program: self.yt_dlp_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DownloadError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let json_str = String::from_utf8(output.stdout)?;
        parse_flat_playlist(&json_str)
    }

    async fn run_download(&self, command: &CommandSpec) -> Result<(), DownloadError> {
        tracing::debug!("Spawning {} with {} args", command.program, command.args.len());

        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| DownloadError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(DownloadError::NonZeroExit {
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}
