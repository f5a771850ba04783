use chrono::{DateTime, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::classify::{classify, UrlCategory};
use crate::command::{CommandBuilder, CommandSpec, PreparedDownload};
use crate::config::Config;
use crate::downloader::{DownloadError, MediaDownloader, PlaylistInfo};

/// What happened to one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    Failed { reason: String },
    /// Command was built but not run (dry run)
    Planned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlOutcome {
    pub url: String,
    pub category: UrlCategory,
    /// Directory the download was written to, if a command was built
    pub output_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl UrlOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }
}

/// Per-URL outcomes of one run, in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub output_root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<UrlOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Succeeded)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UrlOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}

/// Query playlist metadata, falling back to the `Unknown_Playlist` sentinel on any error
pub async fn fetch_playlist_info<D>(downloader: &D, url: &str) -> PlaylistInfo
where
    D: MediaDownloader + ?Sized,
{
    match downloader.fetch_metadata(url).await {
        Ok(info) => info,
        Err(e) => {
            if let DownloadError::NonZeroExit { stderr, .. } = &e {
                if !stderr.is_empty() {
                    tracing::debug!("downloader stderr: {}", stderr);
                }
            }
            tracing::warn!(
                url = %url,
                error = %e,
                "Playlist metadata unavailable, using placeholder title"
            );
            PlaylistInfo::unknown()
        }
    }
}

/// Sequential batch orchestrator
pub struct BatchRunner<D: MediaDownloader> {
    downloader: D,
    builder: CommandBuilder,
    dry_run: bool,
    show_progress: bool,
}

impl<D: MediaDownloader> BatchRunner<D> {
    pub fn new(config: &Config, downloader: D) -> Self {
        Self {
            downloader,
            builder: CommandBuilder::new(config),
            dry_run: false,
            show_progress: false,
        }
    }

    /// Build and print commands without running downloads
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Show a spinner while playlist metadata is fetched
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Process every URL in order. A failing URL never stops the batch.
    pub async fn run_all(&self, urls: &[String]) -> BatchReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(urls.len());

        for (index, url) in urls.iter().enumerate() {
            tracing::debug!("Processing URL {}/{}", index + 1, urls.len());
            outcomes.push(self.process_url(url).await);
        }

        BatchReport {
            output_root: self.builder.output_dir().to_path_buf(),
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }

    /// Classify, inspect, build and run one URL
    pub async fn process_url(&self, url: &str) -> UrlOutcome {
        println!("\n{} {}", style("Checking:").bold(), url);

        let category = classify(url);
        tracing::debug!(url = %url, category = %category, "Classified URL");

        let playlist = if category.is_playlist() {
            Some(self.inspect_playlist(url).await)
        } else {
            None
        };
        self.announce(category, playlist.as_ref());

        let PreparedDownload { command, target } =
            match self.builder.build(url, category, playlist.as_ref()) {
                Ok(prepared) => prepared,
                Err(e) => {
                    let reason = format!("{:#}", e);
                    println!("{}", style(format!("Download failed for {} ({})", url, reason)).red());
                    tracing::warn!(url = %url, error = %reason, "Could not prepare download");
                    return UrlOutcome {
                        url: url.to_string(),
                        category,
                        output_dir: None,
                        status: OutcomeStatus::Failed { reason },
                    };
                }
            };
        let output_dir = Some(target.directory);

        println!("{} {}", style(">>> Running:").cyan(), command);

        let status = if self.dry_run {
            OutcomeStatus::Planned
        } else {
            match self.download_one(&command).await {
                Ok(()) => OutcomeStatus::Succeeded,
                Err(e) => {
                    println!("{}", style(format!("Download failed for {} ({})", url, e)).red());
                    tracing::warn!(url = %url, exit_code = ?e.exit_code(), "Download failed");
                    OutcomeStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        };

        UrlOutcome {
            url: url.to_string(),
            category,
            output_dir,
            status,
        }
    }

    /// Run one download command to completion
    pub async fn download_one(&self, command: &CommandSpec) -> Result<(), DownloadError> {
        self.downloader.run_download(command).await
    }

    async fn inspect_playlist(&self, url: &str) -> PlaylistInfo {
        if !self.show_progress {
            return fetch_playlist_info(&self.downloader, url).await;
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message("Fetching playlist info...");
        progress.enable_steady_tick(Duration::from_millis(100));

        let info = fetch_playlist_info(&self.downloader, url).await;

        progress.finish_and_clear();
        info
    }

    /// Print the per-category notices
    fn announce(&self, category: UrlCategory, playlist: Option<&PlaylistInfo>) {
        let title = playlist.map(|p| p.title.as_str()).unwrap_or_default();
        match category {
            UrlCategory::MixPlaylist => {
                println!("Detected YouTube Mix playlist: {}", title);
                println!(
                    "Mix playlists can be infinite, limiting to first {} songs",
                    self.builder.mix_item_limit()
                );
                println!("Note: Mix playlist order may vary from YouTube display order");
            }
            UrlCategory::RegularPlaylist => {
                println!("Detected regular playlist: {}", title);
                println!(
                    "Playlist contains {} items",
                    playlist.map_or(0, |p| p.item_count)
                );
                println!("Files will be numbered in playlist order");
            }
            UrlCategory::SingleVideo => println!("Detected single video"),
            UrlCategory::Unknown => println!("Unknown URL type, treating as single video"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::MockMediaDownloader;
    use mockall::Sequence;
    use std::path::Path;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.app.output_dir = dir.join("output");
        config
    }

    #[tokio::test]
    async fn test_single_video_skips_metadata_query() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMediaDownloader::new();
        mock.expect_fetch_metadata().never();
        mock.expect_run_download()
            .withf(|cmd| {
                cmd.has_flag("--no-playlist")
                    && cmd.args.iter().any(|a| a.ends_with("%(title)s.%(ext)s"))
            })
            .times(1)
            .returning(|_| Ok(()));

        let runner = BatchRunner::new(&config_in(dir.path()), mock);
        let report = runner
            .run_all(&["https://example.com/watch?v=abc123".to_string()])
            .await;

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.outcomes[0].category, UrlCategory::SingleVideo);
        assert_eq!(
            report.outcomes[0].output_dir.as_deref(),
            Some(dir.path().join("output").as_path())
        );
    }

    #[tokio::test]
    async fn test_regular_playlist_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://example.com/watch?v=abc123&list=PLxyz";
        let playlist_dir = dir.path().join("output").join("Road Trip_ Summer _24_");
        let expected_template = playlist_dir
            .join("%(autonumber)02d - %(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned();

        let mut mock = MockMediaDownloader::new();
        mock.expect_fetch_metadata()
            .withf(move |u| u == url)
            .times(1)
            .returning(|_| Ok(PlaylistInfo::new("Road Trip: Summer '24!", 12)));
        mock.expect_run_download()
            .withf(move |cmd| {
                cmd.flag_value("--output") == Some(expected_template.as_str())
                    && cmd.flag_value("--autonumber-start") == Some("1")
                    && !cmd.has_flag("--playlist-end")
            })
            .times(1)
            .returning(|_| Ok(()));

        let runner = BatchRunner::new(&config_in(dir.path()), mock);
        let report = runner.run_all(&[url.to_string()]).await;

        assert_eq!(report.outcomes[0].category, UrlCategory::RegularPlaylist);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Succeeded);
        assert_eq!(report.outcomes[0].output_dir.as_deref(), Some(playlist_dir.as_path()));
        assert!(playlist_dir.is_dir());
    }

    #[tokio::test]
    async fn test_unusable_output_dir_fails_url_without_download() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(dir.path().join("output"), "not a directory").unwrap();
        let mut mock = MockMediaDownloader::new();
        mock.expect_run_download().never();

        let runner = BatchRunner::new(&config_in(dir.path()), mock);
        let report = runner
            .run_all(&["https://example.com/watch?v=abc123".to_string()])
            .await;

        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcomes[0].output_dir, None);
        match &report.outcomes[0].status {
            OutcomeStatus::Failed { reason } => {
                assert!(reason.contains("Failed to create output directory"))
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_download_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut seq = Sequence::new();
        let mut mock = MockMediaDownloader::new();
        mock.expect_run_download()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(DownloadError::NonZeroExit {
                    code: Some(1),
                    stderr: String::new(),
                })
            });
        mock.expect_run_download()
            .withf(|cmd| cmd.args.iter().any(|a| a == "https://example.com/watch?v=second"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let runner = BatchRunner::new(&config_in(dir.path()), mock);
        let report = runner
            .run_all(&[
                "https://example.com/watch?v=first".to_string(),
                "https://example.com/watch?v=second".to_string(),
            ])
            .await;

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(
            report.outcomes[0].status,
            OutcomeStatus::Failed {
                reason: "exit 1".to_string()
            }
        );
        assert_eq!(report.outcomes[1].status, OutcomeStatus::Succeeded);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
    }

    #[tokio::test]
    async fn test_metadata_failure_uses_sentinel_folder() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMediaDownloader::new();
        mock.expect_fetch_metadata()
            .times(1)
            .returning(|_| {
                let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                Err(DownloadError::Parse(err))
            });
        mock.expect_run_download()
            .withf(|cmd| cmd.flag_value("--playlist-end") == Some("50"))
            .times(1)
            .returning(|_| Ok(()));

        let runner = BatchRunner::new(&config_in(dir.path()), mock);
        let report = runner
            .run_all(&["https://www.youtube.com/watch?v=x&list=RDx".to_string()])
            .await;

        assert_eq!(report.outcomes[0].category, UrlCategory::MixPlaylist);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Succeeded);
        assert!(dir.path().join("output").join("Unknown_Playlist").is_dir());
    }

    #[tokio::test]
    async fn test_dry_run_never_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockMediaDownloader::new();
        mock.expect_run_download().never();

        let runner = BatchRunner::new(&config_in(dir.path()), mock).with_dry_run(true);
        let report = runner.run_all(&["https://youtu.be/abc".to_string()]).await;

        assert_eq!(report.outcomes[0].category, UrlCategory::Unknown);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Planned);
        assert_eq!(report.failed(), 0);
    }

    #[tokio::test]
    async fn test_fetch_playlist_info_passes_through_success() {
        let mut mock = MockMediaDownloader::new();
        mock.expect_fetch_metadata()
            .returning(|_| Ok(PlaylistInfo::new("Lo-fi", 3)));

        let info = fetch_playlist_info(&mock, "https://x/playlist?list=PLa").await;
        assert_eq!(info, PlaylistInfo::new("Lo-fi", 3));
    }
}
