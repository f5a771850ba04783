use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mp3batch",
    about = "mp3-batch - Download audio from YouTube videos and playlists as MP3",
    version,
    long_about = "Reads a list of URLs (one per line), detects single videos, regular playlists and Mix playlists, and downloads each as MP3 with yt-dlp and ffmpeg. Playlists get their own folder; Mix playlists are limited to their first items.\n\nOnly use this for content you have the rights to download."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to ./mp3-batch.yaml, then the user config directory)
    #[arg(long, global = true, value_name = "FILE", env = "MP3_BATCH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download every URL in the input file (default)
    Download(DownloadArgs),

    /// Show how URLs would be classified
    Classify {
        /// URLs to classify
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration to the user config file if it does not exist
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct DownloadArgs {
    /// File with one URL per line [default: urls.txt]
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Root folder for downloads [default: output]
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Downloader executable [default: yt-dlp]
    #[arg(long, value_name = "CMD")]
    pub downloader: Option<String>,

    /// Transcoder executable that must be on PATH [default: ffmpeg]
    #[arg(long, value_name = "CMD")]
    pub transcoder: Option<String>,

    /// Print the commands without downloading anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write a per-URL report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub report_format: ReportFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Plain text
    #[default]
    Text,
    /// JSON
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}
