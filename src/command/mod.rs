use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::UrlCategory;
use crate::config::Config;
use crate::downloader::PlaylistInfo;
use crate::utils::sanitize_title;
use crate::Result;

/// Filename template for numbered playlist items
pub const PLAYLIST_TEMPLATE: &str = "%(autonumber)02d - %(title)s.%(ext)s";

/// Filename template for single downloads
pub const SINGLE_TEMPLATE: &str = "%(title)s.%(ext)s";

/// One external-tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[cfg(test)]
impl CommandSpec {
    /// True if `flag` appears as an argument
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|arg| arg == flag)
    }

    /// Value following `flag`, if present
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Where a download lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub filename_template: String,
}

impl OutputTarget {
    /// Value for `--output`
    pub fn template_path(&self) -> String {
        self.directory
            .join(&self.filename_template)
            .to_string_lossy()
            .into_owned()
    }
}

/// A built command together with the directory it writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDownload {
    pub command: CommandSpec,
    pub target: OutputTarget,
}

/// Builds downloader invocations from a URL and its classification
pub struct CommandBuilder {
    program: String,
    base_options: Vec<String>,
    output_dir: PathBuf,
    mix_item_limit: u32,
}

impl CommandBuilder {
    pub fn new(config: &Config) -> Self {
        let dl = &config.downloader;
        let base_options = vec![
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            dl.audio_format.clone(),
            "--audio-quality".to_string(),
            dl.audio_quality.clone(),
            "--embed-thumbnail".to_string(),
            "--add-metadata".to_string(),
            "--no-mtime".to_string(),
            "--retries".to_string(),
            dl.retries.to_string(),
            "--fragment-retries".to_string(),
            dl.fragment_retries.to_string(),
            "--continue".to_string(),
            // keep original playlist order
            "--no-playlist-reverse".to_string(),
        ];

        Self {
            program: dl.command.clone(),
            base_options,
            output_dir: config.app.output_dir.clone(),
            mix_item_limit: dl.mix_item_limit,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn mix_item_limit(&self) -> u32 {
        self.mix_item_limit
    }

    /// Compute the output directory and filename template. No I/O.
    pub fn output_target(
        &self,
        category: UrlCategory,
        playlist: Option<&PlaylistInfo>,
    ) -> OutputTarget {
        if category.is_playlist() {
            let title = playlist
                .map(|info| info.title.clone())
                .unwrap_or_else(|| PlaylistInfo::unknown().title);
            OutputTarget {
                directory: self.output_dir.join(sanitize_title(&title)),
                filename_template: PLAYLIST_TEMPLATE.to_string(),
            }
        } else {
            OutputTarget {
                directory: self.output_dir.clone(),
                filename_template: SINGLE_TEMPLATE.to_string(),
            }
        }
    }

    /// Build the download command, creating the output directory first
    pub fn build(
        &self,
        url: &str,
        category: UrlCategory,
        playlist: Option<&PlaylistInfo>,
    ) -> Result<PreparedDownload> {
        let target = self.output_target(category, playlist);
        fs_err::create_dir_all(&target.directory).with_context(|| {
            format!(
                "Failed to create output directory {}",
                target.directory.display()
            )
        })?;

        let mut args = self.base_options.clone();
        args.push("--output".to_string());
        args.push(target.template_path());
        args.push(url.to_string());
        args.extend(self.category_flags(category));

        Ok(PreparedDownload {
            command: CommandSpec::new(self.program.clone(), args),
            target,
        })
    }

    fn category_flags(&self, category: UrlCategory) -> Vec<String> {
        match category {
            UrlCategory::MixPlaylist => vec![
                "--yes-playlist".into(),
                "--playlist-start".into(),
                "1".into(),
                "--playlist-end".into(),
                self.mix_item_limit.to_string(),
                "--autonumber-start".into(),
                "1".into(),
            ],
            UrlCategory::RegularPlaylist => vec![
                "--yes-playlist".into(),
                "--autonumber-start".into(),
                "1".into(),
            ],
            UrlCategory::SingleVideo | UrlCategory::Unknown => vec!["--no-playlist".into()],
        }
    }
}
