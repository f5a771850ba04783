use std::path::Path;

use crate::utils::validate_url;
use crate::{BatchError, Result};

/// Read the URL list: one URL per line, blank lines and `#` comments skipped
pub fn read_urls(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(BatchError::Configuration(format!("{} not found.", path.display())).into());
    }

    let content = fs_err::read_to_string(path)
        .map_err(|e| BatchError::Configuration(format!("Failed to read URL list: {}", e)))?;

    let urls = parse_url_list(&content);
    if urls.is_empty() {
        return Err(BatchError::Configuration(format!(
            "No valid URLs found in {}.",
            path.display()
        ))
        .into());
    }

    for url in &urls {
        if let Err(e) = validate_url(url) {
            tracing::warn!("{} (will be treated as an unknown URL)", e);
        }
    }

    tracing::debug!("Loaded {} URL(s) from {}", urls.len(), path.display());
    Ok(urls)
}

/// Keep trimmed lines that are non-empty and not comments
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_list(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_url_list_skips_blank_and_comments() {
        let urls = parse_url_list(
            "# my list\n\nhttps://a.example/watch?v=1\n   \n  # indented comment\n  https://b.example/x  \n",
        );
        assert_eq!(urls, vec!["https://a.example/watch?v=1", "https://b.example/x"]);
    }

    #[test]
    fn test_read_urls_keeps_order() {
        let file = write_list("https://one.example\nhttps://two.example\r\nhttps://three.example");
        let urls = read_urls(file.path()).unwrap();
        assert_eq!(
            urls,
            vec!["https://one.example", "https://two.example", "https://three.example"]
        );
    }

    #[test]
    fn test_read_urls_only_comments_is_configuration_error() {
        let file = write_list("# nothing here\n\n   \n#another\n");
        let err = read_urls(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BatchError>(),
            Some(BatchError::Configuration(_))
        ));
    }

    #[test]
    fn test_read_urls_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_urls(&dir.path().join("urls.txt")).unwrap_err();
        assert_eq!(err.downcast_ref::<BatchError>().map(BatchError::exit_code), Some(1));
    }

    #[test]
    fn test_read_urls_keeps_non_http_lines() {
        let file = write_list("not-a-url\n");
        assert_eq!(read_urls(file.path()).unwrap(), vec!["not-a-url"]);
    }
}
