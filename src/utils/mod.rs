use anyhow::Result;
use url::Url;

use crate::BatchError;

/// Validate that a string is an HTTP(S) URL
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol: {}", url);
    }

    Ok(parsed)
}

/// Make a playlist title safe to use as a folder name.
///
/// Every character other than alphanumerics, space, `-` and `_` becomes `_`.
/// The result is never trimmed, so applying this twice changes nothing.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect()
}

/// Check that every required executable resolves on PATH.
///
/// All missing names are reported at once.
pub fn check_prerequisites(executables: &[&str]) -> std::result::Result<(), BatchError> {
    let missing: Vec<String> = executables
        .iter()
        .filter(|name| match which::which(name) {
            Ok(path) => {
                tracing::debug!("Found {} at {}", name, path.display());
                false
            }
            Err(_) => true,
        })
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BatchError::MissingDependency(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Road Trip: Summer '24!"), "Road Trip_ Summer _24_");
        assert_eq!(sanitize_title("test/file?name"), "test_file_name");
        assert_eq!(sanitize_title("Best-of_2020 mix"), "Best-of_2020 mix");
        assert_eq!(sanitize_title("  spaced  "), "  spaced  ");
        assert_eq!(sanitize_title("a.b"), "a_b");
    }

    #[test]
    fn test_sanitize_title_keeps_unicode_letters() {
        assert_eq!(sanitize_title("Café Lounge"), "Café Lounge");
    }

    #[test]
    fn test_sanitize_title_is_idempotent() {
        for title in ["Road Trip: Summer '24!", "a/b\\c", "日本語 / mix", "", "__--  "] {
            let once = sanitize_title(title);
            assert_eq!(sanitize_title(&once), once);
        }
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not-a-url").is_err());
    }

    #[test]
    fn test_check_prerequisites_reports_all_missing() {
        let err = check_prerequisites(&["mp3-batch-missing-one", "mp3-batch-missing-two"])
            .unwrap_err();
        match err {
            BatchError::MissingDependency(names) => {
                assert_eq!(names, vec!["mp3-batch-missing-one", "mp3-batch-missing-two"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_prerequisites_empty_list() {
        assert!(check_prerequisites(&[]).is_ok());
    }
}
