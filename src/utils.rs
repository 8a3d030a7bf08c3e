//! Utility functions for filename handling

/// Fallback name when a usable filename cannot be derived
pub const UNKNOWN_FILE_NAME: &str = "unknown_file";

/// Reduce an attachment-supplied filename to a safe flat name.
///
/// Strips any directory components so the result always lands directly in
/// the download directory. Names that reduce to nothing (empty, `.`, `..`,
/// bare separators) fall back to [`UNKNOWN_FILE_NAME`].
pub fn sanitize_file_name(name: &str) -> String {
    let flat = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if flat.is_empty() || flat == "." || flat == ".." {
        UNKNOWN_FILE_NAME.to_string()
    } else {
        flat
    }
}

/// Whether a client-supplied name may be looked up in the download directory.
///
/// The serving endpoint only ever materializes flat names, so anything with a
/// path separator or a `..` component is rejected outright.
pub fn is_safe_serve_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}

/// Derive a filename from a URL's last path segment.
///
/// Percent-encoded segments are decoded. Returns `None` when the URL cannot
/// be parsed or has no usable final segment, letting the caller fall back to
/// [`UNKNOWN_FILE_NAME`].
pub fn file_name_from_url(raw_url: &str) -> Option<String> {
    let parsed = url::Url::parse(raw_url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(last)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last.to_string());
    let clean = sanitize_file_name(&decoded);
    if clean == UNKNOWN_FILE_NAME {
        None
    } else {
        Some(clean)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("shot.png"), "shot.png");
        assert_eq!(sanitize_file_name("report v2.pdf"), "report v2.pdf");
    }

    #[test]
    fn sanitize_strips_directory_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("/tmp/evil.sh"), "evil.sh");
        assert_eq!(sanitize_file_name("dir\\nested\\file.bin"), "file.bin");
    }

    #[test]
    fn sanitize_falls_back_for_unusable_names() {
        assert_eq!(sanitize_file_name(""), UNKNOWN_FILE_NAME);
        assert_eq!(sanitize_file_name(".."), UNKNOWN_FILE_NAME);
        assert_eq!(sanitize_file_name("dir/"), UNKNOWN_FILE_NAME);
        assert_eq!(sanitize_file_name("   "), UNKNOWN_FILE_NAME);
    }

    #[test]
    fn serve_name_rejects_traversal() {
        assert!(is_safe_serve_name("shot.png"));
        assert!(!is_safe_serve_name("../secret"));
        assert!(!is_safe_serve_name("a/b.png"));
        assert!(!is_safe_serve_name("a\\b.png"));
        assert!(!is_safe_serve_name(""));
    }

    #[test]
    fn url_file_name_uses_last_segment() {
        assert_eq!(
            file_name_from_url("https://cdn.example.com/a/b/shot.png").as_deref(),
            Some("shot.png")
        );
    }

    #[test]
    fn url_file_name_decodes_percent_encoding() {
        assert_eq!(
            file_name_from_url("https://cdn.example.com/files/shot%20one.png").as_deref(),
            Some("shot one.png")
        );
    }

    #[test]
    fn url_file_name_handles_unusable_urls() {
        assert_eq!(file_name_from_url("not a url"), None);
        assert_eq!(file_name_from_url("https://cdn.example.com/"), None);
    }
}
