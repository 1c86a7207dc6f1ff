use crate::UrlError;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Path extensions that mark a link as a file download rather than a page
const DOWNLOAD_EXTENSIONS: &str = r"(?i)\.(pdf|zip|docx?|xlsx?|pptx?|exe|dmg|pkg|gz|rar)$";

fn download_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(DOWNLOAD_EXTENSIONS).expect("static regex is valid"))
}

/// Normalizes a user-supplied seed into an absolute crawl URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Prepend `https://` when no scheme is present
/// 3. Parse; reject anything that is not HTTP(S) or has no host
/// 4. Remove the fragment
///
/// # Examples
///
/// ```
/// use sumi_gather::url::normalize_seed;
///
/// let url = normalize_seed("example.com/gallery#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/gallery");
/// ```
pub fn normalize_seed(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        tracing::info!("Prepending https:// to seed URL: {}", trimmed);
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves an `href`/`src` value against the page it was found on
///
/// Returns None if the reference should be ignored:
/// - empty values and fragment-only anchors
/// - `javascript:`, `mailto:`, `tel:` and `data:` references
/// - anything that fails to resolve or is not HTTP(S) after resolution
pub fn resolve_reference(reference: &str, base_url: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let lower = reference.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(reference) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

/// Normalizes a page link for the visited set: strips the fragment only
///
/// Scheme, host, path and query are kept exactly as resolved so that the
/// visited set compares what would actually be requested.
pub fn normalize_page_link(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

/// Returns true if the URL path ends in a file-download extension
pub fn is_file_download(url: &Url) -> bool {
    download_pattern().is_match(url.path())
}
