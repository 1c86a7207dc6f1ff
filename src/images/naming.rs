//! Filename derivation for saved images

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn unsafe_chars() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("static regex is valid"))
}

/// Picks a file extension from a declared content type
///
/// Defaults to `jpg`.
pub fn extension_for(content_type: Option<&str>) -> &'static str {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
    if content_type.contains("svg") {
        "svg"
    } else if content_type.contains("png") {
        "png"
    } else if content_type.contains("webp") {
        "webp"
    } else if content_type.contains("gif") {
        "gif"
    } else {
        "jpg"
    }
}

/// Replaces characters that are unsafe in filenames with `_`
pub fn sanitize_filename(name: &str) -> String {
    unsafe_chars().replace_all(name, "_").into_owned()
}

/// Derives the filename for an image
///
/// Uses the final path segment of `canonical_url` (percent-decoded). When
/// that segment is missing or has no extension, falls back to
/// `image_<ordinal>.<ext>` with the extension taken from `content_type`.
///
/// # Examples
///
/// ```
/// use sumi_gather::images::image_filename;
///
/// assert_eq!(image_filename("https://example.com/a/photo%201.jpg", 3, None), "photo 1.jpg");
/// assert_eq!(image_filename("https://example.com/render?id=9", 3, Some("image/png")), "image_3.png");
/// ```
pub fn image_filename(canonical_url: &str, ordinal: usize, content_type: Option<&str>) -> String {
    let segment = last_segment(canonical_url);
    let usable = segment
        .as_deref()
        .filter(|s| s.contains('.') && !s.trim_matches('.').is_empty());

    let name = match usable {
        Some(segment) => segment.to_string(),
        None => format!("image_{}.{}", ordinal, extension_for(content_type)),
    };
    sanitize_filename(&name)
}

fn last_segment(url: &str) -> Option<String> {
    let raw = match Url::parse(url) {
        Ok(parsed) => parsed.path_segments()?.last()?.to_string(),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or_default();
            path.rsplit('/').next()?.to_string()
        }
    };
    if raw.is_empty() {
        return None;
    }
    Some(
        urlencoding::decode(&raw)
            .map(|decoded| decoded.into_owned())
            .unwrap_or(raw),
    )
}
