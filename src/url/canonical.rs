use url::Url;

/// Query parameters that only select a rendition (size, quality, format) of an
/// image. Compared case-insensitively.
const RENDITION_PARAMS: &[&str] = &[
    "width",
    "height",
    "w",
    "h",
    "size",
    "quality",
    "q",
    "fit",
    "crop",
    "maxwidth",
    "maxheight",
    "scale",
    "res",
    "resize",
    "fm",
    "format",
    "auto",
    "dpr",
];

/// Canonicalizes an absolute image URL into its dedup key
///
/// # Canonicalization Steps
///
/// 1. SVG URLs (`.svg` extension or any `svg` substring) are returned as-is
/// 2. Parse the URL; on failure return the input unchanged
/// 3. Drop rendition query parameters (see `RENDITION_PARAMS`), keeping every
///    other parameter byte-for-byte and in its original order
/// 4. Remove an empty query string and the fragment
///
/// Path segments are never touched. The transform is pure and idempotent.
///
/// # Examples
///
/// ```
/// use sumi_gather::url::canonicalize;
///
/// assert_eq!(
///     canonicalize("https://cdn.example.com/a.jpg?w=300&id=7&q=80"),
///     "https://cdn.example.com/a.jpg?id=7"
/// );
/// assert_eq!(canonicalize("not a url"), "not a url");
/// ```
pub fn canonicalize(url_str: &str) -> String {
    if is_svg(url_str) {
        return url_str.to_string();
    }

    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Leaving unparseable image URL as-is ({}): {}", e, url_str);
            return url_str.to_string();
        }
    };

    let kept = url.query().map(strip_rendition_params);
    match kept {
        Some(query) if !query.is_empty() => url.set_query(Some(&query)),
        _ => url.set_query(None),
    }
    url.set_fragment(None);

    url.to_string()
}

/// Returns true if the URL looks like an SVG image
///
/// This is deliberately loose: any occurrence of `svg` counts, matching
/// CDN URLs such as `/render/svg/123` or `?type=svg`.
pub fn is_svg(url_str: &str) -> bool {
    let lower = url_str.to_ascii_lowercase();
    lower.ends_with(".svg") || lower.contains("svg")
}

/// Filters a raw query string, keeping non-rendition pairs verbatim
fn strip_rendition_params(query: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| !is_rendition_param(pair))
        .collect::<Vec<_>>()
        .join("&")
}

/// Checks whether a raw `key=value` pair carries a rendition parameter
fn is_rendition_param(pair: &str) -> bool {
    let raw_key = pair.split('=').next().unwrap_or_default();
    let key = urlencoding::decode(raw_key)
        .map(|k| k.to_ascii_lowercase())
        .unwrap_or_else(|_| raw_key.to_ascii_lowercase());
    RENDITION_PARAMS.contains(&key.as_str())
}
