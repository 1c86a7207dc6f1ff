//! `srcset` attribute parsing

/// Returns every URL listed in a `srcset` value, in order
///
/// Descriptors (`2x`, `640w`) are dropped. Commas inside a URL are kept as
/// long as they are not followed by whitespace.
///
/// # Examples
///
/// ```
/// use sumi_gather::images::srcset_urls;
///
/// let urls = srcset_urls("small.jpg 480w, large.jpg 1080w");
/// assert_eq!(urls, vec!["small.jpg", "large.jpg"]);
/// ```
pub fn srcset_urls(srcset: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut rest = srcset;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..end];
        rest = &rest[end..];

        let url = token.trim_end_matches(',');
        if !url.is_empty() {
            urls.push(url.to_string());
        }

        // A trailing comma already closed this candidate
        if token.ends_with(',') {
            continue;
        }

        // Skip descriptors up to the next separator
        match rest.find(',') {
            Some(comma) => rest = &rest[comma + 1..],
            None => break,
        }
    }

    urls
}

/// Returns the last URL of a `srcset`, usually the largest rendition
pub fn last_srcset_url(srcset: &str) -> Option<String> {
    srcset_urls(srcset).pop()
}

/// Returns true if the value names a single URL with no descriptors or list
pub fn is_single_source(srcset: &str) -> bool {
    let value = srcset.trim();
    !value.is_empty() && !value.contains(char::is_whitespace) && !value.contains(',')
}
