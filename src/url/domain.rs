use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_gather::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Extracts the network location (`host[:port]`) of a URL
///
/// This is the unit the crawler stays inside and the name of the per-domain
/// output directory. The port is only present when it is not the scheme's
/// default.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_gather::url::extract_netloc;
///
/// let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
/// assert_eq!(extract_netloc(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_netloc(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Extracts the origin (`scheme://host[:port]`) used to key robots.txt
pub fn extract_origin(url: &Url) -> Option<String> {
    let netloc = extract_netloc(url)?;
    Some(format!("{}://{}", url.scheme(), netloc))
}
