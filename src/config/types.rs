use serde::Deserialize;

/// Main configuration structure for Sumi-Gather
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of distinct pages fetched in one run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seed page (seed is depth 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Whether pagination-looking links jump the queue
    #[serde(default = "default_true")]
    pub follow_pagination: bool,

    /// Whether the gallery provider runs against the seed page before the crawl
    #[serde(default)]
    pub use_browser_assist: bool,

    /// Timeout for a single page fetch (seconds)
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// Timeout for a single image fetch (seconds)
    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,

    /// Delay after every page fetch and every first robots.txt fetch (milliseconds)
    #[serde(default = "default_politeness_delay")]
    pub politeness_delay_ms: u64,

    /// Polling interval while paused (milliseconds)
    #[serde(default = "default_pause_poll")]
    pub pause_poll_ms: u64,

    /// Upper bound on a robots.txt `Crawl-delay` (milliseconds)
    #[serde(default = "default_max_crawl_delay")]
    pub max_crawl_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            follow_pagination: true,
            use_browser_assist: false,
            page_timeout_secs: default_page_timeout(),
            image_timeout_secs: default_image_timeout(),
            politeness_delay_ms: default_politeness_delay(),
            pause_poll_ms: default_pause_poll(),
            max_crawl_delay_ms: default_max_crawl_delay(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler, also the robots.txt product token
    #[serde(default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(default = "default_contact_url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the full User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory; each crawled domain gets a subdirectory here
    #[serde(default = "default_output_root")]
    pub output_root: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
        }
    }
}

/// Image heuristics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImagesConfig {
    /// Case-insensitive regex; matching candidate URLs are treated as chrome and skipped
    #[serde(default = "default_icon_pattern")]
    pub icon_pattern: String,

    /// Whether the resolution ladder tries the URL with a `_WxH` suffix removed
    #[serde(default = "default_true")]
    pub strip_size_suffix: bool,

    /// Query strings tried as high-resolution variants (at most three)
    #[serde(default = "default_high_res_queries")]
    pub high_res_queries: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            icon_pattern: default_icon_pattern(),
            strip_size_suffix: true,
            high_res_queries: default_high_res_queries(),
        }
    }
}

pub(crate) const DEFAULT_ICON_PATTERN: &str = r"/icons?/|/social/|/nav/|favicon|logo|spinner|loader|rating|cart|search|user|account|menu|arrow|/flags/";

fn default_max_pages() -> usize {
    50
}

fn default_max_depth() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_page_timeout() -> u64 {
    15
}

fn default_image_timeout() -> u64 {
    30
}

fn default_politeness_delay() -> u64 {
    1000
}

fn default_max_crawl_delay() -> u64 {
    60_000
}

fn default_pause_poll() -> u64 {
    500
}

fn default_crawler_name() -> String {
    "SumiGather".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/sumi-gather".to_string()
}

fn default_output_root() -> String {
    "data".to_string()
}

fn default_icon_pattern() -> String {
    DEFAULT_ICON_PATTERN.to_string()
}

fn default_high_res_queries() -> Vec<String> {
    vec![
        "quality=100".to_string(),
        "w=2048".to_string(),
        "size=large".to_string(),
    ]
}
