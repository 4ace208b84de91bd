use crate::listing::PageSpec;
use crate::session::Credentials;
use serde::Deserialize;
use std::path::PathBuf;

/// Tunable settings, optionally loaded from a TOML file
///
/// Every section and field has a default, so an empty file (or no file at
/// all) yields a working configuration against the public site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub site: SiteConfig,
    pub api: ApiConfig,
    pub pdf: PdfConfig,
    pub cache: CacheConfig,
}

/// News site endpoints and login behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SiteConfig {
    /// Root of the news site, e.g. `https://news.ycombinator.com/`
    pub base_url: String,

    /// Path of the login form endpoint, relative to `base_url`
    pub login_path: String,

    /// Path of the saved-items listing, relative to `base_url`
    pub listing_path: String,

    /// Browser user agent sent with every site request
    pub user_agent: String,

    /// Accept header sent with the login request
    pub accept: String,

    /// Marker the site prints when credentials are rejected
    pub bad_login_marker: String,

    /// Upper bound on pages followed while discovering the page count
    pub max_discovery_pages: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://news.ycombinator.com/".to_string(),
            login_path: "login".to_string(),
            listing_path: "upvoted".to_string(),
            user_agent:
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.9; rv:25.0) Gecko/20100101 Firefox/25.0"
                    .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            bad_login_marker: "Bad login".to_string(),
            max_discovery_pages: 1000,
            timeout_secs: 30,
        }
    }
}

/// Item API endpoint and request pacing
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ApiConfig {
    /// Root of the JSON API; items live at `item/<id>.json` below it
    pub base_url: String,

    /// Delay before every item request (milliseconds)
    pub request_delay_ms: u64,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Extra attempts after a failed item request
    pub max_retries: u32,

    /// Base backoff between retries, doubled on each attempt (milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hacker-news.firebaseio.com/v0/".to_string(),
            request_delay_ms: 200,
            timeout_secs: 30,
            max_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

/// PDF renderer invocation and output checks
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PdfConfig {
    /// Renderer executable
    pub renderer: String,

    /// Arguments placed before the URL and destination path
    pub renderer_args: Vec<String>,

    /// Article PDFs at or below this size are reported as likely empty
    pub min_size_bytes: u64,

    /// Longest directory/file stem derived from a story title
    pub max_name_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            renderer: "wkhtmltopdf".to_string(),
            renderer_args: vec!["--quiet".to_string()],
            min_size_bytes: 2048,
            max_name_length: 120,
        }
    }
}

/// Merge/cache behavior
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CacheConfig {
    /// Reuse cached comments too; stories are always reused
    pub cache_comments: bool,
}

/// Which item collections a run processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    StoriesOnly,
    CommentsOnly,
    Both,
}

impl Selection {
    /// Resolves the `--stories` / `--comments` flags
    ///
    /// Passing both flags is treated like passing neither: both collections
    /// are processed.
    pub fn from_flags(stories: bool, comments: bool) -> Self {
        match (stories, comments) {
            (true, false) => Selection::StoriesOnly,
            (false, true) => Selection::CommentsOnly,
            _ => Selection::Both,
        }
    }

    pub fn includes_stories(self) -> bool {
        matches!(self, Selection::StoriesOnly | Selection::Both)
    }

    pub fn includes_comments(self) -> bool {
        matches!(self, Selection::CommentsOnly | Selection::Both)
    }
}

/// Everything one run needs, built once and passed down explicitly
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credentials: Credentials,

    /// Output document path; also the cache snapshot read at startup
    pub output_file: Option<PathBuf>,

    pub pages: PageSpec,
    pub selection: Selection,

    /// Whether to render PDFs after the document is written
    pub pdf: bool,

    /// Root directory for rendered PDFs
    pub output_folder: PathBuf,

    pub settings: Settings,
}
