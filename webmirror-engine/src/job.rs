use std::path::{Path, PathBuf};

use reqwest::header::HeaderMap;
use url::Url;

/// Configuration for one mirror job: the seed URL, the destination root
/// and everything that shapes the traversal. Built once by the caller,
/// handed to [`Mirror`](crate::Mirror) and immutable for the job's
/// lifetime.
#[derive(Debug, Clone)]
pub struct MirrorJob {
    seed: Url,
    root: PathBuf,
    headers: HeaderMap,
    user_agent: String,
    retry_count: usize,
    download_hyperlinks: bool,
    download_images: bool,
    download_multimedia: bool,
    fallback_charset: String,
    workers: usize,
    timeout_secs: u64,
}

impl MirrorJob {
    pub fn new(root: impl Into<PathBuf>, seed: Url) -> Self {
        Self {
            seed,
            root: root.into(),
            headers: HeaderMap::new(),
            user_agent: format!("webmirror/{}", env!("CARGO_PKG_VERSION")),
            retry_count: 3,
            download_hyperlinks: true,
            download_images: true,
            download_multimedia: true,
            fallback_charset: "utf-8".to_string(),
            workers: 4,
            timeout_secs: 10,
        }
    }

    /// User-Agent sent with every request. Some origins refuse unknown
    /// clients, so callers can present whatever they like here.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Extra headers sent with every request.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Extra download attempts after a failed fetch of a single URL.
    pub fn with_retry_count(mut self, retry_count: usize) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_hyperlinks(mut self, enabled: bool) -> Self {
        self.download_hyperlinks = enabled;
        self
    }

    pub fn with_images(mut self, enabled: bool) -> Self {
        self.download_images = enabled;
        self
    }

    pub fn with_multimedia(mut self, enabled: bool) -> Self {
        self.download_multimedia = enabled;
        self
    }

    /// Charset assumed for pages whose response declares none.
    pub fn with_fallback_charset(mut self, charset: impl Into<String>) -> Self {
        self.fallback_charset = charset.into();
        self
    }

    /// Size of the page worker pool, which also bounds concurrent
    /// outbound fetches.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn retry_count(&self) -> usize {
        self.retry_count
    }

    pub fn download_hyperlinks(&self) -> bool {
        self.download_hyperlinks
    }

    pub fn download_images(&self) -> bool {
        self.download_images
    }

    pub fn download_multimedia(&self) -> bool {
        self.download_multimedia
    }

    pub fn fallback_charset(&self) -> &str {
        &self.fallback_charset
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}
