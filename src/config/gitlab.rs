use serde::{Deserialize, Serialize};
use url::Url;

/// Remote API configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitlabConfig {
    /// Base URL of the GitLab REST API.
    /// TOML: `gitlab.base_url`. Default: `https://gitlab.com/api/v4`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Bearer token sent in the `Authorization` header. Required for
    /// commands that talk to the remote; never logged.
    /// TOML: `gitlab.token`, or `GLSYNC_GITLAB__TOKEN`.
    #[serde(default)]
    pub token: String,

    /// Per-request timeout in seconds for remote calls.
    /// TOML: `gitlab.http_timeout_secs`. Default: `30`.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Max retry attempts for transient upstream failures.
    /// TOML: `gitlab.retry_max_times`. Default: `3`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,

    /// Page size for project listing requests.
    /// TOML: `gitlab.per_page`. Default: `100`.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            http_timeout_secs: default_http_timeout_secs(),
            retry_max_times: default_retry_max_times(),
            per_page: default_per_page(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://gitlab.com/api/v4").expect("default base url is valid")
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_retry_max_times() -> usize {
    3
}

fn default_per_page() -> u32 {
    100
}
