//! HTTP client for the GitLab projects API.
//!
//! Transport failures, 5xx and 429 are retried with exponential backoff;
//! 401/403 are fatal and never retried. Page bodies are decoded
//! record-by-record so a single malformed project cannot poison a batch.

use crate::config::GitlabConfig;
use crate::error::{GlsyncError, IsRetryable};
use backon::{ExponentialBuilder, Retryable};
use glsync_schema::RemoteProject;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const NEXT_PAGE_HEADER: &str = "x-next-page";

/// A record in a fetched page that did not decode to a `RemoteProject`.
#[derive(Debug, Clone)]
pub struct MalformedRecord {
    /// Remote id when the raw JSON carried one.
    pub id: Option<i64>,
    pub reason: String,
}

/// One page of `GET /projects`.
#[derive(Debug, Clone)]
pub struct ProjectPage {
    pub records: Vec<RemoteProject>,
    pub malformed: Vec<MalformedRecord>,
    pub next_page: Option<u32>,
}

#[derive(Debug)]
pub struct GitlabClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    retry_policy: ExponentialBuilder,
    per_page: u32,
}

impl GitlabClient {
    /// Builds a client from resolved configuration. Fails when the token is
    /// missing; the token itself is never logged.
    pub fn new(cfg: &GitlabConfig) -> Result<Self, GlsyncError> {
        if cfg.token.trim().is_empty() {
            return Err(GlsyncError::Config(
                "gitlab.token must be set (config file or GLSYNC_GITLAB__TOKEN)".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;

        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(cfg.retry_max_times)
            .with_jitter();

        Ok(Self {
            http,
            base_url: cfg.base_url.clone(),
            token: cfg.token.clone(),
            retry_policy,
            per_page: cfg.per_page,
        })
    }

    /// Fetches one page of projects. Returns the decoded records, the
    /// malformed leftovers and the next page number when the remote
    /// advertises one.
    pub async fn fetch_projects(&self, page: u32) -> Result<ProjectPage, GlsyncError> {
        let url = self.endpoint(&["projects"])?;
        let resp = self
            .get_with_retry(&url, &[("page", page), ("per_page", self.per_page)])
            .await?;

        let next_page = next_page_from_headers(&resp);
        let body = resp.bytes().await.map_err(GlsyncError::Network)?;
        let raw: Vec<Value> = serde_json::from_slice(&body)
            .map_err(|e| GlsyncError::MalformedResponse(format!("project list: {e}")))?;

        let mut records = Vec::with_capacity(raw.len());
        let mut malformed = Vec::new();
        for value in raw {
            let id = value.get("id").and_then(Value::as_i64);
            match serde_json::from_value::<RemoteProject>(value) {
                Ok(project) => records.push(project),
                Err(e) => {
                    warn!(id, error = %e, "skipping malformed project record");
                    malformed.push(MalformedRecord {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            page,
            decoded = records.len(),
            malformed = malformed.len(),
            next_page,
            "fetched project page"
        );
        Ok(ProjectPage {
            records,
            malformed,
            next_page,
        })
    }

    /// Fetches a single project; 404 maps to `NotFound`.
    pub async fn fetch_project(&self, id: i64) -> Result<RemoteProject, GlsyncError> {
        let url = self.endpoint(&["projects", &id.to_string()])?;
        let resp = match self.get_with_retry::<u32>(&url, &[]).await {
            Err(GlsyncError::UpstreamStatus(StatusCode::NOT_FOUND)) => {
                return Err(GlsyncError::NotFound(id));
            }
            other => other?,
        };

        let body = resp.bytes().await.map_err(GlsyncError::Network)?;
        serde_json::from_slice(&body)
            .map_err(|e| GlsyncError::MalformedResponse(format!("project {id}: {e}")))
    }

    /// GET with bearer auth. Each response is classified into the error
    /// taxonomy up front; `IsRetryable` then decides what the backoff loop
    /// retries (transport errors, 5xx, 429) and what aborts immediately
    /// (auth failures and other client errors).
    async fn get_with_retry<Q>(
        &self,
        url: &Url,
        query: &[(&str, Q)],
    ) -> Result<reqwest::Response, GlsyncError>
    where
        Q: serde::Serialize,
    {
        (|| {
            let request = self
                .http
                .get(url.clone())
                .bearer_auth(&self.token)
                .query(query);

            async move {
                let resp = request.send().await.map_err(GlsyncError::Network)?;
                let status = resp.status();
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    return Err(GlsyncError::Auth(status));
                }
                if status == StatusCode::TOO_MANY_REQUESTS {
                    debug!(%status, url = %resp.url(), "upstream rate limit (will retry)");
                    return Err(GlsyncError::RateLimited);
                }
                if !status.is_success() {
                    if status.is_server_error() {
                        debug!(%status, url = %resp.url(), "upstream server error (will retry)");
                    }
                    return Err(GlsyncError::UpstreamStatus(status));
                }
                Ok(resp)
            }
        })
        .retry(self.retry_policy)
        .when(IsRetryable::is_retryable)
        .await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GlsyncError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| GlsyncError::Config("gitlab.base_url cannot be a base".to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

fn next_page_from_headers(resp: &reqwest::Response) -> Option<u32> {
    resp.headers()
        .get(NEXT_PAGE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}
