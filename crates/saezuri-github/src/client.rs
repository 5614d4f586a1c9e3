//! GitHub contents API client implementation.

use std::time::Duration;

use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GitHubError, encoding};

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Connection settings for a repository-backed store.
///
/// Supplied explicitly by the caller; the client holds no ambient state and
/// never logs or persists the token.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    pub token: String,
}

/// A file body plus the blob SHA that guards the next write.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub content: String,
    pub sha: String,
}

/// Client for file operations against a single GitHub repository.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct GetContentResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PutContentResponse {
    content: PutContentBlob,
}

#[derive(Debug, Deserialize)]
struct PutContentBlob {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GitHubClient {
    /// Create a client for the given repository.
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubError> {
        Self::with_api_base(config, DEFAULT_API_BASE)
    }

    /// Create a client against a non-default API base URL.
    ///
    /// Used by tests to point the client at a mock server.
    pub fn with_api_base(
        config: GitHubConfig,
        api_base: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        if config.token.is_empty() {
            return Err(GitHubError::Auth("GitHub token is required".to_string()));
        }
        if config.owner.is_empty() || config.repo.is_empty() {
            return Err(GitHubError::Config(
                "GitHub owner and repo are required".to_string(),
            ));
        }

        let http = Client::builder()
            .user_agent("saezuri")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Ok(Self {
            http,
            api_base: api_base.into(),
            owner: config.owner,
            repo: config.repo,
            token: config.token,
        })
    }

    /// Fetch a file and its blob SHA. A missing file is `Ok(None)`.
    pub async fn get_file(&self, path: &str) -> Result<Option<FileContent>, GitHubError> {
        let response = self
            .http
            .get(self.contents_url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check_status(response, path).await?;
        Self::log_rate_limit(&response);

        let body: GetContentResponse = response.json().await?;
        let content = encoding::decode_base64(&body.content)?;

        Ok(Some(FileContent {
            content,
            sha: body.sha,
        }))
    }

    /// Write a file, guarded by the blob SHA from the last read.
    ///
    /// Pass `None` for `sha` only when the file does not exist yet; GitHub
    /// rejects a stale SHA with a 409, surfaced as [`GitHubError::Conflict`].
    /// Returns the new blob SHA on success.
    pub async fn put_file(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
        message: &str,
    ) -> Result<String, GitHubError> {
        #[derive(Serialize)]
        struct PutRequest<'a> {
            message: &'a str,
            content: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            sha: Option<&'a str>,
        }

        let response = self
            .http
            .put(self.contents_url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .json(&PutRequest {
                message,
                content: encoding::encode_base64(content),
                sha,
            })
            .send()
            .await?;

        let response = Self::check_status(response, path).await?;
        Self::log_rate_limit(&response);

        let body: PutContentResponse = response.json().await?;
        Ok(body.content.sha)
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Log remaining-quota telemetry when the header is present.
    fn log_rate_limit(response: &reqwest::Response) {
        if let Some(remaining) = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
        {
            debug!(remaining, "GitHub API rate limit");
        }
    }

    /// Map a non-success status to the typed error taxonomy.
    async fn check_status(
        response: reqwest::Response,
        path: &str,
    ) -> Result<reqwest::Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset_at = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0));
            return Err(GitHubError::RateLimited { reset_at });
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        match status.as_u16() {
            401 | 403 => Err(GitHubError::Auth(format!(
                "{}: check your GitHub token",
                message
            ))),
            404 => Err(GitHubError::NotFound {
                path: path.to_string(),
            }),
            409 => Err(GitHubError::Conflict {
                path: path.to_string(),
            }),
            500..=599 => Err(GitHubError::Server {
                status: status.as_u16(),
                message,
            }),
            other => Err(GitHubError::Api {
                status: other,
                message,
            }),
        }
    }
}
