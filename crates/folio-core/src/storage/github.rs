//! GitHub contents API store
//!
//! Documents are files on one branch of one repository. The file's blob sha
//! is the version tag: GitHub refuses an update whose `sha` is not the file's
//! current blob, which gives the conditional write the protocol relies on.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{ACCEPT, HeaderMap, USER_AGENT};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{Error, Result};

use super::{DocumentStore, RawDocument, VersionTag};

/// GitHub REST API version pinned in every request
const API_VERSION: &str = "2022-11-28";

/// Wait suggested when GitHub rate limits without a `retry-after` header
const DEFAULT_RATE_LIMIT_WAIT_SECS: u64 = 60;

const CLIENT_USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

/// Store backed by a GitHub repository
#[derive(Clone)]
pub struct GitHubStore {
    http_client: HttpClient,
    api_base_url: String,
    token: String,
    owner: String,
    repo: String,
    branch: String,
    committer: Committer,
}

impl std::fmt::Debug for GitHubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubStore")
            .field("api_base_url", &self.api_base_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
struct Committer {
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct FileContents {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateFileRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    branch: &'a str,
    committer: &'a Committer,
}

#[derive(Debug, Deserialize)]
struct UpdateFileResponse {
    content: UpdatedContent,
}

#[derive(Debug, Deserialize)]
struct UpdatedContent {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GitHubStore {
    /// Create a store for the repository named in `config`
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let (Some(token), Some(owner), Some(repo)) = (
            config.token.clone(),
            config.owner.clone(),
            config.repo.clone(),
        ) else {
            return Err(Error::not_configured(config.missing()));
        };

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(Self {
            http_client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token,
            owner,
            repo,
            branch: config.branch.clone(),
            committer: Committer {
                name: config.committer_name.clone(),
                email: config.committer_email.clone(),
            },
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base_url,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.contents_url(path))
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

#[async_trait]
impl DocumentStore for GitHubStore {
    async fn get_document(&self, path: &str) -> Result<RawDocument> {
        debug!(path = %path, branch = %self.branch, "Fetching file from GitHub");

        let response = self
            .request(reqwest::Method::GET, path)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(path, response).await);
        }

        let body: serde_json::Value = response.json().await.map_err(|e| Error::DecodeFailure {
            document: path.to_string(),
            reason: format!("invalid contents response: {}", e),
        })?;

        decode_file_contents(path, body)
    }

    async fn put_document(
        &self,
        path: &str,
        bytes: Vec<u8>,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag> {
        debug!(path = %path, expected = %expected, "Committing file to GitHub");

        let request = UpdateFileRequest {
            message,
            content: BASE64.encode(&bytes),
            sha: expected.as_str(),
            branch: &self.branch,
            committer: &self.committer,
        };

        let response = self
            .request(reqwest::Method::PUT, path)
            .json(&request)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            let error = error_from_response(path, response).await;
            if matches!(error, Error::VersionConflict { .. }) {
                warn!(path = %path, expected = %expected, "GitHub rejected stale sha");
            }
            return Err(error);
        }

        let updated: UpdateFileResponse = response.json().await.map_err(|e| {
            Error::Other(format!(
                "GitHub accepted the commit to '{}' but returned an unreadable response: {}",
                path, e
            ))
        })?;

        Ok(VersionTag::new(updated.content.sha))
    }

    fn describe(&self) -> String {
        format!("github:{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Turn a contents API body into raw document bytes
fn decode_file_contents(path: &str, body: serde_json::Value) -> Result<RawDocument> {
    let decode_failure = |reason: String| Error::DecodeFailure {
        document: path.to_string(),
        reason,
    };

    if body.is_array() {
        return Err(decode_failure("path is a directory, not a file".to_string()));
    }

    let file: FileContents = serde_json::from_value(body)
        .map_err(|e| decode_failure(format!("unexpected contents response: {}", e)))?;

    if file.encoding.as_deref().is_some_and(|enc| enc != "base64") {
        return Err(decode_failure(format!(
            "unsupported content encoding '{}'",
            file.encoding.unwrap_or_default()
        )));
    }

    let encoded = file
        .content
        .ok_or_else(|| decode_failure("response has no inline content".to_string()))?;

    // GitHub wraps base64 content at 60 columns
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| decode_failure(format!("invalid base64 content: {}", e)))?;

    Ok(RawDocument {
        bytes,
        version: VersionTag::new(file.sha),
    })
}

async fn error_from_response(path: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    classify_error(path, status, &headers, &body)
}

/// Map a non-success GitHub response onto the error taxonomy
fn classify_error(path: &str, status: StatusCode, headers: &HeaderMap, body: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());

    let retry_after = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let quota_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    match status.as_u16() {
        404 => Error::DocumentNotFound(path.to_string()),
        409 => Error::VersionConflict {
            document: path.to_string(),
        },
        422 if message.contains("does not match") => Error::VersionConflict {
            document: path.to_string(),
        },
        429 => Error::RateLimited(retry_after.unwrap_or(DEFAULT_RATE_LIMIT_WAIT_SECS)),
        403 if quota_exhausted || retry_after.is_some() => {
            Error::RateLimited(retry_after.unwrap_or(DEFAULT_RATE_LIMIT_WAIT_SECS))
        }
        401 => Error::Unauthorized(format!("GitHub rejected the token: {}", message)),
        403 => Error::Unauthorized(format!("Token lacks access to '{}': {}", path, message)),
        500..=599 => {
            Error::TransientFailure(format!("GitHub server error ({}): {}", status, message))
        }
        code => Error::StoreRejected {
            status: code,
            message,
        },
    }
}
