// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! [`GitHubApi`] is the seam between the export pipeline and the REST API:
//! the four calls an export needs (who am I, create a repository, look up a
//! file's blob sha, write a file). [`client::GitHubClient`] implements it over
//! reqwest; tests substitute their own implementation.

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub mod client;
pub mod provision;
pub mod ratelimit;

#[cfg(test)]
pub(crate) mod stub;

pub use client::GitHubClient;
pub use provision::{ProvisionedRepo, provision};
pub use ratelimit::RateLimitSnapshot;

/// Branch assumed when GitHub does not report one.
pub const FALLBACK_BRANCH: &str = "main";

/// Characters escaped inside a single path segment of a contents URL.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Body of `POST /user/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRepository {
    /// Repository name.
    pub name: String,
    /// Repository description.
    pub description: String,
    /// Whether the repository is private.
    pub private: bool,
    /// Create an initial commit so the default branch exists.
    pub auto_init: bool,
}

impl CreateRepository {
    /// A public, auto-initialized repository.
    pub fn public(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            private: false,
            auto_init: true,
        }
    }
}

/// Fields of the repository returned by `POST /user/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedRepository {
    /// Repository name as GitHub stored it.
    #[serde(default)]
    pub name: Option<String>,
    /// Browser URL.
    pub html_url: String,
    /// Branch the initial commit landed on.
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutContent {
    /// Commit message.
    pub message: String,
    /// Base64 file content.
    pub content: String,
    /// Target branch.
    pub branch: String,
    /// Blob sha of the file being replaced; omitted when creating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// What GitHub did with a content write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// The file was stored.
    Stored {
        /// Blob sha of the stored file, when GitHub reports it.
        sha: Option<String>,
    },
    /// GitHub answered with a non-2xx status.
    Rejected {
        /// HTTP status of the response.
        status: u16,
        /// Error message from GitHub.
        message: String,
    },
}

/// A content write that reached GitHub, accepted or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    /// Whether the file was stored.
    pub outcome: PutOutcome,
    /// Rate limit state from the response headers.
    pub rate_limit: Option<RateLimitSnapshot>,
}

impl PutReceipt {
    /// A stored write without rate limit headers.
    #[must_use]
    pub fn stored(sha: Option<String>) -> Self {
        Self {
            outcome: PutOutcome::Stored { sha },
            rate_limit: None,
        }
    }

    /// A rejected write without rate limit headers.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self {
            outcome: PutOutcome::Rejected {
                status,
                message: message.into(),
            },
            rate_limit: None,
        }
    }

    /// Attaches the rate limit state of the response.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimitSnapshot>) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}

/// The GitHub REST calls an export performs.
///
/// Implementations hold the credential; callers never see it.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Resolves the login of the authenticated user (`GET /user`).
    ///
    /// Fails with `ExportError::Authentication` when GitHub rejects the token.
    async fn authenticated_login(&self) -> crate::Result<String>;

    /// Creates a repository owned by the authenticated user (`POST /user/repos`).
    ///
    /// Fails with `ExportError::RepositoryCreation` when GitHub refuses.
    async fn create_repository(&self, request: &CreateRepository)
    -> crate::Result<CreatedRepository>;

    /// Looks up the blob sha currently stored at `path` on `branch`.
    ///
    /// Returns `Ok(None)` when the file does not exist (404).
    async fn content_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> crate::Result<Option<String>>;

    /// Creates or updates the file at `path`.
    ///
    /// A non-2xx answer is returned as [`PutOutcome::Rejected`] so the
    /// response's rate limit headers still reach the caller. `Err` is
    /// reserved for transport and decoding failures.
    async fn put_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        body: &PutContent,
    ) -> crate::Result<PutReceipt>;
}

/// Builds an API client for a caller-supplied token.
pub trait ClientFactory: Send + Sync {
    /// Returns a client authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    fn connect(&self, token: SecretString) -> crate::Result<Arc<dyn GitHubApi>>;
}

/// Percent-encodes each segment of a repository path, keeping `/` separators.
#[must_use]
pub fn encode_content_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Route of the Contents API for one file.
#[must_use]
pub fn contents_route(owner: &str, repo: &str, path: &str) -> String {
    format!(
        "/repos/{}/{}/contents/{}",
        utf8_percent_encode(owner, PATH_SEGMENT),
        utf8_percent_encode(repo, PATH_SEGMENT),
        encode_content_path(path)
    )
}
