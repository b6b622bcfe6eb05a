// SPDX-License-Identifier: Apache-2.0

//! reqwest implementation of [`GitHubApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{
    ClientFactory, CreateRepository, CreatedRepository, GitHubApi, PutContent, PutReceipt,
    RateLimitSnapshot, contents_route,
};
use crate::config::GitHubConfig;
use crate::error::ExportError;

/// Media type requested from the REST API.
const GITHUB_JSON: &str = "application/vnd.github+json";

/// REST API version pinned for every request.
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct UserBody {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PutBody {
    #[serde(default)]
    content: Option<ContentBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// GitHub REST client bound to one token.
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: SecretString,
}

impl GitHubClient {
    /// Creates a client for `token` using the API settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Network` if the HTTP client cannot be built.
    pub fn new(config: &GitHubConfig, token: SecretString) -> crate::Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.api_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, method: Method, route: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{route}", self.base_url))
            .bearer_auth(self.token.expose_secret())
            .header(ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

/// Extracts GitHub's `message` from an error response, falling back to the raw body.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.message,
        Err(_) if !body.trim().is_empty() => body,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> crate::Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ExportError::InvalidResponse {
        message: e.to_string(),
    })
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self))]
    async fn authenticated_login(&self) -> crate::Result<String> {
        let response = self.request(Method::GET, "/user").send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Authentication {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        let user: UserBody = decode(response).await?;
        debug!(login = %user.login, "Resolved authenticated user");
        Ok(user.login)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_repository(
        &self,
        request: &CreateRepository,
    ) -> crate::Result<CreatedRepository> {
        let response = self
            .request(Method::POST, "/user/repos")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::RepositoryCreation {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        decode(response).await
    }

    #[instrument(skip(self))]
    async fn content_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> crate::Result<Option<String>> {
        let response = self
            .request(Method::GET, &contents_route(owner, repo, path))
            .query(&[("ref", branch)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ExportError::Upload {
                path: path.to_string(),
                message: format!(
                    "existence check failed (HTTP {}): {}",
                    status.as_u16(),
                    error_message(response).await
                ),
            });
        }

        // Directories come back as arrays and have no blob sha
        let body: ContentBody = decode(response).await?;
        Ok(Some(body.sha))
    }

    #[instrument(skip(self, body), fields(update = body.sha.is_some()))]
    async fn put_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        body: &PutContent,
    ) -> crate::Result<PutReceipt> {
        let response = self
            .request(Method::PUT, &contents_route(owner, repo, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let rate_limit = RateLimitSnapshot::from_headers(response.headers());
        if !status.is_success() {
            let message = error_message(response).await;
            debug!(status = status.as_u16(), "Content write rejected: {message}");
            return Ok(
                PutReceipt::rejected(status.as_u16(), message).with_rate_limit(rate_limit),
            );
        }

        let stored: PutBody = decode(response).await?;
        Ok(PutReceipt::stored(stored.content.map(|c| c.sha)).with_rate_limit(rate_limit))
    }
}

/// Builds [`GitHubClient`]s from the configured API settings.
#[derive(Debug, Clone)]
pub struct GitHubClientFactory {
    config: GitHubConfig,
}

impl GitHubClientFactory {
    /// Creates a factory for the given API settings.
    #[must_use]
    pub fn new(config: GitHubConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for GitHubClientFactory {
    fn connect(&self, token: SecretString) -> crate::Result<Arc<dyn GitHubApi>> {
        Ok(Arc::new(GitHubClient::new(&self.config, token)?))
    }
}
