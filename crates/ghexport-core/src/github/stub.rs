// SPDX-License-Identifier: Apache-2.0

//! In-memory [`GitHubApi`] that records every call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;

use super::{
    ClientFactory, CreateRepository, CreatedRepository, GitHubApi, PutContent, PutReceipt,
    RateLimitSnapshot,
};
use crate::error::ExportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    User,
    CreateRepo(CreateRepository),
    ContentSha { path: String, branch: String },
    Put { path: String, body: PutContent },
}

pub(crate) struct StubApi {
    token_valid: bool,
    creation_error: Option<String>,
    default_branch: Option<String>,
    existing: HashMap<String, String>,
    check_failures: HashMap<String, u16>,
    put_failures: HashMap<String, (u16, String)>,
    rate_limit: Option<RateLimitSnapshot>,
    calls: Mutex<Vec<Call>>,
}

impl StubApi {
    pub(crate) fn new() -> Self {
        Self {
            token_valid: true,
            creation_error: None,
            default_branch: Some("main".to_string()),
            existing: HashMap::new(),
            check_failures: HashMap::new(),
            put_failures: HashMap::new(),
            rate_limit: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn reject_token(mut self) -> Self {
        self.token_valid = false;
        self
    }

    pub(crate) fn reject_creation(mut self, message: &str) -> Self {
        self.creation_error = Some(message.to_string());
        self
    }

    pub(crate) fn with_default_branch(mut self, branch: Option<&str>) -> Self {
        self.default_branch = branch.map(ToString::to_string);
        self
    }

    pub(crate) fn with_existing(mut self, path: &str, sha: &str) -> Self {
        self.existing.insert(path.to_string(), sha.to_string());
        self
    }

    pub(crate) fn fail_check(mut self, path: &str, status: u16) -> Self {
        self.check_failures.insert(path.to_string(), status);
        self
    }

    pub(crate) fn reject_put(mut self, path: &str, status: u16, message: &str) -> Self {
        self.put_failures
            .insert(path.to_string(), (status, message.to_string()));
        self
    }

    /// Rate limit headers attached to every write response.
    pub(crate) fn with_rate_limit(mut self, rate_limit: RateLimitSnapshot) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn puts(&self) -> Vec<(String, PutContent)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Put { path, body } => Some((path, body)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GitHubApi for StubApi {
    async fn authenticated_login(&self) -> crate::Result<String> {
        self.record(Call::User);
        if self.token_valid {
            Ok("octocat".to_string())
        } else {
            Err(ExportError::Authentication {
                status: 401,
                message: "Bad credentials".to_string(),
            })
        }
    }

    async fn create_repository(
        &self,
        request: &CreateRepository,
    ) -> crate::Result<CreatedRepository> {
        self.record(Call::CreateRepo(request.clone()));
        if let Some(message) = &self.creation_error {
            return Err(ExportError::RepositoryCreation {
                status: 422,
                message: message.clone(),
            });
        }
        Ok(CreatedRepository {
            name: Some(request.name.clone()),
            html_url: format!("https://github.com/octocat/{}", request.name),
            default_branch: self.default_branch.clone(),
        })
    }

    async fn content_sha(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
        branch: &str,
    ) -> crate::Result<Option<String>> {
        self.record(Call::ContentSha {
            path: path.to_string(),
            branch: branch.to_string(),
        });
        if let Some(status) = self.check_failures.get(path) {
            return Err(ExportError::Upload {
                path: path.to_string(),
                message: format!("existence check failed (HTTP {status})"),
            });
        }
        Ok(self.existing.get(path).cloned())
    }

    async fn put_content(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
        body: &PutContent,
    ) -> crate::Result<PutReceipt> {
        self.record(Call::Put {
            path: path.to_string(),
            body: body.clone(),
        });
        if let Some((status, message)) = self.put_failures.get(path) {
            return Ok(
                PutReceipt::rejected(*status, message.clone()).with_rate_limit(self.rate_limit),
            );
        }
        Ok(PutReceipt::stored(Some(format!("sha-{path}"))).with_rate_limit(self.rate_limit))
    }
}

/// Hands out the same [`StubApi`] for every token and counts connections.
pub(crate) struct StubFactory {
    pub(crate) api: Arc<StubApi>,
    connects: AtomicUsize,
}

impl StubFactory {
    pub(crate) fn new(api: StubApi) -> Self {
        Self {
            api: Arc::new(api),
            connects: AtomicUsize::new(0),
        }
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ClientFactory for StubFactory {
    fn connect(&self, _token: SecretString) -> crate::Result<Arc<dyn GitHubApi>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.api.clone())
    }
}
