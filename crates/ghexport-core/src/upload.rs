// SPDX-License-Identifier: Apache-2.0

//! Sequential upload of project files through the Contents API.
//!
//! Each file goes through `Pending -> Checking -> Uploading -> Succeeded | Failed`.
//! A rejected file is recorded and the loop moves on; partial failure is a
//! normal outcome of a run. Exactly one file is in flight at any time and the
//! [`Pacer`] is awaited after each one.

use serde::Serialize;
use tracing::{info, instrument, trace, warn};

use crate::error::ExportError;
use crate::github::{
    GitHubApi, ProvisionedRepo, PutContent, PutOutcome, PutReceipt, RateLimitSnapshot,
};
use crate::pacing::Pacer;
use crate::walk::FileEntry;

/// How often (in uploaded files) a progress line is logged.
const PROGRESS_EVERY: usize = 10;

/// Lifecycle of one file within an upload run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Not started.
    Pending,
    /// Looking up an existing blob sha.
    Checking,
    /// Content write in flight.
    Uploading,
    /// Stored by GitHub.
    Succeeded,
    /// Rejected or errored.
    Failed,
}

impl FileState {
    /// Whether moving from `self` to `next` is allowed. There are no backward transitions.
    #[must_use]
    pub fn can_transition_to(self, next: FileState) -> bool {
        matches!(
            (self, next),
            (FileState::Pending, FileState::Checking)
                | (FileState::Checking, FileState::Uploading | FileState::Failed)
                | (FileState::Uploading, FileState::Succeeded | FileState::Failed)
        )
    }

    /// Whether the file has reached an outcome.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, FileState::Succeeded | FileState::Failed)
    }
}

/// Outcome for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    /// Repository-relative path.
    pub path: String,
    /// Whether GitHub stored the file.
    pub succeeded: bool,
    /// Blob sha reported by GitHub on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_sha: Option<String>,
    /// Why the file failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Aggregate counts over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    /// Number of files attempted.
    pub total: usize,
    /// Number of files stored.
    pub uploaded: usize,
    /// Number of files that failed.
    pub failed: usize,
    /// Paths of the failed files, in upload order.
    pub failed_paths: Vec<String>,
}

impl UploadSummary {
    /// Summarizes a list of results.
    #[must_use]
    pub fn from_results(results: &[UploadResult]) -> Self {
        let failed_paths: Vec<String> = results
            .iter()
            .filter(|r| !r.succeeded)
            .map(|r| r.path.clone())
            .collect();
        Self {
            total: results.len(),
            uploaded: results.len() - failed_paths.len(),
            failed: failed_paths.len(),
            failed_paths,
        }
    }
}

/// Commit message used for a file.
#[must_use]
pub fn commit_message(path: &str) -> String {
    format!("Add {path}")
}

struct Tracker<'a> {
    path: &'a str,
    state: FileState,
}

impl<'a> Tracker<'a> {
    fn new(path: &'a str) -> Self {
        Self {
            path,
            state: FileState::Pending,
        }
    }

    fn advance(&mut self, next: FileState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {:?} -> {next:?}",
            self.state
        );
        trace!(path = self.path, from = ?self.state, to = ?next, "File state");
        self.state = next;
    }

    fn succeed(mut self, remote_sha: Option<String>) -> UploadResult {
        self.advance(FileState::Succeeded);
        UploadResult {
            path: self.path.to_string(),
            succeeded: true,
            remote_sha,
            error_message: None,
        }
    }

    fn fail(mut self, message: String) -> UploadResult {
        self.advance(FileState::Failed);
        warn!(path = self.path, "Upload failed: {message}");
        UploadResult {
            path: self.path.to_string(),
            succeeded: false,
            remote_sha: None,
            error_message: Some(message),
        }
    }
}

/// Checks for an existing blob and writes one file.
///
/// Also returns the rate limit state of the write response, whether or not
/// GitHub accepted it.
async fn upload_one(
    api: &dyn GitHubApi,
    repo: &ProvisionedRepo,
    file: &FileEntry,
) -> (UploadResult, Option<RateLimitSnapshot>) {
    let mut tracker = Tracker::new(&file.path);

    tracker.advance(FileState::Checking);
    let sha = match api
        .content_sha(
            &repo.owner_login,
            &repo.name,
            &file.path,
            &repo.default_branch,
        )
        .await
    {
        Ok(sha) => sha,
        Err(e) => return (tracker.fail(e.to_string()), None),
    };

    tracker.advance(FileState::Uploading);
    let body = PutContent {
        message: commit_message(&file.path),
        content: file.encoded_content(),
        branch: repo.default_branch.clone(),
        sha,
    };
    match api
        .put_content(&repo.owner_login, &repo.name, &file.path, &body)
        .await
    {
        Ok(PutReceipt {
            outcome: PutOutcome::Stored { sha },
            rate_limit,
        }) => (tracker.succeed(sha), rate_limit),
        Ok(PutReceipt {
            outcome: PutOutcome::Rejected { status, message },
            rate_limit,
        }) => {
            let err = ExportError::Upload {
                path: file.path.clone(),
                message: format!("HTTP {status}: {message}"),
            };
            (tracker.fail(err.to_string()), rate_limit)
        }
        Err(e) => (tracker.fail(e.to_string()), None),
    }
}

/// Uploads `files` to `repo` one at a time.
///
/// Returns exactly one [`UploadResult`] per input file, in input order.
#[instrument(skip_all, fields(repo = %repo.name, total = files.len()))]
pub async fn upload_all(
    api: &dyn GitHubApi,
    repo: &ProvisionedRepo,
    files: &[FileEntry],
    pacer: &dyn Pacer,
) -> Vec<UploadResult> {
    let total = files.len();
    let mut results = Vec::with_capacity(total);
    let mut uploaded = 0usize;

    for file in files {
        let (result, rate_limit) = upload_one(api, repo, file).await;
        if result.succeeded {
            uploaded += 1;
            if uploaded % PROGRESS_EVERY == 0 || uploaded == total {
                info!("Uploaded {uploaded}/{total}");
            }
        }
        results.push(result);
        pacer.pause(rate_limit.as_ref()).await;
    }

    let summary = UploadSummary::from_results(&results);
    info!(
        uploaded = summary.uploaded,
        failed = summary.failed,
        "Upload complete: {}/{} files",
        summary.uploaded,
        summary.total
    );
    if !summary.failed_paths.is_empty() {
        warn!(failed = ?summary.failed_paths, "{} files could not be uploaded", summary.failed);
    }

    results
}
