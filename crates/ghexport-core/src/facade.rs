// SPDX-License-Identifier: Apache-2.0

//! Platform-agnostic export entry point.
//!
//! [`export_project`] runs the whole pipeline: build a client for the caller's
//! token, provision the repository, wait for GitHub to initialize it, collect
//! the files, and upload them. Front-ends (the HTTP server, tests) only
//! validate input and render the [`ExportReport`].

use std::time::Duration;

use bon::Builder;
use secrecy::SecretString;
use serde::Serialize;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::error::ExportError;
use crate::github::{ClientFactory, ProvisionedRepo, provision};
use crate::pacing::Pacer;
use crate::upload::{UploadResult, UploadSummary, upload_all};
use crate::walk::FileSource;

/// Message returned when `token` or `repo_name` is missing.
pub const MISSING_FIELDS: &str = "Token and repository name are required";

/// A validated export request.
pub struct ExportRequest {
    /// GitHub token of the user the repository is created for.
    pub token: SecretString,
    /// Name of the repository to create.
    pub repo_name: String,
    /// Optional repository description.
    pub repo_description: Option<String>,
}

impl std::fmt::Debug for ExportRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportRequest")
            .field("token", &"[REDACTED]")
            .field("repo_name", &self.repo_name)
            .field("repo_description", &self.repo_description)
            .finish()
    }
}

impl ExportRequest {
    /// Validates raw request fields.
    ///
    /// `token` and `repo_name` are required and must not be blank; an empty
    /// description is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Validation` if a required field is missing.
    pub fn validate(
        token: Option<String>,
        repo_name: Option<String>,
        repo_description: Option<String>,
    ) -> crate::Result<Self> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ExportError::validation(MISSING_FIELDS))?;
        let repo_name = repo_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ExportError::validation(MISSING_FIELDS))?;

        Ok(Self {
            token: SecretString::from(token),
            repo_name,
            repo_description: repo_description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Knobs for a single export run.
#[derive(Debug, Builder)]
pub struct ExportOptions {
    /// Where the files come from.
    pub source: FileSource,
    /// Description used when the request has none.
    #[builder(into)]
    pub default_description: String,
    /// Wait between repository creation and the first upload.
    #[builder(default = Duration::ZERO)]
    pub init_delay: Duration,
}

/// Everything a caller needs to report on a finished export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// The repository that was created.
    pub repo: ProvisionedRepo,
    /// Per-file outcomes, one per exported file.
    pub results: Vec<UploadResult>,
    /// Aggregate counts.
    pub summary: UploadSummary,
}

/// Exports a project to a new GitHub repository.
///
/// An unreadable project root is reported before GitHub is contacted.
/// Provisioning failures (rejected token, rejected repository) abort the run
/// before any file is touched. Per-file failures are recorded in the report.
///
/// # Errors
///
/// - `ExportError::Authentication` / `ExportError::RepositoryCreation` from provisioning
/// - `ExportError::Enumeration` if the project root cannot be read
/// - `ExportError::Network` if the GitHub API is unreachable during provisioning
pub async fn export_project(
    clients: &dyn ClientFactory,
    request: ExportRequest,
    options: ExportOptions,
    pacer: &dyn Pacer,
) -> crate::Result<ExportReport> {
    let run_id = Uuid::new_v4();
    let span = info_span!("export", %run_id, repo = %request.repo_name);

    async move {
        info!("Starting GitHub export");

        // A repository created for an unreadable root would be left empty
        options.source.check()?;

        let api = clients.connect(request.token)?;
        let description = request
            .repo_description
            .unwrap_or(options.default_description);

        let repo = provision(api.as_ref(), &request.repo_name, &description).await?;

        if !options.init_delay.is_zero() {
            tokio::time::sleep(options.init_delay).await;
        }

        let files = options.source.collect().await?;
        info!(count = files.len(), "Collected project files");

        let results = upload_all(api.as_ref(), &repo, &files, pacer).await;
        let summary = UploadSummary::from_results(&results);

        Ok(ExportReport {
            repo,
            results,
            summary,
        })
    }
    .instrument(span)
    .await
}
