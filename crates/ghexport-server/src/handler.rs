// SPDX-License-Identifier: Apache-2.0

//! `POST /api/github/export-full-project`.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use ghexport_core::pacing;
use ghexport_core::{ExportOptions, ExportReport, ExportRequest, FileSource, export_project};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;
use crate::error::ApiError;

/// Message returned on a completed export.
pub const SUCCESS_MESSAGE: &str = "Project exported to GitHub successfully!";

/// Request body. Required fields are checked by [`ExportRequest::validate`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBody {
    /// GitHub token.
    pub token: Option<String>,
    /// Name of the repository to create.
    pub repo_name: Option<String>,
    /// Repository description.
    pub repo_description: Option<String>,
}

/// Upload counts for the response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    /// Files attempted.
    pub total: usize,
    /// Files stored.
    pub uploaded: usize,
    /// Files rejected.
    pub failed: usize,
    /// Paths of the rejected files.
    pub failed_files: Vec<String>,
}

/// 200 response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    /// Always `true`; failures use [`ApiError`].
    pub success: bool,
    /// Browser URL of the new repository.
    pub repo_url: String,
    /// Human readable outcome.
    pub message: String,
    /// Upload counts.
    pub stats: ExportStats,
}

impl From<ExportReport> for ExportResponse {
    fn from(report: ExportReport) -> Self {
        Self {
            success: true,
            repo_url: report.repo.html_url,
            message: SUCCESS_MESSAGE.to_string(),
            stats: ExportStats {
                total: report.summary.total,
                uploaded: report.summary.uploaded,
                failed: report.summary.failed,
                failed_files: report.summary.failed_paths,
            },
        }
    }
}

/// Exports the configured project root to a new repository owned by the token's user.
///
/// # Errors
///
/// See [`ApiError`] for the status mapping.
pub async fn export_full_project(
    State(state): State<AppState>,
    payload: Result<Json<ExportBody>, JsonRejection>,
) -> Result<Json<ExportResponse>, ApiError> {
    let Json(body) = payload?;
    let request = ExportRequest::validate(body.token, body.repo_name, body.repo_description)?;

    let export = &state.config.export;
    let options = ExportOptions::builder()
        .source(FileSource::Directory {
            root: export.project_root.clone(),
            rules: export.exclusion_rules(),
        })
        .default_description(state.config.github.default_description.clone())
        .init_delay(export.init_delay())
        .build();
    let pacer = pacing::from_config(&state.config.pacing);

    let report = export_project(state.clients.as_ref(), request, options, pacer.as_ref()).await?;
    info!(
        url = %report.repo.html_url,
        uploaded = report.summary.uploaded,
        failed = report.summary.failed,
        "Export finished"
    );

    Ok(Json(ExportResponse::from(report)))
}
