// SPDX-License-Identifier: Apache-2.0

//! Repository provisioning: resolve the token's owner, then create the target repository.

use serde::Serialize;
use tracing::{info, instrument};

use super::{CreateRepository, FALLBACK_BRANCH, GitHubApi};

/// A freshly created repository, ready to receive uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedRepo {
    /// Login of the authenticated user who owns the repository.
    pub owner_login: String,
    /// Repository name.
    pub name: String,
    /// Browser URL of the repository.
    pub html_url: String,
    /// Branch uploads are committed to.
    pub default_branch: String,
}

/// Resolves the authenticated login and creates a public repository under it.
///
/// The identity lookup runs first; if GitHub rejects the token no creation
/// request is sent. Neither call is retried.
///
/// # Errors
///
/// - `ExportError::Authentication` if `GET /user` is rejected
/// - `ExportError::RepositoryCreation` if `POST /user/repos` is rejected
#[instrument(skip(api, description))]
pub async fn provision(
    api: &dyn GitHubApi,
    name: &str,
    description: &str,
) -> crate::Result<ProvisionedRepo> {
    let owner_login = api.authenticated_login().await?;
    info!(login = %owner_login, "Authenticated with GitHub");

    let created = api
        .create_repository(&CreateRepository::public(name, description))
        .await?;
    info!(url = %created.html_url, "Repository created");

    Ok(ProvisionedRepo {
        owner_login,
        name: created.name.unwrap_or_else(|| name.to_string()),
        html_url: created.html_url,
        default_branch: created
            .default_branch
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()),
    })
}
