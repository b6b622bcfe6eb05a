// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # ghexport Core
//!
//! Core library for ghexport - push a local project into a brand new GitHub
//! repository.
//!
//! This crate provides reusable components for:
//! - Project file enumeration with exclusion rules
//! - GitHub REST integration (user lookup, repository creation, Contents API)
//! - Sequential, paced file uploads with per-file outcomes
//! - Configuration management
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use ghexport_core::{
//!     ExportOptions, ExportRequest, FileSource, GitHubClientFactory, export_project, load_config,
//! };
//! use ghexport_core::pacing::FixedDelay;
//!
//! # async fn example() -> ghexport_core::Result<()> {
//! let config = load_config()?;
//! let clients = GitHubClientFactory::new(config.github.clone());
//!
//! let request = ExportRequest::validate(
//!     Some("ghp_xxx".to_string()),
//!     Some("my-project".to_string()),
//!     None,
//! )?;
//! let options = ExportOptions::builder()
//!     .source(FileSource::Directory {
//!         root: config.export.project_root.clone(),
//!         rules: config.export.exclusion_rules(),
//!     })
//!     .default_description(config.github.default_description.clone())
//!     .init_delay(config.export.init_delay())
//!     .build();
//!
//! let report = export_project(
//!     &clients,
//!     request,
//!     options,
//!     &FixedDelay::new(Duration::from_millis(300)),
//! )
//! .await?;
//! println!("{} of {} files uploaded", report.summary.uploaded, report.summary.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types
//! - [`facade`] - The export pipeline entry point
//! - [`github`] - GitHub REST API (client, provisioning, rate limits)
//! - [`pacing`] - Delay strategies between uploads
//! - [`upload`] - Per-file upload and aggregation
//! - [`walk`] - Project file enumeration

// ============================================================================
// Error Handling
// ============================================================================

pub use error::ExportError;

/// Convenience Result type for ghexport operations.
///
/// This is equivalent to `std::result::Result<T, ExportError>`.
pub type Result<T> = std::result::Result<T, ExportError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AppConfig, ExportConfig, GitHubConfig, PacingConfig, PacingStrategy, ServerConfig, config_dir,
    config_file_path, load_config,
};

// ============================================================================
// File Enumeration
// ============================================================================

pub use walk::{ExclusionRules, FileEntry, FileSource, enumerate};

// ============================================================================
// GitHub Integration
// ============================================================================

pub use github::client::GitHubClientFactory;
pub use github::{ClientFactory, GitHubApi, GitHubClient, ProvisionedRepo, RateLimitSnapshot};

// ============================================================================
// Uploading
// ============================================================================

pub use pacing::Pacer;
pub use upload::{FileState, UploadResult, UploadSummary};

// ============================================================================
// Platform-Agnostic Facade
// ============================================================================

pub use facade::{ExportOptions, ExportReport, ExportRequest, export_project};

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod facade;
pub mod github;
pub mod pacing;
pub mod upload;
pub mod walk;
