// SPDX-License-Identifier: Apache-2.0

//! Project file enumeration.
//!
//! Walks a project directory and produces the [`FileEntry`] list that gets
//! uploaded. Build output, dependency caches, VCS metadata, secrets and
//! dotfiles are pruned by [`ExclusionRules`]. Entries that cannot be read are
//! logged and skipped so one bad file never aborts the export.

use std::path::{Component, Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ignore::WalkBuilder;
use tracing::{debug, instrument, warn};

use crate::error::ExportError;

/// Names skipped by default, wherever they appear in the tree.
pub const DEFAULT_EXCLUDED_NAMES: &[&str] = &[
    "node_modules",
    ".next",
    ".git",
    "dist",
    "build",
    ".env",
    ".env.local",
];

/// Dotfiles exported by default.
pub const DEFAULT_ALLOWED_DOTFILES: &[&str] = &[".well-known"];

/// A single file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// POSIX-style path relative to the project root, without a leading slash.
    pub path: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

impl FileEntry {
    /// Git file mode for regular files.
    pub const MODE: &'static str = "100644";

    /// Git object kind.
    pub const KIND: &'static str = "blob";

    /// Creates an entry from a relative path and its bytes.
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Standard base64 encoding of the content, as the Contents API expects.
    #[must_use]
    pub fn encoded_content(&self) -> String {
        STANDARD.encode(&self.content)
    }
}

/// Names pruned from the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRules {
    /// Exact file or directory names to skip.
    pub excluded_names: Vec<String>,
    /// Names starting with `.` that are kept anyway.
    pub allowed_dotfiles: Vec<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            excluded_names: DEFAULT_EXCLUDED_NAMES
                .iter()
                .map(ToString::to_string)
                .collect(),
            allowed_dotfiles: DEFAULT_ALLOWED_DOTFILES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ExclusionRules {
    /// Returns `true` if a file or directory with this name must not be exported.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        if self.excluded_names.iter().any(|n| n == name) {
            return true;
        }
        name.starts_with('.') && !self.allowed_dotfiles.iter().any(|n| n == name)
    }
}

/// Where the files of an export come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Walk a directory on disk.
    Directory {
        /// Project root.
        root: PathBuf,
        /// Names to prune.
        rules: ExclusionRules,
    },
    /// An explicit list supplied by the caller.
    Manifest(Vec<FileEntry>),
}

impl FileSource {
    /// Checks that the source can be read at all.
    ///
    /// Cheap enough to run before any remote side effect.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Enumeration` if a directory root is missing or
    /// not a directory.
    pub fn check(&self) -> crate::Result<()> {
        match self {
            FileSource::Manifest(_) => Ok(()),
            FileSource::Directory { root, .. } => ensure_directory(root),
        }
    }

    /// Materializes the file list.
    ///
    /// Directory walks run on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Enumeration` if the root is unusable.
    pub async fn collect(self) -> crate::Result<Vec<FileEntry>> {
        match self {
            FileSource::Manifest(entries) => Ok(entries),
            FileSource::Directory { root, rules } => {
                let display = root.display().to_string();
                tokio::task::spawn_blocking(move || enumerate(&root, &rules))
                    .await
                    .map_err(|e| ExportError::Enumeration {
                        root: display,
                        message: e.to_string(),
                    })?
            }
        }
    }
}

/// Recursively collects every exportable regular file under `root`.
///
/// Symbolic links and unreadable entries are skipped with a warning.
///
/// # Errors
///
/// Returns `ExportError::Enumeration` if `root` does not exist or is not a
/// directory.
#[instrument(skip(rules), fields(root = %root.display()))]
pub fn enumerate(root: &Path, rules: &ExclusionRules) -> crate::Result<Vec<FileEntry>> {
    ensure_directory(root)?;

    let filter_rules = rules.clone();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            // The root itself is never pruned, whatever it is called
            entry.depth() == 0
                || !filter_rules.is_excluded(&entry.file_name().to_string_lossy())
        })
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        if entry.path_is_symlink() {
            warn!(path = %entry.path().display(), "Skipping symbolic link");
            continue;
        }

        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            debug!(path = %entry.path().display(), "Entering directory");
            continue;
        }
        if !file_type.is_file() {
            debug!(path = %entry.path().display(), "Skipping special file");
            continue;
        }

        let Some(relative) = relative_posix_path(root, entry.path()) else {
            warn!(path = %entry.path().display(), "Skipping file with non UTF-8 path");
            continue;
        };

        match std::fs::read(entry.path()) {
            Ok(content) => {
                debug!(path = %relative, bytes = content.len(), "Collected file");
                files.push(FileEntry::new(relative, content));
            }
            Err(e) => {
                warn!(path = %relative, "Skipping unreadable file: {e}");
            }
        }
    }

    debug!(count = files.len(), "Enumeration complete");
    Ok(files)
}

/// Fails unless `root` exists and is a directory.
fn ensure_directory(root: &Path) -> crate::Result<()> {
    let metadata = std::fs::metadata(root).map_err(|e| ExportError::Enumeration {
        root: root.display().to_string(),
        message: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(ExportError::Enumeration {
            root: root.display().to_string(),
            message: "not a directory".to_string(),
        });
    }
    Ok(())
}

/// Builds the `/`-separated path of `path` relative to `root`.
fn relative_posix_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
