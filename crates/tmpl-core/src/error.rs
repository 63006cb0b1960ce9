//! Error type shared by the template store, lister, copier and fetchers

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while listing, copying or fetching templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template root could not be opened for listing
    #[error("Failed to open template directory {}: {source}", .path.display())]
    DirectoryOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A source directory could not be opened during a copy
    #[error("Failed to open source directory {}: {source}", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Path is too long ({} bytes, limit {limit}): {}", .path.as_os_str().len(), .path.display())]
    PathTooLong { path: PathBuf, limit: usize },

    #[error("Failed to read metadata for {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create directory {}: {source}", .path.display())]
    Mkdir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    FileCopy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory resolves to one of its own ancestors through a symlink
    #[error(
        "Symbolic link loop: {} points back to {}",
        .path.display(),
        .ancestor.display()
    )]
    SymlinkLoop { path: PathBuf, ancestor: PathBuf },

    #[error("{var} environment variable not found")]
    MissingEnvironment { var: &'static str },

    #[error("{program} failed: {reason}")]
    SubprocessFailure { program: String, reason: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Template '{name}' not found. Available templates: {}", .available.join(", "))]
    TemplateNotFound { name: String, available: Vec<String> },

    #[error("No available templates in {}", .root.display())]
    NoTemplates { root: PathBuf },

    #[error("Project directory already exists: {}", .path.display())]
    ProjectExists { path: PathBuf },

    #[error("Template directory {} is not empty", .path.display())]
    StoreNotEmpty { path: PathBuf },

    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    #[error("Invalid template archive: {message}")]
    Archive { message: String },
}

impl TemplateError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

pub type Result<T, E = TemplateError> = std::result::Result<T, E>;
