//! Template discovery: the immediate subdirectories of a template root

use crate::error::{Result, TemplateError};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Maximum number of templates returned by a single listing
pub const MAX_TEMPLATES: usize = 50;

/// List the template identifiers found directly under `root`.
///
/// Names are returned verbatim, including names that are not valid UTF-8,
/// in filesystem enumeration order. Symlinks are resolved with a plain
/// `stat`, so a link back to the root itself still counts as a directory.
/// Hidden entries and anything that is not a directory are left out.
/// Entries that cannot be inspected are skipped rather than failing the
/// listing, and at most [`MAX_TEMPLATES`] names are returned.
pub fn list_templates(root: &Path) -> Result<Vec<OsString>> {
    let open_error = |source| TemplateError::DirectoryOpen {
        path: root.to_path_buf(),
        source,
    };
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(open_error(io::Error::other("not a directory"))),
        Err(source) => return Err(open_error(source)),
    }

    let mut templates = Vec::new();
    let walker = WalkDir::new(root).min_depth(1).max_depth(1);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 || err.path() == Some(root) => {
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("unreadable template directory"));
                return Err(open_error(source));
            }
            Err(err) => {
                debug!(error = %err, "skipping unreadable template entry");
                continue;
            }
        };

        let is_dir = if entry.path_is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(meta) => meta.is_dir(),
                Err(err) => {
                    debug!(path = %entry.path().display(), error = %err, "skipping unreadable template entry");
                    continue;
                }
            }
        } else {
            entry.file_type().is_dir()
        };
        if !is_dir || is_hidden(entry.file_name()) {
            continue;
        }

        if templates.len() == MAX_TEMPLATES {
            debug!(
                root = %root.display(),
                limit = MAX_TEMPLATES,
                "template listing truncated"
            );
            break;
        }
        templates.push(entry.file_name().to_os_string());
    }

    Ok(templates)
}

pub(crate) fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().starts_with(b".")
}
