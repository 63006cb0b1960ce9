//! Project creation: a new directory filled with a copy of a template

use crate::error::{Result, TemplateError};
use crate::store::TemplateStore;
use crate::templates::copier::copy_tree;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// A `NAME:TEMPLATE` request from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    pub name: String,
    pub template: String,
}

impl FromStr for ProjectSpec {
    type Err = TemplateError;

    fn from_str(value: &str) -> Result<Self> {
        let (name, template) = value.split_once(':').ok_or_else(|| {
            TemplateError::invalid(format!(
                "invalid format '{}', expected NAME:TEMPLATE",
                value
            ))
        })?;

        if name.is_empty() {
            return Err(TemplateError::invalid("missing project name"));
        }
        if template.is_empty() {
            return Err(TemplateError::invalid("missing template"));
        }
        if template.contains(':') {
            return Err(TemplateError::invalid(format!(
                "unexpected ':' in template '{}'",
                template
            )));
        }
        validate_project_name(name)?;

        Ok(Self {
            name: name.to_string(),
            template: template.to_string(),
        })
    }
}

pub fn validate_project_name(name: &str) -> Result<()> {
    match name.trim() {
        "" => Err(TemplateError::invalid("project name cannot be empty")),
        "." | ".." => Err(TemplateError::invalid(format!(
            "'{}' is not a valid project name",
            name
        ))),
        _ => Ok(()),
    }
}

/// Result of a successful [`create_project`]
#[derive(Debug, Clone)]
pub struct CreatedProject {
    pub dir: PathBuf,
    pub template: String,
    /// Copied files, relative to `dir`
    pub files: Vec<PathBuf>,
}

/// Create `parent/name` and copy `template` from `store` into it.
///
/// The template is looked up before anything is created, so an unknown
/// template leaves no directory behind. A copy failure does not remove what
/// was already written.
pub fn create_project(
    store: &TemplateStore,
    name: &str,
    template: impl AsRef<OsStr>,
    parent: &Path,
) -> Result<CreatedProject> {
    validate_project_name(name)?;
    let template_dir = store.find(&template)?;
    let template = template.as_ref().to_string_lossy().into_owned();

    let dir = parent.join(name);
    fs::create_dir(&dir).map_err(|source| {
        if source.kind() == io::ErrorKind::AlreadyExists {
            TemplateError::ProjectExists { path: dir.clone() }
        } else {
            TemplateError::Mkdir {
                path: dir.clone(),
                source,
            }
        }
    })?;

    let files = copy_tree(&template_dir, &dir)?;
    info!(
        project = %dir.display(),
        %template,
        files = files.len(),
        "project created"
    );

    Ok(CreatedProject {
        dir,
        template,
        files,
    })
}
