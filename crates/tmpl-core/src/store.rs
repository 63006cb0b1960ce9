//! The user-local template store

use crate::error::{Result, TemplateError};
use crate::product::ProductConfig;
use crate::templates::lister::{is_hidden, list_templates};
use crate::templates::manifest::TemplateManifest;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

/// A directory whose immediate subdirectories are templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate the store for a product.
    ///
    /// Resolution order: `template_dir`, then the product's environment
    /// override, then `$HOME/<store_home_path>`.
    pub fn from_config<C: ProductConfig>(config: &C, template_dir: Option<PathBuf>) -> Result<Self> {
        Self::resolve(config, template_dir, |var| std::env::var_os(var))
    }

    fn resolve<C, F>(config: &C, template_dir: Option<PathBuf>, env: F) -> Result<Self>
    where
        C: ProductConfig,
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(dir) = template_dir {
            return Ok(Self::new(dir));
        }
        if let Some(dir) = env(config.store_dir_env()).filter(|dir| !dir.is_empty()) {
            return Ok(Self::new(dir));
        }

        let home = env("HOME")
            .filter(|home| !home.is_empty())
            .ok_or(TemplateError::MissingEnvironment { var: "HOME" })?;
        Ok(Self::new(PathBuf::from(home).join(config.store_home_path())))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Template identifiers available in the store
    pub fn list(&self) -> Result<Vec<OsString>> {
        list_templates(&self.root)
    }

    /// Path a template would have, without checking that it exists
    pub fn template_path(&self, template: impl AsRef<OsStr>) -> Result<PathBuf> {
        let template = template.as_ref();
        validate_template_name(template)?;
        Ok(self.root.join(template))
    }

    /// Path of an existing template.
    ///
    /// A store that cannot be listed reports the listing error rather than
    /// an empty "not found".
    pub fn find(&self, template: impl AsRef<OsStr>) -> Result<PathBuf> {
        let template = template.as_ref();
        let path = self.template_path(template)?;
        if path.is_dir() {
            return Ok(path);
        }

        let available = self.list()?;
        Err(TemplateError::TemplateNotFound {
            name: template.to_string_lossy().into_owned(),
            available: available
                .iter()
                .map(|name| name.to_string_lossy().into_owned())
                .collect(),
        })
    }

    pub fn manifest(&self, template: impl AsRef<OsStr>) -> Option<TemplateManifest> {
        let path = self.template_path(template).ok()?;
        TemplateManifest::load(&path)
    }
}

/// A template identifier must be exactly one visible path component
pub fn validate_template_name(template: &OsStr) -> Result<()> {
    let mut components = Path::new(template).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    let separator = template
        .as_encoded_bytes()
        .iter()
        .any(|&byte| matches!(byte, b'/' | b'\\'));

    if single && !separator && !is_hidden(template) {
        Ok(())
    } else {
        Err(TemplateError::invalid(format!(
            "invalid template name '{}'",
            template.to_string_lossy()
        )))
    }
}
