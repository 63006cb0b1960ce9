//! Optional per-template metadata read from `template.yaml`

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// File name of the manifest inside a template directory
pub const MANIFEST_FILE: &str = "template.yaml";

/// Template metadata. Every field is optional; a template without a
/// manifest is still a valid template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateManifest {
    /// Human-readable template name
    #[serde(default)]
    pub name: Option<String>,

    /// One-line description shown next to the template identifier
    #[serde(default)]
    pub description: Option<String>,

    /// Minimum CLI version the template was written for
    #[serde(default)]
    pub version: Option<String>,
}

impl TemplateManifest {
    /// Read the manifest of the template at `template_dir`.
    ///
    /// Returns `None` when the file is missing or cannot be parsed.
    pub fn load(template_dir: &Path) -> Option<Self> {
        let path = template_dir.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path).ok()?;
        match serde_yaml::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "ignoring malformed template manifest");
                None
            }
        }
    }

    /// Hint displayed alongside the template in listings
    pub fn hint(&self) -> &str {
        self.description
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_full_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            "name: Rust CLI\ndescription: Binary crate with clap\nversion: 0.2.0\n",
        )
        .unwrap();

        let manifest = TemplateManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("Rust CLI"));
        assert_eq!(manifest.hint(), "Binary crate with clap");
        assert_eq!(manifest.version.as_deref(), Some("0.2.0"));
    }

    #[test]
    fn test_partial_manifest_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "name: Plain C\n").unwrap();

        let manifest = TemplateManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.description, None);
        assert_eq!(manifest.hint(), "Plain C");
    }

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        assert!(TemplateManifest::load(dir.path()).is_none());
    }

    #[test]
    fn test_malformed_manifest_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "name: [unclosed\n").unwrap();
        assert!(TemplateManifest::load(dir.path()).is_none());
    }

    #[test]
    fn test_empty_hint() {
        assert_eq!(TemplateManifest::default().hint(), "");
    }
}
