//! Product configuration trait for CLI binaries
//!
//! The binary implements this trait to name itself and to choose where the
//! template store lives and where it is fetched from.

use std::path::Path;

/// Configuration trait for a scaffolding CLI
///
/// Defines:
/// - Product identity (name, display name)
/// - Template store location and its environment override
/// - Remote template source and its environment override
/// - Post-creation instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI command and user agent)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Template store location relative to the home directory
    fn store_home_path(&self) -> &'static str {
        ".local/template"
    }

    /// Environment variable overriding the template store location
    fn store_dir_env(&self) -> &'static str;

    /// Default remote source used to initialize the template store
    fn default_store_url(&self) -> &'static str;

    /// Environment variable overriding the remote source
    fn store_url_env(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, project_dir: &Path, template: &str) -> Vec<String>;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
