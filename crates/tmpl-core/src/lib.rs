//! tmpl core - create projects from a user-local template store
//!
//! A template store is a directory (by default `~/.local/template`) whose
//! immediate subdirectories are templates. Creating a project makes a new
//! directory and copies the chosen template into it verbatim.
//!
//! # Architecture
//!
//! - **Core operations**: [`templates::list_templates`] and
//!   [`templates::copy_tree`], plain blocking filesystem functions
//! - **Workflow**: [`TemplateStore`], [`project::create_project`] and the
//!   [`ProductConfig`] trait the binary implements
//! - **Store initialization**: [`templates::StoreFetcher`] with git and zip
//!   archive implementations
//! - **Interactive prompts**: optional cliclack-based flow (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use tmpl_core::{project, TemplateStore};
//!
//! let store = TemplateStore::from_config(&MyConfig, None)?;
//! for name in store.list()? {
//!     println!("{}", name.to_string_lossy());
//! }
//! let created = project::create_project(&store, "hello", "rust", Path::new("."))?;
//! ```

pub mod error;
pub mod product;
pub mod project;
pub mod store;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use error::{Result, TemplateError};
pub use product::ProductConfig;
pub use project::{create_project, CreatedProject, ProjectSpec};
pub use store::TemplateStore;
pub use templates::{copy_tree, list_templates, StoreSource, TemplateManifest};

#[cfg(feature = "tui")]
pub use tui::{run_init, run_interactive};
