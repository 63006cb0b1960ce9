//! Template discovery, copying and store initialization
//!
//! This module provides:
//! - Listing of the templates in a store root
//! - Recursive copying of a template into a project directory
//! - Optional template manifests and version compatibility checking
//! - Fetchers that populate an empty store from git or a zip archive

pub mod copier;
pub mod fetcher;
pub mod lister;
pub mod manifest;
pub mod version;

pub use copier::copy_tree;
pub use fetcher::{init_store, ArchiveFetcher, GitFetcher, StoreFetcher, StoreSource};
pub use lister::{list_templates, MAX_TEMPLATES};
pub use manifest::TemplateManifest;
pub use version::check_compatibility;
