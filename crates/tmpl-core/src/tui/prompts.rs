//! Charm-style CLI prompts using cliclack

use crate::error::TemplateError;
use crate::product::ProductConfig;
use crate::project::{self, CreatedProject};
use crate::store::TemplateStore;
use crate::templates::fetcher::{init_store, ArchiveFetcher, GitFetcher, StoreSource};
use crate::templates::version;
use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Run the interactive flow: ask for a project name, pick a template from
/// the store and copy it into a new directory under the current one
pub fn run_interactive<C: ProductConfig>(
    config: &C,
    store: &TemplateStore,
    cli_version: &str,
) -> Result<()> {
    cliclack::intro(config.display_name())?;

    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    cliclack::log::info(format!("Creating project in: {}", current_dir.display()))?;

    // Step 1: Project name
    let name = prompt_project_name(&current_dir)?;

    // Step 2: Template
    let template = select_template(config, store)?;
    warn_if_incompatible(config, store, &template, cli_version)?;

    // Step 3: Create and copy
    let spinner = cliclack::spinner();
    spinner.start("Copying template...");

    let created = match project::create_project(store, &name, &template, &current_dir) {
        Ok(created) => created,
        Err(err) => {
            spinner.stop("Failed to create project");
            return Err(err.into());
        }
    };

    spinner.stop(format!(
        "Project '{}' created with template '{}' ({} files)",
        name,
        created.template,
        created.files.len()
    ));

    // Step 4: Show next steps
    print_next_steps(config, &created)?;

    Ok(())
}

fn prompt_project_name(current_dir: &Path) -> Result<String> {
    let current_dir = current_dir.to_path_buf();
    let name: String = cliclack::input("Project name")
        .placeholder("my-project")
        .validate(move |input: &String| {
            project::validate_project_name(input).map_err(|err| err.to_string())?;
            if current_dir.join(input).exists() {
                return Err(format!("'{}' already exists", input));
            }
            Ok(())
        })
        .interact()?;

    Ok(name)
}

fn select_template<C: ProductConfig>(config: &C, store: &TemplateStore) -> Result<OsString> {
    let mut templates = match store.list() {
        Ok(templates) => templates,
        Err(err) => {
            cliclack::log::error(err.to_string())?;
            Vec::new()
        }
    };

    if templates.is_empty() {
        cliclack::log::warning(format!(
            "Run `{} --init` to fetch the default templates",
            config.name()
        ))?;
        return Err(TemplateError::NoTemplates {
            root: store.root().to_path_buf(),
        }
        .into());
    }

    // If only one template, use it automatically
    if templates.len() == 1 {
        let template = templates.remove(0);
        cliclack::log::info(format!("Using template: {}", template.to_string_lossy()))?;
        return Ok(template);
    }

    let mut select = cliclack::select("Select a template");
    for (idx, template) in templates.iter().enumerate() {
        let hint = store
            .manifest(template)
            .map(|manifest| manifest.hint().to_string())
            .unwrap_or_default();
        select = select.item(idx, template.to_string_lossy(), hint);
    }

    let selected_idx: usize = select.interact()?;
    Ok(templates.swap_remove(selected_idx))
}

fn warn_if_incompatible<C: ProductConfig>(
    config: &C,
    store: &TemplateStore,
    template: &OsStr,
    cli_version: &str,
) -> Result<()> {
    let Some(wanted) = store.manifest(template).and_then(|manifest| manifest.version) else {
        return Ok(());
    };

    if let Some(warning) =
        version::check_compatibility(cli_version, &wanted, config.upgrade_command())
    {
        cliclack::log::warning(warning)?;
    }

    Ok(())
}

/// Populate the template store from the configured remote source
pub async fn run_init<C: ProductConfig>(
    config: &C,
    store: &TemplateStore,
    location: Option<&str>,
) -> Result<()> {
    cliclack::intro(config.display_name())?;

    let source = StoreSource::from_config(config, location)?;
    cliclack::log::info(format!(
        "Fetching templates from {} into {}",
        source.location(),
        store.root().display()
    ))?;

    match source {
        StoreSource::Git(remote) => init_store(&GitFetcher::new(remote), store.root()).await?,
        StoreSource::Archive(url) => {
            init_store(&ArchiveFetcher::new(url, config.user_agent()), store.root()).await?
        }
    }

    let templates = store.list().unwrap_or_default();
    cliclack::log::success(format!("{} template(s) available", templates.len()))?;
    cliclack::outro(format!(
        "Templates initialized in {}",
        store.root().display()
    ))?;

    Ok(())
}

fn print_next_steps<C: ProductConfig>(config: &C, created: &CreatedProject) -> Result<()> {
    let steps = config.next_steps(&created.dir, &created.template);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}
