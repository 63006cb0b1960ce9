//! tmpl - Create projects from the templates in ~/.local/template

mod logging;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tmpl_core::templates::version::check_compatibility;
use tmpl_core::{ProductConfig, ProjectSpec, TemplateError, TemplateStore};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// tmpl product configuration
#[derive(Clone)]
pub struct TmplConfig;

impl ProductConfig for TmplConfig {
    fn name(&self) -> &'static str {
        "tmpl"
    }

    fn display_name(&self) -> &'static str {
        "TEMPLATE MAKER"
    }

    fn store_dir_env(&self) -> &'static str {
        "TMPL_TEMPLATE_DIR"
    }

    fn default_store_url(&self) -> &'static str {
        "https://github.com/chlorat3/template.git"
    }

    fn store_url_env(&self) -> &'static str {
        "TMPL_TEMPLATE_URL"
    }

    fn cli_description(&self) -> &'static str {
        "Create a new project from a template in ~/.local/template"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install tmpl-cli --force"
    }

    fn next_steps(&self, project_dir: &Path, _template: &str) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: cd to directory, relative to where we are when possible
        let shown = current
            .as_deref()
            .and_then(|current| project_dir.strip_prefix(current).ok())
            .unwrap_or(project_dir);
        steps.push(format!("cd {}", shown.display()));

        // Step 2: Point at the README if the template ships one
        if project_dir.join("README.md").is_file() {
            steps.push("Open README.md to get started".to_string());
        }

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "tmpl")]
#[command(version)]
pub struct Args {
    /// Create a project without prompting
    #[arg(
        short = 'c',
        long = "create",
        value_name = "NAME:TEMPLATE",
        num_args = 0..=1,
        default_missing_value = "",
        conflicts_with_all = ["init", "list"]
    )]
    pub create: Option<String>,

    /// Initialize the template store by fetching the default template set
    #[arg(long, conflicts_with = "list")]
    pub init: bool,

    /// Source for --init: a git remote or the URL of a .zip archive
    #[arg(long, value_name = "URL", requires = "init")]
    pub from: Option<String>,

    /// List available templates and exit
    #[arg(short, long)]
    pub list: bool,

    /// Template store to use instead of ~/.local/template (for development use)
    #[arg(long = "template-dir", value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let config = TmplConfig;
    let matches = Args::command()
        .about(config.cli_description())
        .get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    logging::init_logging(args.verbose, args.quiet)?;

    let store = TemplateStore::from_config(&config, args.template_dir.clone())?;

    let result = if args.init {
        tmpl_core::run_init(&config, &store, args.from.as_deref()).await
    } else if let Some(spec) = &args.create {
        create(&config, &store, spec)
    } else if args.list {
        list(&config, &store)
    } else {
        // No option provided, default to interactive mode
        tmpl_core::run_interactive(&config, &store, CLI_VERSION)
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}

/// Non-interactive creation from a `NAME:TEMPLATE` argument
fn create<C: ProductConfig>(config: &C, store: &TemplateStore, raw: &str) -> Result<()> {
    let spec: ProjectSpec = match raw.parse() {
        Ok(spec) => spec,
        Err(err) => {
            eprintln!("{} {} -c NAME:TEMPLATE", "Usage:".bold(), config.name());
            return Err(err.into());
        }
    };

    if let Some(wanted) = store
        .manifest(&spec.template)
        .and_then(|manifest| manifest.version)
    {
        if let Some(warning) = check_compatibility(CLI_VERSION, &wanted, config.upgrade_command())
        {
            eprintln!("{} {}", "Warning:".yellow(), warning);
        }
    }

    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let created = tmpl_core::create_project(store, &spec.name, &spec.template, &current_dir)
        .inspect_err(|err| hint_init(config, err))?;

    println!(
        "{}",
        format!(
            "Project '{}' successfully created using template '{}'. Happy coding!",
            spec.name, created.template
        )
        .green()
        .bold()
    );

    Ok(())
}

/// Print the available templates, one per line
fn list<C: ProductConfig>(config: &C, store: &TemplateStore) -> Result<()> {
    let templates = store.list().inspect_err(|err| hint_init(config, err))?;
    if templates.is_empty() {
        let err = TemplateError::NoTemplates {
            root: store.root().to_path_buf(),
        };
        hint_init(config, &err);
        return Err(err.into());
    }

    for template in &templates {
        let hint = store
            .manifest(template)
            .map(|manifest| manifest.hint().to_string())
            .unwrap_or_default();
        let template = template.to_string_lossy();
        if hint.is_empty() {
            println!("{}", template.bold());
        } else {
            println!("{}  {}", template.bold(), hint.dimmed());
        }
    }

    Ok(())
}

/// Whether `err` means the store was never populated
fn store_uninitialized(err: &TemplateError) -> bool {
    match err {
        TemplateError::DirectoryOpen { .. } | TemplateError::NoTemplates { .. } => true,
        TemplateError::TemplateNotFound { available, .. } => available.is_empty(),
        _ => false,
    }
}

fn hint_init<C: ProductConfig>(config: &C, err: &TemplateError) {
    if store_uninitialized(err) {
        eprintln!(
            "{} run `{} --init` to fetch the default templates",
            "Hint:".yellow(),
            config.name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_create_flag_with_and_without_value() {
        let args = Args::try_parse_from(["tmpl", "-c", "hello:rust"]).unwrap();
        assert_eq!(args.create.as_deref(), Some("hello:rust"));

        let args = Args::try_parse_from(["tmpl", "-c"]).unwrap();
        assert_eq!(args.create.as_deref(), Some(""));
    }

    #[test]
    fn test_from_requires_init() {
        assert!(Args::try_parse_from(["tmpl", "--from", "https://example.com/t.zip"]).is_err());
        let args =
            Args::try_parse_from(["tmpl", "--init", "--from", "https://example.com/t.zip"])
                .unwrap();
        assert!(args.init);
    }

    #[test]
    fn test_create_conflicts_with_init() {
        assert!(Args::try_parse_from(["tmpl", "--init", "-c", "a:b"]).is_err());
    }

    #[test]
    fn test_init_hint_only_for_empty_or_missing_store() {
        let missing = TemplateError::DirectoryOpen {
            path: PathBuf::from("/nowhere"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(store_uninitialized(&missing));

        let empty = TemplateError::TemplateNotFound {
            name: "rust".to_string(),
            available: Vec::new(),
        };
        assert!(store_uninitialized(&empty));

        let other = TemplateError::TemplateNotFound {
            name: "cobol".to_string(),
            available: vec!["rust".to_string()],
        };
        assert!(!store_uninitialized(&other));
    }

    #[test]
    fn test_next_steps_start_with_cd() {
        let current = std::env::current_dir().unwrap();
        let steps = TmplConfig.next_steps(&current.join("hello"), "rust");
        assert_eq!(steps[0], "cd hello");
    }
}
