//! Populating the template store from a remote source
//!
//! Two sources are supported:
//! - Git: the store is a clone of a repository (`git clone <url> <root>`)
//! - Archive: a `.zip` served over HTTP(S) is downloaded and extracted
//!
//! Both sit behind [`StoreFetcher`], so [`init_store`] never depends on a
//! particular tool.

use crate::error::{Result, TemplateError};
use crate::product::ProductConfig;
use colored::Colorize;
use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;
use zip::ZipArchive;

/// Where the template set comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    /// Anything `git clone` accepts: URL, scp-style remote or local path
    Git(String),
    /// HTTP(S) URL of a zip archive
    Archive(Url),
}

impl StoreSource {
    /// Resolve the source: explicit location, then the product's env var,
    /// then the product default
    pub fn from_config<C: ProductConfig>(config: &C, location: Option<&str>) -> Result<Self> {
        match location {
            Some(location) => Self::parse(location),
            None => {
                let location = std::env::var(config.store_url_env())
                    .unwrap_or_else(|_| config.default_store_url().to_string());
                Self::parse(&location)
            }
        }
    }

    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(TemplateError::invalid("template source cannot be empty"));
        }

        match Url::parse(location) {
            Ok(url) if url.path().ends_with(".zip") => match url.scheme() {
                "http" | "https" => Ok(Self::Archive(url)),
                scheme => Err(TemplateError::invalid(format!(
                    "unsupported archive scheme '{}' (expected http or https)",
                    scheme
                ))),
            },
            Ok(url) => Ok(Self::Git(url.into())),
            Err(_) => Ok(Self::Git(location.to_string())),
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Self::Git(remote) => remote,
            Self::Archive(url) => url.as_str(),
        }
    }
}

/// Capability to fill an empty directory with a template set
#[allow(async_fn_in_trait)]
pub trait StoreFetcher {
    /// Short description for progress messages
    fn describe(&self) -> String;

    /// Populate `target`, which exists and is empty
    async fn fetch_into(&self, target: &Path) -> Result<()>;
}

/// Prepare `root` and hand it to `fetcher`.
///
/// A missing root is created along with its parents; a root that already
/// has content is refused. The fetch is attempted once.
pub async fn init_store<F: StoreFetcher>(fetcher: &F, root: &Path) -> Result<()> {
    if root.exists() {
        let mut entries = fs::read_dir(root).map_err(|source| TemplateError::DirectoryOpen {
            path: root.to_path_buf(),
            source,
        })?;
        if entries.next().is_some() {
            return Err(TemplateError::StoreNotEmpty {
                path: root.to_path_buf(),
            });
        }
    } else {
        fs::create_dir_all(root).map_err(|source| TemplateError::Mkdir {
            path: root.to_path_buf(),
            source,
        })?;
    }

    info!(source = %fetcher.describe(), root = %root.display(), "initializing template store");
    fetcher.fetch_into(root).await
}

/// Clones a git repository with the `git` executable
pub struct GitFetcher {
    remote: String,
    program: String,
}

impl GitFetcher {
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            program: "git".to_string(),
        }
    }

    /// Use a different executable than `git` from PATH
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Installed version of the git executable, if it runs at all
    pub fn version(&self) -> Option<String> {
        std::process::Command::new(&self.program)
            .arg("--version")
            .output()
            .ok()
            .filter(|output| output.status.success())
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .map(|version| version.trim().to_string())
    }

    fn failure(&self, reason: impl Into<String>) -> TemplateError {
        TemplateError::SubprocessFailure {
            program: self.program.clone(),
            reason: reason.into(),
        }
    }
}

impl StoreFetcher for GitFetcher {
    fn describe(&self) -> String {
        format!("git repository {}", self.remote)
    }

    async fn fetch_into(&self, target: &Path) -> Result<()> {
        let version = self
            .version()
            .ok_or_else(|| self.failure("not installed or not in PATH"))?;
        debug!(%version, "using git");

        println!(
            "{} {} clone {} {}",
            "Running:".dimmed(),
            self.program,
            self.remote,
            target.display()
        );

        let mut child = Command::new(&self.program)
            .arg("clone")
            .arg(&self.remote)
            .arg(target)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.failure(err.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.failure("failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| self.failure("failed to capture stderr"))?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let (mut stdout_done, mut stderr_done) = (false, false);

        while !(stdout_done && stderr_done) {
            tokio::select! {
                line = stdout_lines.next_line(), if !stdout_done => match line {
                    Ok(Some(line)) => println!("  {}", line),
                    _ => stdout_done = true,
                },
                line = stderr_lines.next_line(), if !stderr_done => match line {
                    Ok(Some(line)) => eprintln!("  {}", line.dimmed()),
                    _ => stderr_done = true,
                },
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|err| self.failure(err.to_string()))?;
        if !status.success() {
            return Err(self.failure(match status.code() {
                Some(code) => format!("clone exited with status {}", code),
                None => "clone was terminated by a signal".to_string(),
            }));
        }

        Ok(())
    }
}

/// Downloads a zip archive and extracts it
pub struct ArchiveFetcher {
    url: Url,
    client: reqwest::Client,
}

impl ArchiveFetcher {
    pub fn new(url: Url, user_agent: &str) -> Self {
        Self {
            url,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn failure(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::Download {
            url: self.url.to_string(),
            message: message.into(),
        }
    }
}

impl StoreFetcher for ArchiveFetcher {
    fn describe(&self) -> String {
        format!("archive {}", self.url)
    }

    async fn fetch_into(&self, target: &Path) -> Result<()> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| self.failure(err.to_string()))?;

        if !response.status().is_success() {
            return Err(self.failure(format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.failure(err.to_string()))?;
        let files = extract_archive(&bytes, target)?;
        info!(files, url = %self.url, "extracted template archive");
        Ok(())
    }
}

fn archive_error(err: impl ToString) -> TemplateError {
    TemplateError::Archive {
        message: err.to_string(),
    }
}

/// Extract a zip into `target`, returning the number of files written.
///
/// When every entry lives under one top-level directory (as in forge
/// snapshot archives) that directory is stripped. Entries whose path would
/// leave `target` are rejected.
pub fn extract_archive(bytes: &[u8], target: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_error)?;

    let mut paths = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let file = archive.by_index(index).map_err(archive_error)?;
        let path = file
            .enclosed_name()
            .ok_or_else(|| archive_error(format!("unsafe entry path '{}'", file.name())))?;
        paths.push(path);
    }
    let prefix = shared_top_level(&paths);

    let mut written = 0;
    for (index, path) in paths.iter().enumerate() {
        let relative = match &prefix {
            Some(prefix) => path.strip_prefix(prefix).unwrap_or(path),
            None => path.as_path(),
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let destination = target.join(relative);
        let mut file = archive.by_index(index).map_err(archive_error)?;
        if file.is_dir() {
            create_dirs(&destination)?;
            continue;
        }

        if let Some(parent) = destination.parent() {
            create_dirs(parent)?;
        }
        let mut output = File::create(&destination).map_err(|source| TemplateError::FileOpen {
            path: destination.clone(),
            source,
        })?;
        io::copy(&mut file, &mut output).map_err(|source| TemplateError::FileCopy {
            from: relative.to_path_buf(),
            to: destination.clone(),
            source,
        })?;
        written += 1;
    }

    Ok(written)
}

fn create_dirs(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| TemplateError::Mkdir {
        path: path.to_path_buf(),
        source,
    })
}

/// The single top-level directory shared by every entry, if there is one
fn shared_top_level(paths: &[PathBuf]) -> Option<PathBuf> {
    let first = match paths.first()?.components().next()? {
        Component::Normal(name) => name,
        _ => return None,
    };

    let shared = paths
        .iter()
        .all(|path| path.components().next() == Some(Component::Normal(first)));
    let nested = paths.iter().any(|path| path.components().count() > 1);

    (shared && nested).then(|| PathBuf::from(first))
}
