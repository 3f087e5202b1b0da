//! The context every command runs against: where the user is, which source
//! roots the project has, which resource is currently picked up, and how to
//! ask the user for a package when it cannot be inferred.

use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{Result, ScaffoldError};
use crate::persist::SOURCE_EXTENSION;

/// Fully-qualified types the generated pages refer to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageProfile {
    pub element_type: String,
    pub root_annotation: String,
    pub find_by_annotation: String,
}

impl Default for PageProfile {
    fn default() -> Self {
        Self {
            element_type: "org.openqa.selenium.WebElement".to_string(),
            root_annotation: "org.jboss.arquillian.graphene.spi.annotations.Root".to_string(),
            find_by_annotation: "org.openqa.selenium.support.FindBy".to_string(),
        }
    }
}

pub trait PackagePrompt {
    fn ask_package(&mut self, message: &str, default: &str) -> Result<String>;
}

/// Reads an answer from stdin when attached to a terminal; otherwise takes the default.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl PackagePrompt for StdinPrompt {
    fn ask_package(&mut self, message: &str, default: &str) -> Result<String> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            info!(default = default, "stdin is not a terminal, using default package");
            return Ok(default.to_string());
        }

        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{message} [{default}]: ");
        let _ = stderr.flush();

        let mut line = String::new();
        stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| ScaffoldError::io("<stdin>", e))?;
        let answer = line.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    JavaSource(PathBuf),
    Directory(PathBuf),
    Other(PathBuf),
    Missing(PathBuf),
}

impl Resource {
    pub fn classify(path: &Path) -> Self {
        let path_buf = path.to_path_buf();
        match std::fs::metadata(path) {
            Err(_) => Resource::Missing(path_buf),
            Ok(meta) if meta.is_dir() => Resource::Directory(path_buf),
            Ok(meta) if meta.is_file() && path.extension().is_some_and(|e| e == SOURCE_EXTENSION) => {
                Resource::JavaSource(path_buf)
            }
            Ok(_) => Resource::Other(path_buf),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Resource::JavaSource(p) | Resource::Directory(p) | Resource::Other(p) | Resource::Missing(p) => p,
        }
    }
}

pub struct Workspace {
    pub current_dir: PathBuf,
    pub source_roots: Vec<PathBuf>,
    pub output_root: PathBuf,
    pub base_package: String,
    pub profile: PageProfile,
    pub active_resource: Option<PathBuf>,
    prompt: Box<dyn PackagePrompt>,
}

impl Workspace {
    pub fn new(current_dir: PathBuf, output_root: PathBuf, prompt: Box<dyn PackagePrompt>) -> Self {
        Self {
            current_dir,
            source_roots: Vec::new(),
            output_root,
            base_package: String::new(),
            profile: PageProfile::default(),
            active_resource: None,
            prompt,
        }
    }

    pub fn with_source_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.source_roots = roots;
        self
    }

    pub fn with_base_package(mut self, base_package: impl Into<String>) -> Self {
        self.base_package = base_package.into();
        self
    }

    pub fn with_profile(mut self, profile: PageProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_active_resource(mut self, resource: Option<PathBuf>) -> Self {
        self.active_resource = resource;
        self
    }

    /// Default offered when the package has to be asked for.
    pub fn default_page_package(&self) -> String {
        if self.base_package.is_empty() {
            "pages".to_string()
        } else {
            format!("{}.pages", self.base_package)
        }
    }

    pub fn ask_package(&mut self, message: &str, default: &str) -> Result<String> {
        self.prompt.ask_package(message, default)
    }

    pub fn active_resource(&self) -> Result<Resource> {
        let path = self
            .active_resource
            .as_deref()
            .ok_or(ScaffoldError::NoActiveResource)?;
        Ok(Resource::classify(path))
    }

    pub fn pick_up(&mut self, path: PathBuf) {
        info!(path = %path.display(), "picked up resource");
        self.active_resource = Some(path);
    }
}
