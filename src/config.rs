use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::cli::Cli;
use crate::workspace::PageProfile;

pub const CONFIG_FILE: &str = "page-scaffold.toml";
pub const SESSION_ENV: &str = "PAGE_SCAFFOLD_SESSION";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub base_package: Option<String>,
    pub source_roots: Vec<PathBuf>,
    pub output_root: PathBuf,
    pub profile: PageProfile,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            base_package: None,
            source_roots: vec![
                PathBuf::from("src/main/java"),
                PathBuf::from("src/test/java"),
            ],
            output_root: PathBuf::from("src/test/java"),
            profile: PageProfile::default(),
        }
    }
}

impl ProjectConfig {
    pub fn source_roots_in(&self, project_root: &Path) -> Vec<PathBuf> {
        self.source_roots
            .iter()
            .map(|r| project_root.join(r))
            .collect()
    }

    pub fn output_root_in(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.output_root)
    }
}

pub fn resolve_project_root(cli: &Cli, current_dir: &Path) -> PathBuf {
    let root = match cli.project.clone() {
        Some(p) if p.is_absolute() => p,
        Some(p) => current_dir.join(p),
        None => find_project_root(current_dir).unwrap_or_else(|| current_dir.to_path_buf()),
    };
    // The current directory comes back canonical, so roots must be too.
    std::fs::canonicalize(&root).unwrap_or(root)
}

/// Nearest ancestor holding a `page-scaffold.toml` or a `pom.xml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file() || dir.join("pom.xml").is_file())
        .map(Path::to_path_buf)
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(ProjectConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Configured base package, else the project's Maven groupId, else empty.
pub fn resolve_base_package(project_root: &Path, config: &ProjectConfig) -> String {
    if let Some(p) = config.base_package.as_deref().filter(|p| !p.is_empty()) {
        return p.to_string();
    }
    std::fs::read_to_string(project_root.join("pom.xml"))
        .ok()
        .and_then(|pom| base_package_from_pom(&pom))
        .unwrap_or_default()
}

/// The project's `groupId`: `project/groupId`, else the one inherited from
/// `project/parent/groupId`, as Maven resolves it.
pub fn base_package_from_pom(pom: &str) -> Option<String> {
    let mut reader = Reader::from_str(pom);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut own = None;
    let mut inherited = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                path.push(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(text)) => {
                let slot = match path.join("/").as_str() {
                    "project/groupId" => &mut own,
                    "project/parent/groupId" => &mut inherited,
                    _ => continue,
                };
                match text.unescape() {
                    Ok(value) if !value.trim().is_empty() => {
                        *slot = Some(value.trim().to_string());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "invalid text in pom.xml groupId");
                        return None;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, position = reader.buffer_position(), "failed to parse pom.xml");
                return None;
            }
        }
    }
    own.or(inherited)
}

pub fn resolve_session_path(cli: &Cli, project_root: &Path) -> Result<PathBuf> {
    if let Some(p) = cli.session.clone() {
        return Ok(p);
    }

    if let Ok(p) = env::var(SESSION_ENV)
        && !p.is_empty()
    {
        return Ok(PathBuf::from(p));
    }

    Ok(page_scaffold_home()?
        .join("sessions")
        .join(format!("{}.json", session_key(project_root))))
}

pub fn session_key(project_root: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(project_root.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

fn page_scaffold_home() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve data directory"))?;
    Ok(base.join("page-scaffold"))
}
