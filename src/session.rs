//! Host-side memory of the picked-up resource, so that `new-element` in one
//! invocation finds the page created by `new-page` in the previous one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::persist::replace_contents;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub project_root: Option<PathBuf>,
    pub active_resource: Option<PathBuf>,
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse session file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        replace_contents(path, json.as_bytes())
            .with_context(|| format!("Failed to write session file: {}", path.display()))
    }
}
