use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Namespace(String),
    NeedsPrompt,
}

/// Picks the namespace for a new class: a non-empty explicit value wins as
/// given, then the position of `current_dir` under one of `source_roots`.
/// Touches no files.
pub fn resolve(explicit: Option<&str>, current_dir: &Path, source_roots: &[PathBuf]) -> Resolution {
    if let Some(explicit) = explicit.filter(|s| !s.is_empty()) {
        return Resolution::Namespace(explicit.to_string());
    }

    match package_of_directory(current_dir, source_roots) {
        Some(ns) => Resolution::Namespace(ns),
        None => Resolution::NeedsPrompt,
    }
}

/// Namespace of `dir` relative to the first source root containing it.
/// `dir == root` yields the empty (unnamed) namespace.
pub fn package_of_directory(dir: &Path, source_roots: &[PathBuf]) -> Option<String> {
    let dir = normalize(dir);
    source_roots.iter().find_map(|root| {
        let root = normalize(root);
        let rest = dir.strip_prefix(&root).ok()?;
        let segments: Vec<String> = rest
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(segments.join("."))
    })
}

pub fn package_to_path(package_name: &str) -> PathBuf {
    package_name
        .split('.')
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
