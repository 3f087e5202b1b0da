use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ScaffoldError};
use crate::model::SourceUnit;
use crate::package::package_to_path;
use crate::parse::parse_source;
use crate::render::render;

pub const SOURCE_EXTENSION: &str = "java";

/// `<root>/<package as dirs>/<Name>.java`; depends only on package and name.
pub fn location(root: &Path, unit: &SourceUnit) -> PathBuf {
    root.join(package_to_path(unit.package_name()))
        .join(format!("{}.{SOURCE_EXTENSION}", unit.name()))
}

pub fn write(root: &Path, unit: &SourceUnit) -> Result<PathBuf> {
    let path = location(root, unit);
    write_to(&path, unit)?;
    Ok(path)
}

pub fn write_to(path: &Path, unit: &SourceUnit) -> Result<()> {
    let text = render(unit);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ScaffoldError::io(parent, e))?;
    }
    replace_contents(path, text.as_bytes()).map_err(|e| ScaffoldError::io(path, e))?;
    debug!(path = %path.display(), fields = unit.fields().len(), "wrote source unit");
    Ok(())
}

pub fn read(path: &Path) -> Result<SourceUnit> {
    let source = std::fs::read_to_string(path).map_err(|e| ScaffoldError::io(path, e))?;
    parse_source(&source)
}

/// Writes to a sibling temp file, then renames it over `path`, so readers see
/// either the old contents or the new ones.
pub fn replace_contents(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));

    let written = std::fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
