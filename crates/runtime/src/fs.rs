//! File helpers

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

/// Atomic file write: writes to a temporary file in the same directory, then
/// renames it over the target path. A failed write leaves the original intact.
///
/// Permissions of an existing target are carried over to the new file. A
/// symlinked target is written through: the file it points to is replaced and
/// the link itself stays in place.
pub fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let target = resolve_symlink(path)?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    if let Ok(metadata) = std::fs::metadata(&target) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }

    tmp.persist(&target).map_err(|e| e.error)?;
    debug!("wrote {} bytes to {}", content.len(), target.display());
    Ok(())
}

fn resolve_symlink(path: &Path) -> std::io::Result<PathBuf> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => std::fs::canonicalize(path),
        _ => Ok(path.to_path_buf()),
    }
}
