use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pricewatch_logging::pw_info;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("export directory missing or not writable: {0}")]
    ExportDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the export directory exists; create if missing.
pub fn ensure_export_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::ExportDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::ExportDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::ExportDir(e.to_string()))?;
    }
    Ok(())
}

/// Write the export artifact to `{dir}/{filename}` via a temp file and rename,
/// so a reader never sees a half-written report.
pub fn write_export(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf, PersistError> {
    ensure_export_dir(dir)?;

    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;

    pw_info!("Wrote {} bytes to {}", contents.len(), target.display());
    Ok(target)
}
