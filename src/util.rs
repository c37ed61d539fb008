use anyhow::{anyhow, Result};
use std::fs::File;
use std::path::Path;

/// Opens `path` for reading, annotating any error with the kind of file
/// (e.g. "project") that was being opened.
pub fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}

/// Creates (truncating) the file at `path`, along with any missing parent
/// directories.
pub fn create(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    File::create(path)
}
