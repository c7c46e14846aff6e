//! Zip package handling.

use std::path::{Path, PathBuf};

use crate::error::{UpdateError, UpdateResult};

/// Extract a zip archive into `dest`.
pub fn extract_zip(archive: &Path, dest: &Path) -> UpdateResult<()> {
    let file = std::fs::File::open(archive)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| UpdateError::ExtractionFailed {
        message: e.to_string(),
    })?;

    archive
        .extract(dest)
        .map_err(|e| UpdateError::ExtractionFailed {
            message: e.to_string(),
        })?;

    Ok(())
}

/// Locate the packaged files directory: the top-level directory of the
/// extraction tree. Packages carry their payload inside a single
/// directory; when several are present the first in name order is used.
pub fn find_files_root(dir: &Path) -> UpdateResult<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();

    dirs.sort();
    dirs.into_iter().next().ok_or(UpdateError::NoFilesDirectory)
}
