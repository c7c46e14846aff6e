//! Scratch space for downloads and extraction.

use std::path::{Path, PathBuf};

use crate::error::UpdateResult;

/// Private scratch directory holding a package download and its
/// extraction tree for the duration of one install.
#[derive(Debug)]
pub struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    /// Create a private scratch directory.
    ///
    /// Uses a randomly-named subdirectory to prevent symlink attacks and
    /// predictable file name exploits.
    pub fn new() -> UpdateResult<Self> {
        let random_suffix: u64 = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ u64::from(std::process::id());

        let dir = std::env::temp_dir().join(format!("sideload-{:x}", random_suffix));

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            std::fs::DirBuilder::new()
                .mode(0o700)
                .recursive(true)
                .create(&dir)?;
        }

        #[cfg(not(unix))]
        {
            std::fs::create_dir_all(&dir)?;
        }

        Ok(Self { dir })
    }

    /// The scratch directory path.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Destination path for a package download.
    pub fn package_path(&self, version: &str, url: &str) -> PathBuf {
        let filename = url.rsplit('/').next().unwrap_or("package.zip");
        self.dir.join(format!("{}_{}", version, filename))
    }

    /// Extraction directory for a verified package, named by its hash.
    pub fn extraction_dir(&self, hash: &str) -> PathBuf {
        self.dir.join(hash)
    }

    /// Remove the scratch directory and everything under it.
    pub fn cleanup(&self) -> UpdateResult<()> {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}
