use log::warn;
use std::path::{Path, PathBuf};

use crate::libs::error::AlignError;

/// Registry of temporary files and directories created for one
/// alignment run. Every registered path is removed by `clean_up`,
/// which also runs on drop, so an error exit cannot leak scratch
/// files. One run owns one manager; concurrent runs need their own
/// managers with distinct root directories.
#[derive(Debug)]
pub struct TempFileManager {
    root_dir: PathBuf,
    file_db: Vec<PathBuf>,
    dir_db: Vec<PathBuf>,
}

impl Default for TempFileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TempFileManager {
    pub fn new() -> Self {
        TempFileManager {
            root_dir: std::env::temp_dir(),
            file_db: vec![],
            dir_db: vec![],
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn file_db(&self) -> &[PathBuf] {
        &self.file_db
    }

    pub fn dir_db(&self) -> &[PathBuf] {
        &self.dir_db
    }

    /// Redirect where new resources are created. Forward-only:
    /// resources registered under the old root are not relocated, so
    /// reassignment after any registration is refused.
    pub fn set_root_dir(&mut self, path: &Path) -> Result<(), AlignError> {
        if !self.file_db.is_empty() || !self.dir_db.is_empty() {
            return Err(AlignError::Config(format!(
                "Cannot change temp root to {}: resources are already registered under {}",
                path.display(),
                self.root_dir.display()
            )));
        }
        self.root_dir = path.to_path_buf();
        Ok(())
    }

    // The root is created lazily. A root this manager had to create is
    // itself registered so it is removed with everything else.
    fn ensure_root(&mut self) -> Result<(), AlignError> {
        let created = !self.root_dir.exists();
        if created {
            std::fs::create_dir_all(&self.root_dir).map_err(|e| AlignError::Resource {
                path: self.root_dir.clone(),
                message: e.to_string(),
            })?;
        }
        self.root_dir = self.root_dir.canonicalize().map_err(|e| AlignError::Resource {
            path: self.root_dir.clone(),
            message: e.to_string(),
        })?;
        if created {
            self.dir_db.push(self.root_dir.clone());
        }
        Ok(())
    }

    /// Create an empty, uniquely named file under the root and
    /// register it. Returns the absolute path.
    pub fn register_new_file(&mut self, suffix: Option<&str>) -> Result<PathBuf, AlignError> {
        self.ensure_root()?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("balign_");
        if let Some(suffix) = suffix {
            builder.suffix(suffix);
        }
        let file = builder
            .tempfile_in(&self.root_dir)
            .map_err(|e| AlignError::Resource {
                path: self.root_dir.clone(),
                message: e.to_string(),
            })?;
        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| AlignError::Resource {
                path: self.root_dir.clone(),
                message: e.to_string(),
            })?;

        self.file_db.push(path.clone());
        Ok(path)
    }

    /// Create a uniquely named directory under the root and register
    /// it. Returns the absolute path.
    pub fn register_new_dir(&mut self) -> Result<PathBuf, AlignError> {
        self.ensure_root()?;

        let dir = tempfile::Builder::new()
            .prefix("balign_")
            .tempdir_in(&self.root_dir)
            .map_err(|e| AlignError::Resource {
                path: self.root_dir.clone(),
                message: e.to_string(),
            })?;
        let path = dir.into_path();

        self.dir_db.push(path.clone());
        Ok(path)
    }

    /// Register a file or directory that already exists so it is
    /// removed with the run. Nothing is created.
    pub fn register_existing(&mut self, path: &str, is_dir: bool) -> Result<PathBuf, AlignError> {
        let p = Path::new(path);
        if !p.exists() {
            return Err(AlignError::NotFound(p.to_path_buf()));
        }
        let abs = p.canonicalize().map_err(|e| AlignError::Resource {
            path: p.to_path_buf(),
            message: e.to_string(),
        })?;

        if is_dir {
            self.dir_db.push(abs.clone());
        } else {
            self.file_db.push(abs.clone());
        }
        Ok(abs)
    }

    pub fn is_registered(&self, path: &Path) -> bool {
        self.file_db.iter().any(|p| p == path) || self.dir_db.iter().any(|p| p == path)
    }

    /// Remove every registered file, then every registered directory,
    /// in registration order. Entries already gone or impossible to
    /// remove degrade to warnings; both registries always end up
    /// empty.
    pub fn clean_up(&mut self) {
        for path in &self.file_db {
            if !path.exists() {
                warn!("Temp file {} already removed, skipped", path.display());
                continue;
            }
            if let Err(e) = std::fs::remove_file(path) {
                warn!("Could not remove temp file {}: {}", path.display(), e);
            }
        }
        for path in &self.dir_db {
            if !path.exists() {
                warn!("Temp dir {} already removed, skipped", path.display());
                continue;
            }
            if let Err(e) = std::fs::remove_dir_all(path) {
                warn!("Could not remove temp dir {}: {}", path.display(), e);
            }
        }
        self.file_db.clear();
        self.dir_db.clear();
    }
}

impl Drop for TempFileManager {
    fn drop(&mut self) {
        if !self.file_db.is_empty() || !self.dir_db.is_empty() {
            self.clean_up();
        }
    }
}
