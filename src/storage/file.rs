//! File-based ledger storage for Orchard.
//!
//! The ledger is a single JSON document, `fruit_save.json` in the Orchard
//! data directory by default. Atomic writes are achieved via temp file +
//! rename pattern.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::{save_path, Config};
use crate::error::{OrchardError, Result};
use crate::storage::ledger::Ledger;
use crate::storage::LedgerStore;

/// File-based ledger storage.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    /// Path of the save document.
    path: PathBuf,
}

impl FileLedgerStore {
    /// Create a store at the save path configured in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let path = save_path(config).ok_or_else(|| {
            OrchardError::config("Could not determine data directory for the save file")
        })?;
        Self::with_path(path)
    }

    /// Create a store at a custom path, creating its parent directory.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| OrchardError::storage(parent, e))?;
            }
        }

        Ok(Self { path })
    }

    /// Path of the save document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path for the temp file used during atomic writes.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ledger.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }

    /// Write the ledger atomically using temp file + rename.
    fn atomic_write(&self, ledger: &Ledger) -> Result<()> {
        let temp_path = self.temp_path();

        let json = serde_json::to_string_pretty(ledger)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| OrchardError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| OrchardError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| OrchardError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(OrchardError::storage(&self.path, e));
        }

        Ok(())
    }
}

impl LedgerStore for FileLedgerStore {
    fn load(&self) -> Result<Option<Ledger>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OrchardError::storage(&self.path, e)),
        };

        let ledger: Ledger = serde_json::from_str(&content)?;

        Ok(Some(ledger))
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        self.atomic_write(ledger)
    }

    fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(OrchardError::storage(&self.path, e)),
        }

        // Also clean up any temp file
        let temp_path = self.temp_path();
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }
}
