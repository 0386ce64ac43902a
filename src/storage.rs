use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::constants::{APP_NAME, DOCUMENT_FILE, LOG_FILE};

/// Manages the request document on disk
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Storage rooted at the configured data dir, or `<config dir>/dispatch`
    pub fn new(config: &Config) -> Self {
        let data_dir = config.data_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_NAME)
        });
        Storage { data_dir }
    }

    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Self {
        Storage {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(DOCUMENT_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    /// Ensure the data directory exists
    pub fn ensure_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir).with_context(|| {
                format!("Failed to create data dir {}", self.data_dir.display())
            })?;
        }
        Ok(())
    }

    /// Stored document text; empty when there is none yet or it can't be read
    pub fn load_document(&self) -> String {
        let path = self.document_path();
        match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read document");
                String::new()
            }
        }
    }

    /// Replace the stored document
    pub fn save_document(&self, content: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.document_path();
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Saved document");
        Ok(())
    }
}
