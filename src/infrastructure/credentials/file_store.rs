//! File-backed credential store.
//!
//! The token is stored as the whole content of one file. A missing file,
//! an unreadable file, and a blank file all mean "no credential".

use crate::domain::CredentialStore;
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        FileCredentialStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    // ---
    fn save(&self, token: &str) -> anyhow::Result<()> {
        // ---
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&self.path, token)
            .with_context(|| format!("writing credential to {}", self.path.display()))?;

        tracing::debug!("Credential saved");
        Ok(())
    }

    fn read(&self) -> Option<String> {
        // ---
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!("Failed to read credential file {}: {}", self.path.display(), err);
                None
            }
        }
    }

    fn clear(&self) {
        // ---
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Credential cleared"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!("Failed to remove credential file {}: {}", self.path.display(), err)
            }
        }
    }
}
