//! Lazy scratch-dir download store.

use crate::error::MediaError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Downloads remote files into a private scratch directory.
///
/// The directory is created on the first download, not at
/// construction, and lives until [`cleanup`](MediaStore::cleanup) is
/// called. Files keep the extension of the source URL unless an
/// explicit one is given.
pub struct MediaStore {
    label: String,
    client: Client,
    dir: Mutex<Option<TempDir>>,
}

impl MediaStore {
    /// Create a store. No filesystem activity happens here.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            client: Client::new(),
            dir: Mutex::new(None),
        }
    }

    /// Download `url` into the scratch directory and return the local
    /// path. `ext` overrides the file extension; pass `""` to reuse
    /// the extension of the URL path.
    pub async fn download(&self, url: &str, ext: &str) -> Result<PathBuf, MediaError> {
        let mut dir = self.dir.lock().await;
        let dir_path = match dir.as_ref() {
            Some(existing) => existing.path().to_path_buf(),
            None => {
                let created = tempfile::Builder::new()
                    .prefix(&format!("tgbot-{}-", self.label))
                    .tempdir()?;
                info!("Created {} scratch dir: {}", self.label, created.path().display());
                let path = created.path().to_path_buf();
                *dir = Some(created);
                path
            }
        };
        drop(dir);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MediaError::Status(response.status()));
        }
        let bytes = response.bytes().await?;

        let ext = if ext.is_empty() {
            extension_of(url)
        } else {
            ext.to_string()
        };
        let (_, path) = tempfile::Builder::new()
            .suffix(&ext)
            .tempfile_in(&dir_path)?
            .keep()
            .map_err(|e| MediaError::Io(e.error))?;
        tokio::fs::write(&path, &bytes).await?;

        debug!("Downloaded {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Remove the scratch directory and everything in it. No-op if no
    /// download ever happened; safe to call more than once.
    pub async fn cleanup(&self) -> Result<(), MediaError> {
        let mut dir = self.dir.lock().await;
        if let Some(created) = dir.take() {
            info!("Removing {} scratch dir: {}", self.label, created.path().display());
            created.close()?;
        }
        Ok(())
    }
}

/// Extension (with leading dot) of the path component of a URL, or
/// empty when it has none.
fn extension_of(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}
