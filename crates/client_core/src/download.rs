use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;
use url::Url;

pub const FALLBACK_FILENAME: &str = "font.arfont";

/// Where fetched artifacts end up.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Stores `bytes` under the suggested `filename` and returns the final location.
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> Result<PathBuf>;
}

/// Saves artifacts into a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for DirectoryDownloads {
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await.with_context(|| {
            format!(
                "failed to create download directory '{}'",
                self.dir.display()
            )
        })?;

        let target = self.dir.join(filename);
        let transient = self.dir.join(format!(".{filename}.part"));
        if let Err(err) = write_then_rename(&transient, &target, &bytes).await {
            let _ = tokio::fs::remove_file(&transient).await;
            return Err(err).with_context(|| format!("failed to save '{}'", target.display()));
        }

        info!(path = %target.display(), size_bytes = bytes.len(), "saved font artifact");
        Ok(target)
    }
}

async fn write_then_rename(transient: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(transient, bytes).await?;
    tokio::fs::rename(transient, target).await
}

/// Suggested filename for an artifact: the last path segment of its URL.
pub fn artifact_filename(artifact_url: &str) -> String {
    let candidate = match Url::parse(artifact_url) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.last())
            .map(str::to_string),
        Err(_) => artifact_url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    match candidate {
        Some(name) if is_plain_filename(&name) => name,
        _ => FALLBACK_FILENAME.to_string(),
    }
}

fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

#[cfg(test)]
#[path = "tests/download_tests.rs"]
mod tests;
