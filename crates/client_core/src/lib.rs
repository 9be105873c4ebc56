use std::path::Path;

use anyhow::Context;
use reqwest::{multipart::Form, Client};
use shared::protocol::GenerateResponse;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

mod controller;
mod download;

pub use controller::{text_fields, validate, FormController, FormState, SubmissionState, SubmitOutcome};
pub use download::{artifact_filename, DirectoryDownloads, DownloadSink, FALLBACK_FILENAME};

pub const DEFAULT_API_URL: &str = "https://msdf-api.kansei.graphics/api/generate";
/// Shown when a failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "Failed to upload file";

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Non-2xx reply from the generation service; holds the response body.
    #[error("{0}")]
    Service(String),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed generation response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid artifact url: {0}")]
    ArtifactUrl(#[from] url::ParseError),
    #[error("{0:#}")]
    Download(anyhow::Error),
}

impl SubmitError {
    pub fn display_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

/// A font picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FontFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read font file '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    fn mime_type(&self) -> &'static str {
        if self.name.to_ascii_lowercase().ends_with(".otf") {
            "font/otf"
        } else {
            "font/ttf"
        }
    }
}

/// HTTP boundary to the generation service and the artifact host.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: Client,
    api_url: String,
}

impl GenerationClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// POSTs the multipart form. The multipart boundary header is set by reqwest.
    pub async fn generate(&self, form: Form) -> Result<GenerateResponse, SubmitError> {
        let response = self.http.post(&self.api_url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!(%status, "generation service rejected request");
            return Err(SubmitError::Service(if body.is_empty() {
                GENERIC_FAILURE.to_string()
            } else {
                body
            }));
        }

        let body = response.bytes().await?;
        debug!(size_bytes = body.len(), "generation response received");
        Ok(serde_json::from_slice(&body)?)
    }

    /// Resolves `reference` against the generation endpoint. Absolute URLs are
    /// returned unchanged; `/files/z.arfont` lands on the endpoint's host.
    pub fn resolve_artifact_url(&self, reference: &str) -> Result<Url, SubmitError> {
        Ok(Url::parse(&self.api_url)?.join(reference)?)
    }

    pub async fn fetch_artifact(&self, reference: &str) -> Result<Vec<u8>, SubmitError> {
        let url = self.resolve_artifact_url(reference)?;
        debug!(%url, "fetching artifact");
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
