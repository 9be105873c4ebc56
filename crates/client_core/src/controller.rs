//! Form state, validation and the submit flow for one font generation page.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use reqwest::multipart::{Form, Part};
use shared::{
    domain::{
        is_font_file_name, FieldErrors, GenerationConfig, GlyphsOption, EMPTY_GLYPHS_ERROR,
        INVALID_FILE_ERROR, MISSING_FILE_ERROR,
    },
    error::ConfigPathError,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{artifact_filename, DownloadSink, FontFile, GenerationClient, SubmitError};

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub config: GenerationConfig,
    pub glyphs_option: GlyphsOption,
    /// Kept while other options are selected; only sent for `selectedGlyphs`.
    pub selected_glyphs: String,
    pub selected_file: Option<FontFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    pub errors: FieldErrors,
    pub is_uploading: bool,
    pub is_downloading: bool,
    pub upload_error: Option<String>,
}

impl SubmissionState {
    pub fn can_submit(&self) -> bool {
        !(self.is_uploading || self.is_downloading)
    }

    pub fn phase_label(&self) -> &'static str {
        if self.is_uploading {
            "Uploading..."
        } else if self.is_downloading {
            "Downloading..."
        } else {
            "Generate Font"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission from this controller is still running.
    Busy,
    Invalid(FieldErrors),
    Failed(String),
    /// `saved_to` is `None` when the service reported no font artifact.
    Completed { saved_to: Option<PathBuf> },
}

pub fn validate(form: &FormState) -> FieldErrors {
    let mut errors = FieldErrors::default();

    match &form.selected_file {
        None => errors.file = Some(MISSING_FILE_ERROR.to_string()),
        Some(file) if !is_font_file_name(&file.name) => {
            errors.file = Some(INVALID_FILE_ERROR.to_string());
        }
        Some(_) => {}
    }

    if form.glyphs_option == GlyphsOption::SelectedGlyphs && form.selected_glyphs.trim().is_empty()
    {
        errors.glyphs = Some(EMPTY_GLYPHS_ERROR.to_string());
    }

    errors
}

/// Text parts of the multipart body, in the order they are appended.
pub fn text_fields(form: &FormState) -> Vec<(&'static str, String)> {
    let mut fields = vec![("glyphsOption", form.glyphs_option.as_str().to_string())];
    if form.glyphs_option == GlyphsOption::SelectedGlyphs {
        fields.push(("selectedGlyphs", form.selected_glyphs.clone()));
    }
    fields.extend(form.config.form_fields());
    fields
}

fn build_form(form: &FormState) -> Result<Form, SubmitError> {
    let mut body = Form::new();
    if let Some(file) = &form.selected_file {
        debug!(
            field = "file",
            filename = %file.name,
            size_bytes = file.bytes.len(),
            "multipart part"
        );
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(file.mime_type())?;
        body = body.part("file", part);
    }
    for (name, value) in text_fields(form) {
        debug!(field = name, value = %value, "multipart part");
        body = body.text(name, value);
    }
    Ok(body)
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the form and its submission status for the lifetime of one page view.
pub struct FormController {
    client: GenerationClient,
    downloads: Arc<dyn DownloadSink>,
    form: Mutex<FormState>,
    status: Mutex<SubmissionState>,
    in_flight: AtomicBool,
}

impl FormController {
    pub fn new(client: GenerationClient, downloads: Arc<dyn DownloadSink>) -> Arc<Self> {
        Self::new_with_form(client, downloads, FormState::default())
    }

    pub fn new_with_form(
        client: GenerationClient,
        downloads: Arc<dyn DownloadSink>,
        form: FormState,
    ) -> Arc<Self> {
        Arc::new(Self {
            client,
            downloads,
            form: Mutex::new(form),
            status: Mutex::new(SubmissionState::default()),
            in_flight: AtomicBool::new(false),
        })
    }

    pub async fn update_config(
        &self,
        path: &str,
        value: impl Into<String>,
    ) -> Result<(), ConfigPathError> {
        let mut form = self.form.lock().await;
        form.config = form.config.with_field(path, value)?;
        Ok(())
    }

    pub async fn set_glyphs_option(&self, option: GlyphsOption) {
        self.form.lock().await.glyphs_option = option;
    }

    pub async fn set_selected_glyphs(&self, glyphs: impl Into<String>) {
        self.form.lock().await.selected_glyphs = glyphs.into();
    }

    pub async fn select_file(&self, file: Option<FontFile>) {
        self.form.lock().await.selected_file = file;
    }

    pub async fn form(&self) -> FormState {
        self.form.lock().await.clone()
    }

    pub async fn status(&self) -> SubmissionState {
        self.status.lock().await.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validates, uploads and downloads. Never returns an error: failures end
    /// up in [`SubmissionState::upload_error`] or [`SubmissionState::errors`].
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("submission already in flight; ignoring");
            return SubmitOutcome::Busy;
        };

        {
            let mut status = self.status.lock().await;
            status.errors = FieldErrors::default();
            status.upload_error = None;
        }

        let form = self.form.lock().await.clone();
        let errors = validate(&form);
        if !errors.is_empty() {
            info!(%errors, "submission rejected by validation");
            let mut status = self.status.lock().await;
            status.errors = errors.clone();
            status.is_uploading = false;
            status.is_downloading = false;
            return SubmitOutcome::Invalid(errors);
        }

        info!(
            api_url = self.client.api_url(),
            glyphs = %form.glyphs_option,
            "submitting font for generation"
        );
        let result = self.upload_and_download(&form).await;

        let mut status = self.status.lock().await;
        status.is_uploading = false;
        status.is_downloading = false;
        match result {
            Ok(saved_to) => {
                info!(saved_to = ?saved_to, "font generation finished");
                SubmitOutcome::Completed { saved_to }
            }
            Err(err) => {
                let message = err.display_message();
                warn!(error = %message, "font generation failed");
                status.upload_error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    async fn upload_and_download(&self, form: &FormState) -> Result<Option<PathBuf>, SubmitError> {
        self.set_phase(true, false).await;
        let body = build_form(form)?;
        let response = self.client.generate(body).await;
        self.set_phase(false, false).await;

        let Some(font_url) = response?.output.font.filter(|url| !url.is_empty()) else {
            info!("generation response carried no font artifact");
            return Ok(None);
        };

        self.set_phase(false, true).await;
        let bytes = self.client.fetch_artifact(&font_url).await?;
        let filename = artifact_filename(&font_url);
        debug!(%font_url, %filename, size_bytes = bytes.len(), "artifact fetched");
        let path = self
            .downloads
            .save(&filename, bytes)
            .await
            .map_err(SubmitError::Download)?;
        Ok(Some(path))
    }

    async fn set_phase(&self, uploading: bool, downloading: bool) {
        let mut status = self.status.lock().await;
        status.is_uploading = uploading;
        status.is_downloading = downloading;
    }
}
