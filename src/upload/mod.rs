//! Multipart upload handling.
//!
//! Uploaded files are spooled to a temp file in the configured upload
//! directory and owned by an [`UploadedFile`]. The temp file is removed when
//! the guard is closed or dropped, so every exit path of a request releases it
//! exactly once.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::error::{GatewayError, Result};
use crate::generation::Attachment;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
const PROMPT_FIELD: &str = "prompt";

/// A file received in a multipart request, backed by a temp file.
#[derive(Debug)]
pub struct UploadedFile {
    file: NamedTempFile,
    mime_type: String,
    file_name: Option<String>,
    size: u64,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read the spooled bytes into an in-memory attachment.
    pub async fn read_attachment(&self) -> Result<Attachment> {
        let bytes = tokio::fs::read(self.file.path()).await?;
        Ok(Attachment {
            bytes,
            mime_type: self.mime_type.clone(),
        })
    }

    /// Delete the backing temp file, logging (not failing) on error.
    pub fn close(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed upload {}", path.display()),
            Err(e) => warn!("Failed to remove upload {}: {}", path.display(), e),
        }
    }
}

/// Fields collected from an upload request.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub prompt: Option<String>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    /// Split into prompt and file, failing if the file field was absent.
    pub fn require_file(self, field: &str) -> Result<(Option<String>, UploadedFile)> {
        match self.file {
            Some(file) => Ok((self.prompt, file)),
            None => Err(GatewayError::InvalidRequest(format!(
                "Missing required file field: {}",
                field
            ))),
        }
    }
}

/// Read a multipart body, spooling `file_field` into `upload_dir`.
///
/// The `prompt` text field is captured; any other field is skipped. At most
/// one file is accepted in `file_field`.
pub async fn parse_upload_form(
    mut multipart: Multipart,
    file_field: &str,
    upload_dir: &Path,
) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == PROMPT_FIELD && field.file_name().is_none() {
            form.prompt = Some(field.text().await.map_err(multipart_error)?);
            continue;
        }

        if name != file_field {
            debug!("Ignoring multipart field {:?}", name);
            continue;
        }

        if form.file.is_some() {
            return Err(GatewayError::InvalidRequest(format!(
                "Only one file may be uploaded in field: {}",
                file_field
            )));
        }

        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let file_name = field.file_name().map(str::to_string);

        let temp = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(upload_dir)?;
        let mut writer = tokio::fs::File::from_std(temp.as_file().try_clone()?);

        // The guard owns the temp file from here on, so a failed read below
        // still removes it.
        let mut upload = UploadedFile {
            file: temp,
            mime_type,
            file_name,
            size: 0,
        };

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            writer.write_all(&chunk).await?;
            upload.size += chunk.len() as u64;
        }
        writer.flush().await?;

        debug!(
            "Spooled {} ({} bytes, {}) to {}",
            upload.file_name().unwrap_or("unnamed"),
            upload.size,
            upload.mime_type,
            upload.path().display()
        );
        form.file = Some(upload);
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> GatewayError {
    debug!("Multipart error: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge
    } else {
        GatewayError::InvalidRequest("Invalid multipart body".to_string())
    }
}
