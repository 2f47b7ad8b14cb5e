//! Multipart upload form parsing.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use bytes::Bytes;

use expense_core::service::expense::FileUpload;

use crate::http::error::AppError;
use crate::http::extractors::query::{require_uri, UploadQuery};

/// A file part from a multipart body.
#[derive(Debug)]
pub struct UploadedFile {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Fields of an upload form. URL fields fall back to the query string.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub destination_url: Option<String>,
    pub expense_url: Option<String>,
}

impl UploadForm {
    /// Read every part of the body, keeping the fields we know.
    pub async fn read(mut multipart: Multipart, query: UploadQuery) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(rejected)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(rejected)?;
                    form.file = Some(UploadedFile { content_type, bytes });
                }
                "destinationURL" => {
                    form.destination_url = Some(field.text().await.map_err(rejected)?);
                }
                "expenseURL" => {
                    form.expense_url = Some(field.text().await.map_err(rejected)?);
                }
                other => tracing::debug!(field = other, "ignoring unknown multipart field"),
            }
        }

        form.destination_url = form.destination_url.or(query.destination_url);
        form.expense_url = form.expense_url.or(query.expense_url);
        Ok(form)
    }

    /// The file and its destination as a pod upload.
    pub fn file_upload(&mut self) -> Result<FileUpload, AppError> {
        let destination = require_uri("destinationURL", self.destination_url.as_deref())?;
        let file = self
            .file
            .take()
            .ok_or_else(|| AppError::Validation("missing required part 'file'".to_string()))?;
        Ok(FileUpload {
            destination,
            content_type: file.content_type,
            bytes: file.bytes,
        })
    }
}

fn rejected(e: MultipartError) -> AppError {
    AppError::Rejected(e.status(), e.body_text())
}
