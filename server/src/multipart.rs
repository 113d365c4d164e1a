//! Multipart form decoding.
//!
//! Parts carrying a filename are uploads; everything else is a text field.
//! The first occurrence of a field wins and unknown fields are skipped.

use crate::error::ApiError;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;
use slidemaker::validate::is_pptx_filename;
use slidemaker::{ImageUpload, Limits, ValidationError};
use tracing::debug;

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Fields of the add-slide and get-layouts forms.
#[derive(Debug, Default)]
pub struct SlideForm {
    /// The `file` part, present even when its filename is empty.
    pub file: Option<Upload>,
    pub layout: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    /// The `image` part; a part with an empty filename counts as absent.
    pub image: Option<Upload>,
    pub position: Option<String>,
}

impl SlideForm {
    /// Read every part of the request body.
    ///
    /// A request that is not multipart at all reads as an empty form.
    pub async fn read(
        multipart: Result<Multipart, MultipartRejection>,
        body_limit: u64,
    ) -> Result<Self, ApiError> {
        let mut form = Self::default();
        let mut multipart = match multipart {
            Ok(multipart) => multipart,
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "request is not multipart");
                return Ok(form);
            }
        };

        let read_error = |e: MultipartError| body_error(e, body_limit);
        while let Some(field) = multipart.next_field().await.map_err(read_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "file" | "image" => {
                    let Some(filename) = field.file_name().map(str::to_string) else {
                        debug!(field = %name, "upload field without a filename, skipping");
                        continue;
                    };
                    let data = field.bytes().await.map_err(read_error)?.to_vec();
                    let slot = if name == "file" {
                        &mut form.file
                    } else if filename.is_empty() {
                        continue;
                    } else {
                        &mut form.image
                    };
                    if slot.is_none() {
                        *slot = Some(Upload { filename, data });
                    }
                }
                "layout" | "title" | "text" | "position" => {
                    let value = field.text().await.map_err(read_error)?;
                    let slot = match name.as_str() {
                        "layout" => &mut form.layout,
                        "title" => &mut form.title,
                        "text" => &mut form.text,
                        _ => &mut form.position,
                    };
                    if slot.is_none() {
                        *slot = Some(value);
                    }
                }
                other => debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Take the presentation upload, checking presence, name and size.
    pub fn take_presentation(&mut self, limits: &Limits) -> Result<Upload, ValidationError> {
        let file = self.file.take().ok_or(ValidationError::NoFile)?;
        if file.filename.is_empty() {
            return Err(ValidationError::NoFileSelected);
        }
        if !is_pptx_filename(&file.filename) {
            return Err(ValidationError::NotPptx);
        }
        limits.check_document(file.data.len() as u64)?;
        Ok(file)
    }

    /// Take the image upload, if any.
    pub fn take_image(&mut self) -> Option<ImageUpload> {
        self.image.take().map(|upload| ImageUpload {
            filename: upload.filename,
            data: upload.data,
        })
    }
}

/// Body-limit overruns become a validation error; anything else is a bad request.
fn body_error(error: MultipartError, body_limit: u64) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::RequestTooLarge { limit: body_limit }.into()
    } else {
        ApiError::BadRequest(format!("Malformed upload: {}", error.body_text()))
    }
}
