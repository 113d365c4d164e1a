//! Request handlers.

use crate::error::ApiError;
use crate::multipart::SlideForm;
use crate::AppState;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use slidemaker::validate::parse_position;
use slidemaker::{LayoutInfo, SlideRequest};
use std::sync::Arc;
use tracing::info;

/// MIME type of the returned presentation.
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// `Content-Disposition` of the returned presentation.
pub const DOWNLOAD_DISPOSITION: &str = "attachment; filename=\"presentation_modified.pptx\"";

/// `POST /api/add-slide`
///
/// Fields are validated in order: file, layout, text, image, position.
pub async fn add_slide(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut form = SlideForm::read(multipart, state.body_limit).await?;
    let file = form.take_presentation(&state.limits)?;

    let mut request = SlideRequest::new(
        form.layout.as_deref().unwrap_or_default(),
        form.text.as_deref().unwrap_or_default(),
    );
    if let Some(title) = form.title.as_deref() {
        request = request.with_title(title);
    }
    if let Some(image) = form.take_image() {
        request = request.with_image(image);
    }
    request.validate(&state.limits)?;
    let request = request.at_position(parse_position(form.position.as_deref())?);

    info!(
        filename = %file.filename,
        bytes = file.data.len(),
        layout = request.layout(),
        position = request.position(),
        image = request.image().is_some(),
        "add-slide request"
    );

    let limits = Arc::clone(&state.limits);
    let insertion =
        tokio::task::spawn_blocking(move || slidemaker::add_slide(file.data, &request, &limits))
            .await??;

    Ok((
        [
            (header::CONTENT_TYPE, PPTX_MIME),
            (header::CONTENT_DISPOSITION, DOWNLOAD_DISPOSITION),
        ],
        insertion.bytes,
    )
        .into_response())
}

/// Body of a successful get-layouts response.
#[derive(Debug, Serialize)]
pub struct LayoutsResponse {
    pub total_slides: usize,
    pub layouts: Vec<LayoutInfo>,
    pub message: String,
}

/// `POST /api/get-layouts`
pub async fn get_layouts(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<LayoutsResponse>, ApiError> {
    let mut form = SlideForm::read(multipart, state.body_limit).await?;
    let file = form.take_presentation(&state.limits)?;

    let limits = Arc::clone(&state.limits);
    let listing = tokio::task::spawn_blocking(move || slidemaker::list_layouts(file.data, &limits))
        .await?
        .map_err(|e| match e {
            slidemaker::Error::CorruptPresentation(detail) => {
                ApiError::BadRequest(format!("Invalid PowerPoint file: {}", detail))
            }
            other => ApiError::Document(other),
        })?;

    Ok(Json(LayoutsResponse {
        total_slides: listing.total_slides,
        message: format!("Found {} layouts in presentation", listing.layouts.len()),
        layouts: listing.layouts,
    }))
}

/// Body of the health check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "SlideMaker API is running",
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
