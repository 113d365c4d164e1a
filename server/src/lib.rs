//! # slidemaker-server
//!
//! HTTP API over the `slidemaker` library.
//!
//! | Route | |
//! |---|---|
//! | `POST /api/add-slide` | insert a slide, returns the modified `.pptx` |
//! | `POST /api/get-layouts` | list the first master's layouts |
//! | `GET /api/health` | liveness |

pub mod error;
pub mod multipart;
pub mod routes;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use slidemaker::Limits;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub limits: Arc<Limits>,
    /// Largest accepted request body in bytes.
    pub body_limit: u64,
}

impl AppState {
    pub fn new(limits: Limits) -> Self {
        Self {
            body_limit: limits.max_request_bytes(),
            limits: Arc::new(limits),
        }
    }
}

/// Build the application router.
///
/// ```
/// use slidemaker::Limits;
/// use slidemaker_server::{router, AppState};
///
/// let app = router(AppState::new(Limits::with_megabytes(20, 5)));
/// # let _ = app;
/// ```
pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/api/add-slide", post(routes::add_slide))
        .route("/api/get-layouts", post(routes::get_layouts))
        .route("/api/health", get(routes::health))
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
