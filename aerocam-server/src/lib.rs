//! HTTP surface of the Aerocam gallery.
//!
//! - `GET /api/v1/photos?filter=&sort=&order=` listing with title catalog
//! - `GET /api/v1/titles` filter menu only
//! - `GET /<url_prefix>/<file>` the photos themselves
//! - `POST /upload` (and `/upload.php` for older capture clients)
//! - `GET /ping` liveness
#![allow(missing_docs)]

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::cors::build_cors_layer;
pub use infra::errors::{AppError, AppResult};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{MethodRouter, get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use handlers::{health, upload};

/// Build the full application router. CORS is layered on by the binary.
pub fn create_app(state: AppState) -> Router {
    let photos = ServeDir::new(state.photo_dir());
    let serve_path = state.serve_path.to_string();

    Router::new()
        .route("/ping", get(health::ping_handler))
        .route("/upload", upload_route(&state))
        .route("/upload.php", upload_route(&state))
        .merge(routes::create_api_router())
        .nest_service(&serve_path, photos)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn upload_route(state: &AppState) -> MethodRouter<AppState> {
    post(upload::upload_photo)
        .fallback(upload::method_not_allowed)
        .layer(DefaultBodyLimit::max(state.upload_body_limit()))
}
