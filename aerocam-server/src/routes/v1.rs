use axum::{Router, routing::get};

use crate::{AppState, handlers::gallery};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/photos", get(gallery::list_photos))
        .route("/titles", get(gallery::list_titles))
}
