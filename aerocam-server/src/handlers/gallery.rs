use std::sync::Arc;

use aerocam_model::{CatalogEntry, GalleryListing, GalleryQuery, PhotoRecord, SortBy, SortOrder};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;
use crate::infra::errors::AppResult;

/// Raw query string values. Anything missing or unrecognized falls back to
/// the defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryParams {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl GalleryParams {
    pub fn to_query(&self) -> GalleryQuery {
        GalleryQuery::from_params(
            self.filter.as_deref(),
            self.sort.as_deref(),
            self.order.as_deref(),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub photos: Vec<PhotoRecord>,
    pub titles: Vec<CatalogEntry>,
    pub total_photos: usize,
    /// Effective filter key; empty when every photo is shown.
    pub filter: String,
    pub filter_title: Option<String>,
    pub sort: SortBy,
    pub order: SortOrder,
}

impl From<GalleryListing> for ListingResponse {
    fn from(listing: GalleryListing) -> Self {
        let filter_title = listing.filter_title().map(str::to_string);
        Self {
            titles: listing.catalog.to_vec(),
            total_photos: listing.total_photos,
            filter: listing.filter.into_inner(),
            filter_title,
            sort: listing.sort,
            order: listing.order,
            photos: listing.photos,
        }
    }
}

pub async fn list_photos(
    State(state): State<AppState>,
    params: Result<Query<GalleryParams>, QueryRejection>,
) -> AppResult<Json<ListingResponse>> {
    let params = params
        .map(|Query(params)| params)
        .unwrap_or_else(|rejection| {
            debug!("Unreadable listing parameters, using defaults: {}", rejection);
            GalleryParams::default()
        });
    let query = params.to_query();
    let gallery = Arc::clone(&state.gallery);
    let listing = tokio::task::spawn_blocking(move || gallery.listing(&query)).await??;
    Ok(Json(ListingResponse::from(listing)))
}

pub async fn list_titles(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogEntry>>> {
    let gallery = Arc::clone(&state.gallery);
    let catalog = tokio::task::spawn_blocking(move || gallery.catalog()).await??;
    Ok(Json(catalog.to_vec()))
}
