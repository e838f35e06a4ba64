// src/handlers/pages.rs

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::post::ListParams;
use crate::upload::UploadPolicy;

/// 302 Found redirect.
pub fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// Redirects the root to the main listing, preserving the sort query.
pub async fn root_redirect(Query(params): Query<ListParams>) -> Response {
    match params.sort {
        Some(sort) => found(&format!("/main?sort={}", sort)),
        None => found("/main"),
    }
}

/// Creation-form descriptor: the constraints a client-side form needs to
/// enforce for the cover upload.
pub async fn create_form(State(uploads): State<UploadPolicy>) -> impl IntoResponse {
    Json(json!({
        "fields": ["title", "author", "content", "category", "tags", "cover"],
        "upload": {
            "allowed_types": uploads.allowed_mime_types(),
            "max_bytes": uploads.max_bytes(),
        },
    }))
}

/// Static page route, no data dependency.
pub async fn stock_page() -> impl IntoResponse {
    Json(json!({ "page": "stock" }))
}
