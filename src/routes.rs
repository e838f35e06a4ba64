// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{pages, posts, upload},
    state::AppState,
    upload::MAX_UPLOAD_BYTES,
};

/// Assembles the main application router.
///
/// * Wires the listing, post, creation and upload handlers.
/// * Serves stored media back under the public /uploads prefix.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (repository + upload policy).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let uploads_dir = state.uploads.dest_dir().to_path_buf();

    Router::new()
        .route("/", get(pages::root_redirect))
        .route("/main", get(posts::list_main))
        .route("/blog", get(posts::list_blog))
        .route("/post/{id}", get(posts::view_post))
        .route("/post/{id}/like", post(posts::like_post))
        .route("/create", get(pages::create_form).post(posts::create_post))
        .route("/upload", post(upload::upload_media))
        .route("/category/{category}", get(posts::by_category))
        .route("/tag/{tag}", get(posts::by_tag))
        .route("/stock", get(pages::stock_page))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        // Multipart bodies carry a file up to the policy cap plus form
        // overhead; oversize files themselves are rejected by the policy.
        .layer(DefaultBodyLimit::max(2 * MAX_UPLOAD_BYTES))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
