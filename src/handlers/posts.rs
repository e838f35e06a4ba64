// src/handlers/posts.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::pages::found,
    models::post::{
        CreatePostRequest, ListParams, NewPost, SortKey, DEFAULT_CATEGORY, parse_tags,
    },
    repository::PostRepository,
    state::AppState,
    utils::html::clean_html,
};

/// Main listing. Supports 'latest' (default), 'views' and 'hot'; any other
/// value falls back to the date ordering.
pub async fn list_main(
    State(repo): State<Arc<dyn PostRepository>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let sort = params.sort.unwrap_or_else(|| "latest".to_string());

    let key = match sort.as_str() {
        "hot" => SortKey::Hot,
        "views" => SortKey::Views,
        _ => SortKey::Latest,
    };

    let posts = repo.find_all(key).await?;

    Ok(Json(json!({ "posts": posts, "sort": sort })))
}

/// Blog listing. Unlike the main listing this validates the sort option
/// and rejects unknown values with an emptied list payload.
pub async fn list_blog(
    State(repo): State<Arc<dyn PostRepository>>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let sort = params.sort.unwrap_or_else(|| "latest".to_string());

    let key = match sort.as_str() {
        "latest" => SortKey::Latest,
        "views" => SortKey::Views,
        "likes" => SortKey::Likes,
        _ => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid sort option",
                    "posts": [],
                    "sort": "latest",
                })),
            )
                .into_response());
        }
    };

    let posts = repo.find_all(key).await.map_err(|e| {
        tracing::error!("Failed to list posts: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(json!({ "posts": posts, "sort": sort, "error": null })).into_response())
}

/// Single post view. Every request counts as a view.
pub async fn view_post(
    State(repo): State<Arc<dyn PostRepository>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = repo
        .increment_views(id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// Create a new post from the multipart creation form, with an optional
/// `cover` file stored through the upload policy.
pub async fn create_post(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut title = String::new();
    let mut author = String::new();
    let mut content = String::new();
    let mut category = String::new();
    let mut tags_raw = String::new();
    let mut cover_image: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => title = read_text(field, "title").await?,
            "author" => author = read_text(field, "author").await?,
            "content" => content = read_text(field, "content").await?,
            "category" => category = read_text(field, "category").await?,
            "tags" => tags_raw = read_text(field, "tags").await?,
            "cover" => {
                let filename = field.file_name().unwrap_or("cover").to_string();
                let mime = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read cover: {}", e)))?;

                // Browsers submit an empty part when no file was chosen.
                if !data.is_empty() {
                    cover_image = Some(state.uploads.store(&filename, &mime, &data).await?);
                }
            }
            _ => {}
        }
    }

    let payload = CreatePostRequest {
        title,
        author,
        content,
    };
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let category = if category.trim().is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category
    };
    let tags = parse_tags(&tags_raw);
    let content = clean_html(&payload.content);

    let post = state
        .repo
        .create(NewPost {
            title: payload.title,
            author: payload.author,
            content,
            category,
            tags,
            cover_image,
        })
        .await?;

    tracing::info!(post_id = post.id, "Post created");

    Ok(found("/main"))
}

/// Like a post. Responds with the updated like count as a structured
/// payload rather than a page.
pub async fn like_post(
    State(repo): State<Arc<dyn PostRepository>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = repo
        .increment_likes(id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(json!({ "likes": post.likes })))
}

/// Posts in a category, newest first.
pub async fn by_category(
    State(repo): State<Arc<dyn PostRepository>>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let posts = repo.find_by_category(&category).await?;

    Ok(Json(json!({ "posts": posts, "category": category })))
}

/// Posts carrying a tag, newest first.
pub async fn by_tag(
    State(repo): State<Arc<dyn PostRepository>>,
    Path(tag): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let posts = repo.find_by_tag(&tag).await?;

    Ok(Json(json!({ "posts": posts, "tag": tag })))
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {}: {}", name, e)))
}
