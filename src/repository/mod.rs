// src/repository/mod.rs

pub mod memory;
pub mod postgres;

pub use memory::InMemoryPostRepository;
pub use postgres::PgPostRepository;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::post::{NewPost, Post, SortKey};

/// Failure raised by a repository backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::DatabaseError(err.to_string())
    }
}

/// Persistence port for the post collection.
///
/// The backing store is an implementation detail: Postgres in production,
/// an in-memory map in tests. Every write path recomputes the `is_hot`
/// flag via `compute_is_hot` before persisting.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persists a new post and returns it with its generated id.
    async fn create(&self, new_post: NewPost) -> Result<Post, RepositoryError>;

    /// Returns the full collection ordered (or filtered) by the sort key.
    async fn find_all(&self, sort: SortKey) -> Result<Vec<Post>, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepositoryError>;

    /// Posts in the given category, date descending.
    async fn find_by_category(&self, category: &str) -> Result<Vec<Post>, RepositoryError>;

    /// Posts whose tag list contains the given tag, date descending.
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepositoryError>;

    /// Recomputes `is_hot` and persists every field of the post.
    async fn save(&self, post: Post) -> Result<Post, RepositoryError>;

    /// Atomically adds 1 to the view counter, then recomputes and persists
    /// the hot flag. Returns `None` when the id does not exist.
    async fn increment_views(&self, id: i64) -> Result<Option<Post>, RepositoryError>;

    /// Atomically adds 1 to the like counter, then recomputes and persists
    /// the hot flag. Returns `None` when the id does not exist.
    async fn increment_likes(&self, id: i64) -> Result<Option<Post>, RepositoryError>;
}
