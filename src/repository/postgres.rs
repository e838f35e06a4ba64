// src/repository/postgres.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::models::post::{compute_is_hot, NewPost, Post, SortKey};

use super::{PostRepository, RepositoryError};

const POST_COLUMNS: &str =
    "id, title, author, content, category, tags, date, views, likes, cover_image, is_hot";

/// Postgres-backed post repository.
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a freshly recomputed hot flag for the given post id.
    async fn store_hot_flag(&self, id: i64, is_hot: bool) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE posts SET is_hot = $2 WHERE id = $1")
            .bind(id)
            .bind(is_hot)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepositoryError> {
        let now = Utc::now();
        let is_hot = compute_is_hot(0, now, now);

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (title, author, content, category, tags, date, views, likes, cover_image, is_hot)
            VALUES ($1, $2, $3, $4, $5, $6, 0, 0, $7, $8)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&new_post.title)
        .bind(&new_post.author)
        .bind(&new_post.content)
        .bind(&new_post.category)
        .bind(sqlx::types::Json(&new_post.tags))
        .bind(now)
        .bind(&new_post.cover_image)
        .bind(is_hot)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_all(&self, sort: SortKey) -> Result<Vec<Post>, RepositoryError> {
        let query = match sort {
            SortKey::Latest => {
                format!("SELECT {POST_COLUMNS} FROM posts ORDER BY date DESC")
            }
            SortKey::Views => {
                format!("SELECT {POST_COLUMNS} FROM posts ORDER BY views DESC")
            }
            SortKey::Likes => {
                format!("SELECT {POST_COLUMNS} FROM posts ORDER BY likes DESC")
            }
            // Hot is a filter, not an ordering; the result order is
            // unspecified.
            SortKey::Hot => {
                format!("SELECT {POST_COLUMNS} FROM posts WHERE is_hot")
            }
        };

        let posts = sqlx::query_as::<_, Post>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Post>, RepositoryError> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE category = $1 ORDER BY date DESC"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepositoryError> {
        // `?` tests membership of a string element in the JSONB tag array.
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE tags ? $1 ORDER BY date DESC"
        ))
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn save(&self, mut post: Post) -> Result<Post, RepositoryError> {
        post.is_hot = compute_is_hot(post.views, post.date, Utc::now());

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = $2, author = $3, content = $4, category = $5, tags = $6,
                date = $7, views = $8, likes = $9, cover_image = $10, is_hot = $11
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.author)
        .bind(&post.content)
        .bind(&post.category)
        .bind(&post.tags)
        .bind(post.date)
        .bind(post.views)
        .bind(post.likes)
        .bind(&post.cover_image)
        .bind(post.is_hot)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn increment_views(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        let updated = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET views = views + 1 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(post) = updated else {
            return Ok(None);
        };

        let is_hot = compute_is_hot(post.views, post.date, Utc::now());
        self.store_hot_flag(id, is_hot).await?;

        Ok(Some(Post { is_hot, ..post }))
    }

    async fn increment_likes(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        let updated = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET likes = likes + 1 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(post) = updated else {
            return Ok(None);
        };

        let is_hot = compute_is_hot(post.views, post.date, Utc::now());
        self.store_hot_flag(id, is_hot).await?;

        Ok(Some(Post { is_hot, ..post }))
    }
}
