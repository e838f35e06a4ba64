// src/repository/memory.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::post::{compute_is_hot, NewPost, Post, SortKey};

use super::{PostRepository, RepositoryError};

/// Map-backed post repository.
///
/// Used by the integration tests and for store-free operation; observable
/// semantics match the Postgres adapter. Counter increments happen under
/// the write lock, so they cannot lose updates.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<i64, Post>>,
    next_id: AtomicI64,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_by_date_desc(mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();

        let post = Post {
            id,
            title: new_post.title,
            author: new_post.author,
            content: new_post.content,
            category: new_post.category,
            tags: sqlx::types::Json(new_post.tags),
            date: now,
            views: 0,
            likes: 0,
            cover_image: new_post.cover_image,
            is_hot: compute_is_hot(0, now, now),
        };

        self.posts.write().await.insert(id, post.clone());
        Ok(post)
    }

    async fn find_all(&self, sort: SortKey) -> Result<Vec<Post>, RepositoryError> {
        let posts: Vec<Post> = self.posts.read().await.values().cloned().collect();

        let posts = match sort {
            SortKey::Latest => Self::sorted_by_date_desc(posts),
            SortKey::Views => {
                let mut posts = posts;
                posts.sort_by(|a, b| b.views.cmp(&a.views));
                posts
            }
            SortKey::Likes => {
                let mut posts = posts;
                posts.sort_by(|a, b| b.likes.cmp(&a.likes));
                posts
            }
            SortKey::Hot => posts.into_iter().filter(|p| p.is_hot).collect(),
        };

        Ok(posts)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Post>, RepositoryError> {
        let posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect();

        Ok(Self::sorted_by_date_desc(posts))
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepositoryError> {
        let posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.tags.0.iter().any(|t| t == tag))
            .cloned()
            .collect();

        Ok(Self::sorted_by_date_desc(posts))
    }

    async fn save(&self, mut post: Post) -> Result<Post, RepositoryError> {
        post.is_hot = compute_is_hot(post.views, post.date, Utc::now());
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn increment_views(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(&id) else {
            return Ok(None);
        };

        post.views += 1;
        post.is_hot = compute_is_hot(post.views, post.date, Utc::now());
        Ok(Some(post.clone()))
    }

    async fn increment_likes(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(&id) else {
            return Ok(None);
        };

        post.likes += 1;
        post.is_hot = compute_is_hot(post.views, post.date, Utc::now());
        Ok(Some(post.clone()))
    }
}
