use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Category applied when the creation form leaves the field blank.
pub const DEFAULT_CATEGORY: &str = "Other";

/// A post is hot once it has accumulated at least this many views...
pub const HOT_MIN_VIEWS: i32 = 100;
/// ...and sustains at least this many views per day since publication.
pub const HOT_MIN_DAILY_VIEWS: f64 = 10.0;

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub content: String,
    pub category: String,

    /// Free-text tags used as filter keys, stored as a JSON array.
    pub tags: sqlx::types::Json<Vec<String>>,

    pub date: DateTime<Utc>,

    pub views: i32,
    pub likes: i32,

    /// Public URL of the cover upload, if one was attached at creation.
    pub cover_image: Option<String>,

    /// Derived engagement flag, recomputed on every persistence write.
    pub is_hot: bool,
}

/// Field values for a post that has not been persisted yet.
/// Counters start at zero and `date` is stamped by the repository.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub author: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
}

/// DTO for the create-post form fields (multipart text parts).
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title length must be between 1 and 100 chars"
    ))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Author length must be between 1 and 100 chars"
    ))]
    pub author: String,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ))]
    pub content: String,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Sort option: 'latest' (default), 'views', 'likes' or 'hot'.
    pub sort: Option<String>,
}

/// Ordering / filtering applied by the repository's find_all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Date descending.
    Latest,
    /// View count descending.
    Views,
    /// Like count descending.
    Likes,
    /// Subset where `is_hot` is true; order unspecified.
    Hot,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Latest => "latest",
            SortKey::Views => "views",
            SortKey::Likes => "likes",
            SortKey::Hot => "hot",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "latest" => Some(SortKey::Latest),
            "views" => Some(SortKey::Views),
            "likes" => Some(SortKey::Likes),
            "hot" => Some(SortKey::Hot),
            _ => None,
        }
    }
}

/// Popularity heuristic, evaluated immediately before every persistence
/// write: hot = views >= 100 AND views per day >= 10. Elapsed days are
/// fractional and clamped to a minimum of 1 so same-day posts are measured
/// against a full day.
pub fn compute_is_hot(views: i32, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let days = ((now - date).num_milliseconds() as f64 / 86_400_000.0).max(1.0);
    views >= HOT_MIN_VIEWS && (views as f64 / days) >= HOT_MIN_DAILY_VIEWS
}

/// Splits the comma-separated tags field into trimmed tags.
/// An empty or whitespace-only field yields no tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|tag| tag.trim().to_string()).collect()
}
