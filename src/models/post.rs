// src/models/post.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::{
    models::{comment::Comment, id::EntityId, profile::Profile},
    utils::time::from_db_time,
};

/// Maximum length of a post or comment, in Unicode scalar values.
pub const MAX_CONTENT_CHARS: usize = 280;

/// A post as shown on the timeline and stored in the local cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: EntityId,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    pub likes_count: u32,
    pub reposts_count: u32,
    pub replies_count: u32,

    pub user_id: String,
    pub user: Profile,

    /// Chronological. Absent when the listing did not load comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,

    /// UI helper: whether the session user has liked this post.
    /// Kept on the client only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_liked: bool,
}

/// Row of `posts` joined with the author's profile.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub likes_count: i64,
    pub reposts_count: i64,
    pub replies_count: i64,
    pub created_at: i64,
    pub updated_at: i64,

    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub user_created_at: i64,
    pub user_updated_at: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: EntityId::Remote(row.id),
            content: row.content,
            created_at: from_db_time(row.created_at),
            updated_at: from_db_time(row.updated_at),
            likes_count: counter(row.likes_count),
            reposts_count: counter(row.reposts_count),
            replies_count: counter(row.replies_count),
            user: Profile {
                id: row.user_id.clone(),
                username: row.username,
                display_name: row.display_name,
                avatar_url: row.avatar_url,
                bio: row.bio,
                created_at: from_db_time(row.user_created_at),
                updated_at: from_db_time(row.user_updated_at),
            },
            user_id: row.user_id,
            comments: None,
            is_liked: false,
        }
    }
}

pub(crate) fn counter(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(
        length(
            min = 1,
            max = 280,
            message = "Content length must be between 1 and 280 characters"
        ),
        custom(function = not_blank)
    )]
    pub content: String,

    /// Stand-in for an authenticated session.
    pub user_id: Option<String>,
}

/// Query parameters for cursor-paginated listings.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Id of the last item of the previous page.
    pub cursor: Option<String>,

    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,
}

impl ListParams {
    pub fn page_size(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

/// One page of the post listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

pub(crate) fn not_blank(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Content must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Checks content the same way the service does and returns the trimmed text.
pub fn check_content(content: &str) -> Result<&str, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("Content must not be empty".to_string());
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(format!(
            "Content must be at most {} characters",
            MAX_CONTENT_CHARS
        ));
    }
    Ok(trimmed)
}
