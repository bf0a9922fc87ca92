use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    models::{id::EntityId, post::not_blank, profile::Profile},
    utils::time::from_db_time,
};

/// A reply attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: EntityId,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub user_id: String,
    pub post_id: EntityId,
    pub user: Profile,
}

/// Row of `comments` joined with the author's profile.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,

    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub user_created_at: i64,
    pub user_updated_at: i64,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: EntityId::Remote(row.id),
            content: row.content,
            created_at: from_db_time(row.created_at),
            updated_at: from_db_time(row.updated_at),
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
            post_id: EntityId::Remote(row.post_id),
        }
    }
}

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    #[validate(
        length(
            min = 1,
            max = 280,
            message = "Comment must be between 1 and 280 characters"
        ),
        custom(function = not_blank)
    )]
    pub content: String,

    pub user_id: Option<String>,
}

/// One page of a post's comments, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}
