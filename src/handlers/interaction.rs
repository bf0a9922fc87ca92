use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{require_user, split_page},
    models::{
        comment::{Comment, CommentPage, CommentRow, CreateCommentRequest},
        post::{ListParams, counter},
        response::{ApiResponse, LikeQuery, LikeRequest, LikeStatus, LikeToggled},
    },
    utils::time::{now, to_db_time},
};

/// Comment columns joined with the author's profile.
pub(crate) const COMMENT_SELECT: &str = r#"
    SELECT
        c.id, c.post_id, c.user_id, c.content,
        c.created_at, c.updated_at,
        u.username, u.display_name, u.avatar_url, u.bio,
        u.created_at AS user_created_at, u.updated_at AS user_updated_at
    FROM comments c
    JOIN profiles u ON u.id = c.user_id
"#;

async fn post_exists<'e, E>(executor: E, post_id: &str) -> Result<bool, AppError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(executor)
        .await?;
    Ok(found.is_some())
}

/// Toggle Like on a post.
/// Presence of the (user, post) pair decides the direction; the counter
/// moves in the same transaction and never drops below zero.
pub async fn toggle_like(
    State(pool): State<SqlitePool>,
    Path(post_id): Path<String>,
    Json(payload): Json<LikeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user(&pool, payload.user_id.as_deref()).await?;

    let mut tx = pool.begin().await?;

    if !post_exists(&mut *tx, &post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    // 1. Check if already liked
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(&user_id)
            .bind(&post_id)
            .fetch_optional(&mut *tx)
            .await?;

    let is_liked = existing.is_some();

    if is_liked {
        // Unlike
        sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(&user_id)
            .bind(&post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE posts SET likes_count = MAX(0, likes_count - 1) WHERE id = $1")
            .bind(&post_id)
            .execute(&mut *tx)
            .await?;
    } else {
        // Like
        sqlx::query("INSERT INTO likes (user_id, post_id, created_at) VALUES ($1, $2, $3)")
            .bind(&user_id)
            .bind(&post_id)
            .bind(to_db_time(now()))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                let unique = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if unique {
                    // Concurrent request handled gracefully
                    return AppError::Conflict("Already liked".to_string());
                }
                AppError::InternalServerError(e.to_string())
            })?;

        sqlx::query("UPDATE posts SET likes_count = likes_count + 1 WHERE id = $1")
            .bind(&post_id)
            .execute(&mut *tx)
            .await?;
    }

    let (likes_count,): (i64,) = sqlx::query_as("SELECT likes_count FROM posts WHERE id = $1")
        .bind(&post_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    let message = if is_liked { "Like removed" } else { "Like added" };
    Ok(Json(
        ApiResponse::data(LikeToggled {
            liked: !is_liked,
            likes_count: counter(likes_count),
        })
        .with_message(message),
    ))
}

/// Whether the given user currently likes the post.
pub async fn like_status(
    State(pool): State<SqlitePool>,
    Path(post_id): Path<String>,
    Query(query): Query<LikeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::AuthError("User id is required".to_string()))?;

    if !post_exists(&pool, &post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(&user_id)
            .bind(&post_id)
            .fetch_optional(&pool)
            .await?;

    Ok(Json(ApiResponse::data(LikeStatus {
        liked: existing.is_some(),
    })))
}

/// Create a new comment and bump the post's reply counter.
pub async fn create_comment(
    State(pool): State<SqlitePool>,
    Path(post_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = require_user(&pool, payload.user_id.as_deref()).await?;

    let mut tx = pool.begin().await?;

    if !post_exists(&mut *tx, &post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    // 1. Insert Comment
    let id = uuid::Uuid::new_v4().to_string();
    let at = to_db_time(now());
    sqlx::query(
        r#"
        INSERT INTO comments (id, post_id, user_id, content, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        "#,
    )
    .bind(&id)
    .bind(&post_id)
    .bind(&user_id)
    .bind(&payload.content)
    .bind(at)
    .execute(&mut *tx)
    .await?;

    // 2. Update Post Count
    sqlx::query("UPDATE posts SET replies_count = replies_count + 1 WHERE id = $1")
        .bind(&post_id)
        .execute(&mut *tx)
        .await?;

    let sql = format!("{} WHERE c.id = $1", COMMENT_SELECT);
    let row: CommentRow = sqlx::query_as(&sql).bind(&id).fetch_one(&mut *tx).await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(Comment::from(row)).with_message("Comment created")),
    ))
}

/// List a post's comments, newest first, with the same cursor contract as
/// the post listing.
pub async fn list_comments(
    State(pool): State<SqlitePool>,
    Path(post_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    if !post_exists(&pool, &post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let limit = params.page_size();

    let rows: Vec<CommentRow> = match params.cursor.as_deref() {
        None => {
            let sql = format!(
                "{} WHERE c.post_id = $1 ORDER BY c.created_at DESC, c.id DESC LIMIT $2",
                COMMENT_SELECT
            );
            sqlx::query_as(&sql)
                .bind(&post_id)
                .bind(limit + 1)
                .fetch_all(&pool)
                .await?
        }
        Some(cursor) => {
            let anchor: Option<(i64,)> =
                sqlx::query_as("SELECT created_at FROM comments WHERE id = $1 AND post_id = $2")
                    .bind(cursor)
                    .bind(&post_id)
                    .fetch_optional(&pool)
                    .await?;
            let (anchor_at,) = anchor.ok_or(AppError::BadRequest("Invalid cursor".to_string()))?;

            let sql = format!(
                "{} WHERE c.post_id = $1 \
                 AND (c.created_at < $2 OR (c.created_at = $2 AND c.id < $3)) \
                 ORDER BY c.created_at DESC, c.id DESC LIMIT $4",
                COMMENT_SELECT
            );
            sqlx::query_as(&sql)
                .bind(&post_id)
                .bind(anchor_at)
                .bind(cursor)
                .bind(limit + 1)
                .fetch_all(&pool)
                .await?
        }
    };

    let (rows, has_more, next_cursor) = split_page(rows, limit, |row| row.id.clone());

    Ok(Json(ApiResponse::data(CommentPage {
        comments: rows.into_iter().map(Comment::from).collect(),
        has_more,
        next_cursor,
    })))
}
