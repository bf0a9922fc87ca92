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
    handlers::{interaction::COMMENT_SELECT, require_user, split_page},
    models::{
        comment::{Comment, CommentRow},
        post::{CreatePostRequest, ListParams, Post, PostPage, PostRow},
        response::ApiResponse,
    },
    utils::time::{now, to_db_time},
};

/// Post columns joined with the author's profile.
pub(crate) const POST_SELECT: &str = r#"
    SELECT
        p.id, p.user_id, p.content,
        p.likes_count, p.reposts_count, p.replies_count,
        p.created_at, p.updated_at,
        u.username, u.display_name, u.avatar_url, u.bio,
        u.created_at AS user_created_at, u.updated_at AS user_updated_at
    FROM posts p
    JOIN profiles u ON u.id = p.user_id
"#;

/// List posts (Recent first).
/// Supports cursor-based pagination: the cursor is the id of the last post
/// of the previous page.
pub async fn list_posts(
    State(pool): State<SqlitePool>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.page_size();

    // Fetch one extra row to learn whether another page follows.
    let rows: Vec<PostRow> = match params.cursor.as_deref() {
        None => {
            let sql = format!(
                "{} ORDER BY p.created_at DESC, p.id DESC LIMIT $1",
                POST_SELECT
            );
            sqlx::query_as(&sql)
                .bind(limit + 1)
                .fetch_all(&pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to list posts: {:?}", e);
                    AppError::InternalServerError(e.to_string())
                })?
        }
        Some(cursor) => {
            let anchor: Option<(i64,)> = sqlx::query_as("SELECT created_at FROM posts WHERE id = $1")
                .bind(cursor)
                .fetch_optional(&pool)
                .await?;
            let (anchor_at,) = anchor.ok_or(AppError::BadRequest("Invalid cursor".to_string()))?;

            let sql = format!(
                "{} WHERE p.created_at < $1 OR (p.created_at = $1 AND p.id < $2) \
                 ORDER BY p.created_at DESC, p.id DESC LIMIT $3",
                POST_SELECT
            );
            sqlx::query_as(&sql)
                .bind(anchor_at)
                .bind(cursor)
                .bind(limit + 1)
                .fetch_all(&pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to list posts: {:?}", e);
                    AppError::InternalServerError(e.to_string())
                })?
        }
    };

    let (rows, has_more, next_cursor) = split_page(rows, limit, |row| row.id.clone());

    Ok(Json(ApiResponse::data(PostPage {
        posts: rows.into_iter().map(Post::from).collect(),
        has_more,
        next_cursor,
    })))
}

/// Create a new post with zeroed counters.
/// Content is validated before the user id.
pub async fn create_post(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Resolve the author
    let user_id = require_user(&pool, payload.user_id.as_deref()).await?;

    // 3. Insert Post
    let id = uuid::Uuid::new_v4().to_string();
    let at = to_db_time(now());
    sqlx::query(
        r#"
        INSERT INTO posts (id, user_id, content, likes_count, reposts_count, replies_count, created_at, updated_at)
        VALUES ($1, $2, $3, 0, 0, 0, $4, $4)
        "#,
    )
    .bind(&id)
    .bind(&user_id)
    .bind(&payload.content)
    .bind(at)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create post: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let post = fetch_post(&pool, &id)
        .await?
        .ok_or_else(|| AppError::InternalServerError(format!("post {} vanished", id)))?;

    tracing::info!("User {} created post {}", user_id, id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(post).with_message("Post created")),
    ))
}

/// Get a single post by ID, with its comments in chronological order.
pub async fn get_post(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut post = fetch_post(&pool, &id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let sql = format!(
        "{} WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id ASC",
        COMMENT_SELECT
    );
    let comments: Vec<CommentRow> = sqlx::query_as(&sql).bind(&id).fetch_all(&pool).await?;
    post.comments = Some(comments.into_iter().map(Comment::from).collect());

    Ok(Json(ApiResponse::data(post)))
}

pub(crate) async fn fetch_post(pool: &SqlitePool, id: &str) -> Result<Option<Post>, AppError> {
    let sql = format!("{} WHERE p.id = $1", POST_SELECT);
    let row: Option<PostRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.map(Post::from))
}
