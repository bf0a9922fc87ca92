use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        profile::{Profile, ProfileRow},
        response::ApiResponse,
    },
};

/// Get a public profile by username.
pub async fn get_profile(
    State(pool): State<SqlitePool>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row: ProfileRow = sqlx::query_as(
        r#"
        SELECT id, username, display_name, avatar_url, bio, created_at, updated_at
        FROM profiles
        WHERE username = $1
        "#,
    )
    .bind(&username)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::data(Profile::from(row))))
}
