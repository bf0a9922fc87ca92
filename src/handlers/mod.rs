// src/handlers/mod.rs

pub mod interaction;
pub mod posts;
pub mod profile;

use sqlx::SqlitePool;

use crate::error::AppError;

/// Resolves the caller's identity from the `userId` field.
///
/// There is no session system: an absent or unknown id is treated as an
/// unauthenticated request.
pub(crate) async fn require_user(
    pool: &SqlitePool,
    user_id: Option<&str>,
) -> Result<String, AppError> {
    let user_id = user_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::AuthError("User id is required".to_string()))?;

    let found: Option<(String,)> = sqlx::query_as("SELECT id FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    found
        .map(|(id,)| id)
        .ok_or_else(|| AppError::AuthError("Unknown user".to_string()))
}

/// Splits a `limit + 1` row fetch into the page, whether more rows follow,
/// and the cursor for the next page (id of the last returned row).
pub(crate) fn split_page<T>(
    mut rows: Vec<T>,
    limit: i64,
    id_of: impl Fn(&T) -> String,
) -> (Vec<T>, bool, Option<String>) {
    let limit = usize::try_from(limit).unwrap_or(0);
    let has_more = rows.len() > limit;
    rows.truncate(limit);
    let next_cursor = if has_more { rows.last().map(id_of) } else { None };
    (rows, has_more, next_cursor)
}
