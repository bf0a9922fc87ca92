// src/seed.rs

//! Demo data: the session user, a handful of profiles and five posts.
//!
//! The same set backs the in-memory listing used by the feed when no server
//! is reachable, and is inserted into an empty database on server startup.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::{
    models::{comment::Comment, id::EntityId, post::Post, profile::Profile},
    utils::time::{now, to_db_time},
};

/// Fixed identity used in place of a logged-in user.
pub const SESSION_USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Source of the posts a fresh feed starts from.
pub trait SeedProvider: Send + Sync {
    fn posts(&self) -> Vec<Post>;
}

impl SeedProvider for Vec<Post> {
    fn posts(&self) -> Vec<Post> {
        self.clone()
    }
}

/// The five demo posts, timestamped relative to the moment they are produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSeed;

impl SeedProvider for DefaultSeed {
    fn posts(&self) -> Vec<Post> {
        demo_posts(now())
    }
}

pub fn session_profile() -> Profile {
    profile(
        SESSION_USER_ID,
        "user",
        "User",
        "photo-1472099645785-5658abf4ff4e",
        "Just here for the timeline.",
        now(),
    )
}

/// Every profile referenced by the demo posts, session user first.
pub fn demo_profiles() -> Vec<Profile> {
    let at = now();
    vec![
        session_profile(),
        profile(
            "660e8400-e29b-41d4-a716-446655440001",
            "sakura",
            "Sakura",
            "photo-1494790108755-2616b612b786",
            "Designer.",
            at,
        ),
        profile(
            "770e8400-e29b-41d4-a716-446655440002",
            "taro",
            "Taro",
            "photo-1507003211169-0a1dd7228f2d",
            "Programming on weekends.",
            at,
        ),
        profile(
            "880e8400-e29b-41d4-a716-446655440003",
            "hanako",
            "Hanako",
            "photo-1438761681033-6461ffad8d80",
            "Frontend developer.",
            at,
        ),
        profile(
            "990e8400-e29b-41d4-a716-446655440004",
            "yuki",
            "Yuki",
            "photo-1500648767791-00dcc994a43e",
            "Collecting cafes.",
            at,
        ),
    ]
}

fn profile(
    id: &str,
    username: &str,
    display_name: &str,
    photo: &str,
    bio: &str,
    at: DateTime<Utc>,
) -> Profile {
    Profile {
        id: id.to_string(),
        username: username.to_string(),
        display_name: Some(display_name.to_string()),
        avatar_url: Some(format!(
            "https://images.unsplash.com/{}?w=150&h=150&fit=crop&crop=face",
            photo
        )),
        bio: Some(bio.to_string()),
        created_at: at,
        updated_at: at,
    }
}

fn demo_posts(at: DateTime<Utc>) -> Vec<Post> {
    let profiles = demo_profiles();
    let [me, sakura, taro, hanako, yuki] = [0, 1, 2, 3, 4].map(|i| profiles[i].clone());

    let post = |id: &str,
                content: &str,
                age_minutes: i64,
                likes: u32,
                reposts: u32,
                author: &Profile,
                comments: Vec<Comment>| {
        let created = at - Duration::minutes(age_minutes);
        Post {
            id: EntityId::remote(id),
            content: content.to_string(),
            created_at: created,
            updated_at: created,
            likes_count: likes,
            reposts_count: reposts,
            replies_count: comments.len() as u32,
            user_id: author.id.clone(),
            user: author.clone(),
            comments: Some(comments),
            is_liked: false,
        }
    };

    let comment = |post_id: &str, suffix: &str, content: &str, age_minutes: i64, author: &Profile| {
        let created = at - Duration::minutes(age_minutes);
        Comment {
            id: EntityId::remote(format!("{}_comment_1703123456789_{}", post_id, suffix)),
            content: content.to_string(),
            created_at: created,
            updated_at: created,
            user_id: author.id.clone(),
            post_id: EntityId::remote(post_id),
            user: author.clone(),
        }
    };

    vec![
        post(
            "1",
            "Hello! This is the very first post. The timeline is up and running.",
            0,
            5,
            2,
            &me,
            vec![
                comment("1", "abc123def", "Great first post!", 30, &sakura),
                comment("1", "xyz789ghi", "Same thought here!", 15, &taro),
            ],
        ),
        post(
            "2",
            "Second post. Try out likes, replies and reposts.",
            60,
            12,
            1,
            &sakura,
            vec![comment("2", "def456ghi", "Very helpful, thanks!", 45, &hanako)],
        ),
        post(
            "3",
            "Third post, a slightly longer one to check how wrapped text renders.\n\nIt has line breaks too.",
            120,
            8,
            0,
            &taro,
            vec![comment("3", "ghi789jkl", "The line breaks look clean!", 105, &me)],
        ),
        post(
            "4",
            "Learning a new stack this week. Typed queries and a small router go a long way.",
            180,
            15,
            3,
            &hanako,
            Vec::new(),
        ),
        post(
            "5",
            "Lovely weather today. Went for a walk and found a new cafe. Great coffee!",
            240,
            22,
            1,
            &yuki,
            Vec::new(),
        ),
    ]
}

/// Inserts the demo profiles and posts unless the database already holds posts.
pub async fn seed_database(pool: &SqlitePool, seed: &dyn SeedProvider) -> Result<(), sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        tracing::debug!("Database already holds {} posts, skipping seed", existing);
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    for profile in demo_profiles() {
        insert_profile(&mut tx, &profile).await?;
    }

    let posts = seed.posts();
    for post in &posts {
        insert_profile(&mut tx, &post.user).await?;
        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, content, likes_count, reposts_count, replies_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(post.id.as_str())
        .bind(&post.user_id)
        .bind(&post.content)
        .bind(i64::from(post.likes_count))
        .bind(i64::from(post.reposts_count))
        .bind(i64::from(post.replies_count))
        .bind(to_db_time(post.created_at))
        .bind(to_db_time(post.updated_at))
        .execute(&mut *tx)
        .await?;

        for comment in post.comments.iter().flatten() {
            insert_profile(&mut tx, &comment.user).await?;
            sqlx::query(
                r#"
                INSERT INTO comments (id, post_id, user_id, content, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(comment.id.as_str())
            .bind(post.id.as_str())
            .bind(&comment.user_id)
            .bind(&comment.content)
            .bind(to_db_time(comment.created_at))
            .bind(to_db_time(comment.updated_at))
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    tracing::info!("Seeded {} posts", posts.len());
    Ok(())
}

async fn insert_profile(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    profile: &Profile,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO profiles (id, username, display_name, avatar_url, bio, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.username)
    .bind(&profile.display_name)
    .bind(&profile.avatar_url)
    .bind(&profile.bio)
    .bind(to_db_time(profile.created_at))
    .bind(to_db_time(profile.updated_at))
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_posts_are_newest_first_with_consistent_reply_counts() {
        let posts = DefaultSeed.posts();
        assert_eq!(posts.len(), 5);
        assert!(posts.windows(2).all(|w| w[0].created_at > w[1].created_at));
        for post in &posts {
            let comments = post.comments.as_ref().unwrap();
            assert_eq!(post.replies_count as usize, comments.len());
            assert!(comments.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        }
    }
}
