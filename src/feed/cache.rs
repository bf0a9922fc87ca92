//! Typed view of the post list stored in a [`KvStore`].

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
    feed::store::{CacheError, KvStore},
    models::post::Post,
};

/// Key holding the JSON array of posts.
pub const POSTS_KEY: &str = "sns-posts";
/// Key holding the RFC 3339 time of the last write to [`POSTS_KEY`].
pub const SAVED_AT_KEY: &str = "sns-posts.saved-at";

/// How long a cached snapshot may stand in for a remote fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Any cached snapshot is good enough, no matter its age.
    #[default]
    Forever,
    /// Snapshots older than this, or of unknown age, are stale.
    Ttl(Duration),
}

impl Freshness {
    pub fn is_fresh(&self, saved_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match self {
            Freshness::Forever => true,
            Freshness::Ttl(ttl) => match (saved_at, chrono::Duration::from_std(*ttl)) {
                (Some(saved_at), Ok(ttl)) => now.signed_duration_since(saved_at) < ttl,
                (Some(_), Err(_)) => true,
                (None, _) => false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedPosts {
    pub posts: Vec<Post>,
    pub saved_at: Option<DateTime<Utc>>,
}

/// Reads and writes the feed snapshot.
///
/// Failures are logged and swallowed: an unreadable or malformed entry reads
/// as a miss, and a failed write leaves the previous snapshot in place.
#[derive(Clone)]
pub struct PostCache {
    store: Arc<dyn KvStore>,
}

impl PostCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Option<CachedPosts> {
        match self.try_load().await {
            Ok(cached) => cached,
            Err(err) => {
                tracing::warn!("Ignoring unusable feed cache: {}", err);
                None
            }
        }
    }

    pub async fn save(&self, posts: &[Post]) {
        if let Err(err) = self.try_save(posts).await {
            tracing::warn!("Failed to persist feed cache: {}", err);
        }
    }

    pub async fn clear(&self) {
        for key in [POSTS_KEY, SAVED_AT_KEY] {
            if let Err(err) = self.store.remove(key).await {
                tracing::warn!("Failed to clear cache key {}: {}", key, err);
            }
        }
    }

    async fn try_load(&self) -> Result<Option<CachedPosts>, CacheError> {
        let Some(bytes) = self.store.get(POSTS_KEY).await? else {
            return Ok(None);
        };
        let posts: Vec<Post> = serde_json::from_slice(&bytes)?;

        // A missing or garbled timestamp only makes the snapshot's age unknown.
        let saved_at = match self.store.get(SAVED_AT_KEY).await {
            Ok(Some(raw)) => std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
                .map(|at| at.with_timezone(&Utc)),
            Ok(None) => None,
            Err(err) => {
                tracing::debug!("Cache timestamp unreadable: {}", err);
                None
            }
        };

        Ok(Some(CachedPosts { posts, saved_at }))
    }

    async fn try_save(&self, posts: &[Post]) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(posts)?;
        self.store.set(POSTS_KEY, bytes).await?;
        self.store
            .set(SAVED_AT_KEY, Utc::now().to_rfc3339().into_bytes())
            .await?;
        tracing::trace!("Persisted {} posts to the feed cache", posts.len());
        Ok(())
    }
}
