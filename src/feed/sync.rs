use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    feed::{
        cache::{Freshness, PostCache},
        error::FeedError,
        source::{MAX_PAGE_SIZE, PostSource},
        store::KvStore,
    },
    models::{
        comment::Comment,
        id::EntityId,
        post::{Post, check_content},
        profile::Profile,
    },
    utils::time::now,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// What the user currently sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedState {
    pub posts: Vec<Post>,
    pub loading_state: LoadingState,
    pub error: Option<String>,
    pub cursor: Option<String>,
    pub has_more: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            loading_state: LoadingState::Idle,
            error: None,
            cursor: None,
            has_more: true,
        }
    }
}

/// Result of an optimistic like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: u32,
}

/// Keeps the in-memory feed, the local cache and the remote listing in step.
///
/// State lives behind a per-feed mutex. Mutations hold it across the state
/// change and the cache write that follows, so a reload always sees the
/// result of every completed mutation. Loads release it while waiting on the
/// remote source.
///
/// Every `load` and `clear` starts a new generation. A page that comes back
/// after a newer generation began is dropped without touching the state.
pub struct FeedSync {
    state: Mutex<FeedState>,
    generation: AtomicU64,
    cache: PostCache,
    source: Arc<dyn PostSource>,
    session: Profile,
    page_size: u32,
    freshness: Freshness,
}

impl FeedSync {
    pub fn new(source: Arc<dyn PostSource>, store: Arc<dyn KvStore>, session: Profile) -> Self {
        Self {
            state: Mutex::new(FeedState::default()),
            generation: AtomicU64::new(0),
            cache: PostCache::new(store),
            source,
            session,
            page_size: 20,
            freshness: Freshness::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = freshness;
        self
    }

    pub async fn snapshot(&self) -> FeedState {
        self.state.lock().await.clone()
    }

    /// Hydrates the feed, from the cache when it holds a fresh non-empty
    /// snapshot and `force_refresh` is false, otherwise from page 1 of the
    /// remote listing.
    pub async fn load(&self, force_refresh: bool) {
        let generation = {
            let mut state = self.state.lock().await;
            state.loading_state = LoadingState::Loading;
            state.error = None;
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let cached = self.cache.load().await;

        if !force_refresh {
            if let Some(cached) = &cached {
                if !cached.posts.is_empty()
                    && self.freshness.is_fresh(cached.saved_at, chrono::Utc::now())
                {
                    let mut state = self.state.lock().await;
                    if self.is_superseded(generation) {
                        return;
                    }
                    state.posts = cached.posts.clone();
                    state.has_more = false;
                    state.cursor = None;
                    state.loading_state = LoadingState::Success;
                    tracing::debug!("Hydrated {} posts from cache", state.posts.len());
                    return;
                }
            }
        }

        let result = self.source.list_posts(None, self.page_size).await;
        let mut state = self.state.lock().await;
        if self.is_superseded(generation) {
            tracing::debug!("Dropping page 1 of a superseded load");
            return;
        }

        match result {
            Ok(page) => {
                state.posts = page.posts;
                state.cursor = page.next_cursor;
                state.has_more = page.has_more;
                state.loading_state = LoadingState::Success;
                self.cache.save(&state.posts).await;
                tracing::debug!(
                    "Loaded {} posts from remote (has_more={})",
                    state.posts.len(),
                    state.has_more
                );
            }
            Err(err) => {
                tracing::warn!("Feed load failed: {}", err);
                if state.posts.is_empty() {
                    if let Some(stale) = cached.filter(|c| !c.posts.is_empty()) {
                        tracing::info!("Showing {} stale cached posts", stale.posts.len());
                        state.posts = stale.posts;
                        state.has_more = false;
                        state.cursor = None;
                    }
                }
                state.loading_state = LoadingState::Error;
                state.error = Some(err.to_string());
            }
        }
    }

    pub async fn refresh(&self) {
        self.load(true).await;
    }

    /// Appends the next page. Does nothing while a load is in flight, when
    /// the listing is exhausted, or before a page with a cursor was loaded.
    pub async fn load_more(&self) {
        let (cursor, generation) = {
            let mut state = self.state.lock().await;
            if !state.has_more || state.loading_state == LoadingState::Loading {
                return;
            }
            let Some(cursor) = state.cursor.clone() else {
                return;
            };
            state.loading_state = LoadingState::Loading;
            state.error = None;
            (cursor, self.generation.load(Ordering::SeqCst))
        };

        let result = self.source.list_posts(Some(&cursor), self.page_size).await;
        let mut state = self.state.lock().await;
        if self.is_superseded(generation) {
            tracing::debug!("Dropping page after {} from a superseded listing", cursor);
            return;
        }

        match result {
            Ok(page) => {
                state.posts.extend(page.posts);
                state.cursor = page.next_cursor;
                state.has_more = page.has_more;
                state.loading_state = LoadingState::Success;
                self.cache.save(&state.posts).await;
            }
            Err(err) => {
                tracing::warn!("Loading more posts failed: {}", err);
                state.loading_state = LoadingState::Error;
                state.error = Some(err.to_string());
            }
        }
    }

    /// Prepends a locally created post authored by the session user.
    pub async fn add_post(&self, content: &str) -> Result<Post, FeedError> {
        let content = check_content(content).map_err(FeedError::Validation)?;
        let at = now();
        let post = Post {
            id: EntityId::new_local_post(at.timestamp_millis()),
            content: content.to_string(),
            created_at: at,
            updated_at: at,
            likes_count: 0,
            reposts_count: 0,
            replies_count: 0,
            user_id: self.session.id.clone(),
            user: self.session.clone(),
            comments: Some(Vec::new()),
            is_liked: false,
        };

        let mut state = self.state.lock().await;
        state.posts.insert(0, post.clone());
        self.cache.save(&state.posts).await;
        Ok(post)
    }

    /// Flips the session user's like on a post. `None` when the post is not
    /// loaded.
    pub async fn toggle_like(&self, post_id: &EntityId) -> Option<LikeToggle> {
        let mut state = self.state.lock().await;
        let post = state.posts.iter_mut().find(|p| &p.id == post_id)?;

        post.is_liked = !post.is_liked;
        post.likes_count = if post.is_liked {
            post.likes_count.saturating_add(1)
        } else {
            post.likes_count.saturating_sub(1)
        };
        let toggle = LikeToggle {
            liked: post.is_liked,
            likes_count: post.likes_count,
        };

        self.cache.save(&state.posts).await;
        Some(toggle)
    }

    /// Appends a reply by the session user. `Ok(None)` when the post is not
    /// loaded; nothing changes in that case.
    pub async fn add_reply(
        &self,
        post_id: &EntityId,
        content: &str,
    ) -> Result<Option<Comment>, FeedError> {
        let content = check_content(content).map_err(FeedError::Validation)?;

        let mut state = self.state.lock().await;
        let Some(post) = state.posts.iter_mut().find(|p| &p.id == post_id) else {
            tracing::debug!("Reply to unknown post {} dropped", post_id);
            return Ok(None);
        };

        let at = now();
        let comment = Comment {
            id: EntityId::new_local_comment(post_id, at.timestamp_millis()),
            content: content.to_string(),
            created_at: at,
            updated_at: at,
            user_id: self.session.id.clone(),
            post_id: post_id.clone(),
            user: self.session.clone(),
        };
        post.comments
            .get_or_insert_with(Vec::new)
            .push(comment.clone());
        post.replies_count = post.replies_count.saturating_add(1);

        self.cache.save(&state.posts).await;
        Ok(Some(comment))
    }

    /// Drops the cached snapshot and returns to the initial state.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.clear().await;
        *state = FeedState::default();
    }

    /// Must be called with the state lock held.
    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::atomic::AtomicUsize, time::Duration};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::{
        feed::{
            cache::POSTS_KEY,
            source::SeedListing,
            store::MemoryStore,
        },
        models::post::PostPage,
        seed::{DefaultSeed, SeedProvider, session_profile},
    };

    /// Wraps a source and counts how often it is asked for a page.
    struct Counting<S> {
        inner: S,
        calls: AtomicUsize,
    }

    impl<S> Counting<S> {
        fn new(inner: S) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<S: PostSource> PostSource for Counting<S> {
        async fn list_posts(
            &self,
            cursor: Option<&str>,
            limit: u32,
        ) -> Result<PostPage, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_posts(cursor, limit).await
        }
    }

    struct Unreachable;

    #[async_trait]
    impl PostSource for Unreachable {
        async fn list_posts(&self, _: Option<&str>, _: u32) -> Result<PostPage, FeedError> {
            Err(FeedError::Remote("connection refused".to_string()))
        }
    }

    /// Blocks every request until released.
    struct Gated {
        inner: SeedListing,
        gate: Notify,
    }

    #[async_trait]
    impl PostSource for Gated {
        async fn list_posts(
            &self,
            cursor: Option<&str>,
            limit: u32,
        ) -> Result<PostPage, FeedError> {
            self.gate.notified().await;
            self.inner.list_posts(cursor, limit).await
        }
    }

    /// Holds first-page and follow-up requests behind separate gates.
    struct SplitGate {
        inner: SeedListing,
        first_page: Notify,
        next_page: Notify,
    }

    #[async_trait]
    impl PostSource for SplitGate {
        async fn list_posts(
            &self,
            cursor: Option<&str>,
            limit: u32,
        ) -> Result<PostPage, FeedError> {
            match cursor {
                None => self.first_page.notified().await,
                Some(_) => self.next_page.notified().await,
            }
            self.inner.list_posts(cursor, limit).await
        }
    }

    fn many(count: usize) -> Vec<Post> {
        let template = DefaultSeed.posts().remove(3);
        (0..count)
            .map(|i| {
                let mut post = template.clone();
                post.id = EntityId::remote(format!("n{}", i));
                post.created_at = template.created_at - chrono::Duration::minutes(i as i64);
                post
            })
            .collect()
    }

    fn feed_over(source: Arc<dyn PostSource>, store: Arc<MemoryStore>) -> FeedSync {
        FeedSync::new(source, store, session_profile())
    }

    fn ids(state: &FeedState) -> Vec<String> {
        state.posts.iter().map(|p| p.id.to_string()).collect()
    }

    #[tokio::test]
    async fn fresh_session_end_to_end() {
        let store = Arc::new(MemoryStore::new());
        let feed = feed_over(Arc::new(SeedListing::new(&DefaultSeed)), store);

        assert_eq!(feed.snapshot().await.loading_state, LoadingState::Idle);
        feed.load(false).await;

        let state = feed.snapshot().await;
        assert_eq!(state.loading_state, LoadingState::Success);
        assert_eq!(ids(&state), ["1", "2", "3", "4", "5"]);
        assert!(state.posts.windows(2).all(|w| w[0].created_at > w[1].created_at));
        assert!(!state.has_more);

        let three = EntityId::remote("3");
        let before = state.posts[2].clone();
        let reply = feed.add_reply(&three, "hello").await.unwrap().unwrap();
        assert!(reply.id.is_local());
        assert!(reply.id.as_str().starts_with("3_comment_"));

        let after = feed.snapshot().await.posts[2].clone();
        assert_eq!(after.replies_count, before.replies_count + 1);
        let comments = after.comments.unwrap();
        assert_eq!(comments.len(), before.comments.unwrap().len() + 1);
        assert_eq!(comments.last().unwrap().content, "hello");
    }

    #[tokio::test]
    async fn cache_hit_skips_the_remote() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(Counting::new(SeedListing::new(&DefaultSeed)));

        feed_over(source.clone(), store.clone()).load(false).await;
        assert_eq!(source.calls(), 1);

        let reopened = feed_over(source.clone(), store.clone());
        reopened.load(false).await;
        assert_eq!(source.calls(), 1);

        let state = reopened.snapshot().await;
        assert_eq!(state.posts.len(), 5);
        assert!(!state.has_more);
        assert!(state.cursor.is_none());

        reopened.refresh().await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn expired_snapshot_is_refetched() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(Counting::new(SeedListing::new(&DefaultSeed)));
        let ttl = Freshness::Ttl(Duration::from_secs(300));

        feed_over(source.clone(), store.clone())
            .with_freshness(ttl)
            .load(false)
            .await;
        feed_over(source.clone(), store.clone())
            .with_freshness(ttl)
            .load(false)
            .await;
        assert_eq!(source.calls(), 1);

        feed_over(source.clone(), store.clone())
            .with_freshness(Freshness::Ttl(Duration::ZERO))
            .load(false)
            .await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn empty_cached_list_counts_as_miss() {
        let store = Arc::new(MemoryStore::new());
        store.set(POSTS_KEY, b"[]".to_vec()).await.unwrap();
        let source = Arc::new(Counting::new(SeedListing::new(&DefaultSeed)));

        feed_over(source.clone(), store).load(false).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn corrupt_cache_falls_back_to_remote() {
        let store = Arc::new(MemoryStore::new());
        store.set(POSTS_KEY, b"\x00garbage".to_vec()).await.unwrap();
        let feed = feed_over(Arc::new(SeedListing::new(&DefaultSeed)), store);

        feed.load(false).await;
        let state = feed.snapshot().await;
        assert_eq!(state.loading_state, LoadingState::Success);
        assert_eq!(state.posts.len(), 5);
    }

    #[tokio::test]
    async fn remote_failure_sets_error_and_keeps_posts() {
        let store = Arc::new(MemoryStore::new());
        let feed = feed_over(Arc::new(Unreachable), store.clone());

        feed.load(false).await;
        let state = feed.snapshot().await;
        assert_eq!(state.loading_state, LoadingState::Error);
        assert!(state.error.as_deref().unwrap().contains("connection refused"));
        assert!(state.posts.is_empty());

        feed.add_post("still here").await.unwrap();
        feed.refresh().await;
        let state = feed.snapshot().await;
        assert_eq!(state.loading_state, LoadingState::Error);
        assert_eq!(state.posts.len(), 1);
    }

    #[tokio::test]
    async fn stale_cache_is_used_when_remote_fails() {
        let store = Arc::new(MemoryStore::new());
        feed_over(Arc::new(SeedListing::new(&DefaultSeed)), store.clone())
            .load(false)
            .await;

        let feed = feed_over(Arc::new(Unreachable), store)
            .with_freshness(Freshness::Ttl(Duration::ZERO));
        feed.load(false).await;

        let state = feed.snapshot().await;
        assert_eq!(state.loading_state, LoadingState::Error);
        assert_eq!(state.posts.len(), 5);
        assert!(!state.has_more);
    }

    #[tokio::test]
    async fn load_more_appends_older_pages() {
        let store = Arc::new(MemoryStore::new());
        let feed = feed_over(Arc::new(SeedListing::new(&many(25))), store.clone());

        feed.load(false).await;
        let state = feed.snapshot().await;
        assert_eq!(state.posts.len(), 20);
        assert!(state.has_more);
        assert_eq!(state.cursor.as_deref(), Some("n19"));

        feed.load_more().await;
        let state = feed.snapshot().await;
        assert_eq!(state.posts.len(), 25);
        assert_eq!(state.posts[20].id.to_string(), "n20");
        assert!(!state.has_more);
        assert!(state.cursor.is_none());

        let cached: Vec<Post> =
            serde_json::from_slice(&store.get(POSTS_KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(cached.len(), 25);

        // Exhausted: another call is a no-op.
        feed.load_more().await;
        assert_eq!(feed.snapshot().await.posts.len(), 25);
    }

    #[tokio::test]
    async fn load_more_before_load_does_nothing() {
        let source = Arc::new(Counting::new(SeedListing::new(&many(25))));
        let feed = feed_over(source.clone(), Arc::new(MemoryStore::new()));

        feed.load_more().await;
        assert_eq!(source.calls(), 0);
        assert_eq!(feed.snapshot().await.loading_state, LoadingState::Idle);
    }

    #[tokio::test]
    async fn load_more_is_not_reentrant() {
        let source = Arc::new(Gated {
            inner: SeedListing::new(&many(60)),
            gate: Notify::new(),
        });
        let feed = Arc::new(feed_over(source.clone(), Arc::new(MemoryStore::new())));

        source.gate.notify_one();
        feed.load(false).await;
        assert_eq!(feed.snapshot().await.posts.len(), 20);

        let first = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load_more().await }
        });
        while feed.snapshot().await.loading_state != LoadingState::Loading {
            tokio::task::yield_now().await;
        }

        // Returns immediately: a page is already in flight.
        feed.load_more().await;

        source.gate.notify_one();
        first.await.unwrap();
        assert_eq!(feed.snapshot().await.posts.len(), 40);
    }

    #[tokio::test]
    async fn refresh_discards_pages_from_the_previous_listing() {
        let source = Arc::new(SplitGate {
            inner: SeedListing::new(&many(60)),
            first_page: Notify::new(),
            next_page: Notify::new(),
        });
        let feed = Arc::new(feed_over(source.clone(), Arc::new(MemoryStore::new())));

        source.first_page.notify_one();
        feed.load(false).await;
        assert_eq!(feed.snapshot().await.posts.len(), 20);

        let more = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load_more().await }
        });
        while feed.snapshot().await.loading_state != LoadingState::Loading {
            tokio::task::yield_now().await;
        }

        let refresh = tokio::spawn({
            let feed = feed.clone();
            async move { feed.refresh().await }
        });
        while feed.generation.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        // The older page lands while the refresh is still waiting.
        source.next_page.notify_one();
        more.await.unwrap();
        let state = feed.snapshot().await;
        assert_eq!(state.loading_state, LoadingState::Loading);
        assert_eq!(state.posts.len(), 20);

        // Still in flight, so this returns without a request.
        feed.load_more().await;

        source.first_page.notify_one();
        refresh.await.unwrap();
        let state = feed.snapshot().await;
        assert_eq!(state.loading_state, LoadingState::Success);
        assert_eq!(state.cursor.as_deref(), Some("n19"));

        source.next_page.notify_one();
        feed.load_more().await;
        let state = feed.snapshot().await;
        let expected: Vec<String> = (0..40).map(|i| format!("n{}", i)).collect();
        assert_eq!(ids(&state), expected);
        assert!(state.has_more);
    }

    #[tokio::test]
    async fn add_post_prepends_with_zero_counters() {
        let store = Arc::new(MemoryStore::new());
        let feed = feed_over(Arc::new(SeedListing::new(&DefaultSeed)), store.clone());
        feed.load(false).await;

        let post = feed.add_post("  fresh thoughts  ").await.unwrap();
        let state = feed.snapshot().await;
        assert_eq!(state.posts.len(), 6);
        assert_eq!(state.posts[0], post);
        assert!(post.id.is_local());
        assert_eq!(post.content, "fresh thoughts");
        assert_eq!(
            (post.likes_count, post.reposts_count, post.replies_count),
            (0, 0, 0)
        );
        assert_eq!(post.user_id, session_profile().id);

        let reopened = feed_over(Arc::new(Unreachable), store);
        reopened.load(false).await;
        assert_eq!(reopened.snapshot().await.posts[0], post);
    }

    #[tokio::test]
    async fn add_post_rejects_invalid_content() {
        let store = Arc::new(MemoryStore::new());
        let feed = feed_over(Arc::new(SeedListing::new(&DefaultSeed)), store.clone());
        feed.load(false).await;

        for bad in [String::new(), "   ".to_string(), "x".repeat(281)] {
            let err = feed.add_post(&bad).await.unwrap_err();
            assert!(matches!(err, FeedError::Validation(_)));
        }
        assert_eq!(feed.snapshot().await.posts.len(), 5);

        assert!(feed.add_post(&"あ".repeat(280)).await.is_ok());
    }

    #[tokio::test]
    async fn toggle_like_twice_is_identity() {
        let feed = feed_over(
            Arc::new(SeedListing::new(&DefaultSeed)),
            Arc::new(MemoryStore::new()),
        );
        feed.load(false).await;
        let id = EntityId::remote("2");
        let original = feed.snapshot().await.posts[1].clone();

        let liked = feed.toggle_like(&id).await.unwrap();
        assert!(liked.liked);
        assert_eq!(liked.likes_count, original.likes_count + 1);

        let unliked = feed.toggle_like(&id).await.unwrap();
        assert!(!unliked.liked);
        assert_eq!(unliked.likes_count, original.likes_count);
        assert_eq!(feed.snapshot().await.posts[1], original);
    }

    #[tokio::test]
    async fn likes_never_go_negative() {
        let mut post = DefaultSeed.posts().remove(0);
        post.likes_count = 0;
        post.is_liked = true;
        let feed = feed_over(
            Arc::new(SeedListing::new(&vec![post.clone()])),
            Arc::new(MemoryStore::new()),
        );
        feed.load(false).await;

        let toggle = feed.toggle_like(&post.id).await.unwrap();
        assert!(!toggle.liked);
        assert_eq!(toggle.likes_count, 0);
    }

    #[tokio::test]
    async fn like_state_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        let feed = feed_over(Arc::new(SeedListing::new(&DefaultSeed)), store.clone());
        feed.load(false).await;
        feed.toggle_like(&EntityId::remote("4")).await.unwrap();

        let reopened = feed_over(Arc::new(Unreachable), store);
        reopened.load(false).await;
        let post = reopened.snapshot().await.posts[3].clone();
        assert!(post.is_liked);
        assert_eq!(post.likes_count, 16);
    }

    #[tokio::test]
    async fn unknown_post_mutations_change_nothing() {
        let store = Arc::new(MemoryStore::new());
        let feed = feed_over(Arc::new(SeedListing::new(&DefaultSeed)), store.clone());
        feed.load(false).await;
        let before = feed.snapshot().await;
        let cached_before = store.get(POSTS_KEY).await.unwrap();

        let missing = EntityId::remote("404");
        assert!(feed.toggle_like(&missing).await.is_none());
        assert!(feed.add_reply(&missing, "hello").await.unwrap().is_none());

        assert_eq!(feed.snapshot().await, before);
        assert_eq!(store.get(POSTS_KEY).await.unwrap(), cached_before);
    }

    #[tokio::test]
    async fn reply_validation_precedes_lookup() {
        let feed = feed_over(
            Arc::new(SeedListing::new(&DefaultSeed)),
            Arc::new(MemoryStore::new()),
        );
        feed.load(false).await;

        let err = feed
            .add_reply(&EntityId::remote("404"), "")
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Validation(_)));
    }

    #[tokio::test]
    async fn replies_to_local_posts_get_unique_ids() {
        let feed = feed_over(
            Arc::new(SeedListing::new(&DefaultSeed)),
            Arc::new(MemoryStore::new()),
        );
        feed.load(false).await;
        let post = feed.add_post("mine").await.unwrap();

        let a = feed.add_reply(&post.id, "one").await.unwrap().unwrap();
        let b = feed.add_reply(&post.id, "two").await.unwrap().unwrap();
        assert_ne!(a.id, b.id);

        let state = feed.snapshot().await;
        assert_eq!(state.posts[0].replies_count, 2);
        assert_eq!(state.posts[0].comments.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn clear_resets_state_and_cache() {
        let store = Arc::new(MemoryStore::new());
        let feed = feed_over(Arc::new(SeedListing::new(&DefaultSeed)), store.clone());
        feed.load(false).await;

        feed.clear().await;
        assert_eq!(feed.snapshot().await, FeedState::default());
        assert!(store.get(POSTS_KEY).await.unwrap().is_none());
    }
}
