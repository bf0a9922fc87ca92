//! Where the feed gets pages of posts from.

use async_trait::async_trait;
use url::Url;

use crate::{
    feed::error::FeedError,
    models::{
        post::{Post, PostPage},
        response::ApiResponse,
    },
    seed::SeedProvider,
};

/// Largest page a listing returns, whatever the caller asks for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A cursor-paginated, newest-first listing of posts.
///
/// The cursor is opaque to callers: pass back the `next_cursor` of the
/// previous page verbatim.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn list_posts(&self, cursor: Option<&str>, limit: u32) -> Result<PostPage, FeedError>;
}

/// Serves a fixed set of posts from memory with the service's paging rules.
#[derive(Debug, Clone)]
pub struct SeedListing {
    posts: Vec<Post>,
}

impl SeedListing {
    pub fn new(seed: &dyn SeedProvider) -> Self {
        let mut posts = seed.posts();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { posts }
    }
}

#[async_trait]
impl PostSource for SeedListing {
    async fn list_posts(&self, cursor: Option<&str>, limit: u32) -> Result<PostPage, FeedError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE) as usize;

        let start = match cursor {
            None => 0,
            Some(cursor) => self
                .posts
                .iter()
                .position(|p| p.id.to_string() == cursor)
                .map(|i| i + 1)
                .ok_or_else(|| FeedError::Remote(format!("unknown cursor {}", cursor)))?,
        };

        // One extra row tells whether another page follows.
        let mut posts: Vec<Post> = self.posts[start..].iter().take(limit + 1).cloned().collect();
        let has_more = posts.len() > limit;
        posts.truncate(limit);
        let next_cursor = if has_more {
            posts.last().map(|p| p.id.to_string())
        } else {
            None
        };

        Ok(PostPage {
            posts,
            has_more,
            next_cursor,
        })
    }
}

/// Reads pages from the HTTP service's `GET /api/posts`.
#[derive(Debug, Clone)]
pub struct HttpListing {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpListing {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PostSource for HttpListing {
    async fn list_posts(&self, cursor: Option<&str>, limit: u32) -> Result<PostPage, FeedError> {
        let mut url = self
            .base_url
            .join("api/posts")
            .map_err(|e| FeedError::Remote(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &limit.clamp(1, MAX_PAGE_SIZE).to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }

        tracing::debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body: ApiResponse<PostPage> = response.json().await?;

        if !status.is_success() {
            return Err(FeedError::Remote(
                body.error.unwrap_or_else(|| status.to_string()),
            ));
        }

        body.data
            .ok_or_else(|| FeedError::Decode("response carried no data".to_string()))
    }
}
