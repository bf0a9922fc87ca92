// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{interaction, posts, profile},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (posts, profiles).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
pub fn create_router(state: AppState) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    match HeaderValue::from_str(&state.config.allowed_origin()) {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => tracing::warn!("CORS disabled, base URL is not a valid origin: {}", e),
    }

    let post_routes = Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route("/{id}", get(posts::get_post))
        .route(
            "/{id}/like",
            get(interaction::like_status).post(interaction::toggle_like),
        )
        .route(
            "/{id}/comments",
            get(interaction::list_comments).post(interaction::create_comment),
        );

    let profile_routes = Router::new().route("/{username}", get(profile::get_profile));

    Router::new()
        .nest("/api/posts", post_routes)
        .nest("/api/profiles", profile_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use sqlx::sqlite::SqlitePoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    async fn app() -> Router {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            rust_log: "error".to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            base_url: "http://localhost:3000".parse().unwrap(),
            seed_data: false,
            log_dir: "logs".to_string(),
        };
        create_router(AppState { pool, config })
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let response = app()
            .await
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_listing_has_no_more() {
        let response = app()
            .await
            .oneshot(Request::get("/api/posts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["posts"], serde_json::json!([]));
        assert_eq!(json["data"]["hasMore"], false);
        assert!(json["data"]["nextCursor"].is_null());
    }
}
