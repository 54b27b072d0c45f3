//! End-to-end behavior of the TTL page cache on the index route.

mod support;

use std::collections::HashSet;
use std::time::Duration;

use axum::http::StatusCode;
use time::OffsetDateTime;

use quill::cache::{CacheConfig, CachedRoute};

use support::{TestApp, body_text};

fn long_ttl_config() -> CacheConfig {
    CacheConfig {
        enabled: true,
        ttl: Duration::from_secs(60),
        routes: HashSet::from([CachedRoute::Index]),
    }
}

#[tokio::test]
async fn index_stays_stale_until_cleared() {
    let app = TestApp::with_cache(long_ttl_config());
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos
        .seed_post_at(&ada, None, "old news", OffsetDateTime::now_utc());

    // Prime the cache.
    let first = body_text(app.get("/").await).await;
    assert!(first.contains("old news"));

    app.repos
        .seed_post_at(&ada, None, "breaking news", OffsetDateTime::now_utc());

    // Within the TTL the write is invisible.
    let stale = body_text(app.get("/").await).await;
    assert!(!stale.contains("breaking news"));
    assert_eq!(stale, first);

    // An explicit clear makes the next read fresh.
    let cache = app.cache.as_ref().expect("cache is configured");
    cache.store.clear();
    let fresh = body_text(app.get("/").await).await;
    assert!(fresh.contains("breaking news"));
}

#[tokio::test]
async fn expired_entries_are_refreshed() {
    let config = CacheConfig {
        ttl: Duration::from_millis(30),
        ..long_ttl_config()
    };
    let app = TestApp::with_cache(config);
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos
        .seed_post_at(&ada, None, "first", OffsetDateTime::now_utc());

    let _ = app.get("/").await;
    app.repos
        .seed_post_at(&ada, None, "second", OffsetDateTime::now_utc());

    tokio::time::sleep(Duration::from_millis(60)).await;

    let body = body_text(app.get("/").await).await;
    assert!(body.contains("second"));
}

#[tokio::test]
async fn uncovered_routes_are_never_cached() {
    let app = TestApp::with_cache(long_ttl_config());
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos
        .seed_post_at(&ada, None, "profile one", OffsetDateTime::now_utc());

    let _ = app.get("/ada/").await;
    app.repos
        .seed_post_at(&ada, None, "profile two", OffsetDateTime::now_utc());

    // Profile is outside the default coverage, so the write shows at once.
    let body = body_text(app.get("/ada/").await).await;
    assert!(body.contains("profile two"));
}

#[tokio::test]
async fn query_string_variants_share_one_entry() {
    let app = TestApp::with_cache(long_ttl_config());
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos
        .seed_post_at(&ada, None, "only post", OffsetDateTime::now_utc());

    let plain = app.get("/").await;
    assert_eq!(plain.status(), StatusCode::OK);
    let plain = body_text(plain).await;

    // The key ignores the query string, so ?page=2 serves the cached body.
    let paged = body_text(app.get("/?page=2").await).await;
    assert_eq!(plain, paged);

    let cache = app.cache.as_ref().expect("cache is configured");
    assert_eq!(cache.store.len(), 1);
}

#[tokio::test]
async fn disabled_cache_serves_fresh_content() {
    let config = CacheConfig {
        enabled: false,
        ..long_ttl_config()
    };
    let app = TestApp::with_cache(config);
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos
        .seed_post_at(&ada, None, "one", OffsetDateTime::now_utc());

    let _ = app.get("/").await;
    app.repos
        .seed_post_at(&ada, None, "two", OffsetDateTime::now_utc());

    let body = body_text(app.get("/").await).await;
    assert!(body.contains("two"));
}
