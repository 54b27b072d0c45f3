//! Error page rendering when the storage layer fails.

mod support;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use uuid::Uuid;

use quill::{
    application::{
        feed::FeedService,
        follows::FollowService,
        pagination::PageWindow,
        posts::PostService,
        repos::{FeedScope, PostsRepo, RepoError},
    },
    domain::entities::PostRecord,
    infra::{
        http::{HttpState, build_router},
        memory::MemoryRepositories,
    },
};

use support::body_text;

/// A posts repository whose every read fails, as a lost database would.
struct BrokenPosts;

#[async_trait]
impl PostsRepo for BrokenPosts {
    async fn list_posts(
        &self,
        _scope: FeedScope,
        _window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        Err(RepoError::from_persistence("connection reset"))
    }

    async fn count_posts(&self, _scope: FeedScope) -> Result<u64, RepoError> {
        Err(RepoError::from_persistence("connection reset"))
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Err(RepoError::from_persistence("connection reset"))
    }
}

fn broken_router() -> axum::Router {
    let repos = Arc::new(MemoryRepositories::new());
    let feed = Arc::new(FeedService::new(
        Arc::new(BrokenPosts),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        10,
    ));
    let posts = Arc::new(PostService::new(
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
    ));
    let follows = Arc::new(FollowService::new(repos.clone(), repos.clone()));
    build_router(HttpState {
        feed,
        posts,
        follows,
        sessions: repos,
        cache: None,
        session_cookie: "session".to_string(),
    })
}

#[tokio::test]
async fn repository_failure_renders_the_error_page() {
    let response = broken_router()
        .oneshot(
            Request::builder()
                .uri("/")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router handles request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(body.contains("Something went wrong"));
    assert!(body.contains("Back to home"));
    // The cause never reaches the viewer.
    assert!(!body.contains("connection reset"));
}
