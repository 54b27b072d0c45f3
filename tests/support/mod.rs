//! Shared harness: a router over in-memory repositories plus request helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use quill::{
    application::{feed::FeedService, follows::FollowService, posts::PostService},
    cache::{CacheConfig, CacheState},
    infra::{
        http::{HttpState, build_router},
        memory::MemoryRepositories,
    },
};

pub const SESSION_COOKIE: &str = "session";
pub const PAGE_SIZE: u32 = 10;

pub struct TestApp {
    pub repos: Arc<MemoryRepositories>,
    pub cache: Option<CacheState>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_cache(config: CacheConfig) -> Self {
        Self::build(Some(CacheState::new(config)))
    }

    fn build(cache: Option<CacheState>) -> Self {
        let repos = Arc::new(MemoryRepositories::new());

        let feed = Arc::new(FeedService::new(
            repos.clone(),
            repos.clone(),
            repos.clone(),
            repos.clone(),
            repos.clone(),
            PAGE_SIZE,
        ));
        let posts = Arc::new(PostService::new(
            repos.clone(),
            repos.clone(),
            repos.clone(),
            repos.clone(),
        ));
        let follows = Arc::new(FollowService::new(repos.clone(), repos.clone()));

        let state = HttpState {
            feed,
            posts,
            follows,
            sessions: repos.clone(),
            cache: cache.clone(),
            session_cookie: SESSION_COOKIE.to_string(),
        };

        Self {
            repos,
            cache,
            router: build_router(state),
        }
    }

    pub async fn get(&self, path: &str) -> Response<Body> {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn get_as(&self, path: &str, token: &str) -> Response<Body> {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn post_form(&self, path: &str, token: &str, body: &str) -> Response<Body> {
        self.request(Method::POST, path, Some(token), Some(body))
            .await
    }

    pub async fn post_form_anonymous(&self, path: &str, body: &str) -> Response<Body> {
        self.request(Method::POST, path, None, Some(body)).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={token}"));
        }
        let request = if let Some(body) = body {
            builder
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from(body.to_string()))
                .expect("request builds")
        } else {
            builder.body(Body::empty()).expect("request builds")
        };
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router handles request")
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is utf-8")
}

pub fn location_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub fn assert_redirects_to_login(response: &Response<Body>, next: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = location_header(response).expect("redirect has a location");
    assert!(
        location.starts_with("/auth/login/?next="),
        "unexpected redirect target: {location}"
    );
    let encoded: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    assert_eq!(location, format!("/auth/login/?{encoded}"));
}
