mod account;
mod middleware;
mod public;
mod session;

pub use public::{HttpState, build_router};

use axum::http::StatusCode;

use crate::application::error::HttpError;
use crate::application::feed::FeedError;
use crate::application::follows::FollowError;
use crate::application::posts::PostCommandError;
use crate::application::repos::RepoError;

/// Map a repository error to a consistent HTTP error response.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::Duplicate { constraint } => {
            HttpError::new(source, StatusCode::CONFLICT, "Duplicate record", constraint)
        }
        RepoError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            "resource not found",
        ),
        RepoError::Integrity { message } => HttpError::new(
            source,
            StatusCode::CONFLICT,
            "Integrity constraint violated",
            message,
        ),
        RepoError::Persistence(message) => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Persistence error",
            message,
        ),
    }
}

pub fn feed_error_to_http(source: &'static str, err: FeedError) -> HttpError {
    match err {
        FeedError::Repo(repo) => repo_error_to_http(source, repo),
    }
}

pub fn post_error_to_http(source: &'static str, err: PostCommandError) -> HttpError {
    match err {
        PostCommandError::Domain(domain) => HttpError::from_error(
            source,
            StatusCode::BAD_REQUEST,
            "Request could not be processed",
            &domain,
        ),
        PostCommandError::Repo(repo) => repo_error_to_http(source, repo),
    }
}

pub fn follow_error_to_http(source: &'static str, err: FollowError) -> HttpError {
    match err {
        FollowError::UnknownAuthor { username } => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            format!("author `{username}` not found"),
        ),
        FollowError::Repo(repo) => repo_error_to_http(source, repo),
    }
}
