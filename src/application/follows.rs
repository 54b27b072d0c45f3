//! Follow/unfollow commands.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::repos::{FollowsWriteRepo, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("author `{username}` not found")]
    UnknownAuthor { username: String },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct FollowService {
    users: Arc<dyn UsersRepo>,
    follows_write: Arc<dyn FollowsWriteRepo>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UsersRepo>, follows_write: Arc<dyn FollowsWriteRepo>) -> Self {
        Self {
            users,
            follows_write,
        }
    }

    /// Create the actor → author edge. Idempotent; a self-follow is silently
    /// ignored rather than rejected.
    pub async fn follow(&self, actor: &UserRecord, username: &str) -> Result<(), FollowError> {
        let author = self.lookup(username).await?;
        if author.id == actor.id {
            debug!(
                target = "quill::follows",
                user = %actor.username,
                "ignoring self-follow"
            );
            return Ok(());
        }
        let created = self.follows_write.create_follow(actor.id, author.id).await;
        match created {
            Ok(_) => Ok(()),
            // The unique constraint may fire under concurrent requests;
            // the edge exists either way.
            Err(RepoError::Duplicate { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete the actor → author edge. No-op when the edge is absent.
    pub async fn unfollow(&self, actor: &UserRecord, username: &str) -> Result<(), FollowError> {
        let author = self.lookup(username).await?;
        self.follows_write.delete_follow(actor.id, author.id).await?;
        Ok(())
    }

    async fn lookup(&self, username: &str) -> Result<UserRecord, FollowError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| FollowError::UnknownAuthor {
                username: username.to_string(),
            })
    }
}
