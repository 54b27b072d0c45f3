//! Write side for posts and comments.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::{
    CommentsWriteRepo, CreateCommentParams, CreatePostParams, GroupsRepo, PostsRepo,
    PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::posts::{PostInput, validate_comment_text};

#[derive(Debug, Error)]
pub enum PostCommandError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Result of an edit attempt by an authenticated viewer.
#[derive(Debug)]
pub enum EditOutcome {
    Updated(PostRecord),
    /// The viewer is not the author; the post is untouched.
    NotAuthor,
    /// No post with this id exists under this author.
    NotFound,
}

pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    posts_write: Arc<dyn PostsWriteRepo>,
    comments_write: Arc<dyn CommentsWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        posts_write: Arc<dyn PostsWriteRepo>,
        comments_write: Arc<dyn CommentsWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
    ) -> Self {
        Self {
            posts,
            posts_write,
            comments_write,
            groups,
        }
    }

    /// Groups offered in the post form's selector.
    pub async fn group_choices(&self) -> Result<Vec<GroupRecord>, PostCommandError> {
        Ok(self.groups.list_all().await?)
    }

    /// Create a post on behalf of `author`. Validation failures leave the
    /// store untouched.
    pub async fn create_post(
        &self,
        author: &UserRecord,
        input: PostInput,
    ) -> Result<PostRecord, PostCommandError> {
        let input = input.validate()?;
        self.check_group(input.group_id).await?;
        let record = self
            .posts_write
            .create_post(CreatePostParams {
                author_id: author.id,
                text: input.text,
                group_id: input.group_id,
                image: input.image,
            })
            .await?;
        Ok(record)
    }

    /// Edit a post; only its author may change it. The id, author, and
    /// publication timestamp never change.
    pub async fn edit_post(
        &self,
        actor: &UserRecord,
        author_username: &str,
        post_id: Uuid,
        input: PostInput,
    ) -> Result<EditOutcome, PostCommandError> {
        let Some(post) = self.find_authored(author_username, post_id).await? else {
            return Ok(EditOutcome::NotFound);
        };
        if post.author_id != actor.id {
            return Ok(EditOutcome::NotAuthor);
        }
        let input = input.validate()?;
        self.check_group(input.group_id).await?;
        let updated = self
            .posts_write
            .update_post(UpdatePostParams {
                id: post.id,
                text: input.text,
                group_id: input.group_id,
                image: input.image,
            })
            .await?;
        Ok(EditOutcome::Updated(updated))
    }

    /// Add a comment to the post at `/{author_username}/{post_id}/`.
    /// Returns `Ok(None)` when the post does not exist under that author.
    pub async fn add_comment(
        &self,
        actor: &UserRecord,
        author_username: &str,
        post_id: Uuid,
        text: &str,
    ) -> Result<Option<CommentRecord>, PostCommandError> {
        let Some(post) = self.find_authored(author_username, post_id).await? else {
            return Ok(None);
        };
        let text = validate_comment_text(text)?;
        let comment = self
            .comments_write
            .create_comment(CreateCommentParams {
                post_id: post.id,
                author_id: actor.id,
                text,
            })
            .await?;
        Ok(Some(comment))
    }

    /// Look up a post addressed by author username + id, as in URLs.
    pub async fn find_authored(
        &self,
        author_username: &str,
        post_id: Uuid,
    ) -> Result<Option<PostRecord>, PostCommandError> {
        let post = self.posts.find_by_id(post_id).await?;
        Ok(post.filter(|post| post.author_username == author_username))
    }

    async fn check_group(&self, group_id: Option<Uuid>) -> Result<(), PostCommandError> {
        if let Some(id) = group_id
            && self.groups.find_by_id(id).await?.is_none()
        {
            return Err(DomainError::validation("selected group does not exist").into());
        }
        Ok(())
    }
}
