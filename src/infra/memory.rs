//! In-memory repository fakes backing integration tests and local demos.
//!
//! State lives behind one `RwLock`; every trait method takes the lock for
//! the duration of the call. Ordering matches the Postgres queries: feeds
//! newest first, groups by title.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageWindow;
use crate::application::repos::{
    CommentsRepo, CommentsWriteRepo, CreateCommentParams, CreatePostParams, FeedScope,
    FollowsRepo, FollowsWriteRepo, GroupsRepo, PostsRepo, PostsWriteRepo, RepoError,
    SessionsRepo, UpdatePostParams, UsersRepo,
};
use crate::domain::entities::{
    CommentRecord, FollowCounts, FollowRecord, GroupRecord, PostRecord, UserRecord,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    groups: Vec<GroupRecord>,
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    follows: Vec<FollowRecord>,
    sessions: HashMap<String, Uuid>,
}

#[derive(Debug, Default)]
pub struct MemoryRepositories {
    state: RwLock<MemoryState>,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed_user(&self, username: &str, display_name: &str) -> UserRecord {
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: display_name.to_string(),
            joined_at: OffsetDateTime::now_utc(),
        };
        self.write().users.push(user.clone());
        user
    }

    pub fn seed_group(&self, slug: &str, title: &str, description: &str) -> GroupRecord {
        let group = GroupRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        };
        self.write().groups.push(group.clone());
        group
    }

    pub fn seed_session(&self, token: &str, user_id: Uuid) {
        self.write().sessions.insert(token.to_string(), user_id);
    }

    /// Insert a post with an explicit timestamp, for ordering-sensitive tests.
    pub fn seed_post_at(
        &self,
        author: &UserRecord,
        group: Option<&GroupRecord>,
        text: &str,
        published_at: OffsetDateTime,
    ) -> PostRecord {
        let post = PostRecord {
            id: Uuid::new_v4(),
            text: text.to_string(),
            author_id: author.id,
            author_username: author.username.clone(),
            group_id: group.map(|g| g.id),
            group_slug: group.map(|g| g.slug.clone()),
            group_title: group.map(|g| g.title.clone()),
            image: None,
            published_at,
        };
        self.write().posts.push(post.clone());
        post
    }

    fn scope_matches(state: &MemoryState, scope: FeedScope, post: &PostRecord) -> bool {
        match scope {
            FeedScope::Everything => true,
            FeedScope::Group(group_id) => post.group_id == Some(group_id),
            FeedScope::Author(author_id) => post.author_id == author_id,
            FeedScope::FollowedBy(user_id) => state
                .follows
                .iter()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    fn scoped_posts(state: &MemoryState, scope: FeedScope) -> Vec<PostRecord> {
        let mut posts: Vec<PostRecord> = state
            .posts
            .iter()
            .filter(|post| Self::scope_matches(state, scope, post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        posts
    }
}

#[async_trait]
impl UsersRepo for MemoryRepositories {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl GroupsRepo for MemoryRepositories {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        Ok(self.read().groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupRecord>, RepoError> {
        Ok(self.read().groups.iter().find(|g| g.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<GroupRecord>, RepoError> {
        let mut groups = self.read().groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.slug.cmp(&b.slug)));
        Ok(groups)
    }
}

#[async_trait]
impl PostsRepo for MemoryRepositories {
    async fn list_posts(
        &self,
        scope: FeedScope,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let state = self.read();
        let posts = Self::scoped_posts(&state, scope);
        Ok(posts
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect())
    }

    async fn count_posts(&self, scope: FeedScope) -> Result<u64, RepoError> {
        let state = self.read();
        Ok(Self::scoped_posts(&state, scope).len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.read().posts.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut state = self.write();
        let author = state
            .users
            .iter()
            .find(|u| u.id == params.author_id)
            .cloned()
            .ok_or(RepoError::Integrity {
                message: "post author does not exist".to_string(),
            })?;
        let group = match params.group_id {
            Some(group_id) => Some(
                state
                    .groups
                    .iter()
                    .find(|g| g.id == group_id)
                    .cloned()
                    .ok_or(RepoError::Integrity {
                        message: "post group does not exist".to_string(),
                    })?,
            ),
            None => None,
        };
        let post = PostRecord {
            id: Uuid::new_v4(),
            text: params.text,
            author_id: author.id,
            author_username: author.username,
            group_id: params.group_id,
            group_slug: group.as_ref().map(|g| g.slug.clone()),
            group_title: group.map(|g| g.title),
            image: params.image,
            published_at: OffsetDateTime::now_utc(),
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut state = self.write();
        let group = match params.group_id {
            Some(group_id) => Some(
                state
                    .groups
                    .iter()
                    .find(|g| g.id == group_id)
                    .cloned()
                    .ok_or(RepoError::Integrity {
                        message: "post group does not exist".to_string(),
                    })?,
            ),
            None => None,
        };
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == params.id)
            .ok_or(RepoError::NotFound)?;
        post.text = params.text;
        post.group_id = params.group_id;
        post.group_slug = group.as_ref().map(|g| g.slug.clone());
        post.group_title = group.map(|g| g.title);
        post.image = params.image;
        Ok(post.clone())
    }
}

#[async_trait]
impl CommentsRepo for MemoryRepositories {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        let mut comments: Vec<CommentRecord> = self
            .read()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(comments)
    }
}

#[async_trait]
impl CommentsWriteRepo for MemoryRepositories {
    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let mut state = self.write();
        if !state.posts.iter().any(|p| p.id == params.post_id) {
            return Err(RepoError::Integrity {
                message: "comment post does not exist".to_string(),
            });
        }
        let author = state
            .users
            .iter()
            .find(|u| u.id == params.author_id)
            .cloned()
            .ok_or(RepoError::Integrity {
                message: "comment author does not exist".to_string(),
            })?;
        let comment = CommentRecord {
            id: Uuid::new_v4(),
            post_id: params.post_id,
            text: params.text,
            author_id: author.id,
            author_username: author.username,
            created_at: OffsetDateTime::now_utc(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl FollowsRepo for MemoryRepositories {
    async fn follow_exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        Ok(self
            .read()
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn counts_for(&self, user_id: Uuid) -> Result<FollowCounts, RepoError> {
        let state = self.read();
        Ok(FollowCounts {
            followers: state.follows.iter().filter(|f| f.author_id == user_id).count() as u64,
            following: state.follows.iter().filter(|f| f.user_id == user_id).count() as u64,
        })
    }
}

#[async_trait]
impl FollowsWriteRepo for MemoryRepositories {
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        if user_id == author_id {
            return Err(RepoError::Integrity {
                message: "self-follow edges are rejected".to_string(),
            });
        }
        let mut state = self.write();
        if state
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }
        state.follows.push(FollowRecord {
            id: Uuid::new_v4(),
            user_id,
            author_id,
        });
        Ok(true)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.write();
        let before = state.follows.len();
        state
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(state.follows.len() < before)
    }
}

#[async_trait]
impl SessionsRepo for MemoryRepositories {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserRecord>, RepoError> {
        let state = self.read();
        let Some(user_id) = state.sessions.get(token) else {
            return Ok(None);
        };
        Ok(state.users.iter().find(|u| u.id == *user_id).cloned())
    }
}
