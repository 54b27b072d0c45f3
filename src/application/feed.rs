//! Read side of the application: paginated feeds and post detail.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::{FeedPage, PageParam, Paginator};
use crate::application::repos::{
    CommentsRepo, FeedScope, FollowsRepo, GroupsRepo, PostsRepo, RepoError, UsersRepo,
};
use crate::domain::entities::{
    CommentRecord, FollowCounts, GroupRecord, PostRecord, UserRecord,
};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A group page: the group itself plus its paginated posts.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: GroupRecord,
    pub page: FeedPage<PostRecord>,
}

/// A profile page: the author, their paginated posts, and follow totals.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: UserRecord,
    pub page: FeedPage<PostRecord>,
    pub counts: FollowCounts,
    /// Whether the current viewer already follows this author.
    pub viewer_follows: bool,
}

/// A single post with its comments and the author's follow totals.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostRecord,
    pub author: UserRecord,
    pub comments: Vec<CommentRecord>,
    pub counts: FollowCounts,
    pub author_post_count: u64,
}

pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    groups: Arc<dyn GroupsRepo>,
    users: Arc<dyn UsersRepo>,
    comments: Arc<dyn CommentsRepo>,
    follows: Arc<dyn FollowsRepo>,
    page_size: u32,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        groups: Arc<dyn GroupsRepo>,
        users: Arc<dyn UsersRepo>,
        comments: Arc<dyn CommentsRepo>,
        follows: Arc<dyn FollowsRepo>,
        page_size: u32,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            comments,
            follows,
            page_size,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The main feed: every post, newest first.
    pub async fn index_page(&self, requested: PageParam) -> Result<FeedPage<PostRecord>, FeedError> {
        self.scoped_page(FeedScope::Everything, requested).await
    }

    /// Posts filed into the group with `slug`; `None` when the slug is unknown.
    pub async fn group_page(
        &self,
        slug: &str,
        requested: PageParam,
    ) -> Result<Option<GroupFeed>, FeedError> {
        let Some(group) = self.groups.find_by_slug(slug).await? else {
            return Ok(None);
        };
        let page = self.scoped_page(FeedScope::Group(group.id), requested).await?;
        Ok(Some(GroupFeed { group, page }))
    }

    /// An author profile; `None` when the username is unknown. The viewer id,
    /// when present, is used to mark whether the profile is already followed.
    pub async fn profile_page(
        &self,
        username: &str,
        requested: PageParam,
        viewer: Option<Uuid>,
    ) -> Result<Option<ProfileFeed>, FeedError> {
        let Some(author) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };
        let page = self
            .scoped_page(FeedScope::Author(author.id), requested)
            .await?;
        let counts = self.follows.counts_for(author.id).await?;
        let viewer_follows = match viewer {
            Some(viewer_id) if viewer_id != author.id => {
                self.follows.follow_exists(viewer_id, author.id).await?
            }
            _ => false,
        };
        Ok(Some(ProfileFeed {
            author,
            page,
            counts,
            viewer_follows,
        }))
    }

    /// Posts by authors the user follows, newest first.
    pub async fn follow_feed(
        &self,
        user_id: Uuid,
        requested: PageParam,
    ) -> Result<FeedPage<PostRecord>, FeedError> {
        self.scoped_page(FeedScope::FollowedBy(user_id), requested)
            .await
    }

    /// A single post addressed as `/{username}/{post_id}/`. The username must
    /// match the post's author, otherwise the post is treated as missing.
    pub async fn post_detail(
        &self,
        username: &str,
        post_id: Uuid,
    ) -> Result<Option<PostDetail>, FeedError> {
        let Some(post) = self.posts.find_by_id(post_id).await? else {
            return Ok(None);
        };
        if post.author_username != username {
            return Ok(None);
        }
        let Some(author) = self.users.find_by_id(post.author_id).await? else {
            return Ok(None);
        };
        let comments = self.comments.list_for_post(post.id).await?;
        let counts = self.follows.counts_for(author.id).await?;
        let author_post_count = self.posts.count_posts(FeedScope::Author(author.id)).await?;
        Ok(Some(PostDetail {
            post,
            author,
            comments,
            counts,
            author_post_count,
        }))
    }

    async fn scoped_page(
        &self,
        scope: FeedScope,
        requested: PageParam,
    ) -> Result<FeedPage<PostRecord>, FeedError> {
        let total = self.posts.count_posts(scope).await?;
        let paginator = Paginator::new(total, self.page_size);
        let number = paginator.clamp(requested);
        let items = self.posts.list_posts(scope, paginator.window(number)).await?;
        Ok(FeedPage::new(items, number, &paginator))
    }
}
