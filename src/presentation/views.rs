//! View structs and template rendering helpers.

use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::feed::{GroupFeed, PostDetail, ProfileFeed};
use crate::application::pagination::FeedPage;
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(source, StatusCode::INTERNAL_SERVER_ERROR, public_message, &error)
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(viewer: ViewerView) -> Response {
    let mut response = render_template_response(
        ErrorTemplate {
            viewer,
            content: ErrorPageView::not_found(),
        },
        StatusCode::NOT_FOUND,
    );
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Error page for 5xx statuses. Renders the template directly so a template
/// failure here cannot recurse back into error handling; it falls back to the
/// plain public message instead.
pub fn render_server_error_response(status: StatusCode, public_message: &'static str) -> Response {
    let template = ErrorTemplate {
        viewer: ViewerView::anonymous(),
        content: ErrorPageView::server_error(public_message),
    };
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (status, public_message).into_response(),
    }
}

/// The signed-in user as templates see them. Drives the navigation bar and
/// the visibility of authoring controls.
#[derive(Debug, Clone, Default)]
pub struct ViewerView {
    pub username: Option<String>,
}

impl ViewerView {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_user(user: &UserRecord) -> Self {
        Self {
            username: Some(user.username.clone()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct GroupBadge {
    pub title: String,
    pub href: String,
}

#[derive(Debug, Clone)]
pub struct PostCard {
    pub text: String,
    pub author_username: String,
    pub author_href: String,
    pub detail_href: String,
    pub published: String,
    pub group: Option<GroupBadge>,
    pub image: Option<String>,
}

impl PostCard {
    pub fn from_record(post: &PostRecord) -> Self {
        let group = match (&post.group_slug, &post.group_title) {
            (Some(slug), Some(title)) => Some(GroupBadge {
                title: title.clone(),
                href: format!("/group/{slug}/"),
            }),
            _ => None,
        };
        Self {
            text: post.text.clone(),
            author_username: post.author_username.clone(),
            author_href: format!("/{}/", post.author_username),
            detail_href: format!("/{}/{}/", post.author_username, post.id),
            published: format_timestamp(post.published_at),
            group,
            image: post.image.clone(),
        }
    }

    pub fn cards(posts: &[PostRecord]) -> Vec<Self> {
        posts.iter().map(Self::from_record).collect()
    }
}

/// Previous/next controls for a paginated feed.
#[derive(Debug, Clone)]
pub struct PageNav {
    pub number: u64,
    pub total_pages: u64,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

impl PageNav {
    pub fn from_page<T>(page: &FeedPage<T>, base_path: &str) -> Self {
        let previous_href = page
            .has_previous()
            .then(|| format!("{base_path}?page={}", page.number - 1));
        let next_href = page
            .has_next()
            .then(|| format!("{base_path}?page={}", page.number + 1));
        Self {
            number: page.number,
            total_pages: page.total_pages,
            previous_href,
            next_href,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub author_username: String,
    pub author_href: String,
    pub text: String,
    pub created: String,
}

impl CommentView {
    pub fn from_record(comment: &CommentRecord) -> Self {
        Self {
            author_username: comment.author_username.clone(),
            author_href: format!("/{}/", comment.author_username),
            text: comment.text.clone(),
            created: format_timestamp(comment.created_at),
        }
    }
}

/// One option in the post form's group selector.
#[derive(Debug, Clone)]
pub struct GroupChoice {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

impl GroupChoice {
    pub fn choices(groups: &[GroupRecord], selected: Option<&str>) -> Vec<Self> {
        groups
            .iter()
            .map(|group| {
                let id = group.id.to_string();
                let selected = selected == Some(id.as_str());
                Self {
                    id,
                    title: group.title.clone(),
                    selected,
                }
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub viewer: ViewerView,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

#[derive(Template)]
#[template(path = "group.html")]
pub struct GroupTemplate {
    pub viewer: ViewerView,
    pub title: String,
    pub description: String,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

impl GroupTemplate {
    pub fn from_feed(viewer: ViewerView, feed: &GroupFeed) -> Self {
        let base = format!("/group/{}/", feed.group.slug);
        Self {
            viewer,
            title: feed.group.title.clone(),
            description: feed.group.description.clone(),
            posts: PostCard::cards(&feed.page.items),
            nav: PageNav::from_page(&feed.page, &base),
        }
    }
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub viewer: ViewerView,
    pub author_username: String,
    pub author_display_name: String,
    pub post_count: u64,
    pub followers: u64,
    pub following: u64,
    pub viewer_follows: bool,
    /// False for anonymous viewers and for the author's own profile.
    pub can_follow: bool,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

impl ProfileTemplate {
    pub fn from_feed(viewer: ViewerView, feed: &ProfileFeed) -> Self {
        let base = format!("/{}/", feed.author.username);
        let can_follow =
            viewer.is_authenticated() && viewer.username.as_deref() != Some(&feed.author.username);
        Self {
            viewer,
            author_username: feed.author.username.clone(),
            author_display_name: feed.author.display_name.clone(),
            post_count: feed.page.total_items,
            followers: feed.counts.followers,
            following: feed.counts.following,
            viewer_follows: feed.viewer_follows,
            can_follow,
            posts: PostCard::cards(&feed.page.items),
            nav: PageNav::from_page(&feed.page, &base),
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostPageTemplate {
    pub viewer: ViewerView,
    pub post: PostCard,
    pub author_post_count: u64,
    pub followers: u64,
    pub following: u64,
    pub comments: Vec<CommentView>,
    pub can_edit: bool,
    pub edit_href: String,
    pub comment_action: String,
    pub comment_error: Option<String>,
}

impl PostPageTemplate {
    pub fn from_detail(
        viewer: ViewerView,
        detail: &PostDetail,
        comment_error: Option<String>,
    ) -> Self {
        let can_edit = viewer.username.as_deref() == Some(&detail.post.author_username);
        let edit_href = format!("/{}/{}/edit/", detail.post.author_username, detail.post.id);
        let comment_action =
            format!("/{}/{}/comment/", detail.post.author_username, detail.post.id);
        Self {
            viewer,
            post: PostCard::from_record(&detail.post),
            author_post_count: detail.author_post_count,
            followers: detail.counts.followers,
            following: detail.counts.following,
            comments: detail.comments.iter().map(CommentView::from_record).collect(),
            can_edit,
            edit_href,
            comment_action,
            comment_error,
        }
    }
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub viewer: ViewerView,
    pub heading: String,
    pub submit_label: String,
    pub action_href: String,
    pub text_value: String,
    pub image_value: String,
    pub groups: Vec<GroupChoice>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "follow.html")]
pub struct FollowTemplate {
    pub viewer: ViewerView,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page not found".to_string(),
            message: "The page you requested does not exist.".to_string(),
            action: Some(ErrorAction::home()),
        }
    }

    pub fn server_error(message: &str) -> Self {
        Self {
            title: "Something went wrong".to_string(),
            message: message.to_string(),
            action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub viewer: ViewerView,
    pub content: ErrorPageView,
}

pub fn format_timestamp(moment: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    moment
        .format(&format)
        .unwrap_or_else(|_| moment.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pagination::Paginator;
    use time::macros::datetime;
    use uuid::Uuid;

    fn sample_post() -> PostRecord {
        PostRecord {
            id: Uuid::nil(),
            text: "hello".to_string(),
            author_id: Uuid::nil(),
            author_username: "ada".to_string(),
            group_id: None,
            group_slug: None,
            group_title: None,
            image: None,
            published_at: datetime!(2026-01-02 10:30 UTC),
        }
    }

    #[test]
    fn post_card_links_point_at_author_and_detail() {
        let card = PostCard::from_record(&sample_post());
        assert_eq!(card.author_href, "/ada/");
        assert_eq!(
            card.detail_href,
            "/ada/00000000-0000-0000-0000-000000000000/"
        );
        assert_eq!(card.published, "2026-01-02 10:30");
        assert!(card.group.is_none());
    }

    #[test]
    fn group_badge_shows_the_title_and_links_by_slug() {
        let mut post = sample_post();
        post.group_id = Some(Uuid::new_v4());
        post.group_slug = Some("rust-lang".to_string());
        post.group_title = Some("Rust".to_string());

        let badge = PostCard::from_record(&post).group.expect("group badge");
        assert_eq!(badge.title, "Rust");
        assert_eq!(badge.href, "/group/rust-lang/");
    }

    #[test]
    fn page_nav_builds_hrefs_only_where_pages_exist() {
        let paginator = Paginator::new(25, 10);
        let middle = FeedPage::new(vec![0u8; 10], 2, &paginator);
        let nav = PageNav::from_page(&middle, "/");
        assert_eq!(nav.previous_href.as_deref(), Some("/?page=1"));
        assert_eq!(nav.next_href.as_deref(), Some("/?page=3"));

        let first = FeedPage::new(vec![0u8; 10], 1, &paginator);
        let nav = PageNav::from_page(&first, "/");
        assert!(nav.previous_href.is_none());
    }
}
