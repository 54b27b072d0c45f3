use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::{
        feed::FeedService,
        follows::FollowService,
        pagination::PageParam,
        posts::PostService,
        repos::SessionsRepo,
    },
    cache::{CacheState, page_cache_layer},
    presentation::views::{
        FollowTemplate, GroupTemplate, IndexTemplate, PageNav, PostCard, PostPageTemplate,
        ProfileTemplate, ViewerView, render_not_found_response, render_template_response,
    },
};

use super::{
    account,
    feed_error_to_http,
    middleware::{log_responses, set_request_context},
    session::{login_redirect, resolve_viewer},
};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub follows: Arc<FollowService>,
    pub sessions: Arc<dyn SessionsRepo>,
    pub cache: Option<CacheState>,
    pub session_cookie: String,
}

pub fn build_router(state: HttpState) -> Router {
    let routes = Router::new()
        .route("/", get(index))
        .route("/group/{slug}/", get(group_index))
        .route(
            "/new/",
            get(account::new_post_form).post(account::new_post_submit),
        )
        .route("/follow/", get(follow_index))
        .route("/{username}/", get(profile))
        .route(
            "/{username}/follow/",
            get(account::profile_follow).post(account::profile_follow),
        )
        .route(
            "/{username}/unfollow/",
            get(account::profile_unfollow).post(account::profile_unfollow),
        )
        .route("/{username}/{post_id}/", get(post_detail))
        .route(
            "/{username}/{post_id}/edit/",
            get(account::edit_post_form).post(account::edit_post_submit),
        )
        .route("/{username}/{post_id}/comment/", post(account::add_comment))
        .fallback(fallback);

    let routes = if let Some(cache_state) = state.cache.clone() {
        routes.layer(middleware::from_fn_with_state(
            cache_state,
            page_cache_layer,
        ))
    } else {
        routes
    };

    routes
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// Raw `?page=` value; kept as a string so clamping can treat non-numeric
/// input as page one instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    fn param(&self) -> PageParam {
        PageParam::parse(self.page.as_deref())
    }
}

async fn index(
    State(state): State<HttpState>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> Response {
    let viewer = match resolve_viewer(&state, &jar).await {
        Ok(viewer) => viewer,
        Err(err) => return err.into_response(),
    };
    let viewer_view = viewer
        .as_ref()
        .map(ViewerView::from_user)
        .unwrap_or_default();

    match state.feed.index_page(query.param()).await {
        Ok(page) => render_template_response(
            IndexTemplate {
                viewer: viewer_view,
                posts: PostCard::cards(&page.items),
                nav: PageNav::from_page(&page, "/"),
            },
            StatusCode::OK,
        ),
        Err(err) => feed_error_to_http("infra::http::public::index", err).into_response(),
    }
}

async fn group_index(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> Response {
    let viewer = match resolve_viewer(&state, &jar).await {
        Ok(viewer) => viewer,
        Err(err) => return err.into_response(),
    };
    let viewer_view = viewer
        .as_ref()
        .map(ViewerView::from_user)
        .unwrap_or_default();

    match state.feed.group_page(&slug, query.param()).await {
        Ok(Some(feed)) => render_template_response(
            GroupTemplate::from_feed(viewer_view, &feed),
            StatusCode::OK,
        ),
        Ok(None) => render_not_found_response(viewer_view),
        Err(err) => feed_error_to_http("infra::http::public::group_index", err).into_response(),
    }
}

async fn profile(
    State(state): State<HttpState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> Response {
    let viewer = match resolve_viewer(&state, &jar).await {
        Ok(viewer) => viewer,
        Err(err) => return err.into_response(),
    };
    let viewer_view = viewer
        .as_ref()
        .map(ViewerView::from_user)
        .unwrap_or_default();
    let viewer_id = viewer.as_ref().map(|user| user.id);

    match state
        .feed
        .profile_page(&username, query.param(), viewer_id)
        .await
    {
        Ok(Some(feed)) => render_template_response(
            ProfileTemplate::from_feed(viewer_view, &feed),
            StatusCode::OK,
        ),
        Ok(None) => render_not_found_response(viewer_view),
        Err(err) => feed_error_to_http("infra::http::public::profile", err).into_response(),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    Path((username, post_id)): Path<(String, String)>,
    jar: CookieJar,
) -> Response {
    let viewer = match resolve_viewer(&state, &jar).await {
        Ok(viewer) => viewer,
        Err(err) => return err.into_response(),
    };
    let viewer_view = viewer
        .as_ref()
        .map(ViewerView::from_user)
        .unwrap_or_default();

    // A malformed id addresses no post.
    let Ok(post_id) = post_id.parse::<Uuid>() else {
        return render_not_found_response(viewer_view);
    };

    match state.feed.post_detail(&username, post_id).await {
        Ok(Some(detail)) => render_template_response(
            PostPageTemplate::from_detail(viewer_view, &detail, None),
            StatusCode::OK,
        ),
        Ok(None) => render_not_found_response(viewer_view),
        Err(err) => feed_error_to_http("infra::http::public::post_detail", err).into_response(),
    }
}

async fn follow_index(
    State(state): State<HttpState>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> Response {
    let viewer = match resolve_viewer(&state, &jar).await {
        Ok(Some(viewer)) => viewer,
        Ok(None) => return login_redirect("/follow/"),
        Err(err) => return err.into_response(),
    };

    match state.feed.follow_feed(viewer.id, query.param()).await {
        Ok(page) => render_template_response(
            FollowTemplate {
                viewer: ViewerView::from_user(&viewer),
                posts: PostCard::cards(&page.items),
                nav: PageNav::from_page(&page, "/follow/"),
            },
            StatusCode::OK,
        ),
        Err(err) => feed_error_to_http("infra::http::public::follow_index", err).into_response(),
    }
}

async fn fallback(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let viewer_view = match resolve_viewer(&state, &jar).await {
        Ok(viewer) => viewer
            .as_ref()
            .map(ViewerView::from_user)
            .unwrap_or_default(),
        Err(_) => ViewerView::anonymous(),
    };
    render_not_found_response(viewer_view)
}
