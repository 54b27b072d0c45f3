//! Handlers behind the login requirement: authoring, commenting, following.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::posts::{EditOutcome, PostCommandError},
    domain::entities::UserRecord,
    domain::posts::PostInput,
    presentation::views::{
        GroupChoice, PostFormTemplate, PostPageTemplate, ViewerView, render_not_found_response,
        render_template_response,
    },
};

use super::{
    follow_error_to_http,
    post_error_to_http,
    public::HttpState,
    session::{login_redirect, resolve_viewer},
};

#[derive(Debug, Deserialize)]
pub(super) struct PostForm {
    #[serde(default)]
    text: String,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentForm {
    #[serde(default)]
    text: String,
}

/// Selected group, as submitted. An empty selection means no group.
fn parse_group_selection(raw: Option<&str>) -> Result<Option<Uuid>, String> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse::<Uuid>()
            .map(Some)
            .map_err(|_| "selected group does not exist".to_string()),
    }
}

async fn require_viewer(
    state: &HttpState,
    jar: &CookieJar,
    next_path: &str,
) -> Result<UserRecord, Response> {
    match resolve_viewer(state, jar).await {
        Ok(Some(viewer)) => Ok(viewer),
        Ok(None) => Err(login_redirect(next_path)),
        Err(err) => Err(err.into_response()),
    }
}

async fn render_post_form(
    state: &HttpState,
    viewer: ViewerView,
    heading: &str,
    submit_label: &str,
    action_href: String,
    text_value: String,
    image_value: String,
    selected_group: Option<&str>,
    errors: Vec<String>,
    status: StatusCode,
) -> Response {
    let groups = match state.posts.group_choices().await {
        Ok(groups) => groups,
        Err(err) => {
            return post_error_to_http("infra::http::account::render_post_form", err)
                .into_response();
        }
    };
    render_template_response(
        PostFormTemplate {
            viewer,
            heading: heading.to_string(),
            submit_label: submit_label.to_string(),
            action_href,
            text_value,
            image_value,
            groups: GroupChoice::choices(&groups, selected_group),
            errors,
        },
        status,
    )
}

pub(super) async fn new_post_form(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let viewer = match require_viewer(&state, &jar, "/new/").await {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    render_post_form(
        &state,
        ViewerView::from_user(&viewer),
        "New post",
        "Publish",
        "/new/".to_string(),
        String::new(),
        String::new(),
        None,
        Vec::new(),
        StatusCode::OK,
    )
    .await
}

pub(super) async fn new_post_submit(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> Response {
    let viewer = match require_viewer(&state, &jar, "/new/").await {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    let group_id = match parse_group_selection(form.group.as_deref()) {
        Ok(group_id) => group_id,
        Err(message) => {
            return render_post_form(
                &state,
                ViewerView::from_user(&viewer),
                "New post",
                "Publish",
                "/new/".to_string(),
                form.text,
                form.image.unwrap_or_default(),
                None,
                vec![message],
                StatusCode::OK,
            )
            .await;
        }
    };

    let input = PostInput {
        text: form.text.clone(),
        group_id,
        image: form.image.clone(),
    };
    match state.posts.create_post(&viewer, input).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(PostCommandError::Domain(err)) => {
            render_post_form(
                &state,
                ViewerView::from_user(&viewer),
                "New post",
                "Publish",
                "/new/".to_string(),
                form.text,
                form.image.unwrap_or_default(),
                form.group.as_deref(),
                vec![err.to_string()],
                StatusCode::OK,
            )
            .await
        }
        Err(err) => post_error_to_http("infra::http::account::new_post_submit", err)
            .into_response(),
    }
}

pub(super) async fn edit_post_form(
    State(state): State<HttpState>,
    Path((username, post_id)): Path<(String, String)>,
    jar: CookieJar,
) -> Response {
    let edit_path = format!("/{username}/{post_id}/edit/");
    let viewer = match require_viewer(&state, &jar, &edit_path).await {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    let viewer_view = ViewerView::from_user(&viewer);

    let Ok(post_id) = post_id.parse::<Uuid>() else {
        return render_not_found_response(viewer_view);
    };
    let post = match state.posts.find_authored(&username, post_id).await {
        Ok(Some(post)) => post,
        Ok(None) => return render_not_found_response(viewer_view),
        Err(err) => {
            return post_error_to_http("infra::http::account::edit_post_form", err)
                .into_response();
        }
    };
    // Only the author edits; everyone else is sent back to the post.
    if post.author_id != viewer.id {
        return Redirect::to(&format!("/{username}/{post_id}/")).into_response();
    }

    let selected = post.group_id.map(|id| id.to_string());
    render_post_form(
        &state,
        viewer_view,
        "Edit post",
        "Save",
        edit_path,
        post.text,
        post.image.unwrap_or_default(),
        selected.as_deref(),
        Vec::new(),
        StatusCode::OK,
    )
    .await
}

pub(super) async fn edit_post_submit(
    State(state): State<HttpState>,
    Path((username, post_id)): Path<(String, String)>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> Response {
    let edit_path = format!("/{username}/{post_id}/edit/");
    let detail_path = format!("/{username}/{post_id}/");
    let viewer = match require_viewer(&state, &jar, &edit_path).await {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    let viewer_view = ViewerView::from_user(&viewer);

    let Ok(post_id) = post_id.parse::<Uuid>() else {
        return render_not_found_response(viewer_view);
    };

    let group_id = match parse_group_selection(form.group.as_deref()) {
        Ok(group_id) => group_id,
        Err(message) => {
            return render_post_form(
                &state,
                viewer_view,
                "Edit post",
                "Save",
                edit_path,
                form.text,
                form.image.unwrap_or_default(),
                None,
                vec![message],
                StatusCode::OK,
            )
            .await;
        }
    };

    let input = PostInput {
        text: form.text.clone(),
        group_id,
        image: form.image.clone(),
    };
    match state.posts.edit_post(&viewer, &username, post_id, input).await {
        Ok(EditOutcome::Updated(_)) | Ok(EditOutcome::NotAuthor) => {
            Redirect::to(&detail_path).into_response()
        }
        Ok(EditOutcome::NotFound) => render_not_found_response(viewer_view),
        Err(PostCommandError::Domain(err)) => {
            render_post_form(
                &state,
                viewer_view,
                "Edit post",
                "Save",
                edit_path,
                form.text,
                form.image.unwrap_or_default(),
                form.group.as_deref(),
                vec![err.to_string()],
                StatusCode::OK,
            )
            .await
        }
        Err(err) => post_error_to_http("infra::http::account::edit_post_submit", err)
            .into_response(),
    }
}

pub(super) async fn add_comment(
    State(state): State<HttpState>,
    Path((username, post_id)): Path<(String, String)>,
    jar: CookieJar,
    Form(form): Form<CommentForm>,
) -> Response {
    let comment_path = format!("/{username}/{post_id}/comment/");
    let detail_path = format!("/{username}/{post_id}/");
    let viewer = match require_viewer(&state, &jar, &comment_path).await {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    let viewer_view = ViewerView::from_user(&viewer);

    let Ok(post_id) = post_id.parse::<Uuid>() else {
        return render_not_found_response(viewer_view);
    };

    match state
        .posts
        .add_comment(&viewer, &username, post_id, &form.text)
        .await
    {
        Ok(Some(_)) => Redirect::to(&detail_path).into_response(),
        Ok(None) => render_not_found_response(viewer_view),
        Err(PostCommandError::Domain(err)) => {
            // Re-show the post with the rejected comment's error inline.
            match state.feed.post_detail(&username, post_id).await {
                Ok(Some(detail)) => render_template_response(
                    PostPageTemplate::from_detail(viewer_view, &detail, Some(err.to_string())),
                    StatusCode::OK,
                ),
                Ok(None) => render_not_found_response(viewer_view),
                Err(feed_err) => super::feed_error_to_http(
                    "infra::http::account::add_comment",
                    feed_err,
                )
                .into_response(),
            }
        }
        Err(err) => {
            post_error_to_http("infra::http::account::add_comment", err).into_response()
        }
    }
}

pub(super) async fn profile_follow(
    State(state): State<HttpState>,
    Path(username): Path<String>,
    jar: CookieJar,
) -> Response {
    let follow_path = format!("/{username}/follow/");
    let viewer = match require_viewer(&state, &jar, &follow_path).await {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state.follows.follow(&viewer, &username).await {
        Ok(()) => Redirect::to(&format!("/{username}/")).into_response(),
        Err(crate::application::follows::FollowError::UnknownAuthor { .. }) => {
            render_not_found_response(ViewerView::from_user(&viewer))
        }
        Err(err) => follow_error_to_http("infra::http::account::profile_follow", err)
            .into_response(),
    }
}

pub(super) async fn profile_unfollow(
    State(state): State<HttpState>,
    Path(username): Path<String>,
    jar: CookieJar,
) -> Response {
    let unfollow_path = format!("/{username}/unfollow/");
    let viewer = match require_viewer(&state, &jar, &unfollow_path).await {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match state.follows.unfollow(&viewer, &username).await {
        Ok(()) => Redirect::to(&format!("/{username}/")).into_response(),
        Err(crate::application::follows::FollowError::UnknownAuthor { .. }) => {
            render_not_found_response(ViewerView::from_user(&viewer))
        }
        Err(err) => follow_error_to_http("infra::http::account::profile_unfollow", err)
            .into_response(),
    }
}
