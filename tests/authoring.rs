//! Post creation, author-only editing, and commenting.

mod support;

use axum::http::StatusCode;
use time::OffsetDateTime;

use support::{TestApp, assert_redirects_to_login, body_text, location_header};

#[tokio::test]
async fn anonymous_new_post_page_redirects_to_login() {
    let app = TestApp::new();
    let response = app.get("/new/").await;
    assert_redirects_to_login(&response, "/new/");
}

#[tokio::test]
async fn authenticated_new_post_page_renders_form() {
    let app = TestApp::new();
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos.seed_session("ada-token", ada.id);
    app.repos.seed_group("rust", "Rust", "");

    let response = app.get_as("/new/", "ada-token").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("New post"));
    assert!(body.contains("Rust"));
}

#[tokio::test]
async fn created_post_appears_first_on_index_and_profile() {
    let app = TestApp::new();
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos.seed_session("ada-token", ada.id);
    app.repos.seed_post_at(
        &ada,
        None,
        "older entry",
        OffsetDateTime::now_utc() - time::Duration::hours(1),
    );

    let response = app
        .post_form("/new/", "ada-token", "text=fresh+ink&group=&image=")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_header(&response).as_deref(), Some("/"));

    let index = body_text(app.get("/").await).await;
    let newest = index.find("fresh ink").expect("new post on index");
    let older = index.find("older entry").expect("seeded post on index");
    assert!(newest < older, "new post should lead the feed");

    assert!(body_text(app.get("/ada/").await).await.contains("fresh ink"));
}

#[tokio::test]
async fn blank_post_text_re_renders_form_with_error() {
    let app = TestApp::new();
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos.seed_session("ada-token", ada.id);

    let response = app
        .post_form("/new/", "ada-token", "text=+++&group=&image=")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("post text must not be empty"));

    // Nothing was stored.
    assert!(body_text(app.get("/").await).await.contains("No posts yet."));
}

#[tokio::test]
async fn author_can_edit_own_post() {
    let app = TestApp::new();
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos.seed_session("ada-token", ada.id);
    let post = app
        .repos
        .seed_post_at(&ada, None, "first draft", OffsetDateTime::now_utc());

    let edit_path = format!("/ada/{}/edit/", post.id);
    let form = app.get_as(&edit_path, "ada-token").await;
    assert_eq!(form.status(), StatusCode::OK);
    assert!(body_text(form).await.contains("first draft"));

    let response = app
        .post_form(&edit_path, "ada-token", "text=second+draft&group=&image=")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location_header(&response).as_deref(),
        Some(format!("/ada/{}/", post.id).as_str())
    );

    let detail = body_text(app.get(&format!("/ada/{}/", post.id)).await).await;
    assert!(detail.contains("second draft"));
    assert!(!detail.contains("first draft"));
}

#[tokio::test]
async fn non_author_edit_redirects_without_changing_post() {
    let app = TestApp::new();
    let ada = app.repos.seed_user("ada", "Ada");
    let grace = app.repos.seed_user("grace", "Grace");
    app.repos.seed_session("grace-token", grace.id);
    let post = app
        .repos
        .seed_post_at(&ada, None, "ada's words", OffsetDateTime::now_utc());

    let edit_path = format!("/ada/{}/edit/", post.id);

    // The form never renders for someone else's post.
    let form = app.get_as(&edit_path, "grace-token").await;
    assert_eq!(form.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location_header(&form).as_deref(),
        Some(format!("/ada/{}/", post.id).as_str())
    );

    let response = app
        .post_form(&edit_path, "grace-token", "text=hijacked&group=&image=")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let detail = body_text(app.get(&format!("/ada/{}/", post.id)).await).await;
    assert!(detail.contains("ada&#x27;s words") || detail.contains("ada's words"));
    assert!(!detail.contains("hijacked"));
}

#[tokio::test]
async fn anonymous_edit_redirects_to_login() {
    let app = TestApp::new();
    let ada = app.repos.seed_user("ada", "Ada");
    let post = app
        .repos
        .seed_post_at(&ada, None, "a post", OffsetDateTime::now_utc());

    let edit_path = format!("/ada/{}/edit/", post.id);
    let response = app.get(&edit_path).await;
    assert_redirects_to_login(&response, &edit_path);
}

#[tokio::test]
async fn comment_appears_under_post() {
    let app = TestApp::new();
    let ada = app.repos.seed_user("ada", "Ada");
    let grace = app.repos.seed_user("grace", "Grace");
    app.repos.seed_session("grace-token", grace.id);
    let post = app
        .repos
        .seed_post_at(&ada, None, "discuss", OffsetDateTime::now_utc());

    let response = app
        .post_form(
            &format!("/ada/{}/comment/", post.id),
            "grace-token",
            "text=well+said",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let detail = body_text(app.get(&format!("/ada/{}/", post.id)).await).await;
    assert!(detail.contains("well said"));
    assert!(detail.contains("@grace"));
}

#[tokio::test]
async fn blank_comment_shows_inline_error() {
    let app = TestApp::new();
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos.seed_session("ada-token", ada.id);
    let post = app
        .repos
        .seed_post_at(&ada, None, "quiet post", OffsetDateTime::now_utc());

    let response = app
        .post_form(&format!("/ada/{}/comment/", post.id), "ada-token", "text=++")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("comment text must not be empty"));
    assert!(body.contains("No comments yet."));
}

#[tokio::test]
async fn comment_on_unknown_post_is_not_found() {
    let app = TestApp::new();
    let ada = app.repos.seed_user("ada", "Ada");
    app.repos.seed_session("ada-token", ada.id);

    let response = app
        .post_form(
            "/ada/00000000-0000-0000-0000-000000000000/comment/",
            "ada-token",
            "text=hello",
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
