//! Session cookie resolution and login-required redirects.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::application::error::HttpError;
use crate::domain::entities::UserRecord;

use super::public::HttpState;
use super::repo_error_to_http;

/// Resolve the viewer behind the request's session cookie. An absent or
/// unknown token yields `None`; only repository failures are errors.
pub async fn resolve_viewer(
    state: &HttpState,
    jar: &CookieJar,
) -> Result<Option<UserRecord>, HttpError> {
    let Some(cookie) = jar.get(&state.session_cookie) else {
        return Ok(None);
    };
    state
        .sessions
        .find_user_by_token(cookie.value())
        .await
        .map_err(|err| repo_error_to_http("infra::http::session::resolve_viewer", err))
}

/// Redirect an anonymous viewer to the login page, preserving the page they
/// were after in the `next` query parameter.
pub fn login_redirect(next_path: &str) -> Response {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next_path)
        .finish();
    Redirect::to(&format!("/auth/login/?{query}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header::LOCATION};

    #[test]
    fn login_redirect_preserves_target() {
        let response = login_redirect("/new/");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok());
        assert_eq!(location, Some("/auth/login/?next=%2Fnew%2F"));
    }
}
