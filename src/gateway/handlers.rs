use crate::error::{AuthError, BookmarkError};
use crate::store::User;
use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
};

use super::auth::{clear_session_cookie, current_user, request_token, session_cookie};
use super::{AppState, CreateBookmarkBody, LoginBody, TagQuery};

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let err = serde_json::json!({"error": message.into()});
    (status, Json(err)).into_response()
}

fn internal_error(context: &str, error: &dyn std::fmt::Display) -> Response {
    tracing::error!(error = %error, "{context}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn auth_error_response(err: &AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials => {
            error_response(StatusCode::UNAUTHORIZED, "Invalid credentials")
        }
        AuthError::MissingToken | AuthError::InvalidToken => {
            error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
        }
        AuthError::Validation(message) => error_response(StatusCode::BAD_REQUEST, message.as_str()),
        AuthError::Hash(_) | AuthError::Store(_) => internal_error("auth failure", err),
    }
}

fn bookmark_error_response(err: &BookmarkError) -> Response {
    match err {
        BookmarkError::InvalidUrl | BookmarkError::AlreadyExists => {
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        BookmarkError::NotFound => error_response(StatusCode::NOT_FOUND, err.to_string()),
        BookmarkError::Store(_) => internal_error("bookmark store failure", err),
    }
}

fn user_json(user: &User) -> serde_json::Value {
    serde_json::json!({"id": user.id, "email": user.email})
}

/// Resolve the caller or bail out of the handler with the error response.
macro_rules! require_user {
    ($state:expr, $headers:expr) => {
        match current_user(&$state, &$headers).await {
            Ok(user) => user,
            Err(e) => return auth_error_response(&e),
        }
    };
}

/// GET /health: always public
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// POST /api/auth/login: exchange credentials for a session token
pub(super) async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Response {
    let Json(login) = match body {
        Ok(b) => b,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid request body: {e}"));
        }
    };

    let issued = match state.sessions.login(&login.email, &login.password).await {
        Ok(issued) => issued,
        Err(e) => return auth_error_response(&e),
    };

    let body = serde_json::json!({
        "user": user_json(&issued.user),
        "message": "Login successful",
        "token": issued.token,
    });
    let mut response = (StatusCode::OK, Json(body)).into_response();
    if let Some(cookie) = session_cookie(
        &issued.token,
        state.sessions.token_ttl_secs(),
        state.secure_cookie,
    ) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// POST /api/auth/logout: revoke the presented token and clear the cookie
pub(super) async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = request_token(&headers)
        && let Err(e) = state.sessions.logout(&token).await
    {
        return auth_error_response(&e);
    }

    let mut response = Json(serde_json::json!({"message": "Logged out"})).into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, clear_session_cookie());
    response
}

/// GET /api/auth/status: never 401, reports whether the caller is signed in
pub(super) async fn handle_auth_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let body = match current_user(&state, &headers).await {
        Ok(user) => serde_json::json!({
            "authenticated": true,
            "user": user_json(&user),
            "message": "User is authenticated",
        }),
        Err(AuthError::MissingToken) => serde_json::json!({
            "authenticated": false,
            "message": "No token found",
        }),
        Err(AuthError::InvalidToken) => serde_json::json!({
            "authenticated": false,
            "message": "Invalid token",
        }),
        Err(e) => return auth_error_response(&e),
    };
    Json(body).into_response()
}

/// GET /api/bookmarks?tag=
pub(super) async fn handle_list_bookmarks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TagQuery>,
) -> Response {
    let user = require_user!(state, headers);
    match state.bookmarks.list(&user, query.tag.as_deref()).await {
        Ok(bookmarks) => Json(serde_json::json!({"bookmarks": bookmarks})).into_response(),
        Err(e) => bookmark_error_response(&e),
    }
}

/// POST /api/bookmarks
pub(super) async fn handle_create_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateBookmarkBody>, JsonRejection>,
) -> Response {
    let user = require_user!(state, headers);
    let Json(create) = match body {
        Ok(b) => b,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid request body: {e}"));
        }
    };

    match state.bookmarks.create(&user, &create.url, &create.tags).await {
        Ok(bookmark) => {
            let body = serde_json::json!({
                "bookmark": bookmark,
                "message": "Bookmark created successfully",
            });
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => bookmark_error_response(&e),
    }
}

/// GET /api/bookmarks/{id}
pub(super) async fn handle_get_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let user = require_user!(state, headers);
    match state.bookmarks.get(&user, &id).await {
        Ok(bookmark) => Json(serde_json::json!({"bookmark": bookmark})).into_response(),
        Err(e) => bookmark_error_response(&e),
    }
}

/// DELETE /api/bookmarks/{id}
pub(super) async fn handle_delete_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let user = require_user!(state, headers);
    match state.bookmarks.delete(&user, &id).await {
        Ok(()) => Json(serde_json::json!({"message": "Bookmark deleted successfully"}))
            .into_response(),
        Err(e) => bookmark_error_response(&e),
    }
}

/// GET /api/tags
pub(super) async fn handle_list_tags(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = require_user!(state, headers);
    match state.bookmarks.tags(&user).await {
        Ok(tags) => Json(serde_json::json!({"tags": tags})).into_response(),
        Err(e) => bookmark_error_response(&e),
    }
}
