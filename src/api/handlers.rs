//! HTTP request handlers
//!
//! Page handlers pick the render mode from the `HX-Request` header. Mutation
//! handlers answer with the fragment htmx swaps into the table.

use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    Extension,
};
use serde::Deserialize;
use tracing::info;

use super::extract::{CurrentSession, FormRequest};
use super::htmx::{close_modal, redirect, with_cookie, HxRequest};
use crate::core::{Error, Result, SharedState};
use crate::directory::{LoginForm, UserForm, UserUpdate};
use crate::session::{safe_next, Session};
use crate::system::{HealthStatus, UserOp};
use crate::views::{PageUser, RenderMode};

/// `?next=` carried through the login flow
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    /// Where to go after login
    pub next: Option<String>,
}

/// `GET /`
pub async fn landing(
    State(state): State<SharedState>,
    HxRequest(is_htmx): HxRequest,
    CurrentSession(session): CurrentSession,
) -> Result<Html<String>> {
    let user = match &session {
        Some(session) => PageUser::signed_in(&session.email),
        None => PageUser::anonymous(),
    };
    let html = state
        .views
        .landing(&user, RenderMode::for_request(is_htmx))?;
    Ok(Html(html))
}

/// `GET /login`
pub async fn login_page(
    State(state): State<SharedState>,
    HxRequest(is_htmx): HxRequest,
    CurrentSession(session): CurrentSession,
    Query(query): Query<NextQuery>,
) -> Result<Response> {
    if session.is_some() {
        return redirect(safe_next(query.next.as_deref()), is_htmx);
    }

    let next = query.next.as_deref().map(|next| safe_next(Some(next)));
    let html = state
        .views
        .login(next, RenderMode::for_request(is_htmx))?;
    Ok(Html(html).into_response())
}

/// `POST /login`
pub async fn login(
    State(state): State<SharedState>,
    HxRequest(is_htmx): HxRequest,
    Query(query): Query<NextQuery>,
    FormRequest(form): FormRequest<LoginForm>,
) -> Result<Response> {
    let email = form.validate()?;
    let token = state.sessions.issue(&email);
    state.metrics.logins.inc();
    info!(email = %email, "login");

    let target = safe_next(query.next.as_deref());
    let response = redirect(target, is_htmx)?;
    with_cookie(response, &state.sessions.set_cookie(&token))
}

/// `GET|POST /logout`
pub async fn logout(
    State(state): State<SharedState>,
    HxRequest(is_htmx): HxRequest,
    CurrentSession(session): CurrentSession,
) -> Result<Response> {
    if let Some(session) = session {
        info!(email = %session.email, "logout");
    }
    let response = redirect("/login", is_htmx)?;
    with_cookie(response, &state.sessions.clear_cookie())
}

/// `GET /users`
pub async fn list_users(
    State(state): State<SharedState>,
    HxRequest(is_htmx): HxRequest,
    Extension(session): Extension<Session>,
) -> Result<Html<String>> {
    let html = state.views.users(
        &PageUser::signed_in(&session.email),
        state.directory.list(),
        RenderMode::for_request(is_htmx),
    )?;
    Ok(Html(html))
}

/// `POST /users`
pub async fn create_user(
    State(state): State<SharedState>,
    FormRequest(form): FormRequest<UserForm>,
) -> Result<Response> {
    let valid = form.validate()?;
    let user = state.directory.create(valid.name, valid.email);
    state.metrics.record_user_op(UserOp::Create);
    state.sync_user_gauge();

    let row = state.views.user_row(&user)?;
    Ok((StatusCode::CREATED, close_modal(), Html(row)).into_response())
}

/// `PUT /users/:id`
pub async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    FormRequest(form): FormRequest<UserForm>,
) -> Result<Response> {
    // Unknown ids are reported before field errors.
    if state.directory.get(&id).is_none() {
        return Err(Error::not_found(format!("user {}", id)));
    }

    let valid = form.validate()?;
    let user = state.directory.update(&id, UserUpdate::from(valid))?;
    state.metrics.record_user_op(UserOp::Update);

    let row = state.views.user_row(&user)?;
    Ok((close_modal(), Html(row)).into_response())
}

/// `DELETE /users/:id`
pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if !state.directory.delete(&id) {
        return Err(Error::not_found(format!("user {}", id)));
    }
    state.metrics.record_user_op(UserOp::Delete);
    state.sync_user_gauge();
    Ok(StatusCode::OK)
}

/// `GET /_components/users/new`
pub async fn new_user_dialog(State(state): State<SharedState>) -> Result<Html<String>> {
    Ok(Html(state.views.create_dialog()?))
}

/// `GET /_components/users/update/:id`
pub async fn update_user_dialog(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let user = state
        .directory
        .get(&id)
        .ok_or_else(|| Error::not_found(format!("user {}", id)))?;
    Ok(Html(state.views.update_dialog(&user)?))
}

/// `GET /health`
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: crate::VERSION,
        users: state.directory.len(),
        connected: state.presence.count(),
    })
}

/// `GET /metrics`
pub async fn metrics(State(state): State<SharedState>) -> Result<Response> {
    let body = state.metrics.render()?;
    Ok((
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response())
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> Error {
    Error::not_found(uri.path().to_string())
}
