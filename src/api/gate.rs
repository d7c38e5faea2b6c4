//! Session gate
//!
//! Every path outside [`is_public`] requires a valid session cookie.
//! Anonymous requests are redirected to `/login?next=<path>` with the path and
//! query percent-encoded; authenticated ones continue with the verified
//! [`Session`](crate::session::Session) in the request extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::htmx::{redirect, HxRequest};
use crate::core::SharedState;
use crate::session::login_url;

/// Paths reachable without a session
pub fn is_public(path: &str) -> bool {
    matches!(path, "/" | "/login" | "/logout" | "/health" | "/metrics")
        || path.starts_with("/static/")
}

/// Middleware enforcing authentication on protected paths
pub async fn require_session(
    State(state): State<SharedState>,
    HxRequest(is_htmx): HxRequest,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    if is_public(&path) {
        return next.run(req).await;
    }

    match state.sessions.from_headers(req.headers()) {
        Some(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => {
            debug!(path = %path, "anonymous request to protected path");
            let return_to = req
                .uri()
                .path_and_query()
                .map_or(path.as_str(), |pq| pq.as_str());
            let target = login_url(Some(return_to));
            redirect(&target, is_htmx).into_response()
        }
    }
}
