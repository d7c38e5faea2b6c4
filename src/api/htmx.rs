//! htmx request/response conventions

use axum::{
    extract::FromRequestParts,
    http::{
        header::{LOCATION, SET_COOKIE},
        request::Parts,
        HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use std::convert::Infallible;

use crate::core::{Error, Result};

/// Marker header sent by htmx on every request it issues
pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
/// Ask htmx to do a full client-side navigation
pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");
/// Fire a client-side event after the swap
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Event that closes the user dialog
pub const CLOSE_MODAL_EVENT: &str = "closeModal";

/// Whether the request came from htmx (`HX-Request: true`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

#[axum::async_trait]
impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get(HX_REQUEST)
            .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"true"));
        Ok(HxRequest(is_htmx))
    }
}

/// Redirect to `to`
///
/// Plain requests get `302 Found`. htmx requests get `200` with
/// `HX-Redirect` so the browser navigates instead of swapping the target
/// page into the current one.
pub fn redirect(to: &str, is_htmx: bool) -> Result<Response> {
    let location = HeaderValue::from_str(to)
        .map_err(|_| Error::internal(format!("invalid redirect target {:?}", to)))?;

    let response = if is_htmx {
        (StatusCode::OK, [(HX_REDIRECT, location)]).into_response()
    } else {
        (StatusCode::FOUND, [(LOCATION, location)]).into_response()
    };
    Ok(response)
}

/// Append a `Set-Cookie` header
pub fn with_cookie(mut response: Response, cookie: &str) -> Result<Response> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|_| Error::internal("session cookie is not a valid header value"))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(response)
}

/// Ask the client to close the user dialog after swapping
pub fn close_modal() -> [(HeaderName, HeaderValue); 1] {
    [(HX_TRIGGER, HeaderValue::from_static(CLOSE_MODAL_EVENT))]
}
