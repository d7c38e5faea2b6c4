//! Request extractors

use axum::{
    extract::{rejection::FormRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Form,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

use crate::core::{Error, SharedState};
use crate::session::Session;

/// Form body whose decoding failures become 400 validation errors
pub struct FormRequest<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for FormRequest<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(FormRequest(value)),
            Err(rejection) => {
                let message = match rejection {
                    FormRejection::InvalidFormContentType(_) => {
                        "Expected an application/x-www-form-urlencoded body"
                    }
                    FormRejection::FailedToDeserializeForm(_)
                    | FormRejection::FailedToDeserializeFormBody(_) => "Malformed form body",
                    _ => "Unreadable form body",
                };
                tracing::warn!("Form parsing error: {}", rejection);
                Err(Error::invalid_field("form", message))
            }
        }
    }
}

/// The caller's session, if the cookie carries a valid token
///
/// Protected routes already have the session verified by the gate; this
/// extractor reuses that result and only verifies the cookie itself on public
/// routes.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

#[axum::async_trait]
impl FromRequestParts<SharedState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(CurrentSession(Some(session.clone())));
        }
        Ok(CurrentSession(state.sessions.from_headers(&parts.headers)))
    }
}
