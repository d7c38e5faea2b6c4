//! Error responses
//!
//! [`Error`] converts into a response carrying the right status and an
//! [`ErrorView`] extension. [`render_error_views`] runs as the outermost
//! response mapper and replaces the plain-text body with the rendered
//! fragment, so handlers can keep returning `Result` without holding the
//! renderer themselves.

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::core::{Error, SharedState, ValidationErrors};
use crate::views::Level;

/// What an error response should show
#[derive(Debug, Clone)]
pub enum ErrorView {
    /// Field-level validation errors
    Validation(ValidationErrors),
    /// A single alert
    Message(Level, String),
}

impl ErrorView {
    fn plain_text(&self) -> String {
        match self {
            ErrorView::Validation(errors) => errors.to_string(),
            ErrorView::Message(_, message) => message.clone(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, view) = match self {
            Error::Validation(errors) => (StatusCode::BAD_REQUEST, ErrorView::Validation(errors)),
            Error::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorView::Message(Level::Warning, format!("Not found: {}", what)),
            ),
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorView::Message(Level::Danger, "Something went wrong".to_string()),
                )
            }
        };

        let mut response = (status, view.plain_text()).into_response();
        response.extensions_mut().insert(view);
        response
    }
}

/// Render the body of responses produced from an [`Error`]
pub async fn render_error_views(State(state): State<SharedState>, mut response: Response) -> Response {
    let Some(view) = response.extensions_mut().remove::<ErrorView>() else {
        return response;
    };

    let rendered = match &view {
        ErrorView::Validation(errors) => state.views.errors(errors),
        ErrorView::Message(level, message) => state.views.message(*level, message),
    };

    match rendered {
        Ok(html) => {
            *response.body_mut() = Body::from(html);
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );
        }
        Err(e) => error!(error = %e, "failed to render error view"),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let validation = Error::invalid_field("name", "too short").into_response();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert!(validation.extensions().get::<ErrorView>().is_some());

        let missing = Error::not_found("user 1").into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let internal = Error::internal("boom").into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
