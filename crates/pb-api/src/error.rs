//! Maps engine outcomes onto HTTP responses.
//!
//! JSON routes answer `{"error": ...}`; the HTML view answers plain text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pb_core::error::AppError;
use serde_json::json;

fn status_of(err: &AppError) -> StatusCode {
    match err {
        AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Contention(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn message_of(err: &AppError) -> String {
    match err {
        AppError::ValidationError { field, .. } => format!("Invalid {field}"),
        AppError::NotFound(reason) => reason.message().to_string(),
        AppError::Store(_) => "Internal server error".to_string(),
        AppError::Contention(_) => "Paste is busy, try again".to_string(),
    }
}

fn body_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => "Request body too large",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Expected a JSON body",
        _ => "Invalid JSON body",
    }
}

fn log(err: &AppError) {
    match err {
        AppError::Store(_) => tracing::error!(error = %err, "request failed"),
        AppError::Contention(_) => tracing::warn!(error = %err, "request failed"),
        _ => tracing::debug!(error = %err, "request rejected"),
    }
}

/// Error type for the JSON API routes.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    /// The request body could not be read as JSON. Carries the rejection's
    /// status (400, 413 or 415) and its detail for the log.
    MalformedBody(StatusCode, String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::App(err) => {
                log(&err);
                (status_of(&err), Json(json!({ "error": message_of(&err) }))).into_response()
            }
            Self::MalformedBody(status, detail) => {
                tracing::debug!(%status, %detail, "malformed request body");
                (status, Json(json!({ "error": body_message(status) }))).into_response()
            }
        }
    }
}

/// Error type for the HTML view route.
#[derive(Debug)]
pub enum PageError {
    App(AppError),
    Render(askama::Error),
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<askama::Error> for PageError {
    fn from(err: askama::Error) -> Self {
        Self::Render(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::App(err) => {
                log(&err);
                (status_of(&err), message_of(&err)).into_response()
            }
            Self::Render(err) => {
                tracing::error!(error = %err, "template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::error::NotFoundReason;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            status_of(&AppError::validation("content", "empty")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&AppError::NotFound(NotFoundReason::Expired)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(&AppError::Store("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(&AppError::Contention("id".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn messages_name_the_field_or_reason() {
        assert_eq!(
            message_of(&AppError::validation("max_views", "bad")),
            "Invalid max_views"
        );
        assert_eq!(
            message_of(&AppError::NotFound(NotFoundReason::ViewLimitExceeded)),
            "View limit exceeded"
        );
    }

    #[test]
    fn body_rejections_keep_their_status() {
        for (status, message) in [
            (StatusCode::BAD_REQUEST, "Invalid JSON body"),
            (StatusCode::UNPROCESSABLE_ENTITY, "Invalid JSON body"),
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"),
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected a JSON body"),
        ] {
            let response = ApiError::MalformedBody(status, "detail".into()).into_response();
            assert_eq!(response.status(), status);
            assert_eq!(body_message(status), message);
        }
    }

    #[test]
    fn store_details_do_not_leak() {
        assert_eq!(
            message_of(&AppError::Store("redis://secret-host refused".into())),
            "Internal server error"
        );
    }
}
