use crate::domain::submission::FieldErrors;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("This form only works over HTTPS.")]
    InsecureTransport,
    #[error("Invalid request method.")]
    MethodNotAllowed,
    #[error("Invalid submission.")]
    Spam,
    #[error("Please review the highlighted fields.")]
    Validation(FieldErrors),
    #[error("Unable to send your message right now. Please try again later.")]
    Delivery,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, errors) = match self {
            AppError::InsecureTransport => {
                tracing::debug!("Rejected submission over insecure channel");
                (StatusCode::BAD_REQUEST, None)
            }
            AppError::MethodNotAllowed => {
                tracing::debug!("Rejected request with unsupported method");
                (StatusCode::METHOD_NOT_ALLOWED, None)
            }
            // Deliberately the same shape as other generic rejections so
            // bots get no signal that the honeypot was the trigger.
            AppError::Spam => {
                tracing::info!("Honeypot field populated, rejecting submission");
                (StatusCode::BAD_REQUEST, None)
            }
            AppError::Validation(errors) => {
                tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "Submission failed validation");
                (StatusCode::UNPROCESSABLE_ENTITY, Some(errors))
            }
            AppError::Delivery => {
                tracing::error!("All mail transports failed");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = match errors {
            Some(errors) => Json(json!({
                "ok": false,
                "message": message,
                "errors": errors,
            })),
            None => Json(json!({
                "ok": false,
                "message": message,
            })),
        };

        (status, body).into_response()
    }
}
