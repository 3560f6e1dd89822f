use crate::api::AppState;
use crate::api::schemas::contact::{ContactForm, SubmissionResponse};
use crate::error::{AppError, Result};
use axum::{Form, Json, extract::State, response::IntoResponse};

pub async fn submit(
    State(state): State<AppState>,
    Form(payload): Form<ContactForm>,
) -> Result<impl IntoResponse> {
    let message = state.contact_service.submit(payload.into()).await?;

    Ok(Json(SubmissionResponse {
        ok: true,
        message: message.to_owned(),
        errors: None,
    }))
}

/// Fallback for known paths hit with an unsupported verb.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
