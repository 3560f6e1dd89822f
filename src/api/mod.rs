use crate::error::AppError;
use crate::services::contact::ContactService;
use axum::body::Body;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::{Next, from_fn};
use axum::response::{IntoResponse, Response};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod contact;
pub mod health;
pub mod schemas;

#[derive(Clone, Debug)]
pub struct AppState {
    pub contact_service: ContactService,
}

/// Configures and returns the application router.
pub fn app_router(state: AppState) -> Router {
    // The confidentiality check is layered over the whole contact slice,
    // so it runs before the method fallback: a bad verb over a bad channel
    // is reported as a transport problem, not a method problem.
    let contact_routes = Router::new()
        .route("/contact", post(contact::submit))
        .method_not_allowed_fallback(contact::method_not_allowed)
        .layer(from_fn(enforce_confidential_channel));

    Router::new()
        .route("/livez", get(health::livez))
        .merge(contact_routes)
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Rejects submissions that did not arrive over a confidential channel,
/// unless the request targets a local-development host.
async fn enforce_confidential_channel(request: Request<Body>, next: Next) -> Response {
    if is_confidential(request.headers()) || is_local_development(request.headers()) {
        next.run(request).await
    } else {
        AppError::InsecureTransport.into_response()
    }
}

/// TLS termination happens upstream; the proxy attests to it with
/// `X-Forwarded-Proto`.
fn is_confidential(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

fn is_local_development(headers: &HeaderMap) -> bool {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|host| host.starts_with("localhost") || host.starts_with("127.0.0.1"))
}
