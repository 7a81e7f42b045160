use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

pub const LIVENESS_PATH: &str = "/health";
pub const READINESS_PATH: &str = "/ready";

/// Liveness probe answer: the process is up and able to respond.
#[derive(Debug, Clone, Copy, Default)]
pub struct LivenessStatus;

impl IntoResponse for LivenessStatus {
    fn into_response(self) -> Response {
        (StatusCode::OK, "ok").into_response()
    }
}

/// Readiness probe answer.
///
/// Always ready for now: dependencies such as the database pool are not consulted,
/// so a lost database does not take the instance out of rotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadinessStatus;

impl IntoResponse for ReadinessStatus {
    fn into_response(self) -> Response {
        (StatusCode::OK, "ready").into_response()
    }
}

pub async fn liveness() -> LivenessStatus {
    LivenessStatus
}

pub async fn readiness() -> ReadinessStatus {
    ReadinessStatus
}

/// Add the liveness and readiness routes to `router`.
pub fn register<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .route(LIVENESS_PATH, get(liveness))
        .route(READINESS_PATH, get(readiness))
}
