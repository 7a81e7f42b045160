use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::metrics::setup_metrics_routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Build the service router around an opened pool. `recorder` adds `/metrics` and
/// per-request metrics when set.
pub fn router(state: AppState, recorder: Option<PrometheusHandle>) -> Router {
    let router = health::register(Router::new()).layer(TraceLayer::new_for_http());

    let router = match recorder {
        Some(recorder) => setup_metrics_routes(router, recorder),
        None => router,
    };

    router.with_state(state)
}
