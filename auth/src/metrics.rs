use std::future::ready;
use std::sync::OnceLock;
use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const METRICS_PATH: &str = "/metrics";

static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global prometheus recorder, or return the one already installed.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = RECORDER.get() {
        return Ok(handle.clone());
    }

    const BUCKETS: &[f64] = &[
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    let installed = PrometheusBuilder::new()
        .set_buckets(BUCKETS)
        .and_then(PrometheusBuilder::install_recorder);
    match installed {
        Ok(handle) => Ok(RECORDER.get_or_init(|| handle).clone()),
        // lost a race with a concurrent install
        Err(e) => RECORDER.get().cloned().ok_or(e),
    }
}

/// Add the prometheus endpoint and middleware to a router, should be called last.
pub fn setup_metrics_routes<S>(router: Router<S>, recorder: PrometheusHandle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .route(METRICS_PATH, get(move || ready(recorder.render())))
        .layer(axum::middleware::from_fn(track_metrics))
}

/// Record a request counter and latency histogram per route, method and status.
pub async fn track_metrics(req: Request<Body>, next: Next) -> impl IntoResponse {
    let start = Instant::now();

    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };
    let method = req.method().clone();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_requests_duration_seconds", &labels).record(latency);

    response
}
