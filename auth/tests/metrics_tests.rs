use reqwest::StatusCode;

mod common;
use common::*;

#[tokio::test]
async fn exposes_prometheus_metrics_when_enabled() {
    let server = ServerHandle::for_config(test_config(&[("ENABLE_METRICS", "true")])).await;
    let addr = server.addr().await.expect("server did not start");

    let health = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let metrics = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
    let body = metrics.text().await.unwrap();
    assert!(body.contains("lifecycle_phase"), "{body}");
    assert!(body.contains("http_requests_total"), "{body}");
    assert!(body.contains(r#"path="/health""#), "{body}");

    assert!(server.stop().await.is_ok());
}
