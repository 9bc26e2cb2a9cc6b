mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use metrics_exporter_prometheus::PrometheusBuilder;
use redirect_resolver::api::handlers::{metrics_handler, resolve_handler};

#[test]
fn test_metrics_exposes_resolution_counters() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let body = metrics::with_local_recorder(&recorder, || {
        runtime.block_on(async {
            let ctx = common::create_test_state();
            let app = Router::new()
                .route("/api/resolve", get(resolve_handler))
                .with_state(ctx.state.clone())
                .merge(
                    Router::new()
                        .route("/metrics", get(metrics_handler))
                        .with_state(handle),
                );
            let server = TestServer::new(app).unwrap();

            for _ in 0..2 {
                server
                    .get("/api/resolve")
                    .add_query_param("url", "https://bit.ly/abc")
                    .await
                    .assert_status_ok();
            }

            let response = server.get("/metrics").await;
            response.assert_status_ok();
            response.text()
        })
    });

    assert!(body.contains(r#"redirect_resolutions_total{type="local"} 1"#));
    assert!(body.contains(r#"redirect_resolutions_total{type="cache"} 1"#));
}
