use crate::metrics::WeatherCollector;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

pub const METRICS_PATH: &str = "/metrics";

const INDEX_PAGE: &str = r#"<html>
<head><title>Weather Exporter</title></head>
<body>
<h1>Weather Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>"#;

pub fn router(collector: Arc<WeatherCollector>) -> Router {
    Router::new()
        .route("/", get(index))
        .route(METRICS_PATH, get(metrics))
        .with_state(collector)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn metrics(State(collector): State<Arc<WeatherCollector>>) -> Response {
    match collector.render().await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics").into_response()
        }
    }
}
