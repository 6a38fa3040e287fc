use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

const LOG_TARGET: &str = "server::http";

/// Log every request with its status and latency.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    tracing::info!(
        target: LOG_TARGET,
        %method,
        %path,
        status = %response.status().as_u16(),
        duration_ms = %duration.as_millis(),
        "request completed"
    );

    response
}
