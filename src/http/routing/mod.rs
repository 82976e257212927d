use std::time::Instant;

use axum::{extract::Request, middleware::{self, Next}, response::Response, routing::get, Router};
use tower::ServiceBuilder;

pub use super::routes::items;

pub fn app(router: Router) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(router)
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_request)))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
