use std::time::Instant;

use axum::{Router, extract::Request, middleware, response::Response};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::utils::AppError;
use crate::utils::logger::ACCESS_TARGET;

/// HTTP 请求日志中间件
async fn log_request(request: Request, next: middleware::Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: ACCESS_TARGET,
        %method,
        %uri,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        request_id = %request_id,
        "request"
    );

    response
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::orders::router())
        .merge(crate::api::credits::router())
        .merge(crate::api::reports::router())
        .fallback(route_not_found)
}

/// Build the complete service: routes, state and the tower-http stack
///
/// Layer order, outermost first: request id, tracing, request id
/// propagation, CORS, compression, access log.
pub fn build_router(state: ServerState) -> Router {
    build_app().with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .layer(middleware::from_fn(log_request)),
    )
}
