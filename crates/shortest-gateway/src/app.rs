use axum::extract::Request;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::handlers::{decode_handler, encode_handler, health_handler};
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct App {}

impl App {
    /// Builds the HTTP router. Request spans are children of `root_span`.
    ///
    /// Every request gets an `x-request-id` (a caller-supplied one is kept),
    /// recorded on its span and echoed on the response.
    pub fn router(state: AppState, root_span: Span) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            tracing::info_span!(
                parent: &root_span,
                "request",
                request_id,
                method = %request.method(),
                uri = %request.uri()
            )
        });

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(trace)
            .layer(PropagateRequestIdLayer::x_request_id());

        Router::new()
            .route("/health", get(health_handler))
            .route("/encode", post(encode_handler))
            .route("/decode", post(decode_handler))
            .layer(middleware)
            .with_state(state)
    }
}
