use std::{net::SocketAddr, time::Duration};

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{
        Method, Request, Response,
        header::{ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    },
    routing::get,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::{
    handlers, structs::AppState, summarizer::Summarizer,
    timedtext::IdValidator, transcript::TranscriptSource,
};

/// Builds the public router: routes, CORS, request logging and
/// compression.
pub fn router<V, T, S>(state: AppState<V, T, S>) -> Router
where
    V: IdValidator,
    T: TranscriptSource,
    S: Summarizer,
{
    // Set up a trace layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let remote_addr = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.to_string())
                .unwrap_or_default();

            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                remote_addr = %remote_addr,
            )
        })
        .on_request(|request: &Request<Body>, _: &Span| {
            tracing::debug!(
                "received request: {method} {uri}",
                method = request.method(),
                uri = request.uri()
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "request completed"
                );
            },
        );

    // Every response gets the CORS headers; any OPTIONS request is answered
    // here with an empty 200 before reaching the routes.
    let cors_layer = CorsLayer::new()
        .allow_headers([
            ACCEPT,
            ACCEPT_ENCODING,
            AUTHORIZATION,
            CONTENT_TYPE,
            ORIGIN,
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(Any);

    let compression_layer = CompressionLayer::new().gzip(true).deflate(true);

    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/api/transcript", get(handlers::missing_video_id_handler))
        .route("/api/transcript/", get(handlers::missing_video_id_handler))
        .route(
            "/api/transcript/{id}",
            get(handlers::transcript_summary_handler::<V, T, S>),
        )
        .fallback(handlers::not_found)
        .layer(cors_layer)
        .layer(trace_layer)
        .layer(compression_layer)
        .with_state(state)
}
