//! HTTP surface: router construction and the server loop.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{HeaderName, HeaderValue, Request},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
pub mod pages;

use crate::store::Stores;
use handlers::auth::{self, providers::CodeExchanger, state::AuthConfig};

/// Build the full route table with its middleware stack. Takes the store
/// and exchanger seams explicitly so tests can wire in memory-backed fakes.
pub fn router(
    stores: Stores,
    config: Arc<AuthConfig>,
    exchanger: Arc<dyn CodeExchanger>,
) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/login", get(handlers::login_page).post(auth::local::login))
        .route(
            "/register",
            get(handlers::register_page).post(auth::local::register),
        )
        .route("/secrets", get(handlers::secrets))
        .route(
            "/submit",
            get(handlers::submit_page).post(handlers::submit),
        )
        .route("/logout", get(handlers::logout))
        .route("/auth/:provider", get(auth::oauth::authorize))
        .route("/auth/:provider/secrets", get(auth::oauth::callback))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(config))
                .layer(Extension(exchanger))
                .layer(Extension(stores)),
        )
}

/// Bind and serve until ctrl-c.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn new(
    port: u16,
    stores: Stores,
    config: Arc<AuthConfig>,
    exchanger: Arc<dyn CodeExchanger>,
) -> Result<()> {
    let app = router(stores, config, exchanger);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
