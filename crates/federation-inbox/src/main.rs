//! Federation inbox server.
//!
//! Accepts ActivityStreams activities over HTTP and hands them to
//! `federation-core` for resolution and normalization.

mod api;
mod config;
mod inbox;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use config::InboxConfig;
use inbox::InboxState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = InboxConfig::from_env();
    let state = Arc::new(InboxState::new(&config));
    let app = router(state, config.body_limit);

    tracing::info!("Federation inbox {} listening on {}", env!("BUILD_VERSION"), config.addr);
    tracing::info!("Shared inbox: http://{}/inbox", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await
}

fn router(state: Arc<InboxState>, body_limit: usize) -> Router {
    Router::new()
        .route("/inbox", post(api::shared_inbox))
        .route("/users/{name}/inbox", post(api::user_inbox))
        .route("/api/activities", get(api::list_activities))
        .route("/api/resolve/statusable", post(api::resolve_statusable))
        .route("/api/resolve/accountable", post(api::resolve_accountable))
        .route("/health", get(health))
        .route("/version", get(version))
        // Inbox bodies are streamed, so the limit has to wrap the body itself.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> &'static str {
    env!("BUILD_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn version_carries_package_version() {
        let version = version().await;
        let (package, revision) = match version.split_once('+') {
            Some((package, revision)) => (package, Some(revision)),
            None => (version, None),
        };
        assert_eq!(package, env!("CARGO_PKG_VERSION"));
        assert!(revision.is_none_or(|revision| !revision.is_empty()));
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }
}
