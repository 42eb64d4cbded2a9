use axum::{extract::DefaultBodyLimit, Router};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::WebConfig;

pub mod api;
pub mod common;
pub mod config;

pub fn app(config: &WebConfig) -> Router {
    Router::new()
        .merge(api::routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
}

pub async fn start_web_server(config: WebConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.bind_address).await?;
    serve(listener, config).await
}

/// Serves the app on an already bound listener until the server fails.
pub async fn serve(listener: TcpListener, config: WebConfig) -> std::io::Result<()> {
    log::info!(
        "listening on {} (max upload {} bytes)",
        listener.local_addr()?,
        config.max_upload_bytes
    );
    axum::serve(listener, app(&config).into_make_service()).await?;

    Ok(())
}
