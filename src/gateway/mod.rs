//! HTTP gateway over a shared [`PriceOracle`](crate::oracle::PriceOracle)
//!
//! Public routes read; `/admin` routes mutate and require the governance
//! principal in the `X-Principal` header.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::Context;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/price", post(handlers::feed_price))
        .route("/price/{base}/{quote}", delete(handlers::remove_price))
        .route("/adapter", post(handlers::add_adapter))
        .route("/adapter/{adapter}", delete(handlers::remove_adapter))
        .route(
            "/master_quote_asset",
            put(handlers::edit_master_quote_asset),
        )
        .route("/governance", put(handlers::transfer_governance));

    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/price/{base}/{quote}", get(handlers::get_price))
        .route("/adapters", get(handlers::get_adapters))
        .route("/oracle", get(handlers::get_oracle_info))
        .route("/events", get(handlers::get_events))
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api/v1", api_routes)
        .with_state(state)
        // stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the process is stopped
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("Swagger UI at http://{}/docs", addr);

    axum::serve(listener, router(state))
        .await
        .context("gateway server error")
}
