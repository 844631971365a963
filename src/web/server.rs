use std::sync::Arc;

use axum::{http::Method, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::catalog::{Aggregator, CacheStore, GroupFetcher};

use super::api::{self, AppState};
use super::api_doc::ApiDoc;
use super::config::Config;

pub fn build_aggregator(config: &Config) -> Result<Aggregator, crate::catalog::CatalogError> {
    let fetcher = GroupFetcher::new(
        config.catalog.sources.clone(),
        config.catalog.request_timeout,
    )?;
    let cache = CacheStore::new(config.catalog.cache_dir.clone(), config.catalog.cache_max_age);
    Ok(Aggregator::new(fetcher, cache))
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let refresh_interval = config.catalog.refresh_interval;

    let aggregator = Arc::new(
        build_aggregator(&config).map_err(|e| std::io::Error::other(e.to_string()))?,
    );

    // Initial load plus periodic re-sync; handlers always serve whatever the
    // aggregator has published so far.
    let background = aggregator.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        loop {
            interval.tick().await;
            let status = background.refresh().await;
            log::info!("catalog refresh finished: {}", status);
        }
    });

    let state = AppState { aggregator };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/satellites", get(api::list_satellites))
        .route("/api/satellites/{id}/stats", get(api::satellite_stats))
        .route("/api/status", get(api::catalog_status))
        .route("/api/groups", get(api::list_groups))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
