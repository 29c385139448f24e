mod api;
mod config;
mod models;
mod services;
mod sources;

use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_rest_router, AppState};
use config::Config;
use services::{Enricher, PairCollector, ResultCache, TokenAggregator, TokenPipeline};
use sources::{dexscreener::DexScreenerClient, subgraph::SubgraphClient};

#[tokio::main(worker_threads = 4)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,token_screener=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("configuration loaded");

    let cache = Arc::new(ResultCache::new(Duration::from_secs(config.cache.ttl_secs)));
    let subgraph = Arc::new(SubgraphClient::new(&config.subgraph));
    let screener = Arc::new(DexScreenerClient::new(&config.screener));

    let pipeline = Arc::new(TokenPipeline::new(
        PairCollector::new(subgraph, config.subgraph.page_size),
        TokenAggregator::new(config.filter.excluded_symbols.clone()),
        Enricher::new(
            screener,
            config.screener.batch_size,
            config.screener.max_concurrent,
        ),
        cache.clone(),
    ));

    let state = Arc::new(AppState { pipeline, cache });
    let app = create_rest_router(state).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server ready on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
