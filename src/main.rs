use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

mod config;
mod error;
mod logging;
mod routes;
mod services;

use services::insight_agent::InsightAgent;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::new()?;

    // The narrator client is constructed once here and injected; no lazily
    // initialized globals anywhere in the analytics path.
    let insight_agent = InsightAgent::new(&config.openai_key);

    // Build our application state
    let state = Arc::new(AppState::new(config, insight_agent));

    // Build our application with a route
    let app = Router::new().merge(routes::routes()).with_state(state);

    // Run it
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub insight_agent: InsightAgent,
}

impl AppState {
    fn new(config: config::Config, insight_agent: InsightAgent) -> Self {
        Self {
            config,
            insight_agent,
        }
    }
}
