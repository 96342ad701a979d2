use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use matchday::config::Config;
use matchday::graphql::{query_registry, GraphqlClient};
use matchday::llm::claude::ClaudeClient;
use matchday::routes::configure_routes;
use matchday::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine; the environment may already be set
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = config.bind_address().parse()?;

    let provider = ClaudeClient::new(config.claude.endpoint.clone(), config.claude.model.clone())
        .await?;
    tracing::info!(model = ?config.claude.model, "model client ready");

    let graphql = GraphqlClient::new(config.graphql.endpoint.clone(), config.graphql.auth).await?;
    tracing::info!(endpoint = %graphql.endpoint(), auth = ?config.graphql.auth, "GraphQL client ready");

    let tools = query_registry(Arc::new(graphql))?;
    tracing::info!(tools = tools.declarations().len(), "tool catalog registered");

    let state = AppState::new(Arc::new(provider), tools, config.agent.clone());
    let routes = configure_routes(state);

    tracing::info!(%addr, "starting server");
    warp::serve(routes).run(addr).await;

    Ok(())
}
