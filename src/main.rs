use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway::proxy::upstream::UpstreamClient;
use gateway::routes::RouteTable;
use gateway::store::RedisStore;
use gateway::token::TokenVerifier;
use gateway::{config, AppState};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "gateway=debug,api_gateway=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let port = match args.command {
        Some(cli::Commands::Serve { port }) => port.unwrap_or(cfg.port),
        None => cfg.port,
    };

    run_server(cfg, port).await
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to Redis...");
    let store = Arc::new(RedisStore::connect(&cfg.redis_url).await?);

    let routes = RouteTable::from_config(&cfg)?;
    let verifier = TokenVerifier::new(&cfg.jwt_secret);

    let state = Arc::new(AppState {
        store,
        verifier,
        routes,
        upstream: UpstreamClient::new(),
        config: cfg,
    });

    let app = gateway::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API gateway listening on {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
