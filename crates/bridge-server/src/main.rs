//! Binary entry point: load configuration, synthesise the initial tool
//! registry, and serve the MCP endpoint (spec §4.10).

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .json()
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining in-flight requests");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config_path = bridge_config::paths::config_file()?;
    let config = if config_path.exists() {
        info!(path = %config_path.display(), "loading configuration");
        bridge_config::load_from_path(&config_path)?
    } else {
        info!(path = %config_path.display(), "no configuration file found, starting with defaults");
        bridge_config::ServerConfig::default()
    };

    let bind_addr: SocketAddr = config.bind_addr.parse()?;
    let mcp_path = config.mcp_path.clone();
    let route_count = config.routes.len();

    let state = bridge_server::AppState::new(config);
    info!(tools = state.registry().len(), routes = route_count, path = %mcp_path, "tool registry built");

    let app = bridge_server::build_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, path = %mcp_path, "kong-mcp-bridge listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}
