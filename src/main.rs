use std::net::SocketAddr;

use checkout_bridge::{
    api::create_router,
    api::middleware::{init_tracing, init_tracing_dev},
    config::Config,
    db::open_repository,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    if config.server.development {
        init_tracing_dev();
    } else {
        init_tracing();
    }

    tracing::info!("Starting checkout bridge v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(?config, "Configuration loaded successfully");

    if config.billdesk.is_none() && config.razorpay.is_none() {
        tracing::warn!("Neither BillDesk nor Razorpay is configured; only health routes are served");
    }

    // Order store
    let orders = open_repository(&config.storage).await?;

    tracing::info!("Order store initialized");

    // Gateways
    let state = AppState::new(config.clone(), orders)?;

    tracing::info!(
        billdesk = state.billdesk.is_some(),
        razorpay = state.razorpay.is_some(),
        "Payment gateways initialized"
    );

    // Create router
    let app = create_router(state);

    // Start server
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid HOST '{}': {}", config.server.host, e))?;
    let addr = SocketAddr::from((host, config.server.port));

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Checkout bridge is ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
