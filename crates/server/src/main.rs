use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interceptor_core::{
    load_config, validate_config, AttachmentSignal, HttpRobotClient, InterceptOrchestrator,
    RobotServices, TaskQueue,
};
use interceptor_server::api::create_router;
use interceptor_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("INTERCEPTOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Transport group: {} ({}), manipulator group: {} ({})",
        config.robot.transport.group,
        config.robot.transport.controller,
        config.robot.manipulator.group,
        config.robot.manipulator.controller
    );

    // Connect to the motion services
    info!("Using robot services at {}", config.services.url);
    let client = HttpRobotClient::new(config.services.clone())
        .context("Failed to create robot services client")?;

    if config.services.wait_for_ready {
        let timeout = Duration::from_secs(config.services.ready_timeout_secs);
        info!("Waiting up to {:?} for robot services", timeout);
        client
            .wait_until_ready(timeout)
            .await
            .context("Robot services not available")?;
        info!("Robot services ready");
    }

    let services = RobotServices::from_single(Arc::new(client));

    // Create orchestrator
    let orchestrator = Arc::new(InterceptOrchestrator::new(
        &config,
        services,
        TaskQueue::new(),
        AttachmentSignal::new(),
    ));

    if config.orchestrator.enabled {
        orchestrator.start().await;
    } else {
        info!("Orchestrator disabled in config");
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&orchestrator)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if orchestrator.is_running() {
        orchestrator.stop().await;
        info!("Orchestrator stopped");
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
