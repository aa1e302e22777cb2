//! Tensura Store storefront binary.
//!
//! Serves the public home page on port 3000. The backend platform handle is
//! initialized at startup so configuration problems surface immediately.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use tensura_storefront::config::StorefrontConfig;
use tensura_storefront::platform::PlatformApp;
use tensura_storefront::state::AppState;
use tensura_storefront::{app, telemetry};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from environment (needed for logging and Sentry)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet; fall back to the default logging config
            let _guard = telemetry::init(&telemetry::LogConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let _telemetry = telemetry::init(&config.logging);

    let platform = match PlatformApp::new(config.platform.clone()) {
        Ok(platform) => platform,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize platform");
            return ExitCode::FAILURE;
        }
    };

    let addr = config.socket_addr();
    let state = AppState::new(config, platform);
    let router = app(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind to address");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("storefront listening on {}", addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
