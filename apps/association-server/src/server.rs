//! Database bootstrap and HTTP server lifecycle

use crate::config::{AppConfig, DatabaseConfig, ServerConfig};
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use enrollment_service::EnrollmentServiceModule;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(config.connect_timeout)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .context("failed to connect to the database")?;
    tracing::info!(max_connections = config.max_connections, "database connected");
    Ok(db)
}

/// Build a module over `db`, ready to serve or run maintenance commands
pub fn init_module(config: &AppConfig, db: DatabaseConnection) -> Result<EnrollmentServiceModule> {
    let module = EnrollmentServiceModule::new(config.enrollment.clone());
    module.init(Arc::new(db))?;
    Ok(module)
}

pub fn build_router(module: &EnrollmentServiceModule, config: &ServerConfig) -> Result<Router> {
    let router = module
        .register_rest(Router::new())?
        .route("/health", get(|| async { "ok" }))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

pub async fn serve(config: AppConfig, db: DatabaseConnection) -> Result<()> {
    if config.database.run_migrations {
        EnrollmentServiceModule::migrate(&db).await?;
    }

    let module = init_module(&config, db)?;
    let app = build_router(&module, &config.server)?;

    let listener = TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "association server listening");

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("server error")?;

    tracing::info!("association server stopped");
    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received terminate signal, shutting down"),
    }
    token.cancel();
}
