use std::{net::SocketAddr, time::Duration};

use anyhow::Result;
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{config::config_model::WorkerServer, infrastructure::axum_http::default_routers};

pub fn router(worker_server: &WorkerServer) -> Router {
    Router::new()
        .fallback(default_routers::not_found)
        .route("/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(worker_server.timeout)))
        .layer(TraceLayer::new_for_http())
}

pub async fn start(worker_server: WorkerServer) -> Result<()> {
    let app = router(&worker_server);

    let addr = SocketAddr::from(([0, 0, 0, 0], worker_server.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "http_serve: billing worker HTTP server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "http_serve: failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "http_serve: failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("http_serve: received ctrl+C signal"),
        _ = terminate => info!("http_serve: received terminate signal"),
    }
}
