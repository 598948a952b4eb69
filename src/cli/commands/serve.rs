//! Serving loop shared by the `run`, `filter` and `mux` commands

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

use crate::agent::{Proxy, Server, UpstreamSpec, build_agent};
use crate::logging;

/// One socket to serve and the upstreams behind it
#[derive(Debug, Clone)]
pub struct SocketPlan {
    /// Name used in logs
    pub name: String,
    /// Listen path
    pub path: PathBuf,
    /// Upstream agents, in order
    pub upstreams: Vec<UpstreamSpec>,
}

/// Serve every planned socket until SIGINT or SIGTERM
///
/// All upstreams are dialed and all sockets bound before any client is
/// accepted, so a startup failure never leaves a partial set of sockets
/// behind.
pub async fn serve(plans: Vec<SocketPlan>, log_path: Option<PathBuf>) -> Result<()> {
    let event_log = log_path
        .as_deref()
        .map(logging::open_event_log)
        .transpose()?;

    let mut servers = Vec::with_capacity(plans.len());
    for plan in &plans {
        let agent = build_agent(&plan.upstreams)
            .await
            .with_context(|| format!("Failed to connect upstreams of socket '{}'", plan.name))?;

        let mut server = Server::new(&plan.path);
        server
            .bind()
            .await
            .with_context(|| format!("Failed to create socket '{}'", plan.name))?;

        let mut proxy = Proxy::new(agent)
            .with_socket_path(server.socket_path().display().to_string());
        if let Some(writer) = &event_log {
            proxy = proxy.with_event_log(Arc::clone(writer));
        }

        let upstreams: Vec<String> = plan
            .upstreams
            .iter()
            .map(|u| u.path.display().to_string())
            .collect();
        info!(
            socket = %plan.name,
            path = %plan.path.display(),
            upstreams = ?upstreams,
            "Configured socket"
        );
        servers.push((server, Arc::new(proxy)));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handles: Vec<_> = servers
        .into_iter()
        .map(|(server, proxy)| {
            let shutdown_rx = shutdown_rx.clone();
            tokio::spawn(async move { server.serve(proxy, shutdown_rx).await })
        })
        .collect();

    info!(sockets = handles.len(), "authsock-mux started. Press Ctrl+C to stop.");

    wait_for_shutdown().await;
    let _ = shutdown_tx.send(true);

    for handle in handles {
        if let Err(e) = handle.await.context("Server task panicked")? {
            error!(error = %e, "Server stopped with an error");
        }
    }

    info!("Shutdown complete");
    Ok(())
}

async fn wait_for_shutdown() {
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                error!(error = %err, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
        _ = terminate => {}
    }

    info!("Received shutdown signal, stopping...");
}
