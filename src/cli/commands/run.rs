//! Run command - serve every socket of the configuration file

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use super::serve::{SocketPlan, serve};
use crate::cli::args::RunArgs;
use crate::config::{load_config, resolve_config_path};

/// Execute the run command
pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let path = resolve_config_path(config_path.as_deref())?;
    let config_file = load_config(&path)?;
    let expanded = config_file
        .config
        .expand()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    info!(
        config = %path.display(),
        sockets = expanded.sockets.len(),
        "Starting authsock-mux"
    );

    let plans = expanded
        .sockets
        .into_iter()
        .map(|socket| SocketPlan {
            name: socket.name,
            path: socket.path,
            upstreams: socket.upstreams,
        })
        .collect();

    serve(plans, args.log.or(expanded.log_path)).await
}
