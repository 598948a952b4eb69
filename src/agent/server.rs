//! Unix socket server for SSH agent proxy
//!
//! This module provides a Unix socket server that listens for client
//! connections and spawns a proxy session for each connection.

use crate::agent::Proxy;
use crate::error::{Error, Result};
use crate::logging::LogEvent;
use crate::utils::socket;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

/// Unix socket server for accepting SSH agent client connections
pub struct Server {
    /// Path to the socket file
    socket_path: PathBuf,
    /// The listener (created on bind)
    listener: Option<UnixListener>,
}

impl Server {
    /// Create a new server that will listen on the specified path
    pub fn new<P: AsRef<Path>>(socket_path: P) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            listener: None,
        }
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Bind the server to the socket path
    ///
    /// A stale socket from a crashed process is replaced. Any other file
    /// already at the path, including a symlink, is left alone and the bind
    /// fails. The new socket is only accessible by its owner.
    pub async fn bind(&mut self) -> Result<()> {
        socket::prepare_socket_path(&self.socket_path)
            .map_err(|e| Error::Socket(e.to_string()))?;

        let listener = socket::bind_owner_only(&self.socket_path)
            .map_err(|e| Error::Socket(e.to_string()))?;

        info!(path = %self.socket_path.display(), "Server listening");
        self.listener = Some(listener);
        Ok(())
    }

    /// Run the server with a connection handler
    ///
    /// Each connection is handled on its own task. Runs until the shutdown
    /// signal is received.
    pub async fn run<F, Fut>(
        &self,
        handler: F,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<()>
    where
        F: Fn(UnixStream) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| Error::Socket("Server is not bound".to_string()))?;

        let handler = Arc::new(handler);

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!(
                            path = %self.socket_path.display(),
                            "Received shutdown signal, stopping server"
                        );
                        break;
                    }
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, _addr)) => {
                            trace!("Accepted new client connection");
                            let handler = Arc::clone(&handler);
                            tokio::spawn(async move {
                                if let Err(e) = handler(stream).await {
                                    debug!(error = %e, "Connection handler error");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Serve `proxy` to every client until shutdown
    pub async fn serve(&self, proxy: Arc<Proxy>, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        proxy.log_event(&LogEvent::server_start(proxy.socket_path()));

        let session = Arc::clone(&proxy);
        let result = self
            .run(
                move |stream| {
                    let proxy = Arc::clone(&session);
                    async move { proxy.handle_client(stream).await }
                },
                shutdown_rx,
            )
            .await;

        proxy.log_event(&LogEvent::server_stop(proxy.socket_path()));
        result
    }

    /// Remove the socket file if this server created it
    fn cleanup(&self) {
        if self.listener.is_some() {
            remove_socket_file(&self.socket_path);
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn remove_socket_file(path: &Path) {
    if let Err(e) = socket::remove_existing_socket(path) {
        warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove socket file during cleanup"
        );
    } else {
        debug!(path = %path.display(), "Removed socket file");
    }
}
