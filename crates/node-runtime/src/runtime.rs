//! # Node Runtime
//!
//! Owns the TCP deliver server and its shutdown signal.

use std::net::SocketAddr;
use std::sync::Arc;

use qc_18_block_delivery::{DeliverApi, DeliverError, DeliverServer};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::container::{ContainerError, NodeConfig, NodeContainer};

/// A deliver node: channel registry plus the server serving it.
pub struct NodeRuntime {
    /// Channels, policies and session handler.
    container: Arc<NodeContainer>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver, cloned into the server task.
    shutdown_rx: watch::Receiver<bool>,
    /// Running accept loop, once started.
    server: Option<JoinHandle<Result<(), DeliverError>>>,
}

impl NodeRuntime {
    /// Build the node from `config`. Channels are created immediately.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        info!("Creating Quantum-Chain deliver node");
        let container = Arc::new(NodeContainer::new(config)?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
            server: None,
        })
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Returns the bound address, which differs from the configured one
    /// when port 0 was requested.
    pub async fn start(&mut self) -> Result<SocketAddr, DeliverError> {
        let deliver = &self.container.config.deliver;
        let listener = DeliverServer::bind(deliver.listen_addr).await?;
        let local_addr = listener.local_addr()?;

        let handler: Arc<dyn DeliverApi> = self.container.handler.clone();
        let server = DeliverServer::new(handler, deliver.max_frame_size);
        let shutdown = self.shutdown_rx.clone();
        self.server = Some(tokio::spawn(async move {
            server.serve(listener, shutdown).await
        }));

        info!(addr = %local_addr, "Deliver node started");
        Ok(local_addr)
    }

    /// Signal shutdown and wait for the accept loop and its sessions to end.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        if let Some(server) = self.server.take() {
            match server.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "Deliver server failed"),
                Err(e) => error!(error = %e, "Deliver server task panicked"),
            }
        }

        info!("Shutdown complete");
    }

    /// Get a reference to the node container.
    pub fn container(&self) -> Arc<NodeContainer> {
        Arc::clone(&self.container)
    }
}
