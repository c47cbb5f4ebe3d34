//! # TCP Deliver Server
//!
//! Accept loop running one independent task per client connection.
//! A session blocked on a cursor only occupies its own task; shutdown
//! tears every open session down.
//!
//! A blocked session does not watch its socket. When the client goes
//! away mid-wait, the task and its connection are released by the next
//! append (the block send fails) or by server shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::framed::FramedStream;
use crate::domain::DeliverError;
use crate::ports::DeliverApi;

/// Serves the deliver protocol over TCP.
pub struct DeliverServer {
    handler: Arc<dyn DeliverApi>,
    max_frame_size: usize,
}

impl DeliverServer {
    /// Create a server dispatching sessions to `handler`.
    pub fn new(handler: Arc<dyn DeliverApi>, max_frame_size: usize) -> Self {
        Self {
            handler,
            max_frame_size,
        }
    }

    /// Bind a listener on `addr`.
    pub async fn bind(addr: SocketAddr) -> Result<TcpListener, DeliverError> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Deliver server listening");
        Ok(listener)
    }

    /// Accept connections until `shutdown` flips to `true`.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), DeliverError> {
        let mut sessions = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (socket, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };
                    if let Err(e) = socket.set_nodelay(true) {
                        debug!(%peer, error = %e, "Failed to set TCP_NODELAY");
                    }
                    self.spawn_session(&mut sessions, socket, peer);
                }
                Some(_) = sessions.join_next(), if !sessions.is_empty() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(open_sessions = sessions.len(), "Deliver server shutting down");
        sessions.shutdown().await;
        Ok(())
    }

    fn spawn_session(
        &self,
        sessions: &mut JoinSet<()>,
        socket: tokio::net::TcpStream,
        peer: SocketAddr,
    ) {
        let handler = Arc::clone(&self.handler);
        let max_frame_size = self.max_frame_size;
        let session_id = Uuid::new_v4();
        let span = info_span!("deliver_session", %session_id, %peer);

        sessions.spawn(
            async move {
                debug!("Deliver session opened");
                let mut stream = FramedStream::new(socket, max_frame_size);
                match handler.handle(&mut stream).await {
                    Ok(outcome) => debug!(?outcome, "Deliver session ended"),
                    Err(e) => warn!(error = %e, "Deliver session failed"),
                }
            }
            .instrument(span),
        );
    }
}
