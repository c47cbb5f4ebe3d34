//! # In-Process Transport
//!
//! A deliver stream backed by two `mpsc` channels, for embedding the
//! handler without a socket.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{DeliverError, DeliverResponse, Envelope};
use crate::ports::DeliverStream;

/// Server half of an in-process stream.
pub struct MemoryStream {
    requests: mpsc::Receiver<Result<Envelope, DeliverError>>,
    responses: mpsc::Sender<DeliverResponse>,
}

/// Client half of an in-process stream.
pub struct MemoryClient {
    requests: Option<mpsc::Sender<Result<Envelope, DeliverError>>>,
    responses: mpsc::Receiver<DeliverResponse>,
}

/// Create a connected stream pair with `buffer` slots in each direction.
pub fn memory_stream(buffer: usize) -> (MemoryStream, MemoryClient) {
    let (request_tx, request_rx) = mpsc::channel(buffer.max(1));
    let (response_tx, response_rx) = mpsc::channel(buffer.max(1));
    (
        MemoryStream {
            requests: request_rx,
            responses: response_tx,
        },
        MemoryClient {
            requests: Some(request_tx),
            responses: response_rx,
        },
    )
}

#[async_trait]
impl DeliverStream for MemoryStream {
    async fn recv(&mut self) -> Result<Option<Envelope>, DeliverError> {
        self.requests.recv().await.transpose()
    }

    async fn send(&mut self, response: DeliverResponse) -> Result<(), DeliverError> {
        self.responses
            .send(response)
            .await
            .map_err(|_| DeliverError::ConnectionClosed)
    }
}

impl MemoryClient {
    /// Send a request envelope.
    pub async fn send(&self, envelope: Envelope) -> Result<(), DeliverError> {
        self.push(Ok(envelope)).await
    }

    /// Make the server's next receive fail with `err`.
    pub async fn fail(&self, err: DeliverError) -> Result<(), DeliverError> {
        self.push(Err(err)).await
    }

    /// Next response; `None` once the server dropped its half.
    pub async fn recv(&mut self) -> Option<DeliverResponse> {
        self.responses.recv().await
    }

    /// Close the request direction (a clean hangup).
    pub fn close(&mut self) {
        self.requests.take();
    }

    async fn push(&self, item: Result<Envelope, DeliverError>) -> Result<(), DeliverError> {
        let requests = self.requests.as_ref().ok_or(DeliverError::ConnectionClosed)?;
        requests
            .send(item)
            .await
            .map_err(|_| DeliverError::ConnectionClosed)
    }
}
