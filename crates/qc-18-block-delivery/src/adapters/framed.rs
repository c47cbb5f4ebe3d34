//! # Framed Transport
//!
//! Length-prefixed bincode frames over any byte stream.
//!
//! ```text
//! ┌──────────────┬──────────────────────────┐
//! │ len: u32 BE  │ bincode body (len bytes) │
//! └──────────────┴──────────────────────────┘
//! ```
//!
//! EOF on a frame boundary is a clean close; EOF inside a frame is a
//! transport error.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::domain::{marshal, unmarshal, DeliverError, DeliverResponse, Envelope};
use crate::ports::DeliverStream;

const LEN_PREFIX: usize = 4;

/// Frame codec over an async byte stream.
pub struct FramedStream<T> {
    io: T,
    max_frame_size: usize,
}

impl<T> FramedStream<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap `io`, rejecting inbound frames over `max_frame_size` bytes.
    pub fn new(io: T, max_frame_size: usize) -> Self {
        Self { io, max_frame_size }
    }

    /// Read one frame; `Ok(None)` on a clean close.
    pub async fn read_frame<M: DeserializeOwned>(&mut self) -> Result<Option<M>, DeliverError> {
        let mut len_buf = [0u8; LEN_PREFIX];
        let mut filled = 0;
        while filled < LEN_PREFIX {
            let n = self.io.read(&mut len_buf[filled..]).await?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(DeliverError::Transport(
                    "connection closed inside frame header".to_string(),
                ));
            }
            filled += n;
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > self.max_frame_size {
            return Err(DeliverError::FrameTooLarge {
                size: len,
                max: self.max_frame_size,
            });
        }

        let mut body = vec![0u8; len];
        self.io.read_exact(&mut body).await.map_err(|e| {
            DeliverError::Transport(format!("connection closed inside frame body: {}", e))
        })?;
        Ok(Some(unmarshal(&body)?))
    }

    /// Write one frame and flush.
    pub async fn write_frame<M: Serialize + Sync>(&mut self, message: &M) -> Result<(), DeliverError> {
        let body = marshal(message)?;
        let len = u32::try_from(body.len()).map_err(|_| DeliverError::FrameTooLarge {
            size: body.len(),
            max: u32::MAX as usize,
        })?;

        self.io.write_all(&len.to_be_bytes()).await?;
        self.io.write_all(&body).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Shut down the write direction.
    pub async fn shutdown(&mut self) -> Result<(), DeliverError> {
        self.io.shutdown().await?;
        Ok(())
    }
}

#[async_trait]
impl<T> DeliverStream for FramedStream<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<Envelope>, DeliverError> {
        self.read_frame().await
    }

    async fn send(&mut self, response: DeliverResponse) -> Result<(), DeliverError> {
        self.write_frame(&response).await
    }
}
