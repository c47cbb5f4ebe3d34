//! # Response Encoder
//!
//! Wraps blocks and status codes into [`DeliverResponse`] messages.
//! Any status is transmissible, including failures used to end a stream.

use crate::domain::{Block, DeliverError, DeliverResponse, Status};
use crate::ports::DeliverStream;

/// Block-kind response.
pub fn block_reply(block: Block) -> DeliverResponse {
    DeliverResponse::Block(block)
}

/// Status-kind response.
pub fn status_reply(status: Status) -> DeliverResponse {
    DeliverResponse::Status(status)
}

/// Send a status response.
pub async fn send_status_reply(
    stream: &mut dyn DeliverStream,
    status: Status,
) -> Result<(), DeliverError> {
    stream.send(status_reply(status)).await
}

/// Send a block response.
pub async fn send_block_reply(
    stream: &mut dyn DeliverStream,
    block: Block,
) -> Result<(), DeliverError> {
    stream.send(block_reply(block)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_stream;

    #[test]
    fn test_block_reply_wraps_block() {
        let block = Block::genesis(vec![b"tx".to_vec()]);
        assert_eq!(block_reply(block.clone()), DeliverResponse::Block(block));
    }

    #[test]
    fn test_status_reply_accepts_failures() {
        assert_eq!(
            status_reply(Status::ServiceUnavailable),
            DeliverResponse::Status(Status::ServiceUnavailable)
        );
    }

    #[tokio::test]
    async fn test_send_status_reply_reaches_client() {
        let (mut stream, mut client) = memory_stream(4);
        send_status_reply(&mut stream, Status::Forbidden).await.unwrap();
        assert_eq!(
            client.recv().await,
            Some(DeliverResponse::Status(Status::Forbidden))
        );
    }

    #[tokio::test]
    async fn test_send_fails_after_client_gone() {
        let (mut stream, client) = memory_stream(4);
        drop(client);
        assert!(matches!(
            send_block_reply(&mut stream, Block::genesis(vec![])).await,
            Err(DeliverError::ConnectionClosed)
        ));
    }
}
