//! # Deliver Flow Tests
//!
//! Exercises a running node the way an external client would:
//!
//! 1. **Range reads**: Oldest/Newest/Specified resolve against the live ledger
//! 2. **Tailing**: blocked sessions resume as blocks are appended
//! 3. **Access control**: `/Channel/Readers` gates every request
//! 4. **Session lifetime**: which statuses keep the connection open

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use ed25519_dalek::SigningKey;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::time::timeout;

    use node_runtime::{NodeConfig, NodeRuntime};
    use qc_18_block_delivery::{
        ChainSupport, DeliverClient, DeliverConfig, DeliverResponse, SeekBehavior, SeekPosition,
        SeekRequest, Status,
    };

    const CHANNEL: &str = "orders";
    const MAX_FRAME: usize = 64 * 1024;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn reader_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn stranger_key() -> SigningKey {
        SigningKey::from_bytes(&[9u8; 32])
    }

    struct TestNode {
        runtime: NodeRuntime,
        addr: SocketAddr,
    }

    impl TestNode {
        async fn start(reader_keys: Vec<String>, retention: usize) -> Self {
            let config = NodeConfig {
                deliver: DeliverConfig {
                    channels: vec![CHANNEL.to_string()],
                    reader_keys,
                    ledger_retention: retention,
                    max_frame_size: MAX_FRAME,
                    ..DeliverConfig::for_testing()
                },
                ..NodeConfig::default()
            };
            let mut runtime = NodeRuntime::new(config).unwrap();
            let addr = runtime.start().await.unwrap();
            Self { runtime, addr }
        }

        async fn open() -> Self {
            Self::start(Vec::new(), 16).await
        }

        fn chain(&self) -> Arc<ChainSupport> {
            self.runtime.container().registry.channel(CHANNEL).unwrap()
        }

        /// Append `count` blocks after the current newest.
        fn append(&self, count: usize) {
            let chain = self.chain();
            for _ in 0..count {
                let newest = chain.ledger().newest().unwrap();
                let next = newest.next(vec![format!("tx-{}", newest.number() + 1).into_bytes()]);
                chain.ledger().append(next).unwrap();
            }
        }

        async fn client(&self) -> DeliverClient<TcpStream> {
            DeliverClient::connect(self.addr, MAX_FRAME).await.unwrap()
        }

        async fn stop(mut self) {
            self.runtime.shutdown().await;
        }
    }

    async fn recv(client: &mut DeliverClient<TcpStream>) -> Option<DeliverResponse> {
        timeout(Duration::from_secs(5), client.recv())
            .await
            .expect("timed out waiting for response")
            .unwrap()
    }

    // =============================================================================
    // RANGE READS
    // =============================================================================

    #[tokio::test]
    async fn test_oldest_to_newest_streams_whole_ledger() {
        let node = TestNode::open().await;
        node.append(4);

        let mut client = node.client().await;
        let request = SeekRequest::new(CHANNEL, SeekPosition::Oldest, SeekPosition::Newest)
            .unsigned()
            .unwrap();
        let result = client.seek(&request).await.unwrap();

        assert_eq!(result.status, Status::Success);
        assert_eq!(result.numbers(), vec![0, 1, 2, 3, 4]);
        node.stop().await;
    }

    #[tokio::test]
    async fn test_blocks_chain_by_previous_hash() {
        let node = TestNode::open().await;
        node.append(3);

        let mut client = node.client().await;
        let request = SeekRequest::new(CHANNEL, SeekPosition::Oldest, SeekPosition::Newest)
            .unsigned()
            .unwrap();
        let result = client.seek(&request).await.unwrap();

        for pair in result.blocks.windows(2) {
            assert_eq!(pair[1].header.previous_hash, pair[0].header.hash());
        }
        node.stop().await;
    }

    #[tokio::test]
    async fn test_oldest_starts_at_retention_floor() {
        let node = TestNode::start(Vec::new(), 3).await;
        node.append(6);

        let mut client = node.client().await;
        let request = SeekRequest::new(CHANNEL, SeekPosition::Oldest, SeekPosition::Newest)
            .unsigned()
            .unwrap();
        let result = client.seek(&request).await.unwrap();

        assert_eq!(result.numbers(), vec![4, 5, 6]);
        node.stop().await;
    }

    #[tokio::test]
    async fn test_stop_before_start_is_bad_request_and_closes() {
        let node = TestNode::open().await;
        node.append(5);

        let mut client = node.client().await;
        let request = SeekRequest::new(
            CHANNEL,
            SeekPosition::Specified(4),
            SeekPosition::Specified(2),
        )
        .unsigned()
        .unwrap();
        client.send(&request).await.unwrap();

        assert_eq!(
            recv(&mut client).await,
            Some(DeliverResponse::Status(Status::BadRequest))
        );
        assert_eq!(recv(&mut client).await, None);
        node.stop().await;
    }

    // =============================================================================
    // TAILING
    // =============================================================================

    #[tokio::test]
    async fn test_blocked_seek_resumes_on_append() {
        let node = TestNode::open().await;

        let mut client = node.client().await;
        let request = SeekRequest::new(
            CHANNEL,
            SeekPosition::Specified(1),
            SeekPosition::Specified(3),
        )
        .unsigned()
        .unwrap();
        client.send(&request).await.unwrap();

        // Nothing to send yet
        assert!(timeout(Duration::from_millis(100), client.recv())
            .await
            .is_err());

        node.append(3);

        for expected in 1..=3 {
            let block = recv(&mut client).await.unwrap();
            assert_eq!(block.as_block().map(|b| b.number()), Some(expected));
        }
        assert_eq!(
            recv(&mut client).await,
            Some(DeliverResponse::Status(Status::Success))
        );
        node.stop().await;
    }

    #[tokio::test]
    async fn test_blocked_session_does_not_stall_others() {
        let node = TestNode::open().await;

        let mut tail = node.client().await;
        let request = SeekRequest::new(
            CHANNEL,
            SeekPosition::Specified(1),
            SeekPosition::Specified(5),
        )
        .unsigned()
        .unwrap();
        tail.send(&request).await.unwrap();

        let mut reader = node.client().await;
        let request = SeekRequest::new(CHANNEL, SeekPosition::Oldest, SeekPosition::Oldest)
            .unsigned()
            .unwrap();
        let result = timeout(Duration::from_secs(5), reader.seek(&request))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.numbers(), vec![0]);

        // The tailing session is still parked on block 1
        assert!(timeout(Duration::from_millis(50), tail.recv())
            .await
            .is_err());

        node.stop().await;
    }

    #[tokio::test]
    async fn test_fail_if_not_ready_keeps_session_open() {
        let node = TestNode::open().await;

        let mut client = node.client().await;
        let request = SeekRequest::new(
            CHANNEL,
            SeekPosition::Specified(3),
            SeekPosition::Specified(3),
        )
        .behavior(SeekBehavior::FailIfNotReady)
        .unsigned()
        .unwrap();
        let result = client.seek(&request).await.unwrap();
        assert_eq!(result.status, Status::NotFound);
        assert!(result.blocks.is_empty());

        node.append(3);
        let result = client.seek(&request).await.unwrap();
        assert_eq!(result.status, Status::Success);
        assert_eq!(result.numbers(), vec![3]);
        node.stop().await;
    }

    // =============================================================================
    // ACCESS CONTROL
    // =============================================================================

    #[tokio::test]
    async fn test_configured_reader_is_served() {
        let key = hex::encode(reader_key().verifying_key().to_bytes());
        let node = TestNode::start(vec![key], 16).await;

        let mut client = node.client().await;
        let request = SeekRequest::new(CHANNEL, SeekPosition::Newest, SeekPosition::Newest)
            .signed(&reader_key())
            .unwrap();
        let result = client.seek(&request).await.unwrap();

        assert_eq!(result.status, Status::Success);
        assert_eq!(result.numbers(), vec![0]);
        node.stop().await;
    }

    #[tokio::test]
    async fn test_stranger_is_forbidden_and_closed() {
        let key = hex::encode(reader_key().verifying_key().to_bytes());
        let node = TestNode::start(vec![key], 16).await;

        let mut client = node.client().await;
        let request = SeekRequest::new(CHANNEL, SeekPosition::Newest, SeekPosition::Newest)
            .signed(&stranger_key())
            .unwrap();
        client.send(&request).await.unwrap();

        assert_eq!(
            recv(&mut client).await,
            Some(DeliverResponse::Status(Status::Forbidden))
        );
        assert_eq!(recv(&mut client).await, None);
        node.stop().await;
    }

    #[tokio::test]
    async fn test_unsigned_request_is_forbidden_on_restricted_channel() {
        let key = hex::encode(reader_key().verifying_key().to_bytes());
        let node = TestNode::start(vec![key], 16).await;

        let mut client = node.client().await;
        let request = SeekRequest::new(CHANNEL, SeekPosition::Oldest, SeekPosition::Oldest)
            .unsigned()
            .unwrap();
        let result = client.seek(&request).await.unwrap();

        assert_eq!(result.status, Status::Forbidden);
        assert!(result.blocks.is_empty());
        node.stop().await;
    }

    // =============================================================================
    // SESSION LIFETIME
    // =============================================================================

    #[tokio::test]
    async fn test_unknown_channel_is_not_found_and_closed() {
        let node = TestNode::open().await;

        let mut client = node.client().await;
        let request = SeekRequest::new("missing", SeekPosition::Oldest, SeekPosition::Newest)
            .unsigned()
            .unwrap();
        client.send(&request).await.unwrap();

        assert_eq!(
            recv(&mut client).await,
            Some(DeliverResponse::Status(Status::NotFound))
        );
        assert_eq!(recv(&mut client).await, None);
        node.stop().await;
    }

    #[tokio::test]
    async fn test_sequential_requests_share_a_connection() {
        let node = TestNode::open().await;
        node.append(2);

        let mut client = node.client().await;
        for number in 0..=2 {
            let request = SeekRequest::new(
                CHANNEL,
                SeekPosition::Specified(number),
                SeekPosition::Specified(number),
            )
            .unsigned()
            .unwrap();
            let result = client.seek(&request).await.unwrap();
            assert_eq!(result.numbers(), vec![number]);
            assert_eq!(result.status, Status::Success);
        }
        client.close().await.unwrap();
        node.stop().await;
    }

    #[tokio::test]
    async fn test_oversized_frame_drops_connection() {
        let node = TestNode::open().await;

        let mut socket = TcpStream::connect(node.addr).await.unwrap();
        let length = (MAX_FRAME as u32) + 1;
        socket.write_all(&length.to_be_bytes()).await.unwrap();

        let mut buf = [0u8; 16];
        let read = timeout(Duration::from_secs(5), socket.read(&mut buf))
            .await
            .unwrap();
        assert!(matches!(read, Ok(0) | Err(_)));
        node.stop().await;
    }

    #[tokio::test]
    async fn test_shutdown_ends_tailing_session() {
        let node = TestNode::open().await;

        let mut client = node.client().await;
        let request = SeekRequest::new(
            CHANNEL,
            SeekPosition::Specified(1),
            SeekPosition::Specified(10),
        )
        .unsigned()
        .unwrap();
        client.send(&request).await.unwrap();

        node.stop().await;

        let end = timeout(Duration::from_secs(5), client.recv()).await.unwrap();
        assert!(matches!(end, Ok(None) | Err(_)));
    }
}
