//! # In-Memory Channel Ledger
//!
//! Bounded append-only block store with live cursors.
//!
//! The ledger retains at most `max_size` blocks; appending beyond that
//! evicts the oldest block and raises the retained floor. Cursors learn
//! about appends and evictions through a `watch` channel carrying the
//! current [`LedgerBounds`], so a waiting cursor wakes exactly when its
//! block is committed.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use crate::domain::{Block, LedgerError, SeekPosition, Status};
use crate::ports::{Cursor, LedgerReader};

/// Retained range of a ledger: `[floor, height)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerBounds {
    /// Lowest retained block number.
    pub floor: u64,
    /// One past the newest block number.
    pub height: u64,
}

impl LedgerBounds {
    /// Can a cursor positioned at `next` answer without waiting?
    fn answers(&self, next: u64) -> bool {
        next < self.height || next < self.floor
    }
}

struct Shared {
    max_size: usize,
    blocks: RwLock<VecDeque<Arc<Block>>>,
    bounds: watch::Sender<LedgerBounds>,
}

impl Shared {
    fn bounds(blocks: &VecDeque<Arc<Block>>) -> LedgerBounds {
        match (blocks.front(), blocks.back()) {
            (Some(oldest), Some(newest)) => LedgerBounds {
                floor: oldest.number(),
                height: newest.number() + 1,
            },
            _ => LedgerBounds::default(),
        }
    }
}

/// In-memory ledger for one channel.
///
/// Cloning yields another handle to the same ledger.
#[derive(Clone)]
pub struct RamLedger {
    shared: Arc<Shared>,
}

impl RamLedger {
    /// Create an empty ledger retaining at most `max_size` blocks.
    pub fn new(max_size: usize) -> Self {
        let (bounds, _) = watch::channel(LedgerBounds::default());
        Self {
            shared: Arc::new(Shared {
                max_size: max_size.max(1),
                blocks: RwLock::new(VecDeque::new()),
                bounds,
            }),
        }
    }

    /// Create a ledger seeded with `genesis`.
    pub fn with_genesis(max_size: usize, genesis: Block) -> Result<Self, LedgerError> {
        let ledger = Self::new(max_size);
        ledger.append(genesis)?;
        Ok(ledger)
    }

    /// Append the next block, evicting the oldest when full.
    pub fn append(&self, block: Block) -> Result<(), LedgerError> {
        let mut blocks = self.shared.blocks.write();
        let bounds = Shared::bounds(&blocks);

        if block.number() != bounds.height {
            return Err(LedgerError::InvalidBlockNumber {
                expected: bounds.height,
                got: block.number(),
            });
        }
        if let Some(newest) = blocks.back() {
            if block.header.previous_hash != newest.header.hash() {
                return Err(LedgerError::PreviousHashMismatch {
                    number: block.number(),
                });
            }
        }

        let number = block.number();
        blocks.push_back(Arc::new(block));
        if blocks.len() > self.shared.max_size {
            blocks.pop_front();
        }

        let bounds = Shared::bounds(&blocks);
        self.shared.bounds.send_replace(bounds);
        debug!(
            block_number = number,
            floor = bounds.floor,
            height = bounds.height,
            "Appended block"
        );
        Ok(())
    }

    /// Current retained range.
    pub fn bounds(&self) -> LedgerBounds {
        *self.shared.bounds.borrow()
    }

    /// Newest committed block.
    pub fn newest(&self) -> Option<Block> {
        self.shared.blocks.read().back().map(|b| (**b).clone())
    }

    /// Number of retained blocks.
    pub fn len(&self) -> usize {
        self.shared.blocks.read().len()
    }

    /// Is the ledger empty?
    pub fn is_empty(&self) -> bool {
        self.shared.blocks.read().is_empty()
    }

    fn cursor_at(&self, next: u64) -> RamCursor {
        RamCursor {
            shared: Arc::clone(&self.shared),
            bounds: self.shared.bounds.subscribe(),
            next,
        }
    }
}

impl LedgerReader for RamLedger {
    fn iterator(&self, start: &SeekPosition) -> (Box<dyn Cursor>, u64) {
        let bounds = self.bounds();
        let number = match *start {
            SeekPosition::Oldest => bounds.floor,
            SeekPosition::Newest => bounds.height.saturating_sub(1),
            SeekPosition::Specified(number) => {
                if number < bounds.floor || number > bounds.height {
                    debug!(
                        specified = number,
                        floor = bounds.floor,
                        height = bounds.height,
                        "Seek outside retained range"
                    );
                    return (Box::new(NotFoundCursor), 0);
                }
                number
            }
        };
        (Box::new(self.cursor_at(number)), number)
    }

    fn height(&self) -> u64 {
        self.bounds().height
    }
}

/// Cursor over a [`RamLedger`].
pub struct RamCursor {
    shared: Arc<Shared>,
    bounds: watch::Receiver<LedgerBounds>,
    next: u64,
}

#[async_trait]
impl Cursor for RamCursor {
    async fn ready(&mut self) {
        let next = self.next;
        // The sender lives in `shared`, which this cursor keeps alive.
        let _ = self.bounds.wait_for(|bounds| bounds.answers(next)).await;
    }

    fn is_ready(&self) -> bool {
        self.bounds.borrow().answers(self.next)
    }

    fn next(&mut self) -> Result<Block, Status> {
        let blocks = self.shared.blocks.read();
        let bounds = Shared::bounds(&blocks);
        if self.next < bounds.floor || self.next >= bounds.height {
            return Err(Status::NotFound);
        }

        let index = (self.next - bounds.floor) as usize;
        let block = blocks
            .get(index)
            .map(|b| (**b).clone())
            .ok_or(Status::InternalServerError)?;
        self.next += 1;
        Ok(block)
    }
}

/// Cursor for a seek outside the retained range: always ready, always
/// `NOT_FOUND`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotFoundCursor;

#[async_trait]
impl Cursor for NotFoundCursor {
    async fn ready(&mut self) {}

    fn is_ready(&self) -> bool {
        true
    }

    fn next(&mut self) -> Result<Block, Status> {
        Err(Status::NotFound)
    }
}
