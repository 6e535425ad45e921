use crate::ConnectorError;
use async_trait::async_trait;
use std::time::Duration;

/// Passing this as a pop timeout blocks until an item shows up.
pub const BLOCK_INDEFINITELY: Duration = Duration::ZERO;

/// Connection to a broker that keeps named lists.
///
/// Items go in at the head and come out at the tail, so a list behaves as a
/// FIFO queue. Pops are atomic: an item is handed to exactly one caller.
#[async_trait]
pub trait ListTransport: Send + Sync + 'static {
    /// Push `body` onto the head of `list`.
    async fn push_head(&self, list: &str, body: &[u8]) -> Result<(), ConnectorError>;

    /// Pop from the tail of `list`, waiting up to `timeout` for an item.
    ///
    /// `Ok(None)` means the wait ended without an item. Transport failures
    /// are always reported as errors, never as an empty pop.
    async fn pop_tail_blocking(
        &self,
        list: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, ConnectorError>;

    /// Number of items currently waiting on `list`.
    async fn len(&self, list: &str) -> Result<usize, ConnectorError>;

    /// Drop every item waiting on `list`.
    async fn purge(&self, list: &str) -> Result<(), ConnectorError>;
}
