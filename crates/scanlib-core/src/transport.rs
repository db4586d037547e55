//! Transport trait for scanner communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a scanner.
//! The serial implementation lives in `scanlib-transport`; scripted and
//! simulated transports for tests live in `scanlib-test-harness`.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a scanner.
///
/// Implementations only move bytes. Line framing (`\r`) and command
/// structure are handled by the protocol layer that consumes this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the scanner.
    ///
    /// Implementations should not return until every byte has been handed
    /// to the underlying link.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the scanner into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Will wait up to `timeout`
    /// for data to arrive; returns [`Error::Timeout`](crate::error::Error::Timeout)
    /// if no data is received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
