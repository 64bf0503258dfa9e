//! The byte link between the engine and an amplifier.
//!
//! `azur-transport` implements [`Transport`] over a serial port and
//! `azur-test-harness` implements it as a scripted mock, so the dispatcher
//! in `azur650` runs unchanged against hardware and in tests.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte link to an amplifier.
///
/// Physical layer only: framing, reply splitting and classification belong
/// to the protocol engine.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Queue `data` for the amplifier; it may sit in a buffer until
    /// [`flush`](Transport::flush).
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    async fn flush(&mut self) -> Result<()>;

    /// Read whatever has arrived into `buf`, waiting at most `timeout`.
    ///
    /// Returns the byte count, or [`Error::Timeout`](crate::error::Error::Timeout)
    /// when the line stays quiet.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Open the link again after [`close`](Transport::close). Does nothing
    /// when it is already open.
    async fn open(&mut self) -> Result<()>;

    /// Close the link. Afterwards I/O calls fail with
    /// [`Error::NotConnected`](crate::error::Error::NotConnected). Does
    /// nothing when it is already closed.
    async fn close(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;
}
