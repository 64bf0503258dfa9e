//! Scripted stand-in for the amplifier's serial port.
//!
//! A test loads [`MockTransport`] with the exact command frames it expects
//! the engine to write, each paired with the bytes the amplifier would
//! answer with. The mock checks every write against the script and plays
//! the paired reply back through `receive()`.
//!
//! # Example
//!
//! ```
//! use azur_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // "volume up" is answered with the new level.
//! mock.expect(b"#1,02\r", b"#6,02,-39\r");
//! // Cursor moves are not answered at all.
//! mock.expect(b"#1,15\r", b"");
//! assert_eq!(mock.pending_exchanges(), 2);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use azur_core::error::{Error, Result};
use azur_core::transport::Transport;

/// One scripted command frame and the reply it triggers.
#[derive(Debug, Clone)]
struct Exchange {
    command: Vec<u8>,
    reply: Vec<u8>,
}

/// A [`Transport`] that replays a fixed script of exchanges.
///
/// - A write must match the next scripted command byte for byte, otherwise
///   it fails with [`Error::Transport`]. A write with the script exhausted
///   fails the same way.
/// - After a matching write, `receive()` hands out the scripted reply in
///   chunks no larger than the caller's buffer. Once the reply is drained
///   (or if it was empty) `receive()` reports [`Error::Timeout`], which is
///   how a quiet line looks to the engine.
/// - While closed, every I/O call fails with [`Error::NotConnected`].
#[derive(Debug)]
pub struct MockTransport {
    script: VecDeque<Exchange>,
    /// Reply bytes not yet handed out.
    unread: VecDeque<u8>,
    open: bool,
    writes: Vec<Vec<u8>>,
    flushes: usize,
    reopens: usize,
}

impl MockTransport {
    /// An open transport with an empty script.
    pub fn new() -> Self {
        MockTransport {
            script: VecDeque::new(),
            unread: VecDeque::new(),
            open: true,
            writes: Vec::new(),
            flushes: 0,
            reopens: 0,
        }
    }

    /// Append an exchange to the script. An empty `reply` models a command
    /// the amplifier does not answer.
    pub fn expect(&mut self, command: &[u8], reply: &[u8]) {
        self.script.push_back(Exchange {
            command: command.to_vec(),
            reply: reply.to_vec(),
        });
    }

    /// Every frame written so far, in order, including rejected ones.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Scripted exchanges not yet consumed.
    pub fn pending_exchanges(&self) -> usize {
        self.script.len()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// How many `open()` calls found the transport closed.
    pub fn reopen_count(&self) -> usize {
        self.reopens
    }

    /// Force the link up or down without going through `open()`/`close()`.
    pub fn set_connected(&mut self, connected: bool) {
        self.open = connected;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.writes.push(data.to_vec());

        let Some(exchange) = self.script.pop_front() else {
            return Err(Error::Transport(format!(
                "mock script exhausted, unexpected write {:?}",
                String::from_utf8_lossy(data)
            )));
        };
        if exchange.command != data {
            return Err(Error::Transport(format!(
                "mock expected write {:?}, got {:?}",
                String::from_utf8_lossy(&exchange.command),
                String::from_utf8_lossy(data)
            )));
        }

        // A new command discards whatever the previous reply left behind.
        self.unread = exchange.reply.into();
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.flushes += 1;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        self.ensure_open()?;
        if self.unread.is_empty() {
            return Err(Error::Timeout);
        }
        let n = buf.len().min(self.unread.len());
        for (slot, byte) in buf.iter_mut().zip(self.unread.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn open(&mut self) -> Result<()> {
        if !self.open {
            self.open = true;
            self.reopens += 1;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        self.unread.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(80);

    #[tokio::test]
    async fn reply_is_played_back_then_line_goes_quiet() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#6,02,-39\r");

        mock.send(b"#1,02\r").await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock.receive(&mut buf, WAIT).await.unwrap();
        assert_eq!(&buf[..n], b"#6,02,-39\r");
        assert!(matches!(mock.receive(&mut buf, WAIT).await, Err(Error::Timeout)));
        assert_eq!(mock.pending_exchanges(), 0);
    }

    #[tokio::test]
    async fn unanswered_command_times_out() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,15\r", b"");
        mock.send(b"#1,15\r").await.unwrap();

        let mut buf = [0u8; 16];
        assert!(matches!(mock.receive(&mut buf, WAIT).await, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn reply_is_chunked_by_buffer_size() {
        let mut mock = MockTransport::new();
        mock.expect(b"#5,01\r", b"#10,01,v1.2\r");
        mock.send(b"#5,01\r").await.unwrap();

        let mut buf = [0u8; 4];
        let mut collected = Vec::new();
        while let Ok(n) = mock.receive(&mut buf, WAIT).await {
            assert!(n <= 4);
            collected.extend_from_slice(&buf[..n]);
        }
        assert_eq!(collected, b"#10,01,v1.2\r");
    }

    #[tokio::test]
    async fn new_command_discards_leftover_reply() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#6,02,-39\r#6,01,1\r");
        mock.expect(b"#1,03\r", b"#6,03,-40\r");

        mock.send(b"#1,02\r").await.unwrap();
        let mut buf = [0u8; 10];
        mock.receive(&mut buf, WAIT).await.unwrap();

        mock.send(b"#1,03\r").await.unwrap();
        let mut buf = [0u8; 64];
        let n = mock.receive(&mut buf, WAIT).await.unwrap();
        assert_eq!(&buf[..n], b"#6,03,-40\r");
    }

    #[tokio::test]
    async fn writes_and_flushes_are_recorded() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,08\r", b"#6,08\r");
        mock.expect(b"#1,09\r", b"#6,09\r");

        mock.send(b"#1,08\r").await.unwrap();
        mock.flush().await.unwrap();
        mock.send(b"#1,09\r").await.unwrap();
        mock.flush().await.unwrap();

        assert_eq!(mock.sent_data(), [b"#1,08\r".to_vec(), b"#1,09\r".to_vec()]);
        assert_eq!(mock.flush_count(), 2);
    }

    #[tokio::test]
    async fn off_script_write_fails() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#6,02,-39\r");
        assert!(matches!(mock.send(b"#1,03\r").await, Err(Error::Transport(_))));

        let mut empty = MockTransport::new();
        assert!(matches!(empty.send(b"#5,01\r").await, Err(Error::Transport(_))));
        assert_eq!(empty.sent_data().len(), 1);
    }

    #[tokio::test]
    async fn closed_link_refuses_io_until_reopened() {
        let mut mock = MockTransport::new();
        mock.close().await.unwrap();
        assert!(!mock.is_connected());
        assert!(matches!(mock.send(b"#1,02\r").await, Err(Error::NotConnected)));
        assert!(matches!(mock.flush().await, Err(Error::NotConnected)));

        mock.open().await.unwrap();
        mock.open().await.unwrap();
        assert!(mock.is_connected());
        assert_eq!(mock.reopen_count(), 1);

        mock.set_connected(false);
        let mut buf = [0u8; 8];
        assert!(matches!(mock.receive(&mut buf, WAIT).await, Err(Error::NotConnected)));
    }
}
