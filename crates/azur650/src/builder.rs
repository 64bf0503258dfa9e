//! Azur650Builder -- fluent builder for constructing [`Azur650`] instances.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters and read limits before the transport is opened.
//!
//! # Example
//!
//! ```no_run
//! use azur650::builder::Azur650Builder;
//! use azur650::models::azur_650r;
//! use std::time::Duration;
//!
//! # async fn example() -> azur_core::Result<()> {
//! let mut amp = Azur650Builder::new(azur_650r())
//!     .serial_port("/dev/ttyUSB0")
//!     .read_timeout(Duration::from_millis(120))
//!     .build()
//!     .await?;
//! amp.power_on().await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use azur_core::error::{Error, Result};
use azur_core::transport::Transport;

use crate::amp::Azur650;
use crate::models::AmplifierModel;

/// Fluent builder for [`Azur650`].
///
/// Defaults come from the [`AmplifierModel`].
pub struct Azur650Builder {
    model: AmplifierModel,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
    read_timeout: Duration,
    max_read_len: usize,
}

impl Azur650Builder {
    pub fn new(model: AmplifierModel) -> Self {
        Azur650Builder {
            read_timeout: model.default_read_timeout,
            max_read_len: model.default_max_read_len,
            model,
            serial_port: None,
            baud_rate: None,
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the model's baud rate.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = Some(baud);
        self
    }

    /// How long one command waits for reply bytes (default 80 ms).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Most reply bytes taken per command (default 50).
    pub fn max_read_len(mut self, len: usize) -> Self {
        self.max_read_len = len;
        self
    }

    /// Build with a caller-provided transport.
    ///
    /// This is the entry point for tests (pass a `MockTransport` from
    /// `azur-test-harness`).
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Azur650> {
        if self.read_timeout.is_zero() {
            return Err(Error::InvalidParameter("read_timeout must be non-zero".into()));
        }
        if self.max_read_len == 0 {
            return Err(Error::InvalidParameter("max_read_len must be non-zero".into()));
        }
        Ok(Azur650::new(
            transport,
            self.model,
            self.read_timeout,
            self.max_read_len,
        ))
    }

    /// Build over a serial port.
    ///
    /// Requires [`serial_port()`](Self::serial_port).
    pub async fn build(self) -> Result<Azur650> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        let baud = self.baud_rate.unwrap_or(self.model.default_baud_rate);

        let transport = azur_transport::SerialTransport::open(port, baud).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::azur_650r;
    use azur_test_harness::MockTransport;

    #[tokio::test]
    async fn builder_defaults() {
        let amp = Azur650Builder::new(azur_650r())
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();

        assert_eq!(amp.model().name, "Azur 650R");
        assert!(amp.is_connected());
        assert_eq!(amp.state().volume(), None);
    }

    #[tokio::test]
    async fn builder_custom_read_limits() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#6,02,-30\r#6,01,1\r");
        let mut amp = Azur650Builder::new(azur_650r())
            .serial_port("/dev/ttyUSB0")
            .baud_rate(9600)
            .read_timeout(Duration::from_millis(200))
            .max_read_len(10)
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        assert_eq!(amp.volume_up().await.unwrap(), -30);
        assert_eq!(amp.state().power(), None);
    }

    #[tokio::test]
    async fn builder_rejects_zero_limits() {
        let result = Azur650Builder::new(azur_650r())
            .max_read_len(0)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));

        let result = Azur650Builder::new(azur_650r())
            .read_timeout(Duration::ZERO)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_serial_port_required_for_build() {
        let result = Azur650Builder::new(azur_650r()).build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
