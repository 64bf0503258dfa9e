//! RS-232 transport for the amplifier's control port.
//!
//! The Azur 650R runs its control port at 9600 baud, 8 data bits, no
//! parity, one stop bit, no flow control, over a null-modem cable. Those
//! are the [`SerialConfig`] defaults; other settings exist only for
//! adapters that need them.
//!
//! [`SerialTransport`] keeps the port path and settings, so it can be
//! closed and re-opened for as long as the engine that owns it lives.
//!
//! # Example
//!
//! ```no_run
//! use azur_transport::SerialTransport;
//! use azur_core::transport::Transport;
//!
//! # async fn example() -> azur_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 9600).await?;
//! transport.close().await?;
//! transport.open().await?;
//! # Ok(())
//! # }
//! ```

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use azur_core::error::{Error, Result};
use azur_core::transport::Transport;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, info, trace, warn};

pub use tokio_serial::{DataBits, FlowControl, Parity, StopBits};

/// Line settings applied on every (re-)open.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

impl SerialConfig {
    /// 8N1 without flow control at the given baud rate.
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        SerialConfig {
            baud_rate,
            ..Default::default()
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

/// A re-openable serial link to the amplifier.
pub struct SerialTransport {
    /// `None` while closed.
    stream: Option<SerialStream>,
    path: String,
    config: SerialConfig,
}

impl SerialTransport {
    /// Open `path` at `baud_rate`, 8N1.
    pub async fn open(path: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with_config(path, SerialConfig::with_baud_rate(baud_rate)).await
    }

    pub async fn open_with_config(path: &str, config: SerialConfig) -> Result<Self> {
        let stream = connect(path, &config)?;
        Ok(SerialTransport {
            stream: Some(stream),
            path: path.to_string(),
            config,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn stream(&mut self) -> Result<&mut SerialStream> {
        self.stream.as_mut().ok_or(Error::NotConnected)
    }
}

fn connect(path: &str, config: &SerialConfig) -> Result<SerialStream> {
    debug!(port = %path, config = ?config, "opening serial port");

    let mut stream = tokio_serial::new(path, config.baud_rate)
        .data_bits(config.data_bits)
        .parity(config.parity)
        .stop_bits(config.stop_bits)
        .flow_control(config.flow_control)
        .open_native_async()
        .map_err(|e| {
            error!(port = %path, error = %e, "failed to open serial port");
            Error::Transport(format!("failed to open serial port {path}: {e}"))
        })?;

    // USB adapters may raise the modem lines on open; the amplifier does
    // not use them.
    if let Err(e) = stream.write_data_terminal_ready(false) {
        warn!(port = %path, error = %e, "could not lower DTR");
    }
    if let Err(e) = stream.write_request_to_send(false) {
        warn!(port = %path, error = %e, "could not lower RTS");
    }

    info!(port = %path, baud_rate = config.baud_rate, "serial port open");
    Ok(stream)
}

/// Broken pipes mean the adapter went away.
fn io_error(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::BrokenPipe | ErrorKind::NotConnected => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        trace!(port = %self.path, data = ?String::from_utf8_lossy(data), "write");
        let result = self.stream()?.write_all(data).await;
        result.map_err(|e| {
            error!(port = %self.path, error = %e, "write failed");
            io_error(e)
        })
    }

    async fn flush(&mut self) -> Result<()> {
        let result = self.stream()?.flush().await;
        result.map_err(|e| {
            error!(port = %self.path, error = %e, "flush failed");
            io_error(e)
        })
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let read = tokio::time::timeout(timeout, self.stream()?.read(buf)).await;
        match read {
            Ok(Ok(n)) => {
                trace!(port = %self.path, data = ?String::from_utf8_lossy(&buf[..n]), "read");
                Ok(n)
            }
            Ok(Err(e)) => {
                error!(port = %self.path, error = %e, "read failed");
                Err(io_error(e))
            }
            Err(_) => Err(Error::Timeout),
        }
    }

    async fn open(&mut self) -> Result<()> {
        if self.stream.is_none() {
            self.stream = Some(connect(&self.path, &self.config)?);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        if let Err(e) = stream.flush().await {
            warn!(port = %self.path, error = %e, "flush before close failed");
        }
        info!(port = %self.path, "serial port closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}
