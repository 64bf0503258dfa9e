//! Transport implementations for azurlib.
//!
//! This crate provides the concrete [`Transport`](azur_core::Transport)
//! implementation used to talk to an amplifier over its RS-232 control port:
//!
//! - [`SerialTransport`]: physical RS-232 ports and USB serial adapters
//!
//! # Example
//!
//! ```no_run
//! use azur_transport::SerialTransport;
//! use azur_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> azur_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyS0", 9600).await?;
//!
//! // Ask for the protocol version.
//! transport.send(b"#5,02\r").await?;
//! transport.flush().await?;
//!
//! let mut buf = [0u8; 64];
//! let n = transport.receive(&mut buf, Duration::from_millis(80)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
