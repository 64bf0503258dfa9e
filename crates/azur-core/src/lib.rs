//! azur-core: Core traits, types, and error definitions for azurlib.
//!
//! This crate defines the abstractions shared by the protocol engine, the
//! serial transport, and the test harness. Applications that only need to
//! name inputs or inspect errors depend on these types without pulling in
//! the serial stack.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`InputId`], [`AudioSource`], [`VideoSource`], [`StereoMode`],
//!   [`DynamicRange`] -- device catalogues
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use azur_core::*`.
pub use error::{Error, RejectKind, Result};
pub use transport::Transport;
pub use types::*;
