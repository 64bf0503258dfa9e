//! Cambridge Audio Azur 650R RS-232 protocol engine.
//!
//! This crate drives the amplifier's serial control port. It provides:
//!
//! - **Frame codec** ([`protocol`]) -- encode `#group,number[,data]\r`
//!   commands and split raw reads into de-duplicated reply records.
//! - **Command builders** ([`commands`]) -- one builder per entry in the
//!   amplifier's command table.
//! - **Reply classifier** ([`response`]) -- turn reply records into device
//!   rejections or typed state updates.
//! - **State mirror** ([`state`]) -- the last state the amplifier reported.
//! - **Convergence** ([`converge`]) -- reach an absolute volume, bass or
//!   treble level using only up/down commands.
//! - **Engine** ([`amp`]) -- the [`Azur650`] dispatcher and the full
//!   operation surface.
//! - **Builder** ([`builder`]) and **models** ([`models`]).
//!
//! # Example
//!
//! ```
//! use azur650::protocol::{encode_command, split_response};
//! use azur650::commands::cmd_volume_up;
//! use azur650::response::{classify, Reply, Update};
//!
//! assert_eq!(encode_command(&cmd_volume_up()), b"#1,02\r");
//!
//! let records = split_response(b"#6,02,-39\r");
//! assert_eq!(classify(&records[0]), Reply::Update(Update::Volume(-39)));
//! ```

pub mod amp;
pub mod builder;
pub mod commands;
pub mod converge;
pub mod models;
pub mod protocol;
pub mod response;
pub mod state;

// Re-export the primary types for ergonomic `use azur650::*`.
pub use amp::{Azur650, Response};
pub use builder::Azur650Builder;
pub use commands::OsdDirection;
pub use models::{AmplifierModel, azur_650r};
pub use state::DeviceState;
