//! Error types for azurlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Errors fall into three classes:
//!
//! - **transport** -- the byte stream could not be opened, written, or read
//!   ([`Error::Transport`], [`Error::Io`], [`Error::NotConnected`],
//!   [`Error::ConnectionLost`], [`Error::Timeout`]);
//! - **protocol** -- the amplifier answered with a group `11` error reply
//!   ([`Error::Rejected`]) or with a reply that could not be interpreted
//!   ([`Error::Protocol`]);
//! - **validation** -- a caller-supplied value was refused before any
//!   bytes were sent ([`Error::InvalidParameter`]).
//!
//! None of these are retried by the library.

use std::fmt;

/// Why the amplifier rejected a command.
///
/// Decoded from the second field of a group `11` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectKind {
    /// `11,01` -- the command group is not known to the amplifier.
    UnknownGroup,
    /// `11,02` -- the command number is not known within its group.
    UnknownNumber,
    /// `11,03` -- the command data is out of range or malformed.
    ///
    /// Also returned when a relative command cannot move any further
    /// (e.g. volume down at the floor).
    InvalidData,
    /// Any other group `11` sub-code.
    InvalidCommand,
}

impl RejectKind {
    /// Map a group `11` sub-code to a rejection kind.
    pub fn from_code(code: &str) -> Self {
        match code {
            "01" => RejectKind::UnknownGroup,
            "02" => RejectKind::UnknownNumber,
            "03" => RejectKind::InvalidData,
            _ => RejectKind::InvalidCommand,
        }
    }
}

impl fmt::Display for RejectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectKind::UnknownGroup => "unknown command group",
            RejectKind::UnknownNumber => "unknown command number",
            RejectKind::InvalidData => "invalid command data",
            RejectKind::InvalidCommand => "invalid command",
        };
        write!(f, "{s}")
    }
}

/// The error type for all azurlib operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port could not be opened or configured).
    #[error("transport error: {0}")]
    Transport(String),

    /// The amplifier answered the command with a group `11` error reply.
    ///
    /// Carries the offending command fields for diagnostics.
    #[error("{kind}: #{group},{number}{}", data_suffix(.data))]
    Rejected {
        /// Rejection reason decoded from the reply.
        kind: RejectKind,
        /// Group of the rejected command.
        group: String,
        /// Number of the rejected command.
        number: String,
        /// Data field of the rejected command, if any.
        data: Option<String>,
    },

    /// A reply could not be interpreted (missing or non-numeric value field).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for the transport.
    #[error("timeout waiting for response")]
    Timeout,

    /// A caller-supplied value was refused before any I/O took place.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The transport is closed.
    #[error("not connected")]
    NotConnected,

    /// The connection to the amplifier was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The rejection kind, if this is a device rejection.
    pub fn reject_kind(&self) -> Option<RejectKind> {
        match self {
            Error::Rejected { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the amplifier refused the command's data (`11,03`).
    pub fn is_invalid_data(&self) -> bool {
        self.reject_kind() == Some(RejectKind::InvalidData)
    }
}

fn data_suffix(data: &Option<String>) -> String {
    match data {
        Some(d) => format!(",{d}"),
        None => String::new(),
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
