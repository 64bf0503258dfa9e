//! Azur RS-232 frame encoder/decoder.
//!
//! The amplifier speaks a carriage-return terminated ASCII protocol.
//! Every command names a *group* (command family) and a *number* (the
//! operation within the family), optionally followed by a data field.
//!
//! # Command format
//!
//! ```text
//! #<group>,<number>[,<data>]\r
//! ```
//!
//! - `group`: decimal command group, no padding (`1` amplifier, `2` source,
//!   `4` audio processing, `5` version).
//! - `number`: two-digit command number (`01`, `02`, ...).
//! - `data`: optional parameter. Omitted entirely (not sent as an empty
//!   field) when the command takes none.
//!
//! # Reply format
//!
//! Replies use the same comma-separated layout, behind a one-character
//! marker, with the group shifted by five (`6` answers `1`, `7` answers
//! `2`, ...). Group `11` is reserved for error replies. One read may carry
//! several `\r`-terminated replies, and the amplifier is known to repeat
//! identical status lines, so [`split_response`] collapses duplicates.
//!
//! No numeric interpretation happens here; every field stays a string.
//! The [`response`](crate::response) module gives the fields meaning.

use std::collections::HashSet;
use std::fmt;

use bytes::{BufMut, BytesMut};
use tracing::warn;

/// Frame terminator byte.
pub const TERMINATOR: u8 = b'\r';

/// Leading byte of every outbound command.
pub const COMMAND_MARKER: u8 = b'#';

/// Reply group used for error replies.
pub const ERROR_GROUP: &str = "11";

/// Offset between a command group and the group of its reply.
pub const REPLY_GROUP_OFFSET: u8 = 5;

/// Command group codes.
pub mod group {
    /// Power, levels, mute, OSD, lip sync.
    pub const AMPLIFIER: u8 = 1;
    /// Input selection and per-input source assignment.
    pub const SOURCE: u8 = 2;
    /// Stereo mode, DSP mode, codec.
    pub const AUDIO_PROCESSING: u8 = 4;
    /// Firmware and protocol versions.
    pub const VERSION: u8 = 5;
}

/// A single command frame.
///
/// Immutable once built; use the builders in [`commands`](crate::commands)
/// rather than constructing raw codes where possible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    group: u8,
    number: u8,
    data: Option<String>,
}

impl Command {
    /// A command without a data field.
    pub fn new(group: u8, number: u8) -> Self {
        Command {
            group,
            number,
            data: None,
        }
    }

    /// A command carrying a data field.
    ///
    /// An empty string is treated as "no data" and is not put on the wire.
    pub fn with_data(group: u8, number: u8, data: impl Into<String>) -> Self {
        let data = data.into();
        Command {
            group,
            number,
            data: if data.is_empty() { None } else { Some(data) },
        }
    }

    pub fn group(&self) -> u8 {
        self.group
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// The group as it appears on the wire (`"1"`).
    pub fn group_code(&self) -> String {
        self.group.to_string()
    }

    /// The number as it appears on the wire (`"02"`).
    pub fn number_code(&self) -> String {
        format!("{:02}", self.number)
    }

    /// The group the amplifier answers this command with (`"6"` for `1`).
    pub fn reply_group(&self) -> String {
        (self.group + REPLY_GROUP_OFFSET).to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{},{:02}", self.group, self.number)?;
        if let Some(data) = &self.data {
            write!(f, ",{data}")?;
        }
        Ok(())
    }
}

/// Encode a command into raw bytes ready for transmission.
///
/// # Example
///
/// ```
/// use azur650::protocol::{encode_command, Command};
///
/// assert_eq!(encode_command(&Command::new(1, 2)), b"#1,02\r");
/// assert_eq!(encode_command(&Command::with_data(1, 10, "5")), b"#1,10,5\r");
/// ```
pub fn encode_command(cmd: &Command) -> Vec<u8> {
    let group = cmd.group_code();
    let number = cmd.number_code();
    let data_len = cmd.data().map_or(0, |d| d.len() + 1);
    let mut buf = BytesMut::with_capacity(1 + group.len() + 1 + number.len() + data_len + 1);
    buf.put_u8(COMMAND_MARKER);
    buf.put_slice(group.as_bytes());
    buf.put_u8(b',');
    buf.put_slice(number.as_bytes());
    if let Some(data) = cmd.data() {
        buf.put_u8(b',');
        buf.put_slice(data.as_bytes());
    }
    buf.put_u8(TERMINATOR);
    buf.to_vec()
}

/// One reply line, split into its comma-separated fields.
///
/// Field 0 is the reply group, field 1 the number, and fields 2.. the data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseRecord {
    fields: Vec<String>,
}

impl ResponseRecord {
    /// Build a record from already-split fields.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResponseRecord {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a marker-less reply body (`"6,02,-20"`) on commas.
    pub fn parse(body: &str) -> Self {
        ResponseRecord::from_fields(body.split(','))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Reply group (field 0).
    pub fn group(&self) -> &str {
        self.field(0).unwrap_or("")
    }

    /// Reply number (field 1).
    pub fn number(&self) -> &str {
        self.field(1).unwrap_or("")
    }

    /// First data field (field 2), where the reported value lives.
    pub fn value(&self) -> Option<&str> {
        self.field(2)
    }

    /// Whether this is a group `11` error reply.
    pub fn is_error(&self) -> bool {
        self.group() == ERROR_GROUP
    }

    /// Whether this record is the amplifier's answer to `cmd`.
    pub fn answers(&self, cmd: &Command) -> bool {
        self.group() == cmd.reply_group() && self.number() == cmd.number_code()
    }
}

impl fmt::Display for ResponseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join(","))
    }
}

/// Split one raw read into de-duplicated reply records.
///
/// Lines are separated by `\r`; empty segments are discarded, byte-identical
/// lines are kept once (first arrival wins the position), and each line
/// loses its one-character marker before being split on commas. Lines that
/// are not valid UTF-8 are dropped with a warning.
///
/// # Example
///
/// ```
/// use azur650::protocol::split_response;
///
/// let records = split_response(b"#7,01,03\r#6,01,1\r#6,01,1\r");
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].fields(), ["7", "01", "03"]);
/// assert_eq!(records[1].value(), Some("1"));
/// ```
pub fn split_response(raw: &[u8]) -> Vec<ResponseRecord> {
    let mut seen: HashSet<&[u8]> = HashSet::new();
    let mut records = Vec::new();

    for line in raw.split(|&b| b == TERMINATOR) {
        if line.is_empty() || !seen.insert(line) {
            continue;
        }
        let Ok(text) = std::str::from_utf8(line) else {
            warn!(line = ?String::from_utf8_lossy(line), "discarding undecodable reply line");
            continue;
        };
        let mut chars = text.chars();
        if chars.next().is_none() {
            continue;
        }
        let body = chars.as_str();
        if body.is_empty() {
            continue;
        }
        records.push(ResponseRecord::parse(body));
    }

    records
}
