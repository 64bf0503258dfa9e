//! Reply classification.
//!
//! [`classify`] turns one [`ResponseRecord`] into a [`Reply`]: a device
//! rejection (group `11`), a typed state [`Update`], or nothing at all for
//! records outside the known reply table. Classification is pure; applying
//! an update to the mirror is [`DeviceState::apply`](crate::state::DeviceState::apply).
//!
//! Field layout is `group, number, value`; the value is always field 2.

use azur_core::{
    AudioSource, DynamicRange, Error, InputId, RejectKind, Result, StereoMode, VideoSource,
};
use tracing::{debug, warn};

use crate::protocol::{ERROR_GROUP, ResponseRecord};

/// Reply groups (command group + 5).
pub mod reply_group {
    pub const AMPLIFIER: &str = "6";
    pub const SOURCE: &str = "7";
    pub const AUDIO_PROCESSING: &str = "9";
    pub const VERSION: &str = "10";
}

/// The outcome of classifying one reply record.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The amplifier refused the command.
    Rejected(RejectKind),
    /// The record reports a piece of device state.
    Update(Update),
    /// The record carries nothing the mirror tracks.
    Ignored,
}

/// A single piece of device state reported by a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Power(bool),
    Volume(i32),
    Bass(i32),
    Treble(i32),
    Subwoofer(bool),
    /// Attenuation in dB, already negated (`0..=-10`).
    LfeTrim(i32),
    Mute(bool),
    DynamicRange(DynamicRange),
    Osd(bool),
    LipSync(i32),
    ActiveInput(InputId),
    /// Audio source of whichever input is currently active.
    AudioSource(AudioSource),
    /// Video source of whichever input is currently active.
    VideoSource(VideoSource),
    StereoMode(StereoMode),
    ProcessingMode(String),
    Codec(String),
    SoftwareVersion(String),
    ProtocolVersion(String),
}

/// Classify a reply record.
///
/// Group `11` records are always rejections. Records in the known reply
/// table become updates; anything else is [`Reply::Ignored`]. A known record
/// whose value is missing or cannot be decoded is also ignored, with a
/// warning; only group `11` signals an error.
pub fn classify(record: &ResponseRecord) -> Reply {
    if record.group() == ERROR_GROUP {
        return Reply::Rejected(RejectKind::from_code(record.number()));
    }

    match decode(record) {
        Ok(Some(update)) => {
            debug!(record = %record, update = ?update, "classified reply");
            Reply::Update(update)
        }
        Ok(None) => {
            debug!(record = %record, "ignoring reply");
            Reply::Ignored
        }
        Err(e) => {
            warn!(record = %record, error = %e, "undecodable reply value");
            Reply::Ignored
        }
    }
}

fn decode(record: &ResponseRecord) -> Result<Option<Update>> {
    match (record.group(), record.number()) {
        (reply_group::AMPLIFIER, number) => classify_amplifier(number, record),
        (reply_group::SOURCE, number) => classify_source(number, record),
        (reply_group::AUDIO_PROCESSING, number) => classify_processing(number, record),
        (reply_group::VERSION, number) => classify_version(number, record),
        _ => Ok(None),
    }
}

fn classify_amplifier(number: &str, record: &ResponseRecord) -> Result<Option<Update>> {
    let update = match number {
        "01" => on_off(value(record)?).map(Update::Power),
        "02" | "03" => Some(Update::Volume(level(record)?)),
        "04" | "05" => Some(Update::Bass(level(record)?)),
        "06" | "07" => Some(Update::Treble(level(record)?)),
        "08" => Some(Update::Subwoofer(true)),
        "09" => Some(Update::Subwoofer(false)),
        "10" => Some(Update::LfeTrim(attenuation(record)?)),
        "11" => on_off(value(record)?).map(Update::Mute),
        "12" => DynamicRange::from_code(value(record)?).map(Update::DynamicRange),
        "13" => Some(Update::Osd(true)),
        "14" => Some(Update::Osd(false)),
        "20" | "21" => Some(Update::LipSync(level(record)?)),
        _ => None,
    };
    Ok(update)
}

fn classify_source(number: &str, record: &ResponseRecord) -> Result<Option<Update>> {
    let update = match number {
        "01" => {
            let code = value(record)?;
            let input = InputId::from_code(code).ok_or_else(|| {
                Error::Protocol(format!("non-numeric input id in reply {record}"))
            })?;
            Some(Update::ActiveInput(input))
        }
        "04" => AudioSource::from_code(value(record)?).map(Update::AudioSource),
        "05" => VideoSource::from_code(value(record)?).map(Update::VideoSource),
        _ => None,
    };
    Ok(update)
}

fn classify_processing(number: &str, record: &ResponseRecord) -> Result<Option<Update>> {
    let update = match number {
        "01" => StereoMode::from_code(value(record)?).map(Update::StereoMode),
        "02" | "04" => Some(Update::ProcessingMode(text(record)?)),
        "03" | "05" => Some(Update::Codec(text(record)?)),
        _ => None,
    };
    Ok(update)
}

fn classify_version(number: &str, record: &ResponseRecord) -> Result<Option<Update>> {
    let update = match number {
        "01" => Some(Update::SoftwareVersion(text(record)?)),
        "02" => Some(Update::ProtocolVersion(text(record)?)),
        _ => None,
    };
    Ok(update)
}

/// The value field (field 2), or a protocol error naming the record.
pub fn value(record: &ResponseRecord) -> Result<&str> {
    record
        .value()
        .ok_or_else(|| Error::Protocol(format!("reply {record} has no value field")))
}

/// Parse the value field as a signed level.
///
/// Whitespace anywhere in the field is ignored, so the amplifier's
/// `"+ 4"` and `" 0"` forms parse as `4` and `0`.
pub fn level(record: &ResponseRecord) -> Result<i32> {
    parse_level(value(record)?)
        .ok_or_else(|| Error::Protocol(format!("non-numeric level in reply {record}")))
}

pub(crate) fn parse_level(raw: &str) -> Option<i32> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact.parse().ok()
}

/// The LFE trim level as a non-positive number of dB. The amplifier may
/// report it with either sign.
pub fn attenuation(record: &ResponseRecord) -> Result<i32> {
    level(record)?
        .checked_abs()
        .map(|db| -db)
        .ok_or_else(|| Error::Protocol(format!("trim out of range in reply {record}")))
}

fn text(record: &ResponseRecord) -> Result<String> {
    Ok(value(record)?.trim().to_string())
}

/// A power or mute bit. Both `"1"` and `"01"` forms occur.
fn on_off(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "01" => Some(true),
        "0" | "00" => Some(false),
        _ => None,
    }
}
