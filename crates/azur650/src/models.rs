//! Amplifier model definitions.
//!
//! An [`AmplifierModel`] captures the fixed facts the engine needs about a
//! specific receiver: serial defaults, register bounds used to validate
//! absolute "set" requests, and which inputs accept per-input source
//! assignment.
//!
//! | Model      | Baud | Volume    | Bass/Treble | LFE trim |
//! |------------|------|-----------|-------------|----------|
//! | Azur 650R  | 9600 | -90..=0   | -10..=10    | 0..=10   |

use std::ops::RangeInclusive;
use std::time::Duration;

use azur_core::InputId;

/// Static model definition for an Azur receiver.
#[derive(Debug, Clone)]
pub struct AmplifierModel {
    /// Human-readable model name (e.g. "Azur 650R").
    pub name: &'static str,
    /// Serial baud rate the control port runs at.
    pub default_baud_rate: u32,
    /// How long one read waits for reply bytes.
    pub default_read_timeout: Duration,
    /// Largest number of bytes taken per command round trip.
    pub default_max_read_len: usize,
    /// Master volume bounds in dB.
    pub volume_range: RangeInclusive<i32>,
    /// Bass tone bounds in dB.
    pub bass_range: RangeInclusive<i32>,
    /// Treble tone bounds in dB.
    pub treble_range: RangeInclusive<i32>,
    /// Largest LFE attenuation accepted, in dB.
    pub max_lfe_trim: u8,
    /// Inputs whose audio/video source can be reassigned.
    pub assignable_inputs: RangeInclusive<InputId>,
}

impl AmplifierModel {
    /// Whether `input` accepts per-input source assignment.
    pub fn accepts_source_assignment(&self, input: InputId) -> bool {
        self.assignable_inputs.contains(&input)
    }
}

/// Cambridge Audio Azur 650R.
pub fn azur_650r() -> AmplifierModel {
    AmplifierModel {
        name: "Azur 650R",
        default_baud_rate: 9600,
        default_read_timeout: Duration::from_millis(80),
        default_max_read_len: 50,
        volume_range: -90..=0,
        bass_range: -10..=10,
        treble_range: -10..=10,
        max_lfe_trim: 10,
        assignable_inputs: InputId::BD_DVD..=InputId::TUNER_ALT,
    }
}
