//! Mirror of the amplifier's last reported state.
//!
//! The amplifier is the source of truth. [`DeviceState`] only caches what
//! replies have reported, so every field starts out unknown (`None`) and is
//! filled in as commands are answered. The engine owns one instance and is
//! the only writer; callers get read-only access and may snapshot it with
//! `serde`.

use std::collections::BTreeMap;

use azur_core::{AudioSource, DynamicRange, InputId, StereoMode, VideoSource};
use serde::Serialize;
use tracing::debug;

use crate::response::Update;

/// Cached state of the amplifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceState {
    power: Option<bool>,
    volume: Option<i32>,
    bass: Option<i32>,
    treble: Option<i32>,
    subwoofer: Option<bool>,
    lfe_trim: Option<i32>,
    mute: Option<bool>,
    dynamic_range: Option<DynamicRange>,
    osd: Option<bool>,
    lip_sync: Option<i32>,
    active_input: Option<InputId>,
    /// At most one entry per input id.
    audio_sources: BTreeMap<InputId, AudioSource>,
    video_sources: BTreeMap<InputId, VideoSource>,
    stereo_mode: Option<StereoMode>,
    processing_mode: Option<String>,
    codec: Option<String>,
    software_version: Option<String>,
    protocol_version: Option<String>,
}

impl DeviceState {
    /// Apply one classified update.
    ///
    /// Source updates are attributed to the active input; with no active
    /// input known they are dropped.
    pub(crate) fn apply(&mut self, update: Update) {
        match update {
            Update::Power(on) => self.power = Some(on),
            Update::Volume(v) => self.volume = Some(v),
            Update::Bass(v) => self.bass = Some(v),
            Update::Treble(v) => self.treble = Some(v),
            Update::Subwoofer(on) => self.subwoofer = Some(on),
            Update::LfeTrim(v) => self.lfe_trim = Some(v),
            Update::Mute(on) => self.mute = Some(on),
            Update::DynamicRange(dr) => self.dynamic_range = Some(dr),
            Update::Osd(shown) => self.osd = Some(shown),
            Update::LipSync(v) => self.lip_sync = Some(v),
            Update::ActiveInput(input) => self.active_input = Some(input),
            Update::AudioSource(src) => match self.active_input {
                Some(input) => {
                    self.audio_sources.insert(input, src);
                }
                None => debug!(source = %src, "audio source reported with no active input"),
            },
            Update::VideoSource(src) => match self.active_input {
                Some(input) => {
                    self.video_sources.insert(input, src);
                }
                None => debug!(source = %src, "video source reported with no active input"),
            },
            Update::StereoMode(mode) => self.stereo_mode = Some(mode),
            Update::ProcessingMode(mode) => self.processing_mode = Some(mode),
            Update::Codec(codec) => self.codec = Some(codec),
            Update::SoftwareVersion(v) => self.software_version = Some(v),
            Update::ProtocolVersion(v) => self.protocol_version = Some(v),
        }
    }

    pub fn power(&self) -> Option<bool> {
        self.power
    }

    /// Master volume in dB (`-90..=0`).
    pub fn volume(&self) -> Option<i32> {
        self.volume
    }

    pub fn bass(&self) -> Option<i32> {
        self.bass
    }

    pub fn treble(&self) -> Option<i32> {
        self.treble
    }

    pub fn subwoofer(&self) -> Option<bool> {
        self.subwoofer
    }

    /// LFE trim in dB, zero or negative.
    pub fn lfe_trim(&self) -> Option<i32> {
        self.lfe_trim
    }

    pub fn mute(&self) -> Option<bool> {
        self.mute
    }

    pub fn dynamic_range(&self) -> Option<DynamicRange> {
        self.dynamic_range
    }

    /// Whether the on-screen display is shown.
    pub fn osd(&self) -> Option<bool> {
        self.osd
    }

    pub fn lip_sync(&self) -> Option<i32> {
        self.lip_sync
    }

    pub fn active_input(&self) -> Option<InputId> {
        self.active_input
    }

    /// Front-panel name of the active input.
    pub fn active_input_name(&self) -> Option<&'static str> {
        self.active_input.and_then(|input| input.name())
    }

    /// Last reported audio source of `input`.
    pub fn audio_source(&self, input: InputId) -> Option<AudioSource> {
        self.audio_sources.get(&input).copied()
    }

    /// Last reported video source of `input`.
    pub fn video_source(&self, input: InputId) -> Option<VideoSource> {
        self.video_sources.get(&input).copied()
    }

    /// Audio source of the active input.
    pub fn active_audio_source(&self) -> Option<AudioSource> {
        self.active_input.and_then(|input| self.audio_source(input))
    }

    /// Video source of the active input.
    pub fn active_video_source(&self) -> Option<VideoSource> {
        self.active_input.and_then(|input| self.video_source(input))
    }

    pub fn audio_sources(&self) -> &BTreeMap<InputId, AudioSource> {
        &self.audio_sources
    }

    pub fn video_sources(&self) -> &BTreeMap<InputId, VideoSource> {
        &self.video_sources
    }

    pub fn stereo_mode(&self) -> Option<StereoMode> {
        self.stereo_mode
    }

    /// DSP mode as shown on the front panel (e.g. `"PLII Movie"`).
    pub fn processing_mode(&self) -> Option<&str> {
        self.processing_mode.as_deref()
    }

    pub fn codec(&self) -> Option<&str> {
        self.codec.as_deref()
    }

    pub fn software_version(&self) -> Option<&str> {
        self.software_version.as_deref()
    }

    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }
}
