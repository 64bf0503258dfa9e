//! Azur command builders.
//!
//! One function per entry in the amplifier's command table. All functions
//! are pure: they produce [`Command`] values without performing any I/O.
//! The caller encodes them with [`encode_command`](crate::protocol::encode_command)
//! and hands them to the dispatcher.
//!
//! Argument validation (input catalogue, level bounds) is the engine's job;
//! builders only format what they are given.

use azur_core::{AudioSource, InputId, StereoMode, VideoSource};

use crate::protocol::{Command, group};

// ---------------------------------------------------------------
// Group 1: amplifier
// ---------------------------------------------------------------

/// Power on (`#1,01,1`) or standby (`#1,01,0`).
pub fn cmd_power(on: bool) -> Command {
    Command::with_data(group::AMPLIFIER, 1, if on { "1" } else { "0" })
}

/// Volume up one step (`#1,02`); answered with the new level.
pub fn cmd_volume_up() -> Command {
    Command::new(group::AMPLIFIER, 2)
}

/// Volume down one step (`#1,03`).
pub fn cmd_volume_down() -> Command {
    Command::new(group::AMPLIFIER, 3)
}

/// Bass up one step (`#1,04`).
pub fn cmd_bass_up() -> Command {
    Command::new(group::AMPLIFIER, 4)
}

/// Bass down one step (`#1,05`).
pub fn cmd_bass_down() -> Command {
    Command::new(group::AMPLIFIER, 5)
}

/// Treble up (`#1,06`). Treble moves in 2 dB steps.
pub fn cmd_treble_up() -> Command {
    Command::new(group::AMPLIFIER, 6)
}

/// Treble down (`#1,07`).
pub fn cmd_treble_down() -> Command {
    Command::new(group::AMPLIFIER, 7)
}

/// Subwoofer on (`#1,08`) or off (`#1,09`).
pub fn cmd_subwoofer(on: bool) -> Command {
    Command::new(group::AMPLIFIER, if on { 8 } else { 9 })
}

/// Set the LFE trim attenuation (`#1,10,<magnitude>`).
///
/// The amplifier takes the attenuation as an unsigned number of dB.
pub fn cmd_lfe_trim(magnitude: u8) -> Command {
    Command::with_data(group::AMPLIFIER, 10, magnitude.to_string())
}

/// Mute (`#1,11,01`) or unmute (`#1,11,00`).
pub fn cmd_mute(on: bool) -> Command {
    Command::with_data(group::AMPLIFIER, 11, if on { "01" } else { "00" })
}

/// Show (`#1,13`) or hide (`#1,14`) the on-screen display.
pub fn cmd_osd(show: bool) -> Command {
    Command::new(group::AMPLIFIER, if show { 13 } else { 14 })
}

/// On-screen display cursor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsdDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Move the OSD cursor (`#1,15` .. `#1,18`).
pub fn cmd_osd_navigate(direction: OsdDirection) -> Command {
    let number = match direction {
        OsdDirection::Up => 15,
        OsdDirection::Down => 16,
        OsdDirection::Left => 17,
        OsdDirection::Right => 18,
    };
    Command::new(group::AMPLIFIER, number)
}

/// Confirm the highlighted OSD item (`#1,19`).
pub fn cmd_osd_enter() -> Command {
    Command::new(group::AMPLIFIER, 19)
}

/// Shorten the lip-sync delay by one step (`#1,20`).
pub fn cmd_lip_sync_decrease() -> Command {
    Command::new(group::AMPLIFIER, 20)
}

/// Lengthen the lip-sync delay by one step (`#1,21`).
pub fn cmd_lip_sync_increase() -> Command {
    Command::new(group::AMPLIFIER, 21)
}

// ---------------------------------------------------------------
// Group 2: source
// ---------------------------------------------------------------

/// Select an input (`#2,01,<id>`), id always two digits.
pub fn cmd_select_input(input: InputId) -> Command {
    Command::with_data(group::SOURCE, 1, input.code())
}

/// Step to the previous input (`#2,02`).
pub fn cmd_previous_input() -> Command {
    Command::new(group::SOURCE, 2)
}

/// Step to the next input (`#2,03`).
pub fn cmd_next_input() -> Command {
    Command::new(group::SOURCE, 3)
}

/// Assign the audio source of the active input (`#2,04,<code>`).
pub fn cmd_audio_source(source: AudioSource) -> Command {
    Command::with_data(group::SOURCE, 4, source.code())
}

/// Assign the video source of the active input (`#2,05,<code>`).
pub fn cmd_video_source(source: VideoSource) -> Command {
    Command::with_data(group::SOURCE, 5, source.code())
}

// ---------------------------------------------------------------
// Group 4: audio processing
// ---------------------------------------------------------------

/// Set the stereo mode (`#4,01,<code>`).
pub fn cmd_stereo_mode(mode: StereoMode) -> Command {
    Command::with_data(group::AUDIO_PROCESSING, 1, mode.code())
}

/// Cycle to the next DSP mode (`#4,02`).
pub fn cmd_next_processing_mode() -> Command {
    Command::new(group::AUDIO_PROCESSING, 2)
}

/// Cycle the decoder codec (`#4,03`).
pub fn cmd_next_codec() -> Command {
    Command::new(group::AUDIO_PROCESSING, 3)
}

/// Query the active DSP mode (`#4,04`).
pub fn cmd_read_processing_mode() -> Command {
    Command::new(group::AUDIO_PROCESSING, 4)
}

/// Query the active codec (`#4,05`).
pub fn cmd_read_codec() -> Command {
    Command::new(group::AUDIO_PROCESSING, 5)
}

// ---------------------------------------------------------------
// Group 5: version
// ---------------------------------------------------------------

/// Query the firmware version (`#5,01`).
pub fn cmd_read_software_version() -> Command {
    Command::new(group::VERSION, 1)
}

/// Query the RS-232 protocol version (`#5,02`).
pub fn cmd_read_protocol_version() -> Command {
    Command::new(group::VERSION, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_command;

    fn wire(cmd: Command) -> String {
        String::from_utf8(encode_command(&cmd)).unwrap()
    }

    #[test]
    fn amplifier_group() {
        assert_eq!(wire(cmd_power(true)), "#1,01,1\r");
        assert_eq!(wire(cmd_power(false)), "#1,01,0\r");
        assert_eq!(wire(cmd_volume_up()), "#1,02\r");
        assert_eq!(wire(cmd_volume_down()), "#1,03\r");
        assert_eq!(wire(cmd_bass_up()), "#1,04\r");
        assert_eq!(wire(cmd_bass_down()), "#1,05\r");
        assert_eq!(wire(cmd_treble_up()), "#1,06\r");
        assert_eq!(wire(cmd_treble_down()), "#1,07\r");
        assert_eq!(wire(cmd_subwoofer(true)), "#1,08\r");
        assert_eq!(wire(cmd_subwoofer(false)), "#1,09\r");
        assert_eq!(wire(cmd_lfe_trim(7)), "#1,10,7\r");
        assert_eq!(wire(cmd_lfe_trim(10)), "#1,10,10\r");
        assert_eq!(wire(cmd_mute(true)), "#1,11,01\r");
        assert_eq!(wire(cmd_mute(false)), "#1,11,00\r");
        assert_eq!(wire(cmd_osd(true)), "#1,13\r");
        assert_eq!(wire(cmd_osd(false)), "#1,14\r");
        assert_eq!(wire(cmd_osd_enter()), "#1,19\r");
        assert_eq!(wire(cmd_lip_sync_decrease()), "#1,20\r");
        assert_eq!(wire(cmd_lip_sync_increase()), "#1,21\r");
    }

    #[test]
    fn osd_navigation_numbers() {
        assert_eq!(wire(cmd_osd_navigate(OsdDirection::Up)), "#1,15\r");
        assert_eq!(wire(cmd_osd_navigate(OsdDirection::Down)), "#1,16\r");
        assert_eq!(wire(cmd_osd_navigate(OsdDirection::Left)), "#1,17\r");
        assert_eq!(wire(cmd_osd_navigate(OsdDirection::Right)), "#1,18\r");
    }

    #[test]
    fn source_group() {
        assert_eq!(wire(cmd_select_input(InputId::CD)), "#2,01,07\r");
        assert_eq!(wire(cmd_select_input(InputId::DIRECT_IN)), "#2,01,10\r");
        assert_eq!(wire(cmd_previous_input()), "#2,02\r");
        assert_eq!(wire(cmd_next_input()), "#2,03\r");
        assert_eq!(wire(cmd_audio_source(AudioSource::Hdmi)), "#2,04,02\r");
        assert_eq!(wire(cmd_video_source(VideoSource::Component)), "#2,05,01\r");
    }

    #[test]
    fn audio_processing_group() {
        assert_eq!(wire(cmd_stereo_mode(StereoMode::Stereo)), "#4,01,00\r");
        assert_eq!(wire(cmd_stereo_mode(StereoMode::StereoSubwoofer)), "#4,01,01\r");
        assert_eq!(wire(cmd_next_processing_mode()), "#4,02\r");
        assert_eq!(wire(cmd_next_codec()), "#4,03\r");
        assert_eq!(wire(cmd_read_processing_mode()), "#4,04\r");
        assert_eq!(wire(cmd_read_codec()), "#4,05\r");
    }

    #[test]
    fn version_group() {
        assert_eq!(wire(cmd_read_software_version()), "#5,01\r");
        assert_eq!(wire(cmd_read_protocol_version()), "#5,02\r");
    }
}
