//! Device catalogues used throughout azurlib.
//!
//! The amplifier identifies inputs, sources, and modes by short numeric
//! codes (`"03"`, `"1"`). These types give those codes names and carry the
//! display strings shown on the front panel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Parse a numeric wire code, accepting both padded (`"03"`) and bare
/// (`"3"`) forms.
fn parse_code(code: &str) -> Option<u8> {
    code.trim().parse().ok()
}

/// Amplifier input identifier.
///
/// Wraps the numeric input code used by the source command group. The
/// wire form is always two digits (`"00"`..`"10"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputId(u8);

impl InputId {
    pub const TUNER: InputId = InputId(0);
    pub const BD_DVD: InputId = InputId(1);
    pub const VIDEO_1: InputId = InputId(2);
    pub const VIDEO_2: InputId = InputId(3);
    pub const VIDEO_3: InputId = InputId(4);
    pub const REC_1: InputId = InputId(5);
    pub const AUX: InputId = InputId(6);
    pub const CD: InputId = InputId(7);
    pub const REC_2: InputId = InputId(8);
    /// The tuner as reported by some firmware revisions.
    pub const TUNER_ALT: InputId = InputId(9);
    pub const DIRECT_IN: InputId = InputId(10);

    /// Every input the amplifier is known to report.
    pub const ALL: [InputId; 11] = [
        InputId::TUNER,
        InputId::BD_DVD,
        InputId::VIDEO_1,
        InputId::VIDEO_2,
        InputId::VIDEO_3,
        InputId::REC_1,
        InputId::AUX,
        InputId::CD,
        InputId::REC_2,
        InputId::TUNER_ALT,
        InputId::DIRECT_IN,
    ];

    /// Create an `InputId` from a raw index.
    pub fn from_index(index: u8) -> Self {
        InputId(index)
    }

    /// Parse a wire code such as `"03"`.
    ///
    /// Returns `None` for non-numeric codes. Codes outside the known
    /// catalogue are still accepted; [`name`](Self::name) returns `None`
    /// for them.
    pub fn from_code(code: &str) -> Option<Self> {
        parse_code(code).map(InputId)
    }

    /// Return the raw numeric index of this input.
    pub fn index(&self) -> u8 {
        self.0
    }

    /// The two-digit wire code (e.g. `"03"`).
    pub fn code(&self) -> String {
        format!("{:02}", self.0)
    }

    /// Front-panel name, if the input is in the known catalogue.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "Tuner",
            1 => "BD/DVD",
            2 => "Video 1",
            3 => "Video 2",
            4 => "Video 3",
            5 => "Rec 1",
            6 => "Aux",
            7 => "CD",
            8 => "Rec 2",
            9 => "Tuner",
            10 => "7.1 Direct In",
            _ => return None,
        };
        Some(name)
    }

    /// Whether the input is part of the known catalogue.
    pub fn is_known(&self) -> bool {
        self.name().is_some()
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({:02})", self.0),
            None => write!(f, "Input-{:02}", self.0),
        }
    }
}

/// Error returned when a string cannot be parsed into an [`InputId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseInputError(String);

impl fmt::Display for ParseInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown input: '{}'. Expected an id 00-10 or one of: tuner, bd-dvd, \
             video1, video2, video3, rec1, aux, cd, rec2, direct",
            self.0
        )
    }
}

impl std::error::Error for ParseInputError {}

impl FromStr for InputId {
    type Err = ParseInputError;

    /// Accepts a known input id (`"07"`, `"7"`) or a name shortcut
    /// (`"cd"`, `"bd-dvd"`, `"Video 1"`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(id) = InputId::from_code(s) {
            return if id.is_known() {
                Ok(id)
            } else {
                Err(ParseInputError(s.to_string()))
            };
        }
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "tuner" => Ok(InputId::TUNER),
            "bddvd" | "bd" | "dvd" => Ok(InputId::BD_DVD),
            "video1" => Ok(InputId::VIDEO_1),
            "video2" => Ok(InputId::VIDEO_2),
            "video3" => Ok(InputId::VIDEO_3),
            "rec1" => Ok(InputId::REC_1),
            "aux" => Ok(InputId::AUX),
            "cd" => Ok(InputId::CD),
            "rec2" => Ok(InputId::REC_2),
            "direct" | "71direct" | "71directin" | "directin" => Ok(InputId::DIRECT_IN),
            _ => Err(ParseInputError(s.to_string())),
        }
    }
}

/// Audio source assigned to an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioSource {
    Analogue,
    Digital,
    Hdmi,
}

impl AudioSource {
    /// Parse a wire code (`"0"`/`"00"` .. `"2"`/`"02"`).
    pub fn from_code(code: &str) -> Option<Self> {
        match parse_code(code)? {
            0 => Some(AudioSource::Analogue),
            1 => Some(AudioSource::Digital),
            2 => Some(AudioSource::Hdmi),
            _ => None,
        }
    }

    /// The two-digit wire code sent when assigning this source.
    pub fn code(&self) -> &'static str {
        match self {
            AudioSource::Analogue => "00",
            AudioSource::Digital => "01",
            AudioSource::Hdmi => "02",
        }
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AudioSource::Analogue => "analogue",
            AudioSource::Digital => "digital",
            AudioSource::Hdmi => "HDMI",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string cannot be parsed into a source or mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCatalogueError {
    what: &'static str,
    value: String,
}

impl fmt::Display for ParseCatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.what, self.value)
    }
}

impl std::error::Error for ParseCatalogueError {}

impl FromStr for AudioSource {
    type Err = ParseCatalogueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(src) = AudioSource::from_code(s) {
            return Ok(src);
        }
        match s.to_lowercase().as_str() {
            "analogue" | "analog" => Ok(AudioSource::Analogue),
            "digital" => Ok(AudioSource::Digital),
            "hdmi" => Ok(AudioSource::Hdmi),
            _ => Err(ParseCatalogueError {
                what: "audio source",
                value: s.to_string(),
            }),
        }
    }
}

/// Video source assigned to an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoSource {
    SVideo,
    Component,
    Composite,
    Hdmi,
}

impl VideoSource {
    /// Parse a wire code (`"0"`/`"00"` .. `"3"`/`"03"`).
    pub fn from_code(code: &str) -> Option<Self> {
        match parse_code(code)? {
            0 => Some(VideoSource::SVideo),
            1 => Some(VideoSource::Component),
            2 => Some(VideoSource::Composite),
            3 => Some(VideoSource::Hdmi),
            _ => None,
        }
    }

    /// The two-digit wire code sent when assigning this source.
    pub fn code(&self) -> &'static str {
        match self {
            VideoSource::SVideo => "00",
            VideoSource::Component => "01",
            VideoSource::Composite => "02",
            VideoSource::Hdmi => "03",
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VideoSource::SVideo => "S-video",
            VideoSource::Component => "Component",
            VideoSource::Composite => "Composite",
            VideoSource::Hdmi => "HDMI",
        };
        write!(f, "{s}")
    }
}

impl FromStr for VideoSource {
    type Err = ParseCatalogueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(src) = VideoSource::from_code(s) {
            return Ok(src);
        }
        match s.to_lowercase().as_str() {
            "s-video" | "svideo" => Ok(VideoSource::SVideo),
            "component" => Ok(VideoSource::Component),
            "composite" => Ok(VideoSource::Composite),
            "hdmi" => Ok(VideoSource::Hdmi),
            _ => Err(ParseCatalogueError {
                what: "video source",
                value: s.to_string(),
            }),
        }
    }
}

/// Stereo listening mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StereoMode {
    /// Stereo without the subwoofer.
    Stereo,
    /// Stereo with the subwoofer engaged.
    StereoSubwoofer,
}

impl StereoMode {
    pub fn from_code(code: &str) -> Option<Self> {
        match parse_code(code)? {
            0 => Some(StereoMode::Stereo),
            1 => Some(StereoMode::StereoSubwoofer),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StereoMode::Stereo => "00",
            StereoMode::StereoSubwoofer => "01",
        }
    }
}

impl fmt::Display for StereoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StereoMode::Stereo => write!(f, "Stereo"),
            StereoMode::StereoSubwoofer => write!(f, "Stereo + Subwoofer"),
        }
    }
}

impl FromStr for StereoMode {
    type Err = ParseCatalogueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(mode) = StereoMode::from_code(s) {
            return Ok(mode);
        }
        match s.to_lowercase().as_str() {
            "stereo" | "plain" => Ok(StereoMode::Stereo),
            "stereo+sub" | "stereo-sub" | "sub" | "subwoofer" => Ok(StereoMode::StereoSubwoofer),
            _ => Err(ParseCatalogueError {
                what: "stereo mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Dynamic range compression level.
///
/// The amplifier reports five discrete steps which map onto fractions of
/// full compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DynamicRange {
    Off,
    Quarter,
    Half,
    ThreeQuarters,
    Full,
}

impl DynamicRange {
    /// Parse the reported step (`"0"`..`"4"`).
    pub fn from_code(code: &str) -> Option<Self> {
        match parse_code(code)? {
            0 => Some(DynamicRange::Off),
            1 => Some(DynamicRange::Quarter),
            2 => Some(DynamicRange::Half),
            3 => Some(DynamicRange::ThreeQuarters),
            4 => Some(DynamicRange::Full),
            _ => None,
        }
    }

    /// The compression level as a fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        match self {
            DynamicRange::Off => 0.0,
            DynamicRange::Quarter => 0.25,
            DynamicRange::Half => 0.5,
            DynamicRange::ThreeQuarters => 0.75,
            DynamicRange::Full => 1.0,
        }
    }
}

impl fmt::Display for DynamicRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.fraction() * 100.0)
    }
}
