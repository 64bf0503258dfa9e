// azur-cli -- command line tool for driving a Cambridge Audio Azur 650R
// over its RS-232 control port.
//
// Usage:
//   azur-cli --port /dev/ttyUSB0 power on
//   azur-cli --port /dev/ttyUSB0 volume set -35
//   azur-cli --port /dev/ttyUSB0 input select cd
//   azur-cli --port /dev/ttyUSB0 --json audio-source hdmi
//   azur-cli --mock input list
//
// Logging goes to stderr. RUST_LOG overrides the level picked by -v.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use azur650::{Azur650, Azur650Builder, DeviceState, OsdDirection, azur_650r};
use azur_core::{AudioSource, InputId, StereoMode, VideoSource};
use azur_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Control a Cambridge Audio Azur 650R from the command line.
#[derive(Parser)]
#[command(name = "azur-cli", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3). Required unless --mock.
    #[arg(long)]
    port: Option<String>,

    /// Override the default baud rate (9600).
    #[arg(long)]
    baud: Option<u32>,

    /// How long each command waits for the reply, in milliseconds.
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Use a mock transport instead of a real serial port.
    /// Useful for checking argument parsing without hardware; any command
    /// that talks to the amplifier fails.
    #[arg(long)]
    mock: bool,

    /// Print the mirrored device state as JSON after the command.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Switch the amplifier on or to standby.
    Power { state: OnOff },

    /// Master volume (dB, -90..=0).
    Volume {
        #[command(subcommand)]
        action: LevelAction,
    },

    /// Bass tone (dB, -10..=10).
    Bass {
        #[command(subcommand)]
        action: LevelAction,
    },

    /// Treble tone (dB, -10..=10, steps of 2).
    Treble {
        #[command(subcommand)]
        action: LevelAction,
    },

    /// Subwoofer output.
    Sub { state: OnOff },

    /// Set the LFE trim attenuation (0..=10 dB, sign ignored).
    Lfe {
        #[arg(allow_negative_numbers = true)]
        db: i32,
    },

    /// Mute or unmute.
    Mute { state: OnOff },

    /// On-screen display.
    Osd {
        #[command(subcommand)]
        action: OsdAction,
    },

    /// Lip-sync delay.
    LipSync { direction: UpDown },

    /// Input selection.
    Input {
        #[command(subcommand)]
        action: InputAction,
    },

    /// Assign the audio source of the active input (analogue, digital, hdmi).
    AudioSource { source: AudioSource },

    /// Assign the video source of the active input (s-video, component,
    /// composite, hdmi).
    VideoSource { source: VideoSource },

    /// Stereo listening mode (stereo, sub).
    StereoMode { mode: StereoMode },

    /// DSP processing mode.
    Dsp {
        #[command(subcommand)]
        action: QueryAction,
    },

    /// Incoming signal codec.
    Codec {
        #[command(subcommand)]
        action: QueryAction,
    },

    /// Print software and protocol versions.
    Version,

    /// Print the mirrored device state.
    State,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OnOff {
    On,
    Off,
}

impl OnOff {
    fn is_on(self) -> bool {
        matches!(self, OnOff::On)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UpDown {
    Up,
    Down,
}

#[derive(Subcommand)]
enum LevelAction {
    /// One step up.
    Up,
    /// One step down.
    Down,
    /// Step to an absolute level.
    Set {
        #[arg(allow_negative_numbers = true)]
        level: i32,
    },
}

#[derive(Subcommand)]
enum OsdAction {
    Show,
    Hide,
    Up,
    Down,
    Left,
    Right,
    Enter,
}

#[derive(Subcommand)]
enum InputAction {
    /// Select an input by id (00-10) or name (tuner, bd-dvd, video1, cd, ...).
    Select { input: String },
    Next,
    Previous,
    /// List the known inputs.
    List,
}

#[derive(Subcommand)]
enum QueryAction {
    /// Read the current value.
    Get,
    /// Cycle to the next value.
    Next,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn describe_input(input: Option<InputId>) -> String {
    match input {
        Some(input) => input.to_string(),
        None => "unknown".to_string(),
    }
}

fn show<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_state(state: &DeviceState) {
    println!("Power:           {}", show(state.power().map(|on| if on { "on" } else { "standby" })));
    println!("Volume:          {}", show(state.volume().map(|v| format!("{v} dB"))));
    println!("Bass:            {}", show(state.bass()));
    println!("Treble:          {}", show(state.treble()));
    println!("Subwoofer:       {}", show(state.subwoofer()));
    println!("LFE trim:        {}", show(state.lfe_trim().map(|v| format!("{v} dB"))));
    println!("Mute:            {}", show(state.mute()));
    println!("Dynamic range:   {}", show(state.dynamic_range()));
    println!("OSD:             {}", show(state.osd()));
    println!("Lip sync:        {}", show(state.lip_sync()));
    println!("Active input:    {}", describe_input(state.active_input()));
    println!("Audio source:    {}", show(state.active_audio_source()));
    println!("Video source:    {}", show(state.active_video_source()));
    println!("Stereo mode:     {}", show(state.stereo_mode()));
    println!("DSP mode:        {}", show(state.processing_mode()));
    println!("Codec:           {}", show(state.codec()));
    println!("Software:        {}", show(state.software_version()));
    println!("Protocol:        {}", show(state.protocol_version()));
}

async fn create_amp(cli: &Cli) -> Result<Azur650> {
    let mut builder = Azur650Builder::new(azur_650r());
    if let Some(baud) = cli.baud {
        builder = builder.baud_rate(baud);
    }
    if let Some(ms) = cli.read_timeout_ms {
        builder = builder.read_timeout(Duration::from_millis(ms));
    }

    if cli.mock {
        return builder
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .context("failed to build amplifier with mock transport");
    }

    let port = cli
        .port
        .as_deref()
        .context("--port is required when not using --mock")?;
    tracing::debug!(port, "opening amplifier");
    builder
        .serial_port(port)
        .build()
        .await
        .with_context(|| format!("failed to open amplifier on {port}"))
}

async fn run_level(
    amp: &mut Azur650,
    name: &str,
    action: &LevelAction,
    register: Register,
) -> Result<()> {
    let value = match (register, action) {
        (Register::Volume, LevelAction::Up) => amp.volume_up().await?,
        (Register::Volume, LevelAction::Down) => amp.volume_down().await?,
        (Register::Volume, LevelAction::Set { level }) => amp.set_volume(*level).await?,
        (Register::Bass, LevelAction::Up) => amp.bass_up().await?,
        (Register::Bass, LevelAction::Down) => amp.bass_down().await?,
        (Register::Bass, LevelAction::Set { level }) => amp.set_bass(*level).await?,
        (Register::Treble, LevelAction::Up) => amp.treble_up().await?,
        (Register::Treble, LevelAction::Down) => amp.treble_down().await?,
        (Register::Treble, LevelAction::Set { level }) => amp.set_treble(*level).await?,
    };
    println!("{name}: {value} dB");
    Ok(())
}

#[derive(Clone, Copy)]
enum Register {
    Volume,
    Bass,
    Treble,
}

async fn run(amp: &mut Azur650, command: &Command) -> Result<()> {
    match command {
        Command::Power { state } => {
            if state.is_on() {
                amp.power_on().await?;
            } else {
                amp.power_off().await?;
            }
            println!("Power: {}", show(amp.state().power()));
        }
        Command::Volume { action } => run_level(amp, "Volume", action, Register::Volume).await?,
        Command::Bass { action } => run_level(amp, "Bass", action, Register::Bass).await?,
        Command::Treble { action } => run_level(amp, "Treble", action, Register::Treble).await?,
        Command::Sub { state } => {
            if state.is_on() {
                amp.subwoofer_on().await?;
            } else {
                amp.subwoofer_off().await?;
            }
            println!("Subwoofer: {}", show(amp.state().subwoofer()));
        }
        Command::Lfe { db } => {
            let trim = amp.set_lfe_trim(*db).await?;
            println!("LFE trim: {trim} dB");
        }
        Command::Mute { state } => {
            if state.is_on() {
                amp.mute().await?;
            } else {
                amp.unmute().await?;
            }
            println!("Mute: {}", show(amp.state().mute()));
        }
        Command::Osd { action } => match action {
            OsdAction::Show => amp.show_osd().await?,
            OsdAction::Hide => amp.hide_osd().await?,
            OsdAction::Up => amp.osd_navigate(OsdDirection::Up).await?,
            OsdAction::Down => amp.osd_navigate(OsdDirection::Down).await?,
            OsdAction::Left => amp.osd_navigate(OsdDirection::Left).await?,
            OsdAction::Right => amp.osd_navigate(OsdDirection::Right).await?,
            OsdAction::Enter => amp.osd_enter().await?,
        },
        Command::LipSync { direction } => {
            let delay = match direction {
                UpDown::Up => amp.lip_sync_increase().await?,
                UpDown::Down => amp.lip_sync_decrease().await?,
            };
            println!("Lip sync: {delay}");
        }
        Command::Input { action } => {
            let active = match action {
                InputAction::Select { input } => amp.select_input_by_name(input).await?,
                InputAction::Next => amp.next_input().await?,
                InputAction::Previous => amp.previous_input().await?,
                InputAction::List => {
                    for input in InputId::ALL {
                        println!("  {input}");
                    }
                    return Ok(());
                }
            };
            println!("Input: {}", describe_input(active));
        }
        Command::AudioSource { source } => {
            amp.set_audio_source(*source).await?;
            println!("Audio source: {source}");
        }
        Command::VideoSource { source } => {
            amp.set_video_source(*source).await?;
            println!("Video source: {source}");
        }
        Command::StereoMode { mode } => {
            amp.set_stereo_mode(*mode).await?;
            println!("Stereo mode: {mode}");
        }
        Command::Dsp { action } => {
            let mode = match action {
                QueryAction::Get => amp.processing_mode().await?,
                QueryAction::Next => amp.next_processing_mode().await?,
            };
            println!("DSP mode: {mode}");
        }
        Command::Codec { action } => {
            let codec = match action {
                QueryAction::Get => amp.codec().await?,
                QueryAction::Next => amp.next_codec().await?,
            };
            println!("Codec: {codec}");
        }
        Command::Version => {
            let software = amp.software_version().await?;
            let protocol = amp.protocol_version().await?;
            println!("Software: {software}");
            println!("Protocol: {protocol}");
        }
        Command::State => print_state(amp.state()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut amp = create_amp(&cli).await?;
    let result = run(&mut amp, &cli.command).await;

    if cli.json {
        let snapshot = serde_json::to_string_pretty(amp.state())
            .context("failed to serialize device state")?;
        println!("{snapshot}");
    }

    amp.disconnect().await.ok();
    result
}
