//! Azur650 -- the protocol engine for a Cambridge Audio Azur 650R.
//!
//! [`Azur650`] owns the transport and the [`DeviceState`] mirror. Every
//! operation funnels through [`Azur650::execute`], which sends one command,
//! reads whatever the amplifier answers within the read timeout, classifies
//! each reply line and folds it into the mirror.
//!
//! The engine is strictly request/response: no background reader, no
//! pipelining. All operations take `&mut self`, so two round trips can never
//! interleave on one engine.

use std::time::Duration;

use async_trait::async_trait;
use azur_core::error::{Error, Result};
use azur_core::transport::Transport;
use azur_core::{AudioSource, InputId, StereoMode, VideoSource};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::commands::{self, OsdDirection};
use crate::converge::{Stepper, converge};
use crate::models::AmplifierModel;
use crate::protocol::{Command, ResponseRecord, encode_command, split_response};
use crate::response::{self, Reply, classify};
use crate::state::DeviceState;

/// Size of the scratch buffer used per `receive()` call.
const READ_CHUNK: usize = 64;

/// The records returned for one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    command: Command,
    records: Vec<ResponseRecord>,
}

impl Response {
    /// The command that produced this response.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// De-duplicated records in arrival order.
    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    /// Whether the amplifier said nothing at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record answering the command, or the last record received.
    pub fn reply(&self) -> Option<&ResponseRecord> {
        self.records
            .iter()
            .find(|r| r.answers(&self.command))
            .or_else(|| self.records.last())
    }

    /// The reply's value parsed as a signed level.
    pub fn level(&self) -> Result<i32> {
        response::level(self.required_reply()?)
    }

    /// The reply's value as a non-positive LFE trim in dB.
    pub fn attenuation(&self) -> Result<i32> {
        response::attenuation(self.required_reply()?)
    }

    /// The reply's value as trimmed text.
    pub fn text(&self) -> Result<String> {
        Ok(response::value(self.required_reply()?)?.trim().to_string())
    }

    fn required_reply(&self) -> Result<&ResponseRecord> {
        self.reply()
            .ok_or_else(|| Error::Protocol(format!("no reply to {}", self.command)))
    }
}

/// A connected (or connectable) Azur 650R.
///
/// Construct with [`Azur650Builder`](crate::builder::Azur650Builder).
pub struct Azur650 {
    transport: Box<dyn Transport>,
    model: AmplifierModel,
    read_timeout: Duration,
    max_read_len: usize,
    state: DeviceState,
}

impl Azur650 {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        model: AmplifierModel,
        read_timeout: Duration,
        max_read_len: usize,
    ) -> Self {
        Azur650 {
            transport,
            model,
            read_timeout,
            max_read_len,
            state: DeviceState::default(),
        }
    }

    pub fn model(&self) -> &AmplifierModel {
        &self.model
    }

    /// The last reported device state.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// (Re-)open the link. A no-op when already connected.
    pub async fn connect(&mut self) -> Result<()> {
        if self.transport.is_connected() {
            debug!("already connected");
            return Ok(());
        }
        self.transport.open().await?;
        info!(model = self.model.name, "connected");
        Ok(())
    }

    /// Close the link and forget all mirrored state. A no-op when already
    /// disconnected.
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.transport.is_connected() {
            debug!("already disconnected");
            return Ok(());
        }
        self.transport.close().await?;
        self.state = DeviceState::default();
        info!(model = self.model.name, "disconnected");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Dispatcher
    // ---------------------------------------------------------------

    /// Send one command and fold its replies into the state mirror.
    ///
    /// An empty read is not an error; it yields a [`Response`] with no
    /// records. Records that cannot be decoded are skipped. The first
    /// group `11` reply aborts processing and is returned
    /// as [`Error::Rejected`] carrying the command's fields; replies after it
    /// in the same read are not applied.
    pub async fn execute(&mut self, cmd: &Command) -> Result<Response> {
        debug!(command = %cmd, "sending command");
        self.transport.send(&encode_command(cmd)).await?;
        self.transport.flush().await?;

        let raw = self.read_reply().await?;
        let records = split_response(&raw);

        for record in &records {
            match classify(record) {
                Reply::Rejected(kind) => {
                    warn!(command = %cmd, reply = %record, %kind, "command rejected");
                    return Err(Error::Rejected {
                        kind,
                        group: cmd.group_code(),
                        number: cmd.number_code(),
                        data: cmd.data().map(str::to_string),
                    });
                }
                Reply::Update(update) => self.state.apply(update),
                Reply::Ignored => {}
            }
        }

        Ok(Response {
            command: cmd.clone(),
            records,
        })
    }

    /// Collect reply bytes until `max_read_len` is reached or the read
    /// timeout elapses.
    async fn read_reply(&mut self) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.read_timeout;
        let mut raw = Vec::with_capacity(self.max_read_len);
        let mut buf = [0u8; READ_CHUNK];

        while raw.len() < self.max_read_len {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let want = (self.max_read_len - raw.len()).min(READ_CHUNK);
            match self.transport.receive(&mut buf[..want], remaining).await {
                Ok(0) | Err(Error::Timeout) => break,
                Ok(n) => raw.extend_from_slice(&buf[..n]),
                Err(e) => return Err(e),
            }
        }

        trace!(bytes = raw.len(), data = ?String::from_utf8_lossy(&raw), "reply read");
        Ok(raw)
    }

    async fn step(&mut self, cmd: Command) -> Result<i32> {
        self.execute(&cmd).await?.level()
    }

    async fn converge_register(
        &mut self,
        target: i32,
        current: Option<i32>,
        bounds: std::ops::RangeInclusive<i32>,
        up: fn() -> Command,
        down: fn() -> Command,
    ) -> Result<i32> {
        let mut register = Register {
            amp: self,
            up,
            down,
        };
        converge(&mut register, target, current, bounds).await
    }

    // ---------------------------------------------------------------
    // Group 1: amplifier
    // ---------------------------------------------------------------

    /// Bring the amplifier out of standby. It answers with the power state
    /// and usually the active input.
    pub async fn power_on(&mut self) -> Result<Response> {
        self.execute(&commands::cmd_power(true)).await
    }

    /// Put the amplifier into standby.
    pub async fn power_off(&mut self) -> Result<Response> {
        self.execute(&commands::cmd_power(false)).await
    }

    /// One step up; returns the new volume in dB.
    pub async fn volume_up(&mut self) -> Result<i32> {
        self.step(commands::cmd_volume_up()).await
    }

    /// One step down; returns the new volume in dB.
    pub async fn volume_down(&mut self) -> Result<i32> {
        self.step(commands::cmd_volume_down()).await
    }

    /// Walk the volume to `level` dB and return the final reported value.
    pub async fn set_volume(&mut self, level: i32) -> Result<i32> {
        let current = self.state.volume();
        let bounds = self.model.volume_range.clone();
        self.converge_register(
            level,
            current,
            bounds,
            commands::cmd_volume_up,
            commands::cmd_volume_down,
        )
        .await
    }

    /// One step up; returns the new bass level.
    pub async fn bass_up(&mut self) -> Result<i32> {
        self.step(commands::cmd_bass_up()).await
    }

    /// One step down; returns the new bass level.
    pub async fn bass_down(&mut self) -> Result<i32> {
        self.step(commands::cmd_bass_down()).await
    }

    /// Walk the bass to `level` and return the final reported value.
    pub async fn set_bass(&mut self, level: i32) -> Result<i32> {
        let current = self.state.bass();
        let bounds = self.model.bass_range.clone();
        self.converge_register(
            level,
            current,
            bounds,
            commands::cmd_bass_up,
            commands::cmd_bass_down,
        )
        .await
    }

    /// One 2 dB step up; returns the new treble level.
    pub async fn treble_up(&mut self) -> Result<i32> {
        self.step(commands::cmd_treble_up()).await
    }

    /// One 2 dB step down; returns the new treble level.
    pub async fn treble_down(&mut self) -> Result<i32> {
        self.step(commands::cmd_treble_down()).await
    }

    /// Treble moves in steps of two, so an odd target ends one past it.
    pub async fn set_treble(&mut self, level: i32) -> Result<i32> {
        let current = self.state.treble();
        let bounds = self.model.treble_range.clone();
        self.converge_register(
            level,
            current,
            bounds,
            commands::cmd_treble_up,
            commands::cmd_treble_down,
        )
        .await
    }

    /// Enable the subwoofer output.
    pub async fn subwoofer_on(&mut self) -> Result<()> {
        self.execute(&commands::cmd_subwoofer(true)).await.map(drop)
    }

    /// Disable the subwoofer output.
    pub async fn subwoofer_off(&mut self) -> Result<()> {
        self.execute(&commands::cmd_subwoofer(false)).await.map(drop)
    }

    /// Set the LFE trim attenuation.
    ///
    /// `db` may be given with either sign; both mean attenuation. Returns
    /// the reported trim as a negative number of dB.
    pub async fn set_lfe_trim(&mut self, db: i32) -> Result<i32> {
        let magnitude = db.unsigned_abs();
        if magnitude > u32::from(self.model.max_lfe_trim) {
            return Err(Error::InvalidParameter(format!(
                "LFE trim {db} dB out of range 0..={}",
                self.model.max_lfe_trim
            )));
        }
        let cmd = commands::cmd_lfe_trim(magnitude as u8);
        self.execute(&cmd).await?.attenuation()
    }

    /// Mute the outputs.
    pub async fn mute(&mut self) -> Result<()> {
        self.execute(&commands::cmd_mute(true)).await.map(drop)
    }

    /// Restore the outputs after [`mute`](Self::mute).
    pub async fn unmute(&mut self) -> Result<()> {
        self.execute(&commands::cmd_mute(false)).await.map(drop)
    }

    /// Show the on-screen display.
    pub async fn show_osd(&mut self) -> Result<()> {
        self.execute(&commands::cmd_osd(true)).await.map(drop)
    }

    /// Hide the on-screen display.
    pub async fn hide_osd(&mut self) -> Result<()> {
        self.execute(&commands::cmd_osd(false)).await.map(drop)
    }

    /// Move the OSD cursor. The amplifier does not answer.
    pub async fn osd_navigate(&mut self, direction: OsdDirection) -> Result<()> {
        self.execute(&commands::cmd_osd_navigate(direction))
            .await
            .map(drop)
    }

    /// Confirm the highlighted OSD item.
    pub async fn osd_enter(&mut self) -> Result<()> {
        self.execute(&commands::cmd_osd_enter()).await.map(drop)
    }

    /// Shorten the lip-sync delay by one step; returns the new delay.
    pub async fn lip_sync_decrease(&mut self) -> Result<i32> {
        self.step(commands::cmd_lip_sync_decrease()).await
    }

    /// Lengthen the lip-sync delay by one step; returns the new delay.
    pub async fn lip_sync_increase(&mut self) -> Result<i32> {
        self.step(commands::cmd_lip_sync_increase()).await
    }

    // ---------------------------------------------------------------
    // Group 2: source
    // ---------------------------------------------------------------

    /// Select an input. Inputs outside the catalogue are refused before
    /// any I/O. Returns the active input as reported afterwards.
    pub async fn select_input(&mut self, input: InputId) -> Result<Option<InputId>> {
        if !input.is_known() {
            return Err(Error::InvalidParameter(format!("no input with id {}", input.code())));
        }
        self.execute(&commands::cmd_select_input(input)).await?;
        Ok(self.state.active_input())
    }

    /// Select an input by id or name shortcut (`"cd"`, `"bd-dvd"`, `"07"`).
    pub async fn select_input_by_name(&mut self, name: &str) -> Result<Option<InputId>> {
        let input: InputId = name
            .parse()
            .map_err(|e: azur_core::ParseInputError| Error::InvalidParameter(e.to_string()))?;
        self.select_input(input).await
    }

    /// Step to the next input; returns the active input as reported.
    pub async fn next_input(&mut self) -> Result<Option<InputId>> {
        self.execute(&commands::cmd_next_input()).await?;
        Ok(self.state.active_input())
    }

    /// Step to the previous input; returns the active input as reported.
    pub async fn previous_input(&mut self) -> Result<Option<InputId>> {
        self.execute(&commands::cmd_previous_input()).await?;
        Ok(self.state.active_input())
    }

    /// Assign the audio source of the active input.
    ///
    /// If the active input is not yet known it is learned by stepping to
    /// the next input and back. Inputs that do not take source assignment
    /// are refused.
    pub async fn set_audio_source(&mut self, source: AudioSource) -> Result<()> {
        self.require_assignable_input("audio").await?;
        self.execute(&commands::cmd_audio_source(source)).await.map(drop)
    }

    /// Assign the video source of the active input. See
    /// [`set_audio_source`](Self::set_audio_source).
    pub async fn set_video_source(&mut self, source: VideoSource) -> Result<()> {
        self.require_assignable_input("video").await?;
        self.execute(&commands::cmd_video_source(source)).await.map(drop)
    }

    async fn require_assignable_input(&mut self, what: &str) -> Result<InputId> {
        if self.state.active_input().is_none() {
            debug!("active input unknown, stepping next and back to learn it");
            self.next_input().await?;
            self.previous_input().await?;
        }
        match self.state.active_input() {
            Some(input) if self.model.accepts_source_assignment(input) => Ok(input),
            Some(input) => Err(Error::InvalidParameter(format!(
                "cannot set {what} source for input {input}"
            ))),
            None => Err(Error::InvalidParameter(format!(
                "cannot set {what} source: active input unknown"
            ))),
        }
    }

    // ---------------------------------------------------------------
    // Group 4: audio processing
    // ---------------------------------------------------------------

    /// Select stereo with or without the subwoofer.
    pub async fn set_stereo_mode(&mut self, mode: StereoMode) -> Result<()> {
        self.execute(&commands::cmd_stereo_mode(mode)).await.map(drop)
    }

    /// Cycle to the next DSP mode; returns its front-panel name.
    pub async fn next_processing_mode(&mut self) -> Result<String> {
        self.execute(&commands::cmd_next_processing_mode())
            .await?
            .text()
    }

    /// Cycle the decoder codec; returns its name.
    pub async fn next_codec(&mut self) -> Result<String> {
        self.execute(&commands::cmd_next_codec()).await?.text()
    }

    /// Query the active DSP mode from the device.
    pub async fn processing_mode(&mut self) -> Result<String> {
        self.execute(&commands::cmd_read_processing_mode())
            .await?
            .text()
    }

    /// Query the active codec from the device.
    pub async fn codec(&mut self) -> Result<String> {
        self.execute(&commands::cmd_read_codec()).await?.text()
    }

    // ---------------------------------------------------------------
    // Group 5: version
    // ---------------------------------------------------------------

    /// Firmware version string.
    pub async fn software_version(&mut self) -> Result<String> {
        self.execute(&commands::cmd_read_software_version())
            .await?
            .text()
    }

    /// RS-232 protocol version string.
    pub async fn protocol_version(&mut self) -> Result<String> {
        self.execute(&commands::cmd_read_protocol_version())
            .await?
            .text()
    }
}

/// A stepped register driven through the engine.
struct Register<'a> {
    amp: &'a mut Azur650,
    up: fn() -> Command,
    down: fn() -> Command,
}

#[async_trait]
impl Stepper for Register<'_> {
    async fn step_up(&mut self) -> Result<i32> {
        self.amp.step((self.up)()).await
    }

    async fn step_down(&mut self) -> Result<i32> {
        self.amp.step((self.down)()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::azur_650r;
    use azur_core::RejectKind;
    use azur_test_harness::MockTransport;

    fn make_amp(mock: MockTransport) -> Azur650 {
        Azur650::new(Box::new(mock), azur_650r(), Duration::from_millis(80), 50)
    }

    // ---------------------------------------------------------------
    // Dispatcher
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn power_on_mirrors_power_and_input() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,01,1\r", b"#7,01,07\r#6,01,1\r");
        let mut amp = make_amp(mock);

        let resp = amp.power_on().await.unwrap();
        assert_eq!(resp.records().len(), 2);
        assert_eq!(amp.state().power(), Some(true));
        assert_eq!(amp.state().active_input(), Some(InputId::CD));
    }

    #[tokio::test]
    async fn empty_read_is_not_an_error() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,15\r", b"");
        let mut amp = make_amp(mock);

        amp.osd_navigate(OsdDirection::Up).await.unwrap();
        assert_eq!(*amp.state(), DeviceState::default());
    }

    #[tokio::test]
    async fn rejection_carries_command_fields() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,10,10\r", b"#11,03\r");
        let mut amp = make_amp(mock);

        let err = amp.set_lfe_trim(10).await.unwrap_err();
        match err {
            Error::Rejected {
                kind,
                group,
                number,
                data,
            } => {
                assert_eq!(kind, RejectKind::InvalidData);
                assert_eq!(group, "1");
                assert_eq!(number, "10");
                assert_eq!(data.as_deref(), Some("10"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejection_kinds() {
        let mut mock = MockTransport::new();
        mock.expect(b"#5,01\r", b"#11,01\r");
        mock.expect(b"#5,02\r", b"#11,02\r");
        mock.expect(b"#4,05\r", b"#11,77\r");
        let mut amp = make_amp(mock);

        let kind = |r: Result<String>| r.unwrap_err().reject_kind();
        assert_eq!(kind(amp.software_version().await), Some(RejectKind::UnknownGroup));
        assert_eq!(kind(amp.protocol_version().await), Some(RejectKind::UnknownNumber));
        assert_eq!(kind(amp.codec().await), Some(RejectKind::InvalidCommand));
    }

    #[tokio::test]
    async fn first_rejection_aborts_remaining_records() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#11,02\r#6,02,-20\r");
        let mut amp = make_amp(mock);

        let err = amp.volume_up().await.unwrap_err();
        assert_eq!(err.reject_kind(), Some(RejectKind::UnknownNumber));
        assert_eq!(amp.state().volume(), None);
    }

    #[tokio::test]
    async fn duplicate_lines_classified_once() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,11,01\r", b"#6,11,01\r#6,11,01\r#6,11,01\r");
        let mut amp = make_amp(mock);

        amp.mute().await.unwrap();
        assert_eq!(amp.state().mute(), Some(true));
    }

    #[tokio::test]
    async fn unknown_reply_pairs_leave_state_alone() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,19\r", b"#6,99,5\r#8,01,x\r");
        let mut amp = make_amp(mock);

        amp.osd_enter().await.unwrap();
        assert_eq!(*amp.state(), DeviceState::default());
    }

    #[tokio::test]
    async fn source_reply_without_active_input_is_dropped() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,13\r", b"#7,04,01\r#6,13\r");
        let mut amp = make_amp(mock);

        amp.show_osd().await.unwrap();
        assert_eq!(amp.state().osd(), Some(true));
        assert!(amp.state().audio_sources().is_empty());
    }

    #[tokio::test]
    async fn read_is_capped_at_max_read_len() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#6,02,-30\r#6,01,1\r");
        let mut amp = Azur650::new(Box::new(mock), azur_650r(), Duration::from_millis(80), 10);

        assert_eq!(amp.volume_up().await.unwrap(), -30);
        assert_eq!(amp.state().power(), None);
    }

    #[tokio::test]
    async fn value_taken_from_answering_record() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#6,02,-30\r#7,01,01\r");
        let mut amp = make_amp(mock);

        assert_eq!(amp.volume_up().await.unwrap(), -30);
        assert_eq!(amp.state().active_input(), Some(InputId::BD_DVD));
    }

    #[tokio::test]
    async fn missing_value_is_protocol_error() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#6,02\r");
        mock.expect(b"#1,03\r", b"");
        let mut amp = make_amp(mock);

        assert!(matches!(amp.volume_up().await, Err(Error::Protocol(_))));
        assert!(matches!(amp.volume_down().await, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn undecodable_record_does_not_abort_the_read() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,01,1\r", b"#7,01,--\r#6,01,1\r");
        let mut amp = make_amp(mock);

        let resp = amp.power_on().await.unwrap();
        assert_eq!(resp.records().len(), 2);
        assert_eq!(amp.state().power(), Some(true));
        assert_eq!(amp.state().active_input(), None);
    }

    #[tokio::test]
    async fn undecodable_value_fails_only_where_consumed() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#6,02,loud\r#6,11,01\r");
        let mut amp = make_amp(mock);

        assert!(matches!(amp.volume_up().await, Err(Error::Protocol(_))));
        assert_eq!(amp.state().mute(), Some(true));
        assert_eq!(amp.state().volume(), None);
    }

    #[tokio::test]
    async fn lfe_trim_at_integer_minimum_does_not_panic() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,13\r", b"#6,10,-2147483648\r#6,13\r");
        mock.expect(b"#1,10,5\r", b"#6,10,-2147483648\r");
        let mut amp = make_amp(mock);

        amp.show_osd().await.unwrap();
        assert_eq!(amp.state().lfe_trim(), None);
        assert_eq!(amp.state().osd(), Some(true));
        assert!(matches!(amp.set_lfe_trim(5).await, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let mock = MockTransport::new();
        let mut amp = make_amp(mock);
        assert!(matches!(amp.volume_up().await, Err(Error::Transport(_))));
    }

    // ---------------------------------------------------------------
    // Connection lifecycle
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn connect_and_disconnect_are_idempotent() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,03\r", b"#6,03,-41\r");
        let mut amp = make_amp(mock);

        amp.connect().await.unwrap();
        assert_eq!(amp.volume_down().await.unwrap(), -41);

        amp.disconnect().await.unwrap();
        assert!(!amp.is_connected());
        assert_eq!(*amp.state(), DeviceState::default());
        amp.disconnect().await.unwrap();

        assert!(matches!(amp.volume_up().await, Err(Error::NotConnected)));

        amp.connect().await.unwrap();
        amp.connect().await.unwrap();
        assert!(amp.is_connected());
    }

    // ---------------------------------------------------------------
    // Levels and convergence
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn set_volume_learns_when_unknown() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,03\r", b"#6,03,-41\r");
        mock.expect(b"#1,02\r", b"#6,02,-40\r");
        mock.expect(b"#1,02\r", b"#6,02,-39\r");
        let mut amp = make_amp(mock);

        assert_eq!(amp.set_volume(-39).await.unwrap(), -39);
        assert_eq!(amp.state().volume(), Some(-39));
    }

    #[tokio::test]
    async fn set_volume_survives_a_step_that_does_not_move() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,03\r", b"#6,03,-30\r");
        mock.expect(b"#1,02\r", b"#6,02,-30\r");
        mock.expect(b"#1,02\r", b"#6,02,-29\r");
        mock.expect(b"#1,02\r", b"#6,02,-28\r");
        let mut amp = make_amp(mock);

        assert_eq!(amp.set_volume(-28).await.unwrap(), -28);
        assert_eq!(amp.state().volume(), Some(-28));
    }

    #[tokio::test]
    async fn set_volume_to_current_sends_nothing() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,02\r", b"#6,02,-30\r");
        let mut amp = make_amp(mock);

        amp.volume_up().await.unwrap();
        // The mock has no expectations left; any send would fail.
        assert_eq!(amp.set_volume(-30).await.unwrap(), -30);
    }

    #[tokio::test]
    async fn set_volume_out_of_range() {
        let mut amp = make_amp(MockTransport::new());
        assert!(matches!(amp.set_volume(1).await, Err(Error::InvalidParameter(_))));
        assert!(matches!(amp.set_volume(-91).await, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn set_bass_learning_falls_back_at_floor() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,05\r", b"#11,03\r");
        mock.expect(b"#1,04\r", b"#6,04,- 9\r");
        mock.expect(b"#1,04\r", b"#6,04,- 8\r");
        let mut amp = make_amp(mock);

        assert_eq!(amp.set_bass(-8).await.unwrap(), -8);
        assert_eq!(amp.state().bass(), Some(-8));
    }

    #[tokio::test]
    async fn set_treble_overshoots_with_step_two() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,06\r", b"#6,06,+ 2\r");
        mock.expect(b"#1,06\r", b"#6,06,+ 4\r");
        mock.expect(b"#1,06\r", b"#6,06,+ 6\r");
        let mut amp = make_amp(mock);

        // Learn the current value first.
        amp.treble_up().await.unwrap();
        assert_eq!(amp.set_treble(5).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn lip_sync_steps() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,21\r", b"#6,21,4\r");
        mock.expect(b"#1,20\r", b"#6,20,3\r");
        let mut amp = make_amp(mock);

        assert_eq!(amp.lip_sync_increase().await.unwrap(), 4);
        assert_eq!(amp.lip_sync_decrease().await.unwrap(), 3);
        assert_eq!(amp.state().lip_sync(), Some(3));
    }

    #[tokio::test]
    async fn lfe_trim_accepts_either_sign() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,10,7\r", b"#6,10,7\r");
        mock.expect(b"#1,10,3\r", b"#6,10,3\r");
        let mut amp = make_amp(mock);

        assert_eq!(amp.set_lfe_trim(-7).await.unwrap(), -7);
        assert_eq!(amp.set_lfe_trim(3).await.unwrap(), -3);
        assert_eq!(amp.state().lfe_trim(), Some(-3));
    }

    #[tokio::test]
    async fn lfe_trim_out_of_range() {
        let mut amp = make_amp(MockTransport::new());
        assert!(matches!(amp.set_lfe_trim(11).await, Err(Error::InvalidParameter(_))));
        assert!(matches!(amp.set_lfe_trim(-11).await, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn subwoofer_switching() {
        let mut mock = MockTransport::new();
        mock.expect(b"#1,08\r", b"#6,08\r");
        mock.expect(b"#1,09\r", b"#6,09\r");
        let mut amp = make_amp(mock);

        amp.subwoofer_on().await.unwrap();
        assert_eq!(amp.state().subwoofer(), Some(true));
        amp.subwoofer_off().await.unwrap();
        assert_eq!(amp.state().subwoofer(), Some(false));
    }

    // ---------------------------------------------------------------
    // Inputs and sources
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn select_input_by_name() {
        let mut mock = MockTransport::new();
        mock.expect(b"#2,01,07\r", b"#7,01,07\r");
        let mut amp = make_amp(mock);

        assert_eq!(amp.select_input_by_name("cd").await.unwrap(), Some(InputId::CD));
    }

    #[tokio::test]
    async fn select_unknown_input_does_no_io() {
        let mut amp = make_amp(MockTransport::new());
        assert!(matches!(
            amp.select_input(InputId::from_index(11)).await,
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            amp.select_input_by_name("phono").await,
            Err(Error::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn audio_source_learns_active_input() {
        let mut mock = MockTransport::new();
        mock.expect(b"#2,03\r", b"#7,01,04\r");
        mock.expect(b"#2,02\r", b"#7,01,03\r");
        mock.expect(b"#2,04,02\r", b"#7,04,02\r");
        let mut amp = make_amp(mock);

        amp.set_audio_source(AudioSource::Hdmi).await.unwrap();
        assert_eq!(amp.state().active_input(), Some(InputId::VIDEO_2));
        assert_eq!(amp.state().audio_source(InputId::VIDEO_2), Some(AudioSource::Hdmi));
    }

    #[tokio::test]
    async fn video_source_on_known_input() {
        let mut mock = MockTransport::new();
        mock.expect(b"#2,01,01\r", b"#7,01,01\r");
        mock.expect(b"#2,05,03\r", b"#7,05,03\r");
        let mut amp = make_amp(mock);

        amp.select_input(InputId::BD_DVD).await.unwrap();
        amp.set_video_source(VideoSource::Hdmi).await.unwrap();
        assert_eq!(amp.state().active_video_source(), Some(VideoSource::Hdmi));
    }

    #[tokio::test]
    async fn source_assignment_refused_for_tuner() {
        let mut mock = MockTransport::new();
        mock.expect(b"#2,01,00\r", b"#7,01,00\r");
        let mut amp = make_amp(mock);

        amp.select_input(InputId::TUNER).await.unwrap();
        assert!(matches!(
            amp.set_audio_source(AudioSource::Digital).await,
            Err(Error::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn source_assignment_refused_when_input_cannot_be_learned() {
        let mut mock = MockTransport::new();
        mock.expect(b"#2,03\r", b"");
        mock.expect(b"#2,02\r", b"");
        let mut amp = make_amp(mock);

        assert!(matches!(
            amp.set_video_source(VideoSource::Composite).await,
            Err(Error::InvalidParameter(_))
        ));
    }

    // ---------------------------------------------------------------
    // Audio processing and versions
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn processing_queries_trim_text() {
        let mut mock = MockTransport::new();
        mock.expect(b"#4,04\r", b"#9,04,PLII Movie \r");
        mock.expect(b"#4,03\r", b"#9,03, DTS\r");
        mock.expect(b"#4,01,01\r", b"#9,01,01\r");
        let mut amp = make_amp(mock);

        assert_eq!(amp.processing_mode().await.unwrap(), "PLII Movie");
        assert_eq!(amp.next_codec().await.unwrap(), "DTS");
        amp.set_stereo_mode(StereoMode::StereoSubwoofer).await.unwrap();

        assert_eq!(amp.state().processing_mode(), Some("PLII Movie"));
        assert_eq!(amp.state().codec(), Some("DTS"));
        assert_eq!(amp.state().stereo_mode(), Some(StereoMode::StereoSubwoofer));
    }

    #[tokio::test]
    async fn version_queries() {
        let mut mock = MockTransport::new();
        mock.expect(b"#5,01\r", b"#10,01,v1.4\r");
        mock.expect(b"#5,02\r", b"#10,02,2.0\r");
        let mut amp = make_amp(mock);

        assert_eq!(amp.software_version().await.unwrap(), "v1.4");
        assert_eq!(amp.protocol_version().await.unwrap(), "2.0");
        assert_eq!(amp.state().software_version(), Some("v1.4"));
    }
}
