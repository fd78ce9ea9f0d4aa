//! Media player backends.
//!
//! The dispatcher drives anything implementing [`MediaPlayer`]. Two backends
//! exist: an in-memory [`SimPlayer`] and an [`MmcPlayer`] that remote-controls
//! an external player or DAW over MIDI Machine Control.

use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Error, Result};

/// Volume a fresh player starts at.
pub const DEFAULT_VOLUME: u8 = 50;

/// Stream length used when none is given.
pub const DEFAULT_LENGTH: Duration = Duration::from_secs(600);

// ════════════════════════════════════════════════════════════════════════════
// MediaPlayer: abstraction over sim / MIDI
// ════════════════════════════════════════════════════════════════════════════

/// The transport and volume controls a gesture can reach.
pub trait MediaPlayer {
    /// Short backend name for the HUD and logs.
    fn name(&self) -> &str;

    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;

    /// Current volume, 0–100.
    fn volume(&self) -> u8;
    /// Values above 100 are clamped.
    fn set_volume(&mut self, volume: u8);

    fn position(&self) -> Duration;
    /// Positions past the end are clamped to [`MediaPlayer::length`].
    fn set_position(&mut self, position: Duration);
    fn length(&self) -> Duration;

    /// Let `elapsed` of wall time pass. Only moves the position while
    /// playing.
    fn advance(&mut self, elapsed: Duration);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum PlayerKind {
    /// In-memory transport, nothing leaves the process.
    Sim,
    /// MIDI Machine Control to an external player.
    Midi,
}

impl PlayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerKind::Sim  => "sim",
            PlayerKind::Midi => "midi",
        }
    }
}

impl fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimPlayer
// ════════════════════════════════════════════════════════════════════════════

/// A player that only keeps its transport state in memory.
///
/// Starts playing at position zero with [`DEFAULT_VOLUME`].
#[derive(Clone, Debug)]
pub struct SimPlayer {
    playing:  bool,
    volume:   u8,
    position: Duration,
    length:   Duration,
}

impl SimPlayer {
    pub fn new(length: Duration) -> Self {
        SimPlayer {
            playing:  true,
            volume:   DEFAULT_VOLUME,
            position: Duration::ZERO,
            length,
        }
    }
}

impl Default for SimPlayer {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH)
    }
}

impl MediaPlayer for SimPlayer {
    fn name(&self) -> &str {
        "sim"
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn volume(&self) -> u8 {
        self.volume
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn set_position(&mut self, position: Duration) {
        self.position = position.min(self.length);
    }

    fn length(&self) -> Duration {
        self.length
    }

    fn advance(&mut self, elapsed: Duration) {
        if self.playing {
            self.set_position(self.position.saturating_add(elapsed));
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MIDI Machine Control encoding
// ════════════════════════════════════════════════════════════════════════════

/// MIDI Machine Control and Universal Real-Time SysEx messages.
pub mod mmc {
    use std::time::Duration;

    /// Device id that addresses every receiver.
    pub const ALL_CALL: u8 = 0x7F;

    pub const PLAY:   u8 = 0x02;
    pub const PAUSE:  u8 = 0x09;
    pub const LOCATE: u8 = 0x44;

    /// Frame rate used for LOCATE time codes.
    pub const FPS: u32 = 25;

    /// Hour byte flag for 25 fps in the time code type bits.
    const RATE_25: u8 = 0x20;

    /// A single-byte MMC command such as [`PLAY`] or [`PAUSE`].
    pub fn command(cmd: u8) -> [u8; 6] {
        [0xF0, 0x7F, ALL_CALL, 0x06, cmd & 0x7F, 0xF7]
    }

    /// LOCATE to `position` as hh:mm:ss:ff at 25 fps. Hours wrap at 24.
    pub fn locate(position: Duration) -> [u8; 13] {
        let secs = position.as_secs();
        let hr = ((secs / 3600) % 24) as u8;
        let mn = ((secs / 60) % 60) as u8;
        let sc = (secs % 60) as u8;
        let fr = (position.subsec_millis() * FPS / 1000) as u8;
        [
            0xF0, 0x7F, ALL_CALL, 0x06, LOCATE, 0x06, 0x01,
            RATE_25 | hr, mn, sc, fr, 0x00,
            0xF7,
        ]
    }

    /// Universal Real-Time master volume, `volume` in 0–100 scaled to 14 bits.
    pub fn master_volume(volume: u8) -> [u8; 8] {
        let v = u32::from(volume.min(100)) * 0x3FFF / 100;
        [0xF0, 0x7F, 0x7F, 0x04, 0x01, (v & 0x7F) as u8, ((v >> 7) & 0x7F) as u8, 0xF7]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MmcPlayer: midir backend
// ════════════════════════════════════════════════════════════════════════════

/// Remote-controls an external player over a MIDI output port.
///
/// MMC carries no replies, so a [`SimPlayer`] mirror answers the read-side
/// queries (volume, position, play state).
pub struct MmcPlayer {
    conn:   midir::MidiOutputConnection,
    device: String,
    mirror: SimPlayer,
}

impl MmcPlayer {
    pub fn device(&self) -> &str {
        &self.device
    }

    fn send(&mut self, msg: &[u8]) {
        if let Err(e) = self.conn.send(msg) {
            warn!(device = %self.device, error = %e, "MIDI send failed");
        }
    }
}

impl MediaPlayer for MmcPlayer {
    fn name(&self) -> &str {
        "midi"
    }

    fn play(&mut self) {
        self.mirror.play();
        self.send(&mmc::command(mmc::PLAY));
    }

    fn pause(&mut self) {
        self.mirror.pause();
        self.send(&mmc::command(mmc::PAUSE));
    }

    fn is_playing(&self) -> bool {
        self.mirror.is_playing()
    }

    fn volume(&self) -> u8 {
        self.mirror.volume()
    }

    fn set_volume(&mut self, volume: u8) {
        self.mirror.set_volume(volume);
        let msg = mmc::master_volume(self.mirror.volume());
        self.send(&msg);
    }

    fn position(&self) -> Duration {
        self.mirror.position()
    }

    fn set_position(&mut self, position: Duration) {
        self.mirror.set_position(position);
        let msg = mmc::locate(self.mirror.position());
        self.send(&msg);
    }

    fn length(&self) -> Duration {
        self.mirror.length()
    }

    fn advance(&mut self, elapsed: Duration) {
        self.mirror.advance(elapsed);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Opening a player
// ════════════════════════════════════════════════════════════════════════════

/// Connect to the first MIDI output port whose name contains `port_filter`
/// (case-insensitive), or to the first port at all.
pub fn open_mmc_player(port_filter: Option<&str>, length: Duration) -> Result<MmcPlayer> {
    let midi_out = midir::MidiOutput::new("gesture_remote")?;
    let ports = midi_out.ports();

    let wanted = port_filter.map(str::to_lowercase);
    let port = ports
        .iter()
        .find(|p| match &wanted {
            None => true,
            Some(w) => midi_out
                .port_name(p)
                .map(|n| n.to_lowercase().contains(w.as_str()))
                .unwrap_or(false),
        })
        .ok_or_else(|| Error::NoMidiPort(port_filter.map(str::to_owned)))?;

    let device = midi_out
        .port_name(port)
        .unwrap_or_else(|_| "unknown".to_string());

    let conn = midi_out
        .connect(port, "gesture-remote")
        .map_err(|e| Error::MidiConnect(e.to_string()))?;

    info!(%device, "opened MIDI port");
    Ok(MmcPlayer { conn, device, mirror: SimPlayer::new(length) })
}

/// Open the requested backend. A MIDI backend that cannot be opened falls
/// back to [`SimPlayer`] with a warning.
pub fn open_player(
    kind:        PlayerKind,
    length:      Duration,
    port_filter: Option<&str>,
) -> Box<dyn MediaPlayer> {
    match kind {
        PlayerKind::Sim => Box::new(SimPlayer::new(length)),
        PlayerKind::Midi => match open_mmc_player(port_filter, length) {
            Ok(p) => Box::new(p),
            Err(e) => {
                warn!(error = %e, "MIDI player unavailable, using sim player");
                warn!("install a MIDI-controllable player or a virtual port, e.g. `timidity -iA` on Linux");
                Box::new(SimPlayer::new(length))
            }
        },
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_player_starts_playing_at_zero() {
        let p = SimPlayer::default();
        assert!(p.is_playing());
        assert_eq!(p.position(), Duration::ZERO);
        assert_eq!(p.volume(), DEFAULT_VOLUME);
        assert_eq!(p.length(), DEFAULT_LENGTH);
    }

    #[test]
    fn sim_player_clamps_volume() {
        let mut p = SimPlayer::default();
        p.set_volume(250);
        assert_eq!(p.volume(), 100);
    }

    #[test]
    fn sim_player_clamps_position_to_length() {
        let mut p = SimPlayer::new(Duration::from_secs(30));
        p.set_position(Duration::from_secs(45));
        assert_eq!(p.position(), Duration::from_secs(30));
    }

    #[test]
    fn advance_only_while_playing() {
        let mut p = SimPlayer::new(Duration::from_secs(30));
        p.advance(Duration::from_secs(2));
        assert_eq!(p.position(), Duration::from_secs(2));
        p.pause();
        p.advance(Duration::from_secs(5));
        assert_eq!(p.position(), Duration::from_secs(2));
        p.play();
        p.advance(Duration::from_secs(60));
        assert_eq!(p.position(), Duration::from_secs(30));
    }

    #[test]
    fn mmc_play_and_pause_bytes() {
        assert_eq!(mmc::command(mmc::PLAY),  [0xF0, 0x7F, 0x7F, 0x06, 0x02, 0xF7]);
        assert_eq!(mmc::command(mmc::PAUSE), [0xF0, 0x7F, 0x7F, 0x06, 0x09, 0xF7]);
    }

    #[test]
    fn mmc_locate_encodes_timecode() {
        // 1h 02m 03s 480ms → frame 12 at 25 fps
        let msg = mmc::locate(Duration::from_millis(3_723_480));
        assert_eq!(
            msg,
            [0xF0, 0x7F, 0x7F, 0x06, 0x44, 0x06, 0x01, 0x21, 2, 3, 12, 0, 0xF7]
        );
    }

    #[test]
    fn mmc_locate_zero() {
        let msg = mmc::locate(Duration::ZERO);
        assert_eq!(&msg[7..11], &[0x20, 0, 0, 0]);
    }

    #[test]
    fn master_volume_scales_to_14_bits() {
        assert_eq!(mmc::master_volume(100), [0xF0, 0x7F, 0x7F, 0x04, 0x01, 0x7F, 0x7F, 0xF7]);
        assert_eq!(mmc::master_volume(0),   [0xF0, 0x7F, 0x7F, 0x04, 0x01, 0x00, 0x00, 0xF7]);
        // 50 → 8191 = 0x1FFF
        assert_eq!(&mmc::master_volume(50)[5..7], &[0x7F, 0x3F]);
        assert_eq!(mmc::master_volume(200), mmc::master_volume(100));
    }

    #[test]
    fn sim_kind_opens_sim_player() {
        let p = open_player(PlayerKind::Sim, Duration::from_secs(10), None);
        assert_eq!(p.name(), "sim");
        assert_eq!(p.length(), Duration::from_secs(10));
    }
}
