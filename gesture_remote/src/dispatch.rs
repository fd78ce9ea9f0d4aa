//! Gesture → player command mapping.

use std::fmt;
use std::time::Duration;

use hand_gesture::Gesture;
use tracing::{debug, info};

use crate::player::MediaPlayer;

pub const DEFAULT_VOLUME_STEP: u8 = 10;
pub const DEFAULT_SEEK_STEP: Duration = Duration::from_secs(10);

/// Step sizes for the relative gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Volume change per VolumeUp / VolumeDown, in percent.
    pub volume_step: u8,
    /// Position change per swipe.
    pub seek_step: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            volume_step: DEFAULT_VOLUME_STEP,
            seek_step:   DEFAULT_SEEK_STEP,
        }
    }
}

impl DispatchConfig {
    #[must_use]
    pub fn with_volume_step(mut self, step: u8) -> Self {
        self.volume_step = step;
        self
    }

    #[must_use]
    pub fn with_seek_step(mut self, step: Duration) -> Self {
        self.seek_step = step;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Command
// ════════════════════════════════════════════════════════════════════════════

/// An action actually applied to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Resume,
    Pause,
    /// Absolute volume, 0–100.
    SetVolume(u8),
    /// Absolute position; the player clamps it to the stream length.
    Seek(Duration),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Resume       => f.write_str("resume"),
            Command::Pause        => f.write_str("pause"),
            Command::SetVolume(v) => write!(f, "volume {v}%"),
            Command::Seek(p)      => write!(f, "seek {:.1}s", p.as_secs_f64()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Dispatcher
// ════════════════════════════════════════════════════════════════════════════

/// Applies debounced gestures to a [`MediaPlayer`].
///
/// Keeps its own `paused` mirror so that Play only resumes a paused player
/// and Pause only pauses a running one. The mirror starts as "playing".
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
    paused: bool,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Dispatcher { config, paused: false }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The command `gesture` would execute against `player`, or `None` when
    /// it is a no-op in the current state.
    pub fn command_for(&self, gesture: Gesture, player: &dyn MediaPlayer) -> Option<Command> {
        let step = self.config.volume_step;
        match gesture {
            Gesture::Play  => self.paused.then_some(Command::Resume),
            Gesture::Pause => (!self.paused).then_some(Command::Pause),
            Gesture::VolumeUp => {
                Some(Command::SetVolume(player.volume().saturating_add(step).min(100)))
            }
            Gesture::VolumeDown => Some(Command::SetVolume(player.volume().saturating_sub(step))),
            Gesture::SeekForward => {
                Some(Command::Seek(player.position().saturating_add(self.config.seek_step)))
            }
            Gesture::SeekBackward => {
                Some(Command::Seek(player.position().saturating_sub(self.config.seek_step)))
            }
        }
    }

    /// Execute the action for one gesture. Returns what was done.
    pub fn dispatch(&mut self, gesture: Gesture, player: &mut dyn MediaPlayer) -> Option<Command> {
        let Some(command) = self.command_for(gesture, player) else {
            debug!(%gesture, paused = self.paused, "gesture has no effect");
            return None;
        };

        match command {
            Command::Resume => {
                player.play();
                self.paused = false;
            }
            Command::Pause => {
                player.pause();
                self.paused = true;
            }
            Command::SetVolume(v) => player.set_volume(v),
            Command::Seek(p)      => player.set_position(p),
        }

        info!(%gesture, %command, player = player.name(), "command dispatched");
        Some(command)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
