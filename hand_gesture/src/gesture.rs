//! The closed set of playback gestures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A discrete gesture recognised from one hand.
///
/// "No gesture" is expressed as `Option::<Gesture>::None` throughout the
/// crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// All four fingers extended.
    Play,
    /// All four fingers curled.
    Pause,
    /// Index and middle extended, ring and pinky curled.
    VolumeUp,
    /// Only the index finger extended.
    VolumeDown,
    /// Pinch moving toward smaller x.
    SeekForward,
    /// Pinch moving toward larger x.
    SeekBackward,
}

impl Gesture {
    pub const ALL: [Gesture; 6] = [
        Gesture::Play,
        Gesture::Pause,
        Gesture::VolumeUp,
        Gesture::VolumeDown,
        Gesture::SeekForward,
        Gesture::SeekBackward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play         => "play",
            Self::Pause        => "pause",
            Self::VolumeUp     => "volume-up",
            Self::VolumeDown   => "volume-down",
            Self::SeekForward  => "seek-forward",
            Self::SeekBackward => "seek-backward",
        }
    }

    /// True for the two pinch-swipe gestures.
    pub fn is_swipe(&self) -> bool {
        matches!(self, Self::SeekForward | Self::SeekBackward)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
