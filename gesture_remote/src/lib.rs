//! # gesture_remote
//!
//! Hand-gesture media remote. Landmarks from a LeapMotion, a recorded trace
//! or the keyboard simulator go through a [`hand_gesture::GestureSession`];
//! debounced gestures drive a media player.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Pose | Action |
//! |---|---|---|
//! | Play | open palm | Resume (only when paused) |
//! | Pause | fist | Pause (only when playing) |
//! | VolumeUp | index + middle up | Volume + step (default 10, max 100) |
//! | VolumeDown | index up | Volume − step (min 0) |
//! | SeekForward | pinch moving left | Position + seek step (default 10 s) |
//! | SeekBackward | pinch moving right | Position − seek step (min 0) |
//!
//! ## Players
//!
//! * `sim` (default): in-memory transport shown in the HUD.
//! * `midi`: MIDI Machine Control to any MMC-aware player or DAW.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: keyboard-held poses, or trace replay.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key (hold) | Pose |
//! |---|---|
//! | `O` | Open palm |
//! | `F` | Fist |
//! | `U` | Two fingers |
//! | `J` | One finger |
//! | `←` / `→` | Pinch drifting left / right |
//! | `↓` | Pinch held still |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod dispatch;
pub mod error;
pub mod player;
pub mod source;
pub mod trace;
pub mod visualizer;

pub use app::{run, AppConfig, AppState, RunSummary};
pub use dispatch::{Command, DispatchConfig, Dispatcher};
pub use error::{Error, Result};
pub use player::{MediaPlayer, MmcPlayer, PlayerKind, SimPlayer};
pub use source::{LandmarkSource, SourceKind};
