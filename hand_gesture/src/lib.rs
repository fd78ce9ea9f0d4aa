//! # hand_gesture
//!
//! Turns a stream of per-frame hand landmarks into a stream of debounced,
//! discrete playback gestures.
//!
//! ```text
//!  Frame ──► GestureClassifier ──► raw label ──► Debouncer ──► event
//!                 ▲      │
//!                 └──────┘ SwipeTracker (previous pinch frame)
//! ```
//!
//! ## Gesture table
//!
//! Fingers are compared tip-vs-PIP in image coordinates (smaller y = higher).
//! Rules are checked in order; the first match wins.
//!
//! | # | Pose | Gesture |
//! |---|---|---|
//! | 1 | all four fingers up | [`Gesture::Play`] |
//! | 2 | all four fingers down | [`Gesture::Pause`] |
//! | 3 | index + middle up, ring + pinky down | [`Gesture::VolumeUp`] |
//! | 4 | index up, the rest down | [`Gesture::VolumeDown`] |
//! | 5 | thumb tip touching index tip, moving left | [`Gesture::SeekForward`] |
//! | 5 | thumb tip touching index tip, moving right | [`Gesture::SeekBackward`] |
//!
//! A swipe needs two consecutive pinch frames: the first one only sets the
//! anchor.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use hand_gesture::{Frame, Gesture, GestureConfig, GestureSession};
//! use hand_gesture::synthetic::HandPose;
//!
//! let mut session = GestureSession::new(&GestureConfig::default());
//!
//! let palm = Frame::new(Duration::ZERO, vec![HandPose::OpenPalm.detection()]);
//! assert_eq!(session.process_frame(&palm), Some(Gesture::Play));
//!
//! // Held pose inside the cooldown window is suppressed.
//! let held = Frame::new(Duration::from_millis(500), vec![HandPose::OpenPalm.detection()]);
//! assert_eq!(session.process_frame(&held), None);
//! ```

pub mod classifier;
pub mod config;
pub mod debounce;
pub mod error;
pub mod gesture;
pub mod landmark;
pub mod session;
pub mod swipe;
pub mod synthetic;

pub use classifier::GestureClassifier;
pub use config::{GestureConfig, HandPolicy, DEFAULT_COOLDOWN, DEFAULT_PINCH_THRESHOLD};
pub use debounce::Debouncer;
pub use error::{ConfigError, Result};
pub use gesture::Gesture;
pub use landmark::{Frame, HandDetection, Keypoint, Landmarks, LANDMARK_COUNT};
pub use session::GestureSession;
pub use swipe::{SwipeAnchor, SwipeTracker};
