//! Synthetic hands with known poses.
//!
//! Used by the keyboard simulator (no camera required) and by tests. The
//! layout is a stylised right hand facing the camera; only the relative
//! heights of tips and PIP joints, and the thumb-index distance, matter to
//! the classifier.

use crate::landmark::index::*;
use crate::landmark::{HandDetection, Keypoint, Landmarks, LANDMARK_COUNT};

const WRIST_Y: f32 = 0.85;
const MCP_Y:   f32 = 0.62;
const PIP_Y:   f32 = 0.50;

/// x positions of index, middle, ring, pinky.
const FINGER_X: [f32; 4] = [0.42, 0.48, 0.54, 0.60];

/// Thumb CMC, MCP, IP and tip, far enough from every index tip position
/// that no built-in pose reads as a pinch.
const THUMB: [Keypoint; 4] = [
    Keypoint::new(0.40, 0.78),
    Keypoint::new(0.35, 0.72),
    Keypoint::new(0.32, 0.67),
    Keypoint::new(0.30, 0.62),
];

/// How one non-thumb finger is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FingerPose {
    /// Tip above the PIP joint.
    Extended,
    /// Tip below the PIP joint.
    Curled,
    /// Tip exactly level with the PIP joint.
    Level,
}

/// Build a hand with the given index, middle, ring and pinky poses.
pub fn hand(fingers: [FingerPose; 4]) -> Landmarks {
    let mut kp = [Keypoint::default(); LANDMARK_COUNT];
    kp[WRIST] = Keypoint::new(0.50, WRIST_Y);
    kp[THUMB_CMC..=THUMB_TIP].copy_from_slice(&THUMB);

    for (f, pose) in fingers.iter().enumerate() {
        let base = INDEX_MCP + 4 * f;
        let x = FINGER_X[f];
        let (dip_y, tip_y) = match pose {
            FingerPose::Extended => (0.42, 0.34),
            FingerPose::Curled   => (0.55, 0.58),
            FingerPose::Level    => (0.46, PIP_Y),
        };
        kp[base]     = Keypoint::new(x, MCP_Y);
        kp[base + 1] = Keypoint::new(x, PIP_Y);
        kp[base + 2] = Keypoint::new(x, dip_y);
        kp[base + 3] = Keypoint::new(x, tip_y);
    }
    kp
}

// ════════════════════════════════════════════════════════════════════════════
// HandPose
// ════════════════════════════════════════════════════════════════════════════

/// Canonical poses, one per classifier rule plus a neutral hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HandPose {
    OpenPalm,
    Fist,
    TwoFingers,
    OneFinger,
    /// Index tip and thumb tip at the given positions, other fingers level.
    Pinch { index: Keypoint, thumb: Keypoint },
    /// All fingers level with their joints; matches no rule.
    Relaxed,
}

impl HandPose {
    /// A pinch with the index tip at `(x, 0.5)` and the thumb just right of it.
    pub fn pinch(x: f32) -> Self {
        HandPose::Pinch {
            index: Keypoint::new(x, 0.5),
            thumb: Keypoint::new(x + 0.02, 0.5),
        }
    }

    pub fn landmarks(self) -> Landmarks {
        use FingerPose::*;
        match self {
            HandPose::OpenPalm   => hand([Extended, Extended, Extended, Extended]),
            HandPose::Fist       => hand([Curled, Curled, Curled, Curled]),
            HandPose::TwoFingers => hand([Extended, Extended, Curled, Curled]),
            HandPose::OneFinger  => hand([Extended, Curled, Curled, Curled]),
            HandPose::Relaxed    => hand([Level, Level, Level, Level]),
            HandPose::Pinch { index, thumb } => {
                let mut kp = hand([Level, Level, Level, Level]);
                // Keep the index finger level at the pinch height.
                kp[INDEX_PIP] = Keypoint::new(index.x, index.y);
                kp[INDEX_TIP] = index;
                kp[THUMB_TIP] = thumb;
                kp
            }
        }
    }

    pub fn detection(self) -> HandDetection {
        self.landmarks().into()
    }
}
