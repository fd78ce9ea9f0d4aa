//! Hand landmark data model.
//!
//! Coordinates are normalized to `[0, 1]` relative to the frame width and
//! height, with y increasing downward. Keypoints follow the MediaPipe hand
//! numbering:
//!
//! ```text
//!            8   12  16  20        tips
//!            7   11  15  19        DIP
//!      4     6   10  14  18        PIP
//!       3    5    9  13  17        MCP
//!        2
//!         1                        thumb CMC
//!                 0                wrist
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of keypoints in a usable hand detection.
pub const LANDMARK_COUNT: usize = 21;

/// A complete, indexable set of hand keypoints.
pub type Landmarks = [Keypoint; LANDMARK_COUNT];

/// Keypoint indices.
pub mod index {
    pub const WRIST:      usize = 0;
    pub const THUMB_CMC:  usize = 1;
    pub const THUMB_MCP:  usize = 2;
    pub const THUMB_IP:   usize = 3;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_MCP:  usize = 5;
    pub const INDEX_PIP:  usize = 6;
    pub const INDEX_DIP:  usize = 7;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP:   usize = 13;
    pub const RING_PIP:   usize = 14;
    pub const RING_DIP:   usize = 15;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_MCP:  usize = 17;
    pub const PINKY_PIP:  usize = 18;
    pub const PINKY_DIP:  usize = 19;
    pub const PINKY_TIP:  usize = 20;
}

/// Pairs of keypoints joined by a bone, for drawing a hand skeleton.
pub const HAND_CONNECTIONS: [[usize; 2]; 21] = [
    [0, 1], [1, 2], [2, 3], [3, 4],          // thumb
    [0, 5], [5, 6], [6, 7], [7, 8],          // index
    [5, 9], [9, 10], [10, 11], [11, 12],     // middle
    [9, 13], [13, 14], [14, 15], [15, 16],   // ring
    [13, 17], [0, 17], [17, 18], [18, 19], [19, 20], // pinky + palm
];

// ════════════════════════════════════════════════════════════════════════════
// Keypoint
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point on a hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist, when the source provides it.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub z: f32,
}

fn is_zero(v: &f32) -> bool {
    *v == 0.0
}

impl Keypoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Keypoint { x, y, z: 0.0 }
    }

    pub const fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandDetection
// ════════════════════════════════════════════════════════════════════════════

/// The keypoints of one detected hand in one frame.
///
/// Any number of points is accepted so that truncated detections can be
/// represented; only a detection with exactly [`LANDMARK_COUNT`] points is
/// usable by the classifier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandDetection {
    keypoints: Vec<Keypoint>,
}

impl HandDetection {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        HandDetection { keypoints }
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// The full landmark set, or `None` when the detection is incomplete.
    pub fn landmarks(&self) -> Option<&Landmarks> {
        self.keypoints.as_slice().try_into().ok()
    }

    pub fn is_usable(&self) -> bool {
        self.landmarks().is_some()
    }
}

impl From<Landmarks> for HandDetection {
    fn from(landmarks: Landmarks) -> Self {
        HandDetection { keypoints: landmarks.to_vec() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// Everything the landmark source saw in one captured image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Time since the start of the session.
    #[serde(with = "seconds")]
    pub timestamp: Duration,
    #[serde(default)]
    pub hands: Vec<HandDetection>,
}

impl Frame {
    pub fn new(timestamp: Duration, hands: Vec<HandDetection>) -> Self {
        Frame { timestamp, hands }
    }

    /// A frame in which no hand was detected.
    pub fn empty(timestamp: Duration) -> Self {
        Frame { timestamp, hands: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

/// `Duration` as fractional seconds.
mod seconds {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_detection_is_usable() {
        let det = HandDetection::from([Keypoint::new(0.5, 0.5); LANDMARK_COUNT]);
        assert_eq!(det.len(), 21);
        assert!(det.is_usable());
    }

    #[test]
    fn truncated_detection_is_not_usable() {
        let det = HandDetection::new(vec![Keypoint::new(0.5, 0.5); 20]);
        assert!(det.landmarks().is_none());
    }

    #[test]
    fn oversized_detection_is_not_usable() {
        let det = HandDetection::new(vec![Keypoint::new(0.5, 0.5); 22]);
        assert!(!det.is_usable());
    }

    #[test]
    fn connections_stay_in_range() {
        for [a, b] in HAND_CONNECTIONS {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }

    #[test]
    fn frame_timestamp_is_seconds_in_json() {
        let frame = Frame::empty(Duration::from_millis(1500));
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"timestamp":1.5,"hands":[]}"#);
    }

    #[test]
    fn keypoint_depth_defaults_to_zero() {
        let kp: Keypoint = serde_json::from_str(r#"{"x":0.25,"y":0.75}"#).unwrap();
        assert_eq!(kp, Keypoint::new(0.25, 0.75));
    }

    #[test]
    fn negative_timestamp_is_rejected() {
        let res: Result<Frame, _> = serde_json::from_str(r#"{"timestamp":-1.0}"#);
        assert!(res.is_err());
    }
}
