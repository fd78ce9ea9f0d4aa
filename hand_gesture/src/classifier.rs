//! Geometric gesture classifier.
//!
//! Each finger is judged by comparing its tip with its PIP joint: a tip
//! above the joint (smaller y) is extended, below is curled, and an exact
//! tie is neither. The four finger states select one of the static poses;
//! failing that, a thumb-index pinch feeds the [`SwipeTracker`].

use crate::gesture::Gesture;
use crate::landmark::index::*;
use crate::landmark::{HandDetection, Keypoint, Landmarks};
use crate::swipe::SwipeTracker;

/// Tip / PIP index pairs for index, middle, ring and pinky.
const FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP,  INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP,   RING_PIP),
    (PINKY_TIP,  PINKY_PIP),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Finger {
    Extended,
    Curled,
    /// Tip and joint at the same height (or unordered, e.g. NaN).
    Level,
}

fn finger(lm: &Landmarks, tip: usize, pip: usize) -> Finger {
    let (t, r) = (lm[tip].y, lm[pip].y);
    if t < r {
        Finger::Extended
    } else if t > r {
        Finger::Curled
    } else {
        Finger::Level
    }
}

/// Static pose from the four finger states, if any rule matches.
fn static_pose(lm: &Landmarks) -> Option<Gesture> {
    use Finger::*;
    let f = FINGERS.map(|(tip, pip)| finger(lm, tip, pip));
    match f {
        [Extended, Extended, Extended, Extended] => Some(Gesture::Play),
        [Curled,   Curled,   Curled,   Curled]   => Some(Gesture::Pause),
        [Extended, Extended, Curled,   Curled]   => Some(Gesture::VolumeUp),
        [Extended, Curled,   Curled,   Curled]   => Some(Gesture::VolumeDown),
        _ => None,
    }
}

/// Thumb tip and index tip closer than `threshold` on both axes.
pub fn is_pinch(index_tip: Keypoint, thumb_tip: Keypoint, threshold: f32) -> bool {
    (index_tip.x - thumb_tip.x).abs() < threshold
        && (index_tip.y - thumb_tip.y).abs() < threshold
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Maps one hand to at most one [`Gesture`], remembering the previous pinch
/// frame for swipe detection.
#[derive(Clone, Debug)]
pub struct GestureClassifier {
    pinch_threshold: f32,
    swipe: SwipeTracker,
}

impl GestureClassifier {
    pub fn new(pinch_threshold: f32) -> Self {
        GestureClassifier { pinch_threshold, swipe: SwipeTracker::new() }
    }

    pub fn pinch_threshold(&self) -> f32 {
        self.pinch_threshold
    }

    pub fn swipe(&self) -> &SwipeTracker {
        &self.swipe
    }

    /// Classify one hand.
    ///
    /// Rules, first match wins: Play, Pause, VolumeUp, VolumeDown, pinch.
    /// Only a pinch keeps the swipe anchor alive; any other outcome,
    /// including an incomplete detection, clears it.
    pub fn classify(&mut self, hand: &HandDetection) -> Option<Gesture> {
        let Some(lm) = hand.landmarks() else {
            tracing::trace!(points = hand.len(), "incomplete hand detection");
            self.swipe.clear();
            return None;
        };

        if let Some(gesture) = static_pose(lm) {
            self.swipe.clear();
            return Some(gesture);
        }

        let (index_tip, thumb_tip) = (lm[INDEX_TIP], lm[THUMB_TIP]);
        if is_pinch(index_tip, thumb_tip, self.pinch_threshold) {
            let swipe = self.swipe.direction_from(index_tip);
            self.swipe.observe_pinch(index_tip, thumb_tip);
            swipe
        } else {
            self.swipe.clear();
            None
        }
    }

    /// Forget any swipe in progress.
    pub fn reset(&mut self) {
        self.swipe.clear();
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PINCH_THRESHOLD)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{FingerPose, HandPose, hand};
    use FingerPose::*;

    fn classify_once(pose: HandPose) -> Option<Gesture> {
        GestureClassifier::default().classify(&pose.detection())
    }

    #[test]
    fn open_palm_is_play() {
        assert_eq!(classify_once(HandPose::OpenPalm), Some(Gesture::Play));
    }

    #[test]
    fn fist_is_pause() {
        assert_eq!(classify_once(HandPose::Fist), Some(Gesture::Pause));
    }

    #[test]
    fn two_fingers_is_volume_up() {
        assert_eq!(classify_once(HandPose::TwoFingers), Some(Gesture::VolumeUp));
    }

    #[test]
    fn one_finger_is_volume_down() {
        assert_eq!(classify_once(HandPose::OneFinger), Some(Gesture::VolumeDown));
    }

    #[test]
    fn relaxed_hand_is_none() {
        assert_eq!(classify_once(HandPose::Relaxed), None);
    }

    #[test]
    fn play_and_pause_are_exclusive() {
        // Every combination of extended/curled fingers: never both.
        for mask in 0u8..16 {
            let fingers = [0, 1, 2, 3].map(|i| if mask & (1 << i) != 0 { Extended } else { Curled });
            let g = GestureClassifier::default().classify(&hand(fingers).into());
            match mask {
                0b1111 => assert_eq!(g, Some(Gesture::Play)),
                0b0000 => assert_eq!(g, Some(Gesture::Pause)),
                0b0011 => assert_eq!(g, Some(Gesture::VolumeUp)),
                0b0001 => assert_eq!(g, Some(Gesture::VolumeDown)),
                _      => assert_eq!(g, None, "mask {mask:04b}"),
            }
        }
    }

    #[test]
    fn level_finger_blocks_static_poses() {
        let g = GestureClassifier::default()
            .classify(&hand([Extended, Extended, Extended, Level]).into());
        assert_eq!(g, None);
    }

    #[test]
    fn pinch_threshold_is_strict() {
        let thumb = Keypoint::new(0.0, 0.5);
        assert!(!is_pinch(Keypoint::new(0.05, 0.5), thumb, 0.05));
        assert!(is_pinch(Keypoint::new(0.0499, 0.5), thumb, 0.05));
        assert!(!is_pinch(Keypoint::new(0.0, 0.25), Keypoint::new(0.0, 0.5), 0.25));
    }

    #[test]
    fn pinch_at_threshold_does_not_anchor() {
        let mut c = GestureClassifier::default();
        let det = HandPose::Pinch {
            index: Keypoint::new(0.05, 0.5),
            thumb: Keypoint::new(0.0, 0.5),
        }
        .detection();
        assert_eq!(c.classify(&det), None);
        assert!(!c.swipe().is_tracking());
    }

    #[test]
    fn first_pinch_only_anchors() {
        let mut c = GestureClassifier::default();
        assert_eq!(c.classify(&HandPose::pinch(0.40).detection()), None);
        assert!(c.swipe().is_tracking());
    }

    #[test]
    fn second_pinch_left_seeks_forward() {
        let mut c = GestureClassifier::default();
        c.classify(&HandPose::pinch(0.40).detection());
        assert_eq!(c.classify(&HandPose::pinch(0.3999).detection()), Some(Gesture::SeekForward));
    }

    #[test]
    fn second_pinch_right_seeks_backward() {
        let mut c = GestureClassifier::default();
        c.classify(&HandPose::pinch(0.40).detection());
        assert_eq!(c.classify(&HandPose::pinch(0.45).detection()), Some(Gesture::SeekBackward));
    }

    #[test]
    fn stationary_pinch_is_none_but_keeps_anchor() {
        let mut c = GestureClassifier::default();
        c.classify(&HandPose::pinch(0.40).detection());
        assert_eq!(c.classify(&HandPose::pinch(0.40).detection()), None);
        assert!(c.swipe().is_tracking());
    }

    #[test]
    fn anchor_follows_latest_pinch() {
        let mut c = GestureClassifier::default();
        c.classify(&HandPose::pinch(0.40).detection());
        c.classify(&HandPose::pinch(0.30).detection());
        // Compared against 0.30 now, not 0.40.
        assert_eq!(c.classify(&HandPose::pinch(0.35).detection()), Some(Gesture::SeekBackward));
    }

    #[test]
    fn broken_pinch_resets_swipe() {
        let mut c = GestureClassifier::default();
        c.classify(&HandPose::pinch(0.40).detection());
        assert_eq!(c.classify(&HandPose::Relaxed.detection()), None);
        assert!(!c.swipe().is_tracking());
        assert_eq!(c.classify(&HandPose::pinch(0.30).detection()), None);
    }

    #[test]
    fn static_pose_between_pinches_resets_swipe() {
        let mut c = GestureClassifier::default();
        c.classify(&HandPose::pinch(0.40).detection());
        assert_eq!(c.classify(&HandPose::OpenPalm.detection()), Some(Gesture::Play));
        assert_eq!(c.classify(&HandPose::pinch(0.30).detection()), None);
    }

    #[test]
    fn incomplete_detection_is_none_and_resets() {
        let mut c = GestureClassifier::default();
        c.classify(&HandPose::pinch(0.40).detection());
        let mut points = HandPose::OpenPalm.detection().keypoints().to_vec();
        points.pop();
        assert_eq!(c.classify(&HandDetection::new(points)), None);
        assert!(!c.swipe().is_tracking());
    }

    #[test]
    fn nan_coordinates_yield_none() {
        let det = HandDetection::from([Keypoint::new(f32::NAN, f32::NAN); 21]);
        assert_eq!(GestureClassifier::default().classify(&det), None);
    }
}
