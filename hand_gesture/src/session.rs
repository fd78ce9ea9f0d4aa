//! One camera session's worth of gesture state.
//!
//! `GestureSession` owns the classifier (with its swipe anchor) and the
//! debouncer. Construct one per camera session and feed it every frame in
//! capture order; it is not meant to be shared between threads.

use tracing::trace;

use crate::classifier::GestureClassifier;
use crate::config::{GestureConfig, HandPolicy};
use crate::debounce::Debouncer;
use crate::gesture::Gesture;
use crate::landmark::Frame;

pub struct GestureSession {
    classifier: GestureClassifier,
    debouncer:  Debouncer,
    policy:     HandPolicy,
    last_raw:   Option<Gesture>,
    active:     Option<usize>,
    frames:     u64,
}

impl GestureSession {
    pub fn new(config: &GestureConfig) -> Self {
        GestureSession {
            classifier: GestureClassifier::new(config.pinch_threshold),
            debouncer:  Debouncer::new(config.cooldown),
            policy:     config.hand_policy,
            last_raw:   None,
            active:     None,
            frames:     0,
        }
    }

    /// Run one frame through classifier and debouncer.
    ///
    /// Returns the gesture to act on, if any. At most one gesture comes out
    /// per frame.
    pub fn process_frame(&mut self, frame: &Frame) -> Option<Gesture> {
        self.frames += 1;
        let raw = self.classify_frame(frame);
        self.last_raw = raw;
        self.debouncer.filter(raw, frame.timestamp)
    }

    /// Classify a frame without debouncing, applying the hand policy.
    ///
    /// A frame with no usable hand clears the swipe anchor, since it shows
    /// no pinch.
    pub fn classify_frame(&mut self, frame: &Frame) -> Option<Gesture> {
        let mut usable = frame.hands.iter().enumerate().filter(|(_, h)| h.is_usable());

        if frame.hands.len() > 1 {
            trace!(hands = frame.hands.len(), policy = %self.policy, "multiple hands in frame");
        }

        let (active, label) = match self.policy {
            HandPolicy::First => match usable.next() {
                Some((i, hand)) => (Some(i), self.classifier.classify(hand)),
                None => (None, None),
            },
            HandPolicy::Last => {
                let mut active = None;
                let mut label = None;
                for (i, hand) in usable {
                    active = Some(i);
                    label = self.classifier.classify(hand);
                }
                (active, label)
            }
        };

        if active.is_none() {
            self.classifier.reset();
        }
        self.active = active;
        label
    }

    /// Index into the last frame's hands of the detection whose label
    /// counted, or `None` when no hand was usable.
    pub fn active_hand(&self) -> Option<usize> {
        self.active
    }

    /// The undebounced label of the most recent frame.
    pub fn last_raw(&self) -> Option<Gesture> {
        self.last_raw
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn policy(&self) -> HandPolicy {
        self.policy
    }

    /// Start over as if the session had just been created.
    pub fn reset(&mut self) {
        self.classifier.reset();
        self.debouncer.reset();
        self.last_raw = None;
        self.active = None;
        self.frames = 0;
    }
}

impl Default for GestureSession {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::landmark::{HandDetection, Keypoint};
    use crate::synthetic::HandPose;
    use Gesture::*;

    fn at(ms: u64, poses: &[HandPose]) -> Frame {
        Frame::new(
            Duration::from_millis(ms),
            poses.iter().map(|p| p.detection()).collect(),
        )
    }

    fn feed(session: &mut GestureSession, frames: &[Frame]) -> Vec<Option<Gesture>> {
        frames.iter().map(|f| session.process_frame(f)).collect()
    }

    fn pinch(index_x: f32, thumb_x: f32) -> HandPose {
        HandPose::Pinch {
            index: Keypoint::new(index_x, 0.50),
            thumb: Keypoint::new(thumb_x, 0.50),
        }
    }

    #[test]
    fn play_then_swipe_forward() {
        let mut s = GestureSession::default();
        let events = feed(
            &mut s,
            &[
                at(0,   &[HandPose::OpenPalm]),
                at(100, &[pinch(0.40, 0.42)]),
                at(200, &[pinch(0.30, 0.32)]),
            ],
        );
        assert_eq!(events, [Some(Play), None, Some(SeekForward)]);
    }

    #[test]
    fn held_pose_repeats_after_cooldown() {
        let mut s = GestureSession::default();
        let frames: Vec<_> = (0..=25).map(|i| at(i * 100, &[HandPose::Fist])).collect();
        let events: Vec<_> = feed(&mut s, &frames)
            .into_iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|g| (i, g)))
            .collect();
        // t = 0.0s and t = 2.0s
        assert_eq!(events, [(0, Pause), (20, Pause)]);
    }

    #[test]
    fn empty_frames_never_emit_or_touch_debounce() {
        let mut s = GestureSession::default();
        s.process_frame(&at(0, &[HandPose::OpenPalm]));
        let before = s.debouncer().last_emission();
        for ms in [100, 1_000, 5_000] {
            assert_eq!(s.process_frame(&Frame::empty(Duration::from_millis(ms))), None);
        }
        assert_eq!(s.debouncer().last_emission(), before);
    }

    #[test]
    fn empty_frame_breaks_swipe() {
        let mut s = GestureSession::default();
        let events = feed(
            &mut s,
            &[
                at(0,   &[HandPose::pinch(0.40)]),
                at(33,  &[]),
                at(66,  &[HandPose::pinch(0.30)]),
                at(100, &[HandPose::pinch(0.20)]),
            ],
        );
        assert_eq!(events, [None, None, None, Some(SeekForward)]);
    }

    #[test]
    fn continued_swipe_is_debounced() {
        let mut s = GestureSession::default();
        let events = feed(
            &mut s,
            &[
                at(0,   &[HandPose::pinch(0.50)]),
                at(33,  &[HandPose::pinch(0.45)]),
                at(66,  &[HandPose::pinch(0.40)]),
                at(100, &[HandPose::pinch(0.45)]),
            ],
        );
        assert_eq!(events, [None, Some(SeekForward), None, Some(SeekBackward)]);
    }

    #[test]
    fn malformed_detection_yields_none() {
        let mut s = GestureSession::default();
        let short = HandDetection::new(vec![Keypoint::new(0.5, 0.5); 5]);
        let frame = Frame::new(Duration::ZERO, vec![short]);
        assert_eq!(s.process_frame(&frame), None);
        assert_eq!(s.debouncer().last_emission(), None);
    }

    #[test]
    fn first_policy_uses_first_usable_hand() {
        let mut s = GestureSession::default();
        let short = HandDetection::new(vec![Keypoint::new(0.5, 0.5); 3]);
        let frame = Frame::new(
            Duration::ZERO,
            vec![short, HandPose::Fist.detection(), HandPose::OpenPalm.detection()],
        );
        assert_eq!(s.process_frame(&frame), Some(Pause));
    }

    #[test]
    fn last_policy_lets_last_hand_win() {
        let config = GestureConfig::new().with_hand_policy(HandPolicy::Last);
        let mut s = GestureSession::new(&config);
        let frame = at(0, &[HandPose::Fist, HandPose::OpenPalm]);
        assert_eq!(s.process_frame(&frame), Some(Play));
    }

    #[test]
    fn active_hand_follows_policy() {
        let short = HandDetection::new(vec![Keypoint::new(0.5, 0.5); 3]);
        let frame = Frame::new(
            Duration::ZERO,
            vec![short, HandPose::pinch(0.4).detection(), HandPose::Fist.detection()],
        );

        let mut first = GestureSession::default();
        first.process_frame(&frame);
        assert_eq!(first.active_hand(), Some(1));

        let mut last = GestureSession::new(&GestureConfig::new().with_hand_policy(HandPolicy::Last));
        last.process_frame(&frame);
        assert_eq!(last.active_hand(), Some(2));

        first.process_frame(&Frame::empty(Duration::from_millis(33)));
        assert_eq!(first.active_hand(), None);
    }

    #[test]
    fn last_policy_later_hand_clears_anchor() {
        let config = GestureConfig::new().with_hand_policy(HandPolicy::Last);
        let mut s = GestureSession::new(&config);
        s.process_frame(&at(0, &[HandPose::pinch(0.40), HandPose::Relaxed]));
        assert!(!s.classifier().swipe().is_tracking());
    }

    #[test]
    fn first_policy_ignores_second_hand_for_swipe() {
        let mut s = GestureSession::default();
        let events = feed(
            &mut s,
            &[
                at(0,  &[HandPose::pinch(0.40), HandPose::Relaxed]),
                at(33, &[HandPose::pinch(0.30), HandPose::Relaxed]),
            ],
        );
        assert_eq!(events, [None, Some(SeekForward)]);
    }

    #[test]
    fn last_raw_tracks_undebounced_label() {
        let mut s = GestureSession::default();
        s.process_frame(&at(0, &[HandPose::OpenPalm]));
        assert_eq!(s.process_frame(&at(100, &[HandPose::OpenPalm])), None);
        assert_eq!(s.last_raw(), Some(Play));
        assert_eq!(s.frames_processed(), 2);
    }

    #[test]
    fn independent_sessions_do_not_share_state() {
        let mut a = GestureSession::default();
        let mut b = GestureSession::default();
        a.process_frame(&at(0, &[HandPose::OpenPalm]));
        assert_eq!(b.process_frame(&at(100, &[HandPose::OpenPalm])), Some(Play));
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = GestureSession::default();
        s.process_frame(&at(0, &[HandPose::OpenPalm]));
        s.process_frame(&at(10, &[HandPose::pinch(0.4)]));
        s.reset();
        assert_eq!(s.frames_processed(), 0);
        assert!(!s.classifier().swipe().is_tracking());
        assert_eq!(s.process_frame(&at(20, &[HandPose::OpenPalm])), Some(Play));
    }
}
