//! Pinch-swipe tracking across consecutive frames.
//!
//! The tracker remembers where the index tip and thumb tip were in the last
//! frame that showed a pinch. A swipe direction can only be derived while
//! that anchor exists, so a seek needs two pinch frames in a row.

use crate::gesture::Gesture;
use crate::landmark::Keypoint;

/// Fingertip positions from the previous pinch frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeAnchor {
    pub index_tip: Keypoint,
    pub thumb_tip: Keypoint,
}

/// Holds the optional [`SwipeAnchor`] for one camera session.
#[derive(Clone, Debug, Default)]
pub struct SwipeTracker {
    anchor: Option<SwipeAnchor>,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Option<&SwipeAnchor> {
        self.anchor.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.anchor.is_some()
    }

    /// Record the current pinch as the anchor for the next frame.
    pub fn observe_pinch(&mut self, index_tip: Keypoint, thumb_tip: Keypoint) {
        self.anchor = Some(SwipeAnchor { index_tip, thumb_tip });
    }

    /// Forget the anchor; the next pinch starts a fresh swipe.
    pub fn clear(&mut self) {
        self.anchor = None;
    }

    /// Direction of travel of the index tip relative to the anchor.
    ///
    /// Smaller x is a forward seek, larger x a backward seek. No anchor, or
    /// no horizontal movement, gives `None`.
    pub fn direction_from(&self, index_tip: Keypoint) -> Option<Gesture> {
        let anchor = self.anchor?;
        if index_tip.x < anchor.index_tip.x {
            Some(Gesture::SeekForward)
        } else if index_tip.x > anchor.index_tip.x {
            Some(Gesture::SeekBackward)
        } else {
            None
        }
    }
}
