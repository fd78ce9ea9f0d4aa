//! Cooldown debounce for the raw per-frame gesture labels.
//!
//! A held pose produces the same label on every frame; the debouncer lets
//! the first one through and suppresses repeats until the cooldown has
//! elapsed. A different label always passes immediately.
//!
//! Timestamps are session time (`Duration` since the session started). Time
//! that passes while capture is stalled still counts toward the cooldown.

use std::time::Duration;

use tracing::debug;

use crate::config::DEFAULT_COOLDOWN;
use crate::gesture::Gesture;

/// The last gesture let through, and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Emission {
    pub gesture: Gesture,
    pub at: Duration,
}

#[derive(Clone, Debug)]
pub struct Debouncer {
    cooldown: Duration,
    last: Option<Emission>,
}

impl Debouncer {
    pub fn new(cooldown: Duration) -> Self {
        Debouncer { cooldown, last: None }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_emission(&self) -> Option<Emission> {
        self.last
    }

    /// Pass or suppress one raw label observed at `now`.
    ///
    /// * `None` in → `None` out, state untouched.
    /// * A label different from the last emitted one always passes.
    /// * A repeat passes once `now - last >= cooldown`. If `now` is earlier
    ///   than the last emission the elapsed time is treated as below the
    ///   cooldown, so the repeat is suppressed.
    pub fn filter(&mut self, raw: Option<Gesture>, now: Duration) -> Option<Gesture> {
        let gesture = raw?;

        let eligible = match self.last {
            None => true,
            Some(last) if last.gesture != gesture => true,
            Some(last) => now
                .checked_sub(last.at)
                .is_some_and(|elapsed| elapsed >= self.cooldown),
        };

        if eligible {
            debug!(%gesture, at = ?now, "gesture emitted");
            self.last = Some(Emission { gesture, at: now });
            Some(gesture)
        } else {
            debug!(%gesture, at = ?now, "gesture suppressed by cooldown");
            None
        }
    }

    /// Back to the start-of-session state.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Gesture::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn run(d: &mut Debouncer, seq: &[(Option<Gesture>, f64)]) -> Vec<Option<Gesture>> {
        seq.iter().map(|&(g, t)| d.filter(g, secs(t))).collect()
    }

    #[test]
    fn repeat_within_cooldown_is_suppressed() {
        let mut d = Debouncer::default();
        assert_eq!(run(&mut d, &[(Some(Play), 0.0), (Some(Play), 0.5)]), [Some(Play), None]);
    }

    #[test]
    fn repeat_after_cooldown_passes() {
        let mut d = Debouncer::default();
        assert_eq!(
            run(&mut d, &[(Some(Play), 0.0), (Some(Play), 2.001)]),
            [Some(Play), Some(Play)]
        );
    }

    #[test]
    fn repeat_exactly_at_cooldown_passes() {
        let mut d = Debouncer::new(Duration::from_secs(2));
        d.filter(Some(Pause), Duration::from_secs(10));
        assert_eq!(d.filter(Some(Pause), Duration::from_secs(12)), Some(Pause));
    }

    #[test]
    fn label_change_always_passes() {
        let mut d = Debouncer::default();
        assert_eq!(
            run(&mut d, &[(Some(VolumeUp), 1.0), (Some(VolumeDown), 1.000_001)]),
            [Some(VolumeUp), Some(VolumeDown)]
        );
    }

    #[test]
    fn change_then_back_passes() {
        let mut d = Debouncer::default();
        assert_eq!(
            run(&mut d, &[(Some(Play), 0.0), (Some(Pause), 0.1), (Some(Play), 0.2)]),
            [Some(Play), Some(Pause), Some(Play)]
        );
    }

    #[test]
    fn none_does_not_touch_state() {
        let mut d = Debouncer::default();
        d.filter(Some(Play), secs(1.0));
        let before = d.last_emission();
        assert_eq!(d.filter(None, secs(5.0)), None);
        assert_eq!(d.last_emission(), before);
        // Still measured from t=1.0, not t=5.0.
        assert_eq!(d.filter(Some(Play), secs(3.5)), Some(Play));
    }

    #[test]
    fn cooldown_restarts_from_each_emission() {
        let mut d = Debouncer::default();
        assert_eq!(
            run(
                &mut d,
                &[(Some(Play), 0.0), (Some(Play), 1.9), (Some(Play), 2.0), (Some(Play), 3.9)]
            ),
            [Some(Play), None, Some(Play), None]
        );
    }

    #[test]
    fn backward_clock_suppresses_repeat() {
        let mut d = Debouncer::default();
        d.filter(Some(Play), secs(10.0));
        assert_eq!(d.filter(Some(Play), secs(1.0)), None);
        assert_eq!(d.last_emission().map(|e| e.at), Some(secs(10.0)));
    }

    #[test]
    fn backward_clock_still_passes_new_label() {
        let mut d = Debouncer::default();
        d.filter(Some(Play), secs(10.0));
        assert_eq!(d.filter(Some(Pause), secs(1.0)), Some(Pause));
    }

    #[test]
    fn zero_cooldown_passes_every_repeat() {
        let mut d = Debouncer::new(Duration::ZERO);
        assert_eq!(
            run(&mut d, &[(Some(Play), 0.0), (Some(Play), 0.0)]),
            [Some(Play), Some(Play)]
        );
    }

    #[test]
    fn reset_forgets_last_emission() {
        let mut d = Debouncer::default();
        d.filter(Some(Play), secs(0.0));
        d.reset();
        assert_eq!(d.filter(Some(Play), secs(0.1)), Some(Play));
    }
}
