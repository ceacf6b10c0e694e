//! Single/double activation disambiguation for one control.
//!
//! A first activation arms a short window. A second activation inside the
//! window yields the secondary action; if the window expires first, the
//! primary action fires. Callers pass the current `Instant` in and poll at
//! (or after) `deadline()`; there are no background timers.

use std::time::{Duration, Instant};

pub const DEFAULT_DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(250);

/// Action resolved from one or two activations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAction {
    /// Single activation (opens the editor).
    Primary,
    /// Double activation (cycles the season).
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TapState {
    Idle,
    Pending { deadline: Instant },
}

#[derive(Debug, Clone)]
pub struct DoubleTapTimer {
    window: Duration,
    state: TapState,
}

impl Default for DoubleTapTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_TAP_WINDOW)
    }
}

impl DoubleTapTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: TapState::Idle,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Registers an activation at `now`.
    ///
    /// Returns `Secondary` when it completes a double activation, `Primary`
    /// when an expired, unpolled activation is still pending (the new one
    /// then re-arms the timer), and `None` when it only arms the timer.
    pub fn activate(&mut self, now: Instant) -> Option<TapAction> {
        match self.state {
            TapState::Pending { deadline } if now < deadline => {
                self.state = TapState::Idle;
                Some(TapAction::Secondary)
            }
            TapState::Pending { .. } => {
                self.arm(now);
                Some(TapAction::Primary)
            }
            TapState::Idle => {
                self.arm(now);
                None
            }
        }
    }

    /// Fires `Primary` once the pending window has expired.
    pub fn poll(&mut self, now: Instant) -> Option<TapAction> {
        match self.state {
            TapState::Pending { deadline } if now >= deadline => {
                self.state = TapState::Idle;
                Some(TapAction::Primary)
            }
            _ => None,
        }
    }

    /// Instant at which `poll` will fire, if an activation is pending.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            TapState::Pending { deadline } => Some(deadline),
            TapState::Idle => None,
        }
    }

    /// Drops a pending activation without firing.
    pub fn cancel(&mut self) {
        self.state = TapState::Idle;
    }

    fn arm(&mut self, now: Instant) {
        self.state = TapState::Pending {
            deadline: now + self.window,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{DoubleTapTimer, TapAction};
    use std::time::{Duration, Instant};

    const WINDOW: Duration = Duration::from_millis(250);

    #[test]
    fn single_activation_fires_primary_after_window() {
        let start = Instant::now();
        let mut timer = DoubleTapTimer::new(WINDOW);

        assert_eq!(timer.activate(start), None);
        assert_eq!(timer.poll(start + Duration::from_millis(100)), None);
        assert_eq!(timer.poll(start + WINDOW), Some(TapAction::Primary));
        assert_eq!(timer.poll(start + WINDOW * 2), None);
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn second_activation_inside_window_is_secondary() {
        let start = Instant::now();
        let mut timer = DoubleTapTimer::new(WINDOW);

        timer.activate(start);
        assert_eq!(
            timer.activate(start + Duration::from_millis(120)),
            Some(TapAction::Secondary)
        );
        assert_eq!(timer.poll(start + WINDOW * 4), None);
    }

    #[test]
    fn late_second_activation_flushes_primary_and_rearms() {
        let start = Instant::now();
        let mut timer = DoubleTapTimer::new(WINDOW);

        timer.activate(start);
        let late = start + Duration::from_millis(400);
        assert_eq!(timer.activate(late), Some(TapAction::Primary));
        assert_eq!(timer.deadline(), Some(late + WINDOW));
    }

    #[test]
    fn cancel_drops_pending_activation() {
        let start = Instant::now();
        let mut timer = DoubleTapTimer::default();
        timer.activate(start);
        timer.cancel();
        assert_eq!(timer.poll(start + Duration::from_secs(1)), None);
    }
}
