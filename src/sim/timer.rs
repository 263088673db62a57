//! Single-slot deferred action
//!
//! Holds at most one pending action. Arming while armed replaces the pending
//! action and restarts the countdown; firing disarms, so one arm produces at
//! most one action.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShot<A> {
    pending: Option<(A, Duration)>,
}

impl<A> Default for OneShot<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> OneShot<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire after `delay`. Returns true if a pending
    /// action was replaced.
    pub fn arm(&mut self, action: A, delay: Duration) -> bool {
        self.pending.replace((action, delay)).is_some()
    }

    /// Drop any pending action
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending action fires
    pub fn remaining(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(_, left)| *left)
    }

    /// Advance by `dt`; yields the action exactly once when its delay elapses
    pub fn tick(&mut self, dt: Duration) -> Option<A> {
        let (_, left) = self.pending.as_mut()?;
        *left = left.saturating_sub(dt);
        if left.is_zero() {
            self.pending.take().map(|(action, _)| action)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let mut t = OneShot::new();
        t.arm("advance", Duration::from_millis(1000));
        assert_eq!(t.tick(Duration::from_millis(600)), None);
        assert_eq!(t.remaining(), Some(Duration::from_millis(400)));
        assert_eq!(t.tick(Duration::from_millis(400)), Some("advance"));
        assert!(!t.is_armed());
        assert_eq!(t.tick(Duration::from_millis(1000)), None);
    }

    #[test]
    fn test_rearm_replaces_pending() {
        let mut t = OneShot::new();
        assert!(!t.arm(1, Duration::from_millis(1000)));
        t.tick(Duration::from_millis(900));
        assert!(t.arm(2, Duration::from_millis(1000)));

        // Old countdown is gone, only the replacement fires
        assert_eq!(t.tick(Duration::from_millis(200)), None);
        assert_eq!(t.tick(Duration::from_millis(800)), Some(2));
        assert_eq!(t.tick(Duration::from_millis(5000)), None);
    }

    #[test]
    fn test_cancel() {
        let mut t = OneShot::new();
        t.arm((), Duration::from_millis(10));
        t.cancel();
        assert_eq!(t.tick(Duration::from_millis(50)), None);
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut t: OneShot<u8> = OneShot::default();
        assert_eq!(t.tick(Duration::from_secs(1)), None);
        assert_eq!(t.remaining(), None);
    }
}
