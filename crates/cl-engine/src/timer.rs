use std::time::Duration;

/// A fire-once countdown.
///
/// Timers never repeat: whoever owns one replaces it with a fresh timer
/// when the next wait starts, and drops it to cancel. Time that elapses
/// past the deadline is kept as overrun; [`Timer::then`] starts the next
/// wait early by that much, so back-to-back waits do not drift when the
/// frame length does not divide the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    remaining: Duration,
    overrun: Duration,
}

impl Timer {
    /// A timer that fires once `delay` has elapsed.
    pub fn new(delay: Duration) -> Self {
        Self {
            remaining: delay,
            overrun: Duration::ZERO,
        }
    }

    /// The timer for a wait of `delay` that starts when this one fired.
    pub fn then(self, delay: Duration) -> Self {
        Self {
            remaining: delay.saturating_sub(self.overrun),
            overrun: self.overrun.saturating_sub(delay),
        }
    }

    /// Count down by `dt`. Returns `true` once the delay has fully elapsed
    /// (and on every later call).
    pub fn tick(&mut self, dt: Duration) -> bool {
        if dt >= self.remaining {
            self.overrun += dt - self.remaining;
            self.remaining = Duration::ZERO;
        } else {
            self.remaining -= dt;
        }
        self.remaining.is_zero()
    }

    /// Time left before the timer fires.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Time elapsed since the timer fired.
    pub fn overrun(&self) -> Duration {
        self.overrun
    }

    /// Whether the timer has fired.
    pub fn is_done(&self) -> bool {
        self.remaining.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_delay() {
        let mut t = Timer::new(Duration::from_millis(250));
        let dt = Duration::from_millis(100);
        assert!(!t.tick(dt));
        assert!(!t.tick(dt));
        assert!(t.tick(dt));
        assert!(t.is_done());
        assert!(t.tick(dt));
    }

    #[test]
    fn zero_delay_fires_on_first_tick() {
        let mut t = Timer::new(Duration::ZERO);
        assert!(t.tick(Duration::from_millis(16)));
    }

    #[test]
    fn remaining_counts_down() {
        let mut t = Timer::new(Duration::from_secs(1));
        t.tick(Duration::from_millis(400));
        assert_eq!(t.remaining(), Duration::from_millis(600));
    }

    #[test]
    fn overrun_shortens_the_next_wait() {
        let mut t = Timer::new(Duration::from_millis(300));
        let dt = Duration::from_millis(16);
        let mut frames = 0;
        while !t.tick(dt) {
            frames += 1;
        }
        assert_eq!(frames + 1, 19);
        assert_eq!(t.overrun(), Duration::from_millis(4));

        let next = t.then(Duration::from_millis(300));
        assert_eq!(next.remaining(), Duration::from_millis(296));
        assert_eq!(next.overrun(), Duration::ZERO);
    }

    #[test]
    fn overrun_longer_than_next_wait_carries_over() {
        let mut t = Timer::new(Duration::from_millis(10));
        assert!(t.tick(Duration::from_millis(50)));
        let next = t.then(Duration::from_millis(30));
        assert!(next.is_done());
        assert_eq!(next.overrun(), Duration::from_millis(10));
    }
}
