use std::time::Duration;

/// Tracks scheduler time: a monotonic tick counter and the elapsed time
/// those ticks represent. Every tick has the same length.
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: u64,
    tick_length: Duration,
    elapsed: Duration,
}

impl SimClock {
    /// Create a clock at tick 0.
    pub fn new(tick_length: Duration) -> Self {
        Self {
            tick: 0,
            tick_length,
            elapsed: Duration::ZERO,
        }
    }

    /// Advance by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.elapsed += self.tick_length;
        self.tick
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Time covered by one tick.
    pub fn tick_length(&self) -> Duration {
        self.tick_length
    }

    /// Total time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of ticks needed to cover `span`, rounded up.
    pub fn ticks_for(&self, span: Duration) -> u64 {
        if self.tick_length.is_zero() {
            return 0;
        }
        let len = self.tick_length.as_nanos();
        span.as_nanos().div_ceil(len) as u64
    }
}
