//! Frame clock for the host loop.
//!
//! The host calls `update()` once per animation frame with a monotonic
//! timestamp. The clock turns that into a delta in seconds, clamped so a
//! backgrounded or suspended tab cannot inject one enormous tick. Time away
//! is credited by offline reconciliation instead.

/// Largest delta a single frame may report, in seconds.
pub const MAX_FRAME_SECS: f64 = 0.25;

pub struct FrameClock {
    max_delta: f64,
    /// Timestamp of the last update (ms), None before the first frame.
    last_timestamp: Option<f64>,
    /// Simulated seconds handed out since creation.
    pub total_secs: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_delta(MAX_FRAME_SECS)
    }

    pub fn with_max_delta(max_delta: f64) -> Self {
        Self {
            max_delta,
            last_timestamp: None,
            total_secs: 0.0,
        }
    }

    /// Feed a frame timestamp (from `performance.now()` or similar) and get
    /// the seconds to simulate for this frame.
    pub fn update(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_timestamp {
            // Clamp both ways: clocks can step backwards.
            Some(prev) => ((now_ms - prev) / 1000.0).clamp(0.0, self.max_delta),
            None => 0.0,
        };
        if now_ms.is_finite() {
            self.last_timestamp = Some(now_ms);
        }
        let delta = if delta.is_finite() { delta } else { 0.0 };
        self.total_secs += delta;
        delta
    }

    /// Forget the last timestamp, e.g. after the page was hidden.
    pub fn reset(&mut self) {
        self.last_timestamp = None;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.update(1234.0), 0.0);
    }

    #[test]
    fn delta_in_seconds() {
        let mut clock = FrameClock::new();
        clock.update(0.0);
        assert!((clock.update(100.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn clamp_large_delta() {
        let mut clock = FrameClock::new();
        clock.update(0.0);
        // 10 second gap (tab backgrounded)
        assert_eq!(clock.update(10_000.0), MAX_FRAME_SECS);
    }

    #[test]
    fn backwards_clock_is_zero() {
        let mut clock = FrameClock::new();
        clock.update(500.0);
        assert_eq!(clock.update(400.0), 0.0);
        assert!((clock.update(450.0) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn non_finite_timestamps_are_ignored() {
        let mut clock = FrameClock::new();
        clock.update(0.0);
        assert_eq!(clock.update(f64::NAN), 0.0);
        assert!((clock.update(16.0) - 0.016).abs() < 1e-12);
    }

    #[test]
    fn steady_60fps() {
        let mut clock = FrameClock::new();
        clock.update(0.0);
        for i in 1..=60 {
            clock.update(i as f64 * 16.667);
        }
        assert!((clock.total_secs - 1.0).abs() < 0.01, "got {}", clock.total_secs);
    }

    #[test]
    fn reset_skips_the_gap() {
        let mut clock = FrameClock::new();
        clock.update(0.0);
        clock.reset();
        assert_eq!(clock.update(60_000.0), 0.0);
        assert!((clock.update(60_100.0) - 0.1).abs() < 1e-12);
    }
}
