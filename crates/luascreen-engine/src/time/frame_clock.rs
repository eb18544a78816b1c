use std::time::{Duration, Instant};

/// Frame clock ticked once per present.
///
/// Delta time is clamped to avoid pathological values when the script is
/// paused by a debugger, the window is minimized, or a frame stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps (0.1 ms to 250 ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            dt_min,
            dt_max,
        }
    }

    /// Advances the clock and returns the seconds since the previous tick.
    /// Zero on the first tick.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(last) => now
                .saturating_duration_since(last)
                .clamp(self.dt_min, self.dt_max)
                .as_secs_f32(),
            None => 0.0,
        };

        self.last = Some(now);
        dt
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
    fn first_tick_has_zero_dt() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick_at(t0);
        assert_eq!(clock.tick_at(t0 + Duration::from_secs(5)), 0.25);
        let dt = clock.tick_at(t0 + Duration::from_secs(5));
        assert!((dt - 0.0001).abs() < 1e-6);
    }

    #[test]
    fn custom_clamps_apply() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(10), Duration::from_millis(20));
        let t0 = Instant::now();
        clock.tick_at(t0);
        assert!((clock.tick_at(t0 + Duration::from_millis(1)) - 0.01).abs() < 1e-6);
        assert!((clock.tick_at(t0 + Duration::from_millis(500)) - 0.02).abs() < 1e-6);
    }
}
