/// Fixed timestep the particle kinematics were tuned for.
pub const FIXED_STEP: f32 = 1.0 / 60.0;

/// Upper bound on steps taken for a single frame, so a long stall (window drag,
/// breakpoint) does not replay seconds of motion at once.
const MAX_STEPS_PER_FRAME: u32 = 8;

/// Turns variable frame deltas into a whole number of fixed steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    accumulator: f32,
    elapsed: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub const fn new() -> Self {
        Self {
            accumulator: 0.0,
            elapsed: 0.0,
        }
    }

    /// Adds `dt` seconds and returns how many fixed steps are now due.
    pub fn advance(&mut self, dt: f32) -> u32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= FIXED_STEP && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= FIXED_STEP;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_FRAME {
            self.accumulator = self.accumulator.min(FIXED_STEP);
        }
        steps
    }

    /// Total seconds fed through `advance`.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_accumulate_across_short_frames() {
        let mut clock = FrameClock::new();
        let total: u32 = (0..120).map(|_| clock.advance(1.0 / 120.0)).sum();
        // 120 half steps make 60 whole steps, give or take float drift on the last one
        assert!((59..=60).contains(&total), "{total}");
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(5.0), MAX_STEPS_PER_FRAME);
        assert!(clock.advance(0.0) <= 1);
        assert_eq!(clock.elapsed(), 5.0);
    }

    #[test]
    fn test_bad_deltas_are_ignored() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.advance(f32::NAN), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }
}
