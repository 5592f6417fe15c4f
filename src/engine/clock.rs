//! Fixed-step frame clock
//!
//! Turns host frame timestamps into a whole number of simulation ticks.

use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, SIM_DT_MS};

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    accumulator: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last timestamp; the next frame runs exactly one tick
    pub fn reset(&mut self) {
        self.last_ms = None;
        self.accumulator = 0.0;
    }

    /// Ticks to run for a frame at `now_ms`, in `0..=MAX_SUBSTEPS`
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 1;
        };

        // Stalls (background tab, debugger) are clamped so we never spiral
        let dt = (now_ms - last).clamp(0.0, MAX_FRAME_MS);
        self.accumulator += dt;

        let mut ticks = 0;
        while self.accumulator + 1e-6 >= SIM_DT_MS && ticks < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT_MS;
            ticks += 1;
        }
        if ticks == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.clamp(0.0, SIM_DT_MS);
        }
        self.accumulator = self.accumulator.max(0.0);
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_runs_one_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(12_345.0), 1);
    }

    #[test]
    fn test_steady_frames() {
        let mut clock = FrameClock::new();
        let mut now = 0.0;
        clock.advance(now);
        let mut total = 0;
        for _ in 0..60 {
            now += SIM_DT_MS;
            total += clock.advance(now);
        }
        assert_eq!(total, 60);
    }

    #[test]
    fn test_fast_display_skips_ticks() {
        // 120 Hz display: one tick every other frame
        let mut clock = FrameClock::new();
        let mut now = 0.0;
        clock.advance(now);
        let ticks: Vec<u32> = (0..4)
            .map(|_| {
                now += SIM_DT_MS / 2.0;
                clock.advance(now)
            })
            .collect();
        assert_eq!(ticks.iter().sum::<u32>(), 2);
        assert!(ticks.contains(&0));
    }

    #[test]
    fn test_stall_is_capped() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        assert_eq!(clock.advance(5_000.0), MAX_SUBSTEPS);
        // The backlog does not carry over
        assert!(clock.advance(5_000.0 + SIM_DT_MS) <= 2);
    }

    #[test]
    fn test_time_going_backwards_runs_nothing() {
        let mut clock = FrameClock::new();
        clock.advance(100.0);
        assert_eq!(clock.advance(50.0), 0);
    }
}
