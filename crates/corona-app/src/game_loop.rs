//! Fixed-timestep frame loop.
//!
//! The sun animation advances in 60 Hz steps regardless of how fast frames
//! are presented, so spin and drift rates do not depend on the display.

use std::time::Instant;
use tracing::warn;

/// Simulation step: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame the loop will catch up on. Anything slower runs the
/// animation slower instead of queueing dozens of steps.
pub const MAX_FRAME_TIME: f64 = 0.25;

pub struct GameLoop {
    previous_time: Instant,
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            total_sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Measure the wall time since the previous call and run one frame.
    ///
    /// `update_fn(dt, total_sim_time)` runs zero or more times with the total
    /// time *after* the step; `render_fn(alpha)` runs once with the leftover
    /// fraction of a step in `[0, 1)`.
    pub fn tick(&mut self, update_fn: impl FnMut(f64, f64), render_fn: impl FnMut(f64)) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(frame_time, update_fn, render_fn);
    }

    /// Run one frame for an explicit frame time in seconds.
    pub fn advance(
        &mut self,
        frame_time: f64,
        mut update_fn: impl FnMut(f64, f64),
        mut render_fn: impl FnMut(f64),
    ) {
        let frame_time = if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame took {:.1}ms, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time.max(0.0)
        };

        self.accumulator += frame_time;
        while self.accumulator >= FIXED_DT {
            self.total_sim_time += FIXED_DT;
            self.accumulator -= FIXED_DT;
            self.update_count += 1;
            update_fn(FIXED_DT, self.total_sim_time);
        }

        render_fn(self.alpha());
        self.frame_count += 1;
    }

    pub fn alpha(&self) -> f64 {
        if self.accumulator > 0.0 {
            self.accumulator / FIXED_DT
        } else {
            0.0
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_step_runs_one_update() {
        let mut game_loop = GameLoop::new();
        let mut times = Vec::new();
        game_loop.advance(FIXED_DT, |_, t| times.push(t), |_| {});
        assert_eq!(times.len(), 1);
        assert!((times[0] - FIXED_DT).abs() < 1e-12);
        assert!(game_loop.alpha().abs() < 1e-9);
    }

    #[test]
    fn test_partial_step_only_renders() {
        let mut game_loop = GameLoop::new();
        let mut updates = 0;
        let mut alpha = -1.0;
        game_loop.advance(0.25 * FIXED_DT, |_, _| updates += 1, |a| alpha = a);
        assert_eq!(updates, 0);
        assert!((alpha - 0.25).abs() < 1e-10);
        assert_eq!(game_loop.frame_count(), 1);
    }

    #[test]
    fn test_update_times_increase_by_fixed_dt() {
        let mut game_loop = GameLoop::new();
        let mut times = Vec::new();
        game_loop.advance(3.5 * FIXED_DT, |_, t| times.push(t), |_| {});
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!((pair[1] - pair[0] - FIXED_DT).abs() < 1e-12);
        }
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut game_loop = GameLoop::new();
        let mut updates = 0u32;
        game_loop.advance(5.0, |_, _| updates += 1, |_| {});
        assert!(updates > 0);
        assert!(updates <= (MAX_FRAME_TIME / FIXED_DT).ceil() as u32);
        assert!(game_loop.total_sim_time() <= MAX_FRAME_TIME + 1e-9);
    }

    #[test]
    fn test_negative_frame_time_is_ignored() {
        let mut game_loop = GameLoop::new();
        game_loop.advance(-1.0, |_, _| {}, |_| {});
        assert_eq!(game_loop.update_count(), 0);
        assert!(game_loop.alpha().abs() < 1e-12);
    }

    #[test]
    fn test_sim_time_tracks_update_count() {
        let mut game_loop = GameLoop::new();
        for frame_time in [0.017, 0.015, 0.020, 0.016, 0.033, 0.008, 0.018] {
            game_loop.advance(frame_time, |_, _| {}, |_| {});
        }
        let expected = game_loop.update_count() as f64 * FIXED_DT;
        assert!((game_loop.total_sim_time() - expected).abs() < 1e-10);
        assert_eq!(game_loop.frame_count(), 7);
    }
}
