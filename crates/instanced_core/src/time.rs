//! Frame timing for the animation step.
//!
//! `TimeClock` produces one [`Time`] snapshot per frame.  It runs either on
//! the wall clock or with a fixed step, the latter making headless runs and
//! tests reproducible: ten ticks of `0.1` always add up to one second of
//! animation regardless of how fast the GPU is.

/// A snapshot of timing information for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Seconds elapsed since the previous frame, clamped to `MAX_DELTA`.
    pub delta: f32,

    /// Total seconds elapsed since the clock started.
    pub elapsed: f64,

    /// Number of frames ticked so far (0 for the first frame).
    pub frame_count: u64,
}

impl Time {
    /// Instantaneous frames-per-second derived from `delta`.
    #[inline]
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 { 1.0 / self.delta } else { 0.0 }
    }
}

/// Upper bound for a single wall-clock step; a stalled frame would otherwise
/// make every instance jump.
pub const MAX_DELTA: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
enum Step {
    RealTime { start: std::time::Instant, last_tick: std::time::Instant },
    Fixed(f32),
}

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Stateful timer that produces [`Time`] snapshots.
#[derive(Debug, Clone)]
pub struct TimeClock {
    step: Step,
    elapsed: f64,
    frame_count: u64,
}

impl TimeClock {
    /// Wall-clock timer starting now.
    pub fn new() -> Self {
        let now = std::time::Instant::now();
        Self {
            step: Step::RealTime { start: now, last_tick: now },
            elapsed: 0.0,
            frame_count: 0,
        }
    }

    /// Deterministic timer advancing by `dt` seconds per tick.
    pub fn fixed(dt: f32) -> Self {
        Self { step: Step::Fixed(dt.max(0.0)), elapsed: 0.0, frame_count: 0 }
    }

    /// Fixed-step when `fixed_dt > 0`, wall clock otherwise.
    pub fn from_fixed_dt(fixed_dt: f32) -> Self {
        if fixed_dt > 0.0 { Self::fixed(fixed_dt) } else { Self::new() }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.step, Step::Fixed(_))
    }

    /// Advance by one frame.  Returns the [`Time`] snapshot for this frame.
    pub fn tick(&mut self) -> Time {
        let delta = match &mut self.step {
            Step::RealTime { start, last_tick } => {
                let now = std::time::Instant::now();
                let raw = (now - *last_tick).as_secs_f32();
                *last_tick = now;
                self.elapsed = (now - *start).as_secs_f64();
                raw.min(MAX_DELTA)
            }
            Step::Fixed(dt) => {
                self.elapsed += f64::from(*dt);
                *dt
            }
        };
        let count = self.frame_count;
        self.frame_count += 1;

        Time { delta, elapsed: self.elapsed, frame_count: count }
    }
}

impl Default for TimeClock {
    fn default() -> Self {
        Self::new()
    }
}
