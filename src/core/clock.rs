use std::time::Instant;

use super::frame::FrameInfo;

/// Frame clock: elapsed seconds since start plus per-tick delta
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_tick: Instant,
    frame_number: u64,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            frame_number: 0,
        }
    }

    /// Advance the clock and describe the frame about to be drawn
    pub fn tick(&mut self) -> FrameInfo {
        self.tick_at(Instant::now())
    }

    /// Same as `tick` with an explicit timestamp; earlier instants are treated as `last_tick`
    pub fn tick_at(&mut self, now: Instant) -> FrameInfo {
        let now = now.max(self.last_tick);
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.frame_number += 1;
        FrameInfo::new(
            self.frame_number,
            now.duration_since(self.start).as_secs_f32(),
            delta,
        )
    }

    /// Seconds since the clock started, as of the last tick
    pub fn elapsed(&self) -> f32 {
        self.last_tick.duration_since(self.start).as_secs_f32()
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    /// Restart from zero
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
