use std::time::{Duration, Instant};

/// How often the FPS figure is recomputed
const FPS_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Frame-rate and frame-time meter bracketing each tick with `begin`/`end`
#[derive(Debug, Clone)]
pub struct FrameStats {
    begin: Option<Instant>,
    window_start: Option<Instant>,
    frame_count: u32,
    fps: f32,
    frame_ms: f32,
    max_frame_ms: f32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            begin: None,
            window_start: None,
            frame_count: 0,
            fps: 0.0,
            frame_ms: 0.0,
            max_frame_ms: 0.0,
        }
    }

    pub fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    pub fn end(&mut self) {
        self.end_at(Instant::now());
    }

    pub fn begin_at(&mut self, now: Instant) {
        self.begin = Some(now);
        if self.window_start.is_none() {
            self.window_start = Some(now);
        }
    }

    /// Close the current frame. Returns true when the FPS figure was refreshed.
    pub fn end_at(&mut self, now: Instant) -> bool {
        let Some(begin) = self.begin.take() else {
            return false;
        };
        self.frame_ms = now.saturating_duration_since(begin).as_secs_f32() * 1000.0;
        self.max_frame_ms = self.max_frame_ms.max(self.frame_ms);
        self.frame_count += 1;

        let window_start = self.window_start.unwrap_or(begin);
        let window = now.saturating_duration_since(window_start);
        if window < FPS_UPDATE_INTERVAL {
            return false;
        }

        self.fps = self.frame_count as f32 / window.as_secs_f32();
        log::debug!(
            "FPS: {:.1} (frame {:.2} ms, max {:.2} ms)",
            self.fps,
            self.frame_ms,
            self.max_frame_ms
        );
        self.frame_count = 0;
        self.max_frame_ms = 0.0;
        self.window_start = Some(now);
        true
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// CPU time of the last completed frame in milliseconds
    pub fn frame_ms(&self) -> f32 {
        self.frame_ms
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
