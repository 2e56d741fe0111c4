use std::time::Instant;

/// Frame counter and FPS estimate for the processing loop. The FPS value
/// is the inverse of the last frame interval, not a running average; it is
/// the natural `fps` argument for the summary export.
#[derive(Debug, Clone)]
pub struct FrameStats {
    start: Instant,
    last: Instant,
    total_frames: u64,
    fps: f32,
}

impl FrameStats {
    pub fn new() -> Self {
        let now = Instant::now();

        Self {
            start: now,
            last: now,
            total_frames: 0,
            fps: 0.0,
        }
    }

    /// Call once per processed frame.
    pub fn tick(&mut self) {
        self.total_frames += 1;

        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt > 0.0 {
            self.fps = 1.0 / dt;
        }
        self.last = now;
    }

    #[inline]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Seconds since this instance was created.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_frames() {
        let mut stats = FrameStats::new();
        assert_eq!(stats.total_frames(), 0);

        stats.tick();
        stats.tick();

        assert_eq!(stats.total_frames(), 2);
        assert!(stats.elapsed() >= 0.0);
        assert!(stats.fps() >= 0.0);
    }
}
