/// Smoothed FPS from per-frame timestamps.
///
/// Fed with the render loop's elapsed time, so it follows whatever clock the
/// loop runs on.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Timestamp of the previous frame in seconds.
    last_frame: Option<f32>,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl FrameTiming {
    /// Create a new frame timer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: None,
            smoothed_fps: 60.0, // Start with reasonable default
            smoothing: 0.05,    /* 5% new value, 95% old value for smooth
                                 * display */
        }
    }

    /// Record a frame rendered at `now` seconds.
    pub fn record(&mut self, now: f32) {
        if let Some(last) = self.last_frame.replace(now) {
            let frame_time = now - last;
            if frame_time > 0.0 {
                let instant_fps = 1.0 / frame_time;
                // Exponential moving average for smooth display
                self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                    + instant_fps * self.smoothing;
            }
        }
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_toward_frame_rate() {
        let mut timing = FrameTiming::new();
        for i in 0..400 {
            timing.record(i as f32 / 30.0);
        }
        assert!((timing.fps() - 30.0).abs() < 0.5);
    }

    #[test]
    fn repeated_timestamps_are_ignored() {
        let mut timing = FrameTiming::new();
        timing.record(1.0);
        timing.record(1.0);
        assert_eq!(timing.fps(), 60.0);
    }
}
