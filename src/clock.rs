use std::time::Instant;

use log::debug;

/// Wall-clock frame timer.
///
/// `tick()` returns seconds since the previous tick, clamped so a stall
/// (breakpoint, dragged window) does not produce a huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_dt: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            max_dt: 0.1,
        }
    }

    pub fn with_max_dt(mut self, max_dt: f32) -> Self {
        self.max_dt = max_dt.max(0.0);
        self
    }

    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32();
        self.last = now;
        dt.clamp(0.0, self.max_dt)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Average frame time over roughly one-second windows.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    window_time: f32,
    window_frames: u32,
    last_report: Option<FrameReport>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub ms_per_frame: f32,
    pub fps: f32,
}

impl FrameStats {
    const WINDOW_SECONDS: f32 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts one frame of `dt` seconds. Returns a report (also logged at
    /// debug level) whenever a full window has elapsed.
    pub fn record(&mut self, dt: f32) -> Option<FrameReport> {
        self.window_time += dt.max(0.0);
        self.window_frames += 1;
        if self.window_time < Self::WINDOW_SECONDS {
            return None;
        }
        let fps = self.window_frames as f32 / self.window_time;
        let report = FrameReport {
            ms_per_frame: 1000.0 / fps,
            fps,
        };
        debug!(
            "application average {:.3} ms/frame ({:.1} FPS)",
            report.ms_per_frame, report.fps
        );
        self.window_time = 0.0;
        self.window_frames = 0;
        self.last_report = Some(report);
        Some(report)
    }

    pub fn last_report(&self) -> Option<FrameReport> {
        self.last_report
    }
}
