//! Frame and tick counters behind the `loop_metrics` log line and the F3 overlay.

use std::time::{Duration, Instant};

/// Averages over the last completed reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    /// Simulation ticks thrown away because a frame fell too far behind.
    pub dropped_ticks: u32,
}

#[derive(Debug)]
pub(crate) struct LoopStats {
    window: Duration,
    window_start: Instant,
    frames: u32,
    ticks: u32,
    dropped_ticks: u32,
    frame_time_total: Duration,
    latest: LoopMetricsSnapshot,
}

impl LoopStats {
    pub(crate) fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            window_start: now,
            frames: 0,
            ticks: 0,
            dropped_ticks: 0,
            frame_time_total: Duration::ZERO,
            latest: LoopMetricsSnapshot::default(),
        }
    }

    pub(crate) fn count_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_total = self.frame_time_total.saturating_add(frame_dt);
    }

    pub(crate) fn count_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Converts a discarded accumulator backlog into whole ticks.
    pub(crate) fn count_dropped_backlog(&mut self, backlog: Duration, fixed_dt: Duration) {
        let whole_ticks = backlog.as_nanos() / fixed_dt.as_nanos().max(1);
        let whole_ticks = u32::try_from(whole_ticks).unwrap_or(u32::MAX);
        self.dropped_ticks = self.dropped_ticks.saturating_add(whole_ticks);
    }

    /// Last finished window; zeros until the first one closes.
    pub(crate) fn latest(&self) -> LoopMetricsSnapshot {
        self.latest
    }

    /// Closes the window once it has run its full length and starts a new one at `now`.
    pub(crate) fn close_window(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_total.as_secs_f32() * 1000.0 / frames as f32,
        };
        self.latest = LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms,
            dropped_ticks: self.dropped_ticks,
        };

        *self = Self {
            latest: self.latest,
            ..Self::new(self.window, now)
        };
        Some(self.latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(1);

    #[test]
    fn window_averages_frames_and_ticks() {
        let start = Instant::now();
        let mut stats = LoopStats::new(WINDOW, start);
        for _ in 0..30 {
            stats.count_frame(Duration::from_millis(20));
            stats.count_tick();
            stats.count_tick();
        }

        let snapshot = stats.close_window(start + Duration::from_secs(2)).expect("closed");
        assert!((snapshot.fps - 15.0).abs() < 0.01);
        assert!((snapshot.tps - 30.0).abs() < 0.01);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.01);
        assert_eq!(stats.latest(), snapshot);
    }

    #[test]
    fn open_window_keeps_previous_snapshot() {
        let start = Instant::now();
        let mut stats = LoopStats::new(WINDOW, start);
        assert!(stats.close_window(start + Duration::from_millis(999)).is_none());
        assert_eq!(stats.latest(), LoopMetricsSnapshot::default());

        stats.count_frame(Duration::from_millis(10));
        let first = stats.close_window(start + WINDOW).expect("first");

        stats.count_frame(Duration::from_millis(50));
        assert!(stats.close_window(start + WINDOW + Duration::from_millis(500)).is_none());
        assert_eq!(stats.latest(), first);
    }

    #[test]
    fn dropped_backlog_rounds_down_to_whole_ticks_per_window() {
        let start = Instant::now();
        let mut stats = LoopStats::new(WINDOW, start);
        let fixed_dt = Duration::from_millis(16);

        stats.count_dropped_backlog(Duration::from_millis(40), fixed_dt);
        stats.count_dropped_backlog(Duration::from_millis(15), fixed_dt);
        stats.count_dropped_backlog(Duration::from_millis(48), fixed_dt);
        assert_eq!(stats.close_window(start + WINDOW).map(|s| s.dropped_ticks), Some(5));
        assert_eq!(
            stats.close_window(start + WINDOW * 2).map(|s| s.dropped_ticks),
            Some(0)
        );
    }

    #[test]
    fn empty_window_reports_zero_frame_time() {
        let start = Instant::now();
        let mut stats = LoopStats::new(WINDOW, start);
        stats.count_tick();
        let snapshot = stats.close_window(start + WINDOW).expect("closed");
        assert_eq!(snapshot.fps, 0.0);
        assert_eq!(snapshot.frame_time_ms, 0.0);
        assert!((snapshot.tps - 1.0).abs() < 0.01);
    }
}
