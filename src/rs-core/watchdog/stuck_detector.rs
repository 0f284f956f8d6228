/// Detects playback that is reported as running while its position does not advance, but only
/// inside a given "critical" window of the video.
///
/// Outside of that window, it stays inert: its count is kept at zero and its baseline just
/// follows the current position.
#[derive(Clone, Debug)]
pub(crate) struct StuckDetector {
    /// Position observed at the last tick where playback was considered as progressing.
    last_known_time: f64,

    /// Consecutive ticks without progress inside the critical window.
    stuck_detection_count: u32,

    critical_start: f64,
    critical_end: f64,

    /// Progress under which two positions are considered as equal, in seconds.
    epsilon: f64,

    /// `stuck_detection_count` at which playback is considered stuck.
    threshold: u32,
}

/// Outcome of a single `StuckDetector` tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StallCheck {
    /// The position is outside the critical window.
    OutsideWindow,
    /// Playback progresses normally inside the critical window.
    Progressing,
    /// No progress was seen, `count` consecutive ticks in a row.
    Suspected { count: u32 },
    /// The stall threshold was reached. The detector has already been reset.
    Stuck,
}

impl StuckDetector {
    pub(crate) fn new(critical_start: f64, critical_end: f64, epsilon: f64, threshold: u32) -> Self {
        Self {
            last_known_time: 0.,
            stuck_detection_count: 0,
            critical_start,
            critical_end,
            epsilon,
            threshold,
        }
    }

    pub(crate) fn last_known_time(&self) -> f64 {
        self.last_known_time
    }

    pub(crate) fn stuck_detection_count(&self) -> u32 {
        self.stuck_detection_count
    }

    pub(crate) fn is_in_critical_window(&self, position: f64) -> bool {
        position >= self.critical_start && position <= self.critical_end
    }

    /// Seconds left before entering the critical window. Negative once past its start.
    pub(crate) fn time_to_critical(&self, position: f64) -> f64 {
        self.critical_start - position
    }

    /// Feed the detector with the current position and whether the media element reports
    /// itself as paused.
    pub(crate) fn tick(&mut self, position: f64, paused: bool) -> StallCheck {
        if !self.is_in_critical_window(position) {
            self.stuck_detection_count = 0;
            self.last_known_time = position;
            return StallCheck::OutsideWindow;
        }
        if (position - self.last_known_time).abs() < self.epsilon && !paused {
            self.stuck_detection_count += 1;
            if self.stuck_detection_count >= self.threshold {
                self.stuck_detection_count = 0;
                StallCheck::Stuck
            } else {
                StallCheck::Suspected {
                    count: self.stuck_detection_count,
                }
            }
        } else {
            self.stuck_detection_count = 0;
            self.last_known_time = position;
            StallCheck::Progressing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> StuckDetector {
        StuckDetector::new(18., 25., 0.1, 3)
    }

    #[test]
    fn test_stall_inside_window() {
        let mut d = detector();
        assert_eq!(d.tick(20., false), StallCheck::Progressing);
        assert_eq!(d.tick(20., false), StallCheck::Suspected { count: 1 });
        assert_eq!(d.tick(20.05, false), StallCheck::Suspected { count: 2 });
        assert_eq!(d.tick(20.05, false), StallCheck::Stuck);
        assert_eq!(d.stuck_detection_count(), 0);
        assert_eq!(d.tick(20.05, false), StallCheck::Suspected { count: 1 });
    }

    #[test]
    fn test_progress_resets_detection() {
        let mut d = detector();
        d.tick(19., false);
        assert_eq!(d.tick(19., false), StallCheck::Suspected { count: 1 });
        assert_eq!(d.tick(19.2, false), StallCheck::Progressing);
        assert_eq!(d.stuck_detection_count(), 0);
        assert_eq!(d.last_known_time(), 19.2);
    }

    #[test]
    fn test_paused_never_accumulates() {
        let mut d = detector();
        for _ in 0..10 {
            assert_ne!(d.tick(21., true), StallCheck::Stuck);
        }
        assert_eq!(d.stuck_detection_count(), 0);
    }

    #[test]
    fn test_outside_window_is_inert() {
        let mut d = detector();
        for _ in 0..10 {
            assert_eq!(d.tick(10., false), StallCheck::OutsideWindow);
        }
        assert_eq!(d.stuck_detection_count(), 0);
        assert_eq!(d.last_known_time(), 10.);
        for _ in 0..10 {
            assert_eq!(d.tick(30., false), StallCheck::OutsideWindow);
        }
        assert_eq!(d.stuck_detection_count(), 0);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let d = detector();
        assert!(d.is_in_critical_window(18.));
        assert!(d.is_in_critical_window(25.));
        assert!(!d.is_in_critical_window(17.99));
        assert!(!d.is_in_critical_window(25.01));
        assert_eq!(d.time_to_critical(16.), 2.);
    }
}
