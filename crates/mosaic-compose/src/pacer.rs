//! Soft frame budget for the render loop.

use std::time::{Duration, Instant};

/// Fixed-period frame clock that drops late frames instead of catching up.
#[derive(Debug, Clone)]
pub struct FramePacer {
    period: Duration,
    /// When the next frame is due. Unset until the first frame begins.
    next: Option<Instant>,
    dropped: u64,
}

impl FramePacer {
    /// A pacer running at `fps` frames per second. Zero is treated as one.
    pub fn new(fps: u32) -> Self {
        Self::with_period(Duration::from_secs(1) / fps.max(1))
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            next: None,
            dropped: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Frames skipped so far because a frame overran its budget.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Time left until the next frame is due. Zero once it is due.
    pub fn remaining(&self) -> Duration {
        self.remaining_at(Instant::now())
    }

    fn remaining_at(&self, now: Instant) -> Duration {
        self.next
            .map_or(Duration::ZERO, |next| next.saturating_duration_since(now))
    }

    /// Whether the next frame is due.
    pub fn is_due(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Mark the start of a frame and schedule the next one.
    pub fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    fn begin_at(&mut self, now: Instant) {
        let Some(next) = self.next else {
            self.next = Some(now + self.period);
            return;
        };
        let scheduled = next + self.period;
        if scheduled <= now {
            // Overran: start the next period from now rather than queueing.
            let missed = now.duration_since(next).as_nanos() / self.period.as_nanos().max(1);
            self.dropped += missed as u64;
            self.next = Some(now + self.period);
        } else {
            self.next = Some(scheduled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_from_fps() {
        assert_eq!(FramePacer::new(10).period(), Duration::from_millis(100));
        assert_eq!(FramePacer::new(0).period(), Duration::from_secs(1));
    }

    #[test]
    fn test_on_time_frames_keep_cadence() {
        let period = Duration::from_millis(100);
        let start = Instant::now();
        let mut pacer = FramePacer::with_period(period);
        pacer.begin_at(start);
        assert_eq!(pacer.next, Some(start + period));
        assert_eq!(pacer.remaining_at(start + Duration::from_millis(40)), Duration::from_millis(60));

        // Slightly late frame still schedules from the ideal cadence.
        pacer.begin_at(start + Duration::from_millis(120));
        assert_eq!(pacer.next, Some(start + 2 * period));
        assert_eq!(pacer.dropped(), 0);
    }

    #[test]
    fn test_overrun_drops_instead_of_catching_up() {
        let period = Duration::from_millis(100);
        let start = Instant::now();
        let mut pacer = FramePacer::with_period(period);
        pacer.begin_at(start);

        let late = start + Duration::from_millis(450);
        pacer.begin_at(late);
        assert_eq!(pacer.next, Some(late + period));
        assert_eq!(pacer.dropped(), 3);
        assert_eq!(pacer.remaining_at(late + Duration::from_millis(500)), Duration::ZERO);
    }

    #[test]
    fn test_time_before_first_frame_is_not_dropped() {
        let period = Duration::from_millis(100);
        let mut pacer = FramePacer::with_period(period);
        assert!(pacer.is_due());
        assert_eq!(pacer.remaining(), Duration::ZERO);

        let first = Instant::now() + Duration::from_secs(2);
        pacer.begin_at(first);
        assert_eq!(pacer.dropped(), 0);
        assert_eq!(pacer.next, Some(first + period));
    }
}
