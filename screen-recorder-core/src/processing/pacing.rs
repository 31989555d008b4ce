use std::time::{Duration, Instant};

/// Frame deadline tracker for fixed-rate pacing.
///
/// Deadlines advance by one interval per frame. When the producer falls
/// behind, the next deadline is pulled up to "now" so a slow frame is never
/// followed by a burst of catch-up frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    next_deadline: Instant,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_deadline: now,
        }
    }

    /// Instant the next frame is due.
    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Record that a frame was produced at `now` and compute the next deadline.
    pub fn tick(&mut self, now: Instant) -> Instant {
        self.next_deadline += self.interval;
        if self.next_deadline < now {
            self.next_deadline = now;
        }
        self.next_deadline
    }

    /// Restart the schedule at `now`, e.g. after a pause.
    pub fn reset(&mut self, now: Instant) {
        self.next_deadline = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_advance_by_interval() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(Duration::from_millis(50), start);

        assert_eq!(clock.tick(start), start + Duration::from_millis(50));
        assert_eq!(
            clock.tick(start + Duration::from_millis(10)),
            start + Duration::from_millis(100)
        );
    }

    #[test]
    fn slow_frame_does_not_cause_burst() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(Duration::from_millis(50), start);

        let late = start + Duration::from_millis(400);
        assert_eq!(clock.tick(late), late);
        assert_eq!(clock.tick(late), late + Duration::from_millis(50));
    }

    #[test]
    fn reset_restarts_schedule() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(Duration::from_millis(50), start);
        clock.tick(start);

        let resumed = start + Duration::from_secs(2);
        clock.reset(resumed);
        assert_eq!(clock.next_deadline(), resumed);
    }
}
