/// Cancelable periodic ticker.
///
/// Armed with a start instant, it reports how many whole periods have
/// elapsed each time it is polled, carrying the remainder so no tick is
/// dropped or repeated. Cancelling disarms it immediately: a poll after
/// `cancel` never yields a tick.
///
/// Time is passed in by the caller, so tests drive it with synthetic
/// instants instead of sleeping.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Ticker { period: period.max(Duration::from_millis(1)), next_due: None }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Number of ticks due at `now`; advances the schedule past them.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else { return 0 };
        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn idle_until_started() {
        let mut t = Ticker::new(SEC);
        let t0 = Instant::now();
        assert!(!t.is_active());
        assert_eq!(t.poll(t0 + SEC * 5), 0);
    }

    #[test]
    fn fires_once_per_period() {
        let mut t = Ticker::new(SEC);
        let t0 = Instant::now();
        t.start(t0);
        assert_eq!(t.poll(t0 + Duration::from_millis(999)), 0);
        assert_eq!(t.poll(t0 + SEC), 1);
        assert_eq!(t.poll(t0 + SEC), 0);
        assert_eq!(t.poll(t0 + Duration::from_millis(2500)), 1);
        assert_eq!(t.poll(t0 + Duration::from_millis(3000)), 1);
    }

    #[test]
    fn catches_up_without_drift() {
        let mut t = Ticker::new(SEC);
        let t0 = Instant::now();
        t.start(t0);
        assert_eq!(t.poll(t0 + Duration::from_millis(4200)), 4);
        assert_eq!(t.poll(t0 + Duration::from_millis(4999)), 0);
        assert_eq!(t.poll(t0 + SEC * 5), 1);
    }

    #[test]
    fn cancel_stops_delivery() {
        let mut t = Ticker::new(SEC);
        let t0 = Instant::now();
        t.start(t0);
        assert_eq!(t.poll(t0 + SEC), 1);
        t.cancel();
        assert!(!t.is_active());
        assert_eq!(t.poll(t0 + SEC * 10), 0);

        // Restart schedules from the new start instant
        t.start(t0 + SEC * 10);
        assert_eq!(t.poll(t0 + SEC * 10), 0);
        assert_eq!(t.poll(t0 + SEC * 11), 1);
    }
}
