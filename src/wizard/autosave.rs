use std::time::{Duration, Instant};

/// Trailing-edge debounce: fires once after `delay` with no new touches.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_touch: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_touch: None,
        }
    }

    /// Restart the idle period
    pub fn touch(&mut self, now: Instant) {
        self.last_touch = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_touch.is_some()
    }

    /// Drop any pending fire
    pub fn cancel(&mut self) {
        self.last_touch = None;
    }

    /// True exactly once per idle period, when `delay` has elapsed since the
    /// last touch.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last_touch {
            Some(touched) if now.saturating_duration_since(touched) >= self.delay => {
                self.last_touch = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(1000);

    #[test]
    fn test_idle_debouncer_never_fires() {
        let mut debouncer = Debouncer::new(DELAY);
        assert!(!debouncer.due(Instant::now() + DELAY * 10));
    }

    #[test]
    fn test_fires_once_after_delay() {
        let mut debouncer = Debouncer::new(DELAY);
        let start = Instant::now();
        debouncer.touch(start);

        assert!(!debouncer.due(start + Duration::from_millis(999)));
        assert!(debouncer.due(start + DELAY));
        assert!(!debouncer.due(start + DELAY * 2));
    }

    #[test]
    fn test_touch_restarts_idle_period() {
        let mut debouncer = Debouncer::new(DELAY);
        let start = Instant::now();
        debouncer.touch(start);
        debouncer.touch(start + Duration::from_millis(800));

        assert!(!debouncer.due(start + Duration::from_millis(1500)));
        assert!(debouncer.due(start + Duration::from_millis(1800)));
    }

    #[test]
    fn test_cancel_drops_pending_fire() {
        let mut debouncer = Debouncer::new(DELAY);
        let start = Instant::now();
        debouncer.touch(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.due(start + DELAY));
    }
}
