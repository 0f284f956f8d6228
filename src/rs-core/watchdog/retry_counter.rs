/// Count of consecutive failed play attempts, bounded by a maximum.
#[derive(Clone, Debug)]
pub(crate) struct RetryCounter {
    count: u32,
    max: u32,
}

impl RetryCounter {
    pub(crate) fn new(max: u32) -> Self {
        Self { count: 0, max }
    }

    pub(crate) fn count(&self) -> u32 {
        self.count
    }

    /// Returns `true` once no automatic retry should be attempted anymore.
    pub(crate) fn is_exhausted(&self) -> bool {
        self.count >= self.max
    }

    /// Register a failed (or deferred) attempt. Never goes past the maximum.
    pub(crate) fn record_failure(&mut self) {
        self.count = (self.count + 1).min(self.max);
    }

    pub(crate) fn reset(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_counter_saturates() {
        let mut counter = RetryCounter::new(3);
        assert!(!counter.is_exhausted());
        counter.record_failure();
        counter.record_failure();
        assert_eq!(counter.count(), 2);
        assert!(!counter.is_exhausted());
        counter.record_failure();
        assert!(counter.is_exhausted());
        counter.record_failure();
        counter.record_failure();
        assert_eq!(counter.count(), 3);
        counter.reset();
        assert_eq!(counter.count(), 0);
        assert!(!counter.is_exhausted());
    }
}
