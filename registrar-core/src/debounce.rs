//! Input debouncing and stale-response tokens.

use std::time::{Duration, Instant};

/// Monotonic request token source. A response is current only while its
/// token is the latest one issued for the same key.
#[derive(Debug, Clone, Default)]
pub struct RequestTokens {
    last: u64,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    pub fn last(&self) -> u64 {
        self.last
    }
}

/// Holds the most recent value until the input has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
    generation: u64,
}

impl<T> Debounced<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            generation: 0,
        }
    }

    /// Replace any pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.generation += 1;
        self.pending = Some((value, now + self.delay));
    }

    /// Pending value whose quiet period has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let mut tokens = RequestTokens::new();
        let a = tokens.issue();
        let b = tokens.issue();
        assert!(b > a);
        assert_eq!(tokens.last(), b);
    }

    #[test]
    fn test_value_released_after_quiet_period() {
        let start = Instant::now();
        let mut debounced = Debounced::new(Duration::from_millis(300));
        debounced.push("bo", start);
        assert_eq!(debounced.take_ready(start + Duration::from_millis(299)), None);
        assert_eq!(debounced.take_ready(start + Duration::from_millis(300)), Some("bo"));
        assert!(!debounced.is_pending());
    }

    #[test]
    fn test_new_input_restarts_quiet_period() {
        let start = Instant::now();
        let mut debounced = Debounced::new(Duration::from_millis(300));
        debounced.push("b", start);
        debounced.push("bo", start + Duration::from_millis(200));
        assert_eq!(debounced.take_ready(start + Duration::from_millis(400)), None);
        assert_eq!(
            debounced.take_ready(start + Duration::from_millis(500)),
            Some("bo")
        );
        assert_eq!(debounced.generation(), 2);
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let start = Instant::now();
        let mut debounced = Debounced::new(Duration::from_millis(10));
        debounced.push(1, start);
        debounced.cancel();
        assert_eq!(debounced.take_ready(start + Duration::from_secs(1)), None);
    }
}
