//! Reconnect backoff policy.

use std::time::Duration;

/// Exponential backoff between reconnection attempts.
///
/// Defaults match the reconnecting-socket wrappers commonly used in
/// browsers: start at one second, grow by 1.5x per failed attempt, cap at
/// thirty seconds.
#[derive(Clone, Debug)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub decay: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            decay: 1.5,
        }
    }
}

impl ReconnectPolicy {
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Delay before the given reconnection attempt (0-based). The attempt
    /// counter resets after every successful open.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.decay.max(1.0).powi(attempt.min(64) as i32);
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_exponentially() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2250));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(20), Duration::from_secs(30));
        assert_eq!(policy.delay_for(1000), Duration::from_secs(30));
    }

    #[test]
    fn test_decay_below_one_is_clamped() {
        let policy = ReconnectPolicy::default().with_decay(0.5);
        assert_eq!(policy.delay_for(5), Duration::from_secs(1));
    }
}
