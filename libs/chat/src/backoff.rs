use std::time::Duration;

/// Reconnect delay schedule: doubling from `base`, capped at `cap`.
///
/// Deterministic on purpose: the delay sequence is part of the transport's
/// observable contract. The attempt counter resets on every successful open,
/// so backoff is per-outage rather than cumulative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base: Duration,
    pub cap: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let pow = attempt.min(16); // prevent overflow
        let millis = (self.base.as_millis() as u64).saturating_mul(1u64 << pow);
        Duration::from_millis(millis.min(self.cap.as_millis() as u64))
    }
}
