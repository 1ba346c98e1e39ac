use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time, in epoch milliseconds.
///
/// Snapshot timestamps are absolute epoch seconds, so every consumer
/// compares against the same epoch rather than a monotonic origin.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
