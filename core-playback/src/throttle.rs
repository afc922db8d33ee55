//! Progress report rate limiting.

/// Lets a progress report through at most once per interval.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    interval_ms: i64,
    last_emit_ms: Option<i64>,
}

impl ProgressThrottle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.min(i64::MAX as u64) as i64,
            last_emit_ms: None,
        }
    }

    /// Returns `true` and records `now_ms` when a report may be emitted.
    pub fn ready(&mut self, now_ms: i64) -> bool {
        match self.last_emit_ms {
            Some(last) if now_ms.saturating_sub(last) < self.interval_ms => false,
            _ => {
                self.last_emit_ms = Some(now_ms);
                true
            }
        }
    }

    /// Let the next report through immediately.
    pub fn reset(&mut self) {
        self.last_emit_ms = None;
    }
}
