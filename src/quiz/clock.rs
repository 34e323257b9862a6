use std::time::{Duration, Instant};

/// Countdown for a timed exam
#[derive(Debug, Clone, Copy)]
pub struct ExamClock {
    deadline: Instant,
    limit: Duration,
}

impl ExamClock {
    pub fn start(limit: Duration) -> Self {
        Self::started_at(Instant::now(), limit)
    }

    pub fn started_at(start: Instant, limit: Duration) -> Self {
        Self {
            deadline: start + limit,
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whole seconds left, rounded up so the display reaches 0:00 only at
    /// expiry.
    pub fn remaining_secs(&self) -> u64 {
        let left = self.remaining();
        left.as_secs() + u64::from(left.subsec_nanos() > 0)
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// `m:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
