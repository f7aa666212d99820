use std::time::Duration;

/// Identifies one polling attempt. Results tagged with an older token are stale.
pub type SessionToken = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

/// Snapshot of the remote scrape job as last reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobState {
    pub status: JobStatus,
    pub progress: u32,
    pub total: u32,
    pub current_item: String,
}

impl JobState {
    pub fn new(status: JobStatus, progress: u32, total: u32, current_item: impl Into<String>) -> Self {
        Self {
            status,
            progress,
            total,
            current_item: current_item.into(),
        }
        .clamped()
    }

    /// Caps `progress` at `total` once a total is known.
    pub fn clamped(mut self) -> Self {
        if self.total > 0 && self.progress > self.total {
            self.progress = self.total;
        }
        self
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.progress) * 100.0 / f64::from(self.total)
        }
    }
}

/// Timing and retry knobs for the job-status poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub grace: Duration,
    /// `None` retries transport failures forever.
    pub max_consecutive_failures: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            grace: Duration::from_millis(3000),
            max_consecutive_failures: None,
        }
    }
}
