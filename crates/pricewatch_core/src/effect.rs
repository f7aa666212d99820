use std::time::Duration;

use crate::{ReportWindow, RequestId, SessionToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST the start-job request.
    StartJob,
    /// Issue one status query for the session.
    PollStatus { token: SessionToken },
    /// Start the fixed-period poll timer for the session.
    ArmTicker { token: SessionToken, period: Duration },
    /// Stop every timer belonging to the session.
    CancelTimers { token: SessionToken },
    /// One-shot timer that resets the tracker after completion.
    ScheduleGrace { token: SessionToken, delay: Duration },
    FetchHistory {
        request: RequestId,
        window: ReportWindow,
        active_only: bool,
    },
    WriteExport { filename: String, contents: String },
    Notify { level: NoticeLevel, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl Effect {
    pub(crate) fn notify(level: NoticeLevel, message: impl Into<String>) -> Self {
        Effect::Notify {
            level,
            message: message.into(),
        }
    }
}
