use crate::{Entity, JobState, ReportWindow, RequestId, SessionToken};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked to run the scraper.
    RunScraperClicked,
    /// Outcome of the start request; `Err` carries the server's message.
    JobStartFinished(Result<(), String>),
    /// Begin tracking without starting a job (re-attach to a running one).
    AttachTracker,
    /// User stopped watching. The remote job is unaffected.
    DetachClicked,
    /// Poll timer fired.
    PollTick { token: SessionToken },
    /// Status response for a poll issued under `token`.
    StatusReceived { token: SessionToken, state: JobState },
    /// Transport failure for a poll issued under `token`.
    PollFailed { token: SessionToken, message: String },
    /// Grace timer after completion fired.
    GraceElapsed { token: SessionToken },
    /// User opened (or switched) the history report.
    ReportOpened { window: ReportWindow },
    /// User asked to reload the open report.
    ReportRefreshClicked,
    /// User navigated away from the report.
    ReportClosed,
    /// History fetch finished.
    HistoryLoaded {
        request: RequestId,
        result: Result<Vec<Entity>, String>,
    },
    /// User asked to download the report.
    ExportClicked,
}

