use crate::view_model::{AppViewModel, ReportView, TrackerView};
use crate::{
    render_grid, JobStatusPoller, PollPolicy, ReportController, ReportError, ReportStatus,
    ReportWindow, TrackerPhase,
};

/// The parts of the state a render depends on, without building the table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderKey {
    tracker: TrackerView,
    report_open: bool,
    report_window: ReportWindow,
    report_status: ReportStatus,
    report_revision: u64,
}

/// Everything the dashboard owns. Only [`crate::update`] mutates it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    poller: JobStatusPoller,
    report: ReportController,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PollPolicy, active_only: bool) -> Self {
        Self {
            poller: JobStatusPoller::new(policy),
            report: ReportController::new(active_only),
            dirty: false,
        }
    }

    pub fn poller(&self) -> &JobStatusPoller {
        &self.poller
    }

    pub fn report(&self) -> &ReportController {
        &self.report
    }

    pub fn export_current(&self) -> Result<String, ReportError> {
        self.report.export_current()
    }

    pub fn view(&self) -> AppViewModel {
        let tracker = self.tracker_view();
        let report = ReportView {
            open: self.report.is_open(),
            window: self.report.window(),
            status: self.report.status().clone(),
            table: self.report.grid().map(render_grid),
        };
        AppViewModel {
            tracker,
            report,
            dirty: self.dirty,
        }
    }

    fn tracker_view(&self) -> TrackerView {
        let phase = self.poller.phase();
        let job = self.poller.job();
        TrackerView {
            phase,
            progress: job.map_or(0, |job| job.progress),
            total: job.map_or(0, |job| job.total),
            percent: job.map_or(0.0, |job| job.percent()),
            message: job.map(|job| job.current_item.clone()).unwrap_or_default(),
            run_enabled: phase == TrackerPhase::Detached,
        }
    }

    pub(crate) fn render_key(&self) -> RenderKey {
        RenderKey {
            tracker: self.tracker_view(),
            report_open: self.report.is_open(),
            report_window: self.report.window(),
            report_status: self.report.status().clone(),
            report_revision: self.report.revision(),
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn poller_mut(&mut self) -> &mut JobStatusPoller {
        &mut self.poller
    }

    pub(crate) fn report_mut(&mut self) -> &mut ReportController {
        &mut self.report
    }
}
