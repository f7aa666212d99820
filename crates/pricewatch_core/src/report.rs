use pricewatch_logging::{pw_debug, pw_info, pw_warn};

use crate::effect::NoticeLevel;
use crate::{build_report, export_grid, Effect, Entity, ReportGrid, ReportWindow, EXPORT_FILENAME};

/// Identifies one history fetch; responses for older requests are dropped.
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("no report loaded")]
    NoReportLoaded,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReportStatus {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed(String),
}

/// Owns the report view: which window is shown, the last grid, and the
/// request currently in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportController {
    open: bool,
    window: ReportWindow,
    active_only: bool,
    last_request: RequestId,
    pending: Option<RequestId>,
    grid: Option<ReportGrid>,
    status: ReportStatus,
    /// Bumped whenever an accepted response replaces or clears the grid.
    revision: u64,
}

impl Default for ReportController {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReportController {
    pub fn new(active_only: bool) -> Self {
        Self {
            open: false,
            window: ReportWindow::default(),
            active_only,
            last_request: 0,
            pending: None,
            grid: None,
            status: ReportStatus::Empty,
            revision: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn window(&self) -> ReportWindow {
        self.window
    }

    pub fn status(&self) -> &ReportStatus {
        &self.status
    }

    pub fn grid(&self) -> Option<&ReportGrid> {
        self.grid.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Opens the report view (if needed) and requests the history for `window`.
    pub fn load_report(&mut self, window: ReportWindow) -> Vec<Effect> {
        self.open = true;
        self.window = window;
        self.last_request += 1;
        self.pending = Some(self.last_request);
        self.status = ReportStatus::Loading;
        pw_debug!("Report request {} for {:?}", self.last_request, window);
        vec![Effect::FetchHistory {
            request: self.last_request,
            window,
            active_only: self.active_only,
        }]
    }

    /// Reloads with the last-used window when the view is open.
    pub fn refresh(&mut self) -> Vec<Effect> {
        if self.open {
            self.load_report(self.window)
        } else {
            Vec::new()
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.pending = None;
    }

    /// Applies a history response. Returns `false` when it was stale.
    pub fn history_loaded(&mut self, request: RequestId, result: Result<Vec<Entity>, String>) -> bool {
        if self.pending != Some(request) {
            pw_debug!("Dropping stale history response {}", request);
            return false;
        }
        self.pending = None;
        self.revision += 1;
        match result {
            Ok(entities) => {
                let grid = build_report(&entities, self.window);
                pw_info!(
                    "Report ready: {} products x {} dates",
                    grid.rows.len(),
                    grid.dates.len()
                );
                self.grid = Some(grid);
                self.status = ReportStatus::Ready;
            }
            Err(message) => {
                pw_warn!("History fetch failed: {}", message);
                self.grid = None;
                self.status = ReportStatus::Failed(message);
            }
        }
        true
    }

    /// Serializes the currently loaded grid.
    pub fn export_current(&self) -> Result<String, ReportError> {
        self.grid
            .as_ref()
            .map(export_grid)
            .ok_or(ReportError::NoReportLoaded)
    }

    /// Export as an effect: a file write on success, an error notice otherwise.
    pub fn export_effect(&self) -> Effect {
        match self.export_current() {
            Ok(contents) => Effect::WriteExport {
                filename: EXPORT_FILENAME.to_string(),
                contents,
            },
            Err(err) => Effect::notify(NoticeLevel::Error, format!("Cannot export: {err}")),
        }
    }
}
