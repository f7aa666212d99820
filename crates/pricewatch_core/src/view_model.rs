use crate::{ReportStatus, ReportWindow, TextTable, TrackerPhase};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerView {
    pub phase: TrackerPhase,
    pub progress: u32,
    pub total: u32,
    pub percent: f64,
    pub message: String,
    pub run_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportView {
    pub open: bool,
    pub window: ReportWindow,
    pub status: ReportStatus,
    pub table: Option<TextTable>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub tracker: TrackerView,
    pub report: ReportView,
    pub dirty: bool,
}
