//! Pricewatch core: pure state machine, report engine and view-model helpers.
mod effect;
mod export;
mod job;
mod msg;
mod poller;
mod report;
mod state;
mod table;
mod trend;
mod update;
mod view_model;

pub use effect::{Effect, NoticeLevel};
pub use export::{export_grid, export_table, EXPORT_FILENAME};
pub use job::{JobState, JobStatus, PollPolicy, SessionToken};
pub use msg::Msg;
pub use poller::{JobStatusPoller, TrackerPhase, COMPLETION_MARKER};
pub use report::{ReportController, ReportError, ReportStatus, RequestId};
pub use state::AppState;
pub use table::{
    render_grid, store_display_name, trend_glyph, TableField, TextTable, GLYPH_DOWN, GLYPH_FLAT,
    GLYPH_UP, KNOWN_STORES, PLACEHOLDER_DASH,
};
pub use trend::{
    build_report, Cell, Entity, RenderedRow, ReportGrid, ReportWindow, Trend, DEFAULT_RECENT_DAYS,
};
pub use update::update;
pub use view_model::{AppViewModel, ReportView, TrackerView};
