use std::io::Write;

use pricewatch_core::{
    AppViewModel, NoticeLevel, ReportStatus, ReportView, TextTable, TrackerPhase, TrackerView,
};

use crate::dashboard::DashboardObserver;

const BAR_WIDTH: usize = 30;

/// Prints tracker progress, the report table and notices to a writer.
pub struct TerminalObserver<W: Write> {
    out: W,
    last_tracker: Option<TrackerView>,
    last_report: Option<ReportView>,
}

impl<W: Write> TerminalObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_tracker: None,
            last_report: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DashboardObserver for TerminalObserver<W> {
    fn render(&mut self, view: &AppViewModel) {
        if self.last_tracker.as_ref() != Some(&view.tracker) {
            let _ = writeln!(self.out, "{}", tracker_line(&view.tracker));
            self.last_tracker = Some(view.tracker.clone());
        }
        if view.report.open && self.last_report.as_ref() != Some(&view.report) {
            if let Some(text) = report_text(&view.report) {
                let _ = writeln!(self.out, "{text}");
            }
            self.last_report = Some(view.report.clone());
        }
        let _ = self.out.flush();
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        let tag = match level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(self.out, "[{tag}] {message}");
        let _ = self.out.flush();
    }
}

pub fn tracker_line(view: &TrackerView) -> String {
    match view.phase {
        TrackerPhase::Detached => "Scraper idle".to_string(),
        TrackerPhase::Starting => "Starting scraper...".to_string(),
        TrackerPhase::Tracking | TrackerPhase::Completing => {
            let filled = ((view.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
            let filled = filled.min(BAR_WIDTH);
            format!(
                "[{}{}] {}/{} {}",
                "#".repeat(filled),
                ".".repeat(BAR_WIDTH - filled),
                view.progress,
                view.total,
                view.message
            )
            .trim_end()
            .to_string()
        }
    }
}

/// Report body for the current status; `None` when there is nothing to show.
pub fn report_text(view: &ReportView) -> Option<String> {
    match &view.status {
        ReportStatus::Empty => None,
        ReportStatus::Loading => Some("Loading history...".to_string()),
        ReportStatus::Failed(message) => Some(format!("Failed to load history data: {message}")),
        ReportStatus::Ready => match &view.table {
            Some(table) if !table.body().is_empty() => Some(format_table(table)),
            _ => Some("No historical data available.".to_string()),
        },
    }
}

/// Left-aligned columns separated by two spaces, sized by display width.
pub fn format_table(table: &TextTable) -> String {
    let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in &table.rows {
        for (i, field) in row.iter().enumerate() {
            widths[i] = widths[i].max(field.display.chars().count());
        }
    }

    table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, field)| {
                    let pad = widths[i] - field.display.chars().count();
                    format!("{}{}", field.display, " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
