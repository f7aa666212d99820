//! Sparse per-entity price series reconciled into a dense date × entity grid.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

/// Number of trailing days in the default report.
pub const DEFAULT_RECENT_DAYS: usize = 7;

/// One tracked product as returned by the history collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    /// Store key the product belongs to.
    pub group_key: String,
    pub display_name: String,
    pub unit: String,
    /// A date may be present with no value; it still contributes a column.
    pub series: BTreeMap<NaiveDate, Option<f64>>,
}

impl Entity {
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.series.get(&date).copied().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    /// Keep only the last `k` dates.
    Recent(usize),
    FullRange,
}

impl ReportWindow {
    /// Value of the `days` query parameter; 0 means unbounded.
    pub fn days(self) -> u32 {
        match self {
            ReportWindow::Recent(k) => u32::try_from(k).unwrap_or(u32::MAX),
            ReportWindow::FullRange => 0,
        }
    }
}

impl Default for ReportWindow {
    fn default() -> Self {
        ReportWindow::Recent(DEFAULT_RECENT_DAYS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub value: Option<f64>,
    pub trend: Trend,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        value: None,
        trend: Trend::None,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub entity: Entity,
    /// Aligned 1:1 with [`ReportGrid::dates`].
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportGrid {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<RenderedRow>,
}

impl ReportGrid {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds the report grid. Pure: the same input always yields the same grid.
pub fn build_report(entities: &[Entity], window: ReportWindow) -> ReportGrid {
    let all_dates: BTreeSet<NaiveDate> = entities
        .iter()
        .flat_map(|entity| entity.series.keys().copied())
        .collect();

    let skip = match window {
        ReportWindow::Recent(k) => all_dates.len().saturating_sub(k),
        ReportWindow::FullRange => 0,
    };
    let dates: Vec<NaiveDate> = all_dates.into_iter().skip(skip).collect();

    let rows = entities
        .iter()
        .map(|entity| RenderedRow {
            entity: entity.clone(),
            cells: trend_cells(entity, &dates),
        })
        .collect();

    ReportGrid { dates, rows }
}

/// Left-to-right scan; a gap keeps the previous baseline.
fn trend_cells(entity: &Entity, dates: &[NaiveDate]) -> Vec<Cell> {
    let mut baseline: Option<f64> = None;
    dates
        .iter()
        .map(|date| {
            let Some(value) = entity.value_at(*date) else {
                return Cell::EMPTY;
            };
            let trend = match baseline {
                None => Trend::None,
                Some(prev) if value > prev => Trend::Up,
                Some(prev) if value < prev => Trend::Down,
                Some(_) => Trend::Flat,
            };
            baseline = Some(value);
            Cell {
                value: Some(value),
                trend,
            }
        })
        .collect()
}
