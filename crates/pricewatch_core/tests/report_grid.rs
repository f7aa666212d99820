use std::collections::BTreeMap;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use pricewatch_core::{build_report, Cell, Entity, ReportGrid, ReportWindow, Trend};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn entity(id: &str, points: &[(u32, Option<f64>)]) -> Entity {
    Entity {
        id: id.to_string(),
        group_key: "nofrills".to_string(),
        display_name: id.to_uppercase(),
        unit: "kg".to_string(),
        series: points.iter().map(|(d, v)| (day(*d), *v)).collect(),
    }
}

fn trends(grid: &ReportGrid, row: usize) -> Vec<Trend> {
    grid.rows[row].cells.iter().map(|cell| cell.trend).collect()
}

#[test]
fn baseline_carries_across_gaps() {
    let milk = entity(
        "milk",
        &[
            (1, Some(1.00)),
            (2, Some(1.00)),
            (3, None),
            (4, Some(0.50)),
            (5, Some(0.80)),
        ],
    );
    let grid = build_report(&[milk], ReportWindow::FullRange);

    assert_eq!(grid.dates, vec![day(1), day(2), day(3), day(4), day(5)]);
    assert_eq!(
        trends(&grid, 0),
        vec![Trend::None, Trend::Flat, Trend::None, Trend::Down, Trend::Up]
    );
    assert_eq!(grid.rows[0].cells[2], Cell::EMPTY);
}

#[test]
fn dates_missing_for_one_entity_are_gaps_not_resets() {
    let eggs = entity("eggs", &[(1, Some(3.0)), (4, Some(3.5))]);
    let bread = entity("bread", &[(2, Some(2.0)), (3, Some(1.5))]);
    let grid = build_report(&[eggs, bread], ReportWindow::FullRange);

    assert_eq!(grid.dates, vec![day(1), day(2), day(3), day(4)]);
    assert_eq!(
        trends(&grid, 0),
        vec![Trend::None, Trend::None, Trend::None, Trend::Up]
    );
    assert_eq!(
        trends(&grid, 1),
        vec![Trend::None, Trend::None, Trend::Down, Trend::None]
    );
}

#[test]
fn recent_window_keeps_last_dates_in_order() {
    let a = entity("a", &(1..=6u32).map(|d| (d, Some(f64::from(d)))).collect::<Vec<_>>());
    let b = entity("b", &(5..=10u32).map(|d| (d, Some(1.0))).collect::<Vec<_>>());
    let entities = [a, b];

    let recent = build_report(&entities, ReportWindow::Recent(7));
    assert_eq!(recent.dates, (4..=10).map(day).collect::<Vec<_>>());
    assert!(recent.rows.iter().all(|row| row.cells.len() == 7));

    let full = build_report(&entities, ReportWindow::FullRange);
    assert_eq!(full.dates, (1..=10).map(day).collect::<Vec<_>>());
}

#[test]
fn trends_are_computed_inside_the_window_only() {
    // Day 1 falls outside the window, so day 2 is the first observation.
    let a = entity("a", &[(1, Some(5.0)), (2, Some(6.0)), (3, Some(6.0))]);
    let grid = build_report(&[a], ReportWindow::Recent(2));
    assert_eq!(trends(&grid, 0), vec![Trend::None, Trend::Flat]);
}

#[test]
fn building_twice_yields_identical_grids() {
    let entities = [
        entity("a", &[(1, Some(1.0)), (3, Some(2.0))]),
        entity("b", &[(2, None), (3, Some(0.5))]),
    ];
    let first = build_report(&entities, ReportWindow::Recent(7));
    let second = build_report(&entities, ReportWindow::Recent(7));
    assert_eq!(first, second);
}

#[test]
fn empty_input_gives_empty_grid() {
    let grid = build_report(&[], ReportWindow::Recent(7));
    assert_eq!(grid, ReportGrid::default());
}

#[test]
fn entity_without_points_renders_absent_row() {
    let empty = Entity {
        series: BTreeMap::new(),
        ..entity("ghost", &[])
    };
    let other = entity("a", &[(1, Some(1.0)), (2, Some(2.0))]);
    let grid = build_report(&[empty, other], ReportWindow::FullRange);

    assert_eq!(grid.rows[0].entity.id, "ghost");
    assert_eq!(grid.rows[0].cells, vec![Cell::EMPTY, Cell::EMPTY]);
    assert_eq!(grid.rows[1].entity.id, "a");
}
