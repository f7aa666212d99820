use std::collections::BTreeMap;

use chrono::NaiveDate;
use pricewatch_core::{
    update, AppState, Effect, Entity, Msg, NoticeLevel, ReportError, ReportStatus, ReportWindow,
};

fn eggs() -> Entity {
    Entity {
        id: "foodbasics/Eggs".into(),
        group_key: "foodbasics".into(),
        display_name: "Eggs".into(),
        unit: "unit".into(),
        series: BTreeMap::from([(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), Some(2.5))]),
    }
}

#[test]
fn opening_report_requests_history_for_window() {
    let (state, effects) = update(
        AppState::new(),
        Msg::ReportOpened {
            window: ReportWindow::Recent(7),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::FetchHistory {
            request: 1,
            window: ReportWindow::Recent(7),
            active_only: true,
        }]
    );
    let view = state.view();
    assert!(view.report.open);
    assert_eq!(view.report.status, ReportStatus::Loading);
}

#[test]
fn loaded_history_becomes_grid() {
    let (state, _) = update(
        AppState::new(),
        Msg::ReportOpened {
            window: ReportWindow::FullRange,
        },
    );
    let (mut state, effects) = update(
        state,
        Msg::HistoryLoaded {
            request: 1,
            result: Ok(vec![eggs()]),
        },
    );
    assert!(effects.is_empty());
    assert!(state.consume_dirty());

    let view = state.view();
    assert_eq!(view.report.status, ReportStatus::Ready);
    let table = view.report.table.expect("table");
    assert_eq!(table.body()[0][0].display, "Food Basics");
    assert_eq!(table.body()[0][3].display, "$2.50");
}

#[test]
fn superseded_history_response_is_dropped() {
    let (state, _) = update(
        AppState::new(),
        Msg::ReportOpened {
            window: ReportWindow::Recent(7),
        },
    );
    let (state, _) = update(
        state,
        Msg::ReportOpened {
            window: ReportWindow::FullRange,
        },
    );
    let (state, _) = update(
        state,
        Msg::HistoryLoaded {
            request: 1,
            result: Ok(vec![eggs()]),
        },
    );
    assert_eq!(state.view().report.status, ReportStatus::Loading);
    assert!(state.report().grid().is_none());
}

#[test]
fn fetch_failure_shows_failed_state_and_blocks_export() {
    let (state, _) = update(
        AppState::new(),
        Msg::ReportOpened {
            window: ReportWindow::FullRange,
        },
    );
    let (state, _) = update(
        state,
        Msg::HistoryLoaded {
            request: 1,
            result: Ok(vec![eggs()]),
        },
    );
    let (state, _) = update(state, Msg::ReportRefreshClicked);
    let (state, effects) = update(
        state,
        Msg::HistoryLoaded {
            request: 2,
            result: Err("http status 500".into()),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Error,
            message: "Failed to load history data: http status 500".into(),
        }]
    );
    assert_eq!(
        state.view().report.status,
        ReportStatus::Failed("http status 500".into())
    );
    assert_eq!(state.export_current(), Err(ReportError::NoReportLoaded));
}

#[test]
fn refresh_on_closed_report_does_nothing() {
    let (state, effects) = update(AppState::new(), Msg::ReportRefreshClicked);
    assert!(effects.is_empty());
    assert!(!state.view().report.open);
}

#[test]
fn reloaded_grid_is_redrawn_but_polling_alone_is_not() {
    let (state, _) = update(
        AppState::new(),
        Msg::ReportOpened {
            window: ReportWindow::FullRange,
        },
    );
    let (state, _) = update(
        state,
        Msg::HistoryLoaded {
            request: 1,
            result: Ok(vec![eggs()]),
        },
    );
    let (mut state, _) = update(state, Msg::AttachTracker);
    state.consume_dirty();

    // The poll only marks a request in flight; nothing visible changes.
    let token = state.poller().active_token().expect("session");
    let (mut state, _) = update(state, Msg::PollTick { token });
    assert!(!state.consume_dirty());

    let (state, _) = update(state, Msg::ReportRefreshClicked);
    let (mut state, _) = update(
        state,
        Msg::HistoryLoaded {
            request: 2,
            result: Ok(vec![eggs()]),
        },
    );
    assert!(state.consume_dirty());
    assert_eq!(state.view().report.status, ReportStatus::Ready);
}
