use pricewatch_core::{update, AppState, Msg};

#[test]
fn closing_a_report_that_was_never_opened_changes_nothing() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::ReportClosed);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_for_unknown_session_changes_nothing() {
    let state = AppState::new();
    let (mut next, effects) = update(state.clone(), Msg::PollTick { token: 99 });

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert_eq!(state, next);
}
