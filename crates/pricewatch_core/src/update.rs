use crate::effect::NoticeLevel;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let before = state.render_key();

    let effects = match msg {
        Msg::RunScraperClicked => state.poller_mut().request_start(),
        Msg::JobStartFinished(result) => state.poller_mut().start_finished(result),
        Msg::AttachTracker => state.poller_mut().start(),
        Msg::DetachClicked => state.poller_mut().detach(),
        Msg::PollTick { token } => state.poller_mut().on_tick(token),
        Msg::StatusReceived { token, state: job } => state.poller_mut().on_status(token, job),
        Msg::PollFailed { token, message } => state.poller_mut().on_poll_failed(token, &message),
        Msg::GraceElapsed { token } => {
            if state.poller_mut().on_grace_elapsed(token) {
                let mut effects = vec![Effect::notify(NoticeLevel::Success, "Scrape finished")];
                // Job completed while the report is up: show the fresh data.
                effects.extend(state.report_mut().refresh());
                effects
            } else {
                Vec::new()
            }
        }
        Msg::ReportOpened { window } => state.report_mut().load_report(window),
        Msg::ReportRefreshClicked => state.report_mut().refresh(),
        Msg::ReportClosed => {
            state.report_mut().close();
            Vec::new()
        }
        Msg::HistoryLoaded { request, result } => {
            let failure = result.as_ref().err().cloned();
            if state.report_mut().history_loaded(request, result) {
                failure
                    .map(|message| {
                        vec![Effect::notify(
                            NoticeLevel::Error,
                            format!("Failed to load history data: {message}"),
                        )]
                    })
                    .unwrap_or_default()
            } else {
                Vec::new()
            }
        }
        Msg::ExportClicked => vec![state.report().export_effect()],
    };

    if state.render_key() != before {
        state.mark_dirty();
    }

    (state, effects)
}
