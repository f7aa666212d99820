use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use pricewatch_core::{
    update, AppState, AppViewModel, Msg, NoticeLevel, ReportStatus, ReportWindow, TrackerPhase,
};
use pricewatch_engine::EngineHandle;
use pricewatch_logging::pw_info;

use crate::config::AppConfig;
use crate::effects::{EffectOutcome, EffectRunner};

const PUMP_INTERVAL: Duration = Duration::from_millis(50);

/// Receives everything the dashboard wants shown.
pub trait DashboardObserver {
    /// Called after a message changed visible state.
    fn render(&mut self, view: &AppViewModel);
    fn notify(&mut self, level: NoticeLevel, message: &str);
}

/// Owns the state and runs the message loop: engine events in, effects out.
pub struct Dashboard<O: DashboardObserver> {
    state: AppState,
    runner: EffectRunner,
    observer: O,
    first_error: Option<String>,
}

impl<O: DashboardObserver> Dashboard<O> {
    pub fn new(engine: EngineHandle, config: &AppConfig, observer: O) -> Self {
        Self {
            state: AppState::with_policy(config.poll_policy(), config.active_only),
            runner: EffectRunner::new(engine, config.export_dir.clone()),
            observer,
            first_error: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The first error notice raised since the dashboard was created.
    pub fn first_error(&self) -> Option<&str> {
        self.first_error.as_deref()
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        if was_dirty {
            self.observer.render(&self.state.view());
        }
        for effect in effects {
            if let EffectOutcome::Notice(level, message) = self.runner.run(effect) {
                self.observer.notify(level, &message);
                if level == NoticeLevel::Error && self.first_error.is_none() {
                    self.first_error = Some(message);
                }
            }
        }
    }

    /// Handles at most one engine event. Returns whether one arrived.
    pub fn pump(&mut self, timeout: Duration) -> bool {
        match self.runner.next_msg(timeout) {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    /// Pumps events until `done` holds. Returns `false` if `limit` ran out first.
    pub fn run_until(&mut self, limit: Option<Duration>, done: impl Fn(&AppState) -> bool) -> bool {
        let started = Instant::now();
        while !done(&self.state) {
            if limit.is_some_and(|limit| started.elapsed() >= limit) {
                return false;
            }
            self.pump(PUMP_INTERVAL);
        }
        true
    }
}

/// The tracker is back to its pre-start affordances and no report fetch is pending.
pub fn is_settled(state: &AppState) -> bool {
    state.poller().phase() == TrackerPhase::Detached
        && *state.report().status() != ReportStatus::Loading
}

pub fn report_settled(state: &AppState) -> bool {
    *state.report().status() != ReportStatus::Loading
}

/// Starts (or attaches to) the scrape job and follows it until it is done.
///
/// With a report window, the report stays open for the whole run and is
/// reloaded once the job completes. Any error notice along the way (rejected
/// start, job error, lost contact, failed report load) makes the run an error.
pub fn run_tracking<O: DashboardObserver>(
    config: &AppConfig,
    start: bool,
    report_window: Option<ReportWindow>,
    observer: O,
) -> Result<O> {
    let engine = EngineHandle::new(&config.api_settings()).context("Failed to set up the HTTP client")?;
    let mut dashboard = Dashboard::new(engine, config, observer);

    if let Some(window) = report_window {
        dashboard.dispatch(Msg::ReportOpened { window });
    }
    dashboard.dispatch(if start {
        Msg::RunScraperClicked
    } else {
        Msg::AttachTracker
    });

    dashboard.run_until(None, is_settled);
    if let Some(message) = dashboard.first_error() {
        bail!("{message}");
    }
    pw_info!("Tracking finished");
    Ok(dashboard.into_observer())
}

/// Loads one report and optionally exports it.
pub fn run_report<O: DashboardObserver>(
    config: &AppConfig,
    window: ReportWindow,
    export: bool,
    observer: O,
) -> Result<O> {
    let engine = EngineHandle::new(&config.api_settings()).context("Failed to set up the HTTP client")?;
    let mut dashboard = Dashboard::new(engine, config, observer);

    dashboard.dispatch(Msg::ReportOpened { window });
    dashboard.run_until(None, report_settled);

    if let ReportStatus::Failed(message) = dashboard.state().report().status() {
        bail!("Failed to load history data: {message}");
    }
    if export {
        dashboard.dispatch(Msg::ExportClicked);
    }
    Ok(dashboard.into_observer())
}
