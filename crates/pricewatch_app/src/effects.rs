use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use pricewatch_core::{Effect, Entity, JobState, JobStatus, Msg, NoticeLevel};
use pricewatch_engine::{
    write_export, EngineCommand, EngineEvent, EngineHandle, HistoryEntry, HistoryQuery,
    JobStatusReport, RemoteJobStatus,
};
use pricewatch_logging::{pw_debug, pw_error, pw_warn};

/// What the caller still has to do after an effect ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    Done,
    Notice(NoticeLevel, String),
}

pub struct EffectRunner {
    engine: EngineHandle,
    export_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, export_dir: PathBuf) -> Self {
        Self { engine, export_dir }
    }

    pub fn run(&self, effect: Effect) -> EffectOutcome {
        pw_debug!("Effect {:?}", effect);
        match effect {
            Effect::StartJob => self.engine.execute(EngineCommand::StartJob),
            Effect::PollStatus { token } => self.engine.execute(EngineCommand::PollStatus { token }),
            Effect::ArmTicker { token, period } => self
                .engine
                .execute(EngineCommand::ArmTicker { token, period }),
            Effect::CancelTimers { token } => {
                self.engine.execute(EngineCommand::CancelTimers { token })
            }
            Effect::ScheduleGrace { token, delay } => self
                .engine
                .execute(EngineCommand::ScheduleGrace { token, delay }),
            Effect::FetchHistory {
                request,
                window,
                active_only,
            } => self.engine.execute(EngineCommand::FetchHistory {
                request,
                query: HistoryQuery {
                    days: window.days(),
                    active_only,
                },
            }),
            Effect::WriteExport { filename, contents } => {
                return match write_export(&self.export_dir, &filename, &contents) {
                    Ok(path) => EffectOutcome::Notice(
                        NoticeLevel::Success,
                        format!("Exported report to {}", path.display()),
                    ),
                    Err(err) => {
                        pw_error!("Export to {:?} failed: {}", self.export_dir, err);
                        EffectOutcome::Notice(NoticeLevel::Error, format!("Export failed: {err}"))
                    }
                };
            }
            Effect::Notify { level, message } => return EffectOutcome::Notice(level, message),
        }
        EffectOutcome::Done
    }

    /// Waits up to `timeout` for the next engine event, already mapped to a message.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StartFinished(result) => {
            Msg::JobStartFinished(result.map_err(|err| err.to_string()))
        }
        EngineEvent::StatusReceived { token, result } => match result {
            Ok(report) => Msg::StatusReceived {
                token,
                state: map_status(&report),
            },
            Err(err) => Msg::PollFailed {
                token,
                message: err.to_string(),
            },
        },
        EngineEvent::Tick { token } => Msg::PollTick { token },
        EngineEvent::GraceElapsed { token } => Msg::GraceElapsed { token },
        EngineEvent::HistoryReceived { request, result } => Msg::HistoryLoaded {
            request,
            result: result.map(map_history).map_err(|err| err.to_string()),
        },
    }
}

pub fn map_status(report: &JobStatusReport) -> JobState {
    let status = match report.kind() {
        RemoteJobStatus::Idle => JobStatus::Idle,
        RemoteJobStatus::Running => JobStatus::Running,
        RemoteJobStatus::Completed => JobStatus::Completed,
        RemoteJobStatus::Error => JobStatus::Error,
    };
    JobState::new(
        status,
        report.progress,
        report.total,
        report.current_product.clone(),
    )
}

pub fn map_history(entries: Vec<HistoryEntry>) -> Vec<Entity> {
    entries
        .into_iter()
        .map(|entry| {
            let id = format!("{}/{}", entry.store, entry.name);
            let mut series = BTreeMap::new();
            for (key, value) in entry.history {
                let date = match NaiveDate::parse_from_str(&key, "%Y-%m-%d") {
                    Ok(date) => date,
                    Err(err) => {
                        pw_warn!("Skipping history point {:?} for {}: {}", key, id, err);
                        continue;
                    }
                };
                // Keys arrive sorted, so the zero-padded spelling wins.
                match series.entry(date) {
                    Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                    Entry::Occupied(_) => {
                        pw_warn!("Skipping duplicate history point {:?} for {}", key, id);
                    }
                }
            }
            Entity {
                id,
                group_key: entry.store,
                display_name: entry.name,
                unit: entry.unit,
                series,
            }
        })
        .collect()
}
