use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use pricewatch_logging::{pw_debug, pw_error};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::client::{ApiSettings, ReqwestApi, TrackerApi};
use crate::{ApiError, EngineEvent, HistoryQuery, RequestId, SessionToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    StartJob,
    PollStatus { token: SessionToken },
    ArmTicker { token: SessionToken, period: Duration },
    ScheduleGrace { token: SessionToken, delay: Duration },
    CancelTimers { token: SessionToken },
    FetchHistory { request: RequestId, query: HistoryQuery },
}

/// Background worker that runs requests and timers on its own tokio runtime
/// and reports back over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        Ok(Self::with_api(Arc::new(ReqwestApi::new(settings)?)))
    }

    pub fn with_api(api: Arc<dyn TrackerApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    pw_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };

            let mut timers: HashMap<SessionToken, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                timers.retain(|_, cancel| !cancel.is_cancelled());
                let _guard = runtime.enter();
                handle_command(api.clone(), command, event_tx.clone(), &mut timers);
            }
            for cancel in timers.values() {
                cancel.cancel();
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn execute(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn handle_command(
    api: Arc<dyn TrackerApi>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    timers: &mut HashMap<SessionToken, CancellationToken>,
) {
    match command {
        EngineCommand::StartJob => {
            tokio::spawn(async move {
                let result = api.start_job().await;
                let _ = event_tx.send(EngineEvent::StartFinished(result));
            });
        }
        EngineCommand::PollStatus { token } => {
            tokio::spawn(async move {
                let result = api.job_status().await;
                let _ = event_tx.send(EngineEvent::StatusReceived { token, result });
            });
        }
        EngineCommand::FetchHistory { request, query } => {
            tokio::spawn(async move {
                let result = api.fetch_history(query).await;
                let _ = event_tx.send(EngineEvent::HistoryReceived { request, result });
            });
        }
        EngineCommand::ArmTicker { token, period } => {
            let cancel = timers.entry(token).or_default().clone();
            pw_debug!("Ticker armed for session {} every {:?}", token, period);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = interval.tick() => {
                            if event_tx.send(EngineEvent::Tick { token }).is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
        EngineCommand::ScheduleGrace { token, delay } => {
            let cancel = timers.entry(token).or_default().clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        let _ = event_tx.send(EngineEvent::GraceElapsed { token });
                        // One-shot: mark the slot finished so it gets pruned.
                        cancel.cancel();
                    }
                }
            });
        }
        EngineCommand::CancelTimers { token } => {
            if let Some(cancel) = timers.remove(&token) {
                pw_debug!("Timers cancelled for session {}", token);
                cancel.cancel();
            }
        }
    }
}
