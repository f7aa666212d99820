//! Job-status poller: one active polling session at a time, guarded by a
//! monotonically increasing session token.
//!
//! The poller never touches clocks or sockets. It answers every input with a
//! list of [`Effect`]s (issue a poll, arm or cancel timers, show a notice) and
//! the runtime feeds results back tagged with the token they were issued for.
//! Anything tagged with a token other than the live one is dropped.

use pricewatch_logging::{pw_debug, pw_error, pw_info, pw_warn};

use crate::effect::NoticeLevel;
use crate::{Effect, JobState, JobStatus, PollPolicy, SessionToken};

/// Text shown in place of the current item while the completion marker is up.
pub const COMPLETION_MARKER: &str = "Completed!";

/// UI-facing affordance state of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerPhase {
    /// No session; the run action is available.
    #[default]
    Detached,
    /// Start request in flight; the run action is disabled.
    Starting,
    Tracking,
    /// Completion marker shown until the grace timer fires.
    Completing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionStage {
    Polling,
    Completing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PollingSession {
    token: SessionToken,
    stage: SessionStage,
    ticker_armed: bool,
    in_flight: bool,
    consecutive_failures: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStatusPoller {
    policy: PollPolicy,
    last_token: SessionToken,
    session: Option<PollingSession>,
    job: Option<JobState>,
    phase: TrackerPhase,
}

impl JobStatusPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn job(&self) -> Option<&JobState> {
        self.job.as_ref()
    }

    /// Token of the live session, if any.
    pub fn active_token(&self) -> Option<SessionToken> {
        self.session.as_ref().map(|session| session.token)
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// User asked to run the scraper: request the remote start.
    pub fn request_start(&mut self) -> Vec<Effect> {
        if self.phase != TrackerPhase::Detached {
            pw_debug!("Ignoring run request while tracker is {:?}", self.phase);
            return Vec::new();
        }
        self.phase = TrackerPhase::Starting;
        vec![Effect::StartJob]
    }

    /// Result of the start request. Polling only begins on success.
    pub fn start_finished(&mut self, result: Result<(), String>) -> Vec<Effect> {
        if self.phase != TrackerPhase::Starting {
            pw_debug!("Ignoring start result while tracker is {:?}", self.phase);
            return Vec::new();
        }
        match result {
            Ok(()) => {
                let mut effects = vec![Effect::notify(
                    NoticeLevel::Success,
                    "Scraper started successfully",
                )];
                effects.extend(self.start());
                effects
            }
            Err(message) => {
                pw_warn!("Scraper start rejected: {}", message);
                self.phase = TrackerPhase::Detached;
                vec![Effect::notify(NoticeLevel::Error, message)]
            }
        }
    }

    /// Opens a fresh polling session, invalidating any previous one first.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(previous) = self.session.take() {
            pw_debug!("Invalidating polling session {}", previous.token);
            effects.push(Effect::CancelTimers {
                token: previous.token,
            });
        }

        self.last_token += 1;
        let token = self.last_token;
        self.session = Some(PollingSession {
            token,
            stage: SessionStage::Polling,
            ticker_armed: false,
            in_flight: true,
            consecutive_failures: 0,
        });
        self.job = Some(JobState::default());
        self.phase = TrackerPhase::Tracking;
        pw_info!("Polling session {} started", token);

        effects.push(Effect::PollStatus { token });
        effects
    }

    /// Drops the local session. The remote job keeps running.
    pub fn detach(&mut self) -> Vec<Effect> {
        match self.session.take() {
            Some(session) => {
                pw_info!("Detached from polling session {}", session.token);
                self.reset_affordances();
                vec![Effect::CancelTimers {
                    token: session.token,
                }]
            }
            None => Vec::new(),
        }
    }

    pub fn on_tick(&mut self, token: SessionToken) -> Vec<Effect> {
        let Some(session) = self.polling_session_mut(token) else {
            pw_debug!("Dropping stale tick for session {}", token);
            return Vec::new();
        };
        if session.in_flight {
            pw_debug!("Session {} still waiting on a poll; skipping tick", token);
            return Vec::new();
        }
        session.in_flight = true;
        vec![Effect::PollStatus { token }]
    }

    pub fn on_status(&mut self, token: SessionToken, state: JobState) -> Vec<Effect> {
        let arm_ticker = {
            let Some(session) = self.polling_session_mut(token) else {
                pw_debug!(
                    "Dropping stale status {:?} for session {}",
                    state.status,
                    token
                );
                return Vec::new();
            };
            session.in_flight = false;
            session.consecutive_failures = 0;
            match state.status {
                JobStatus::Running => !std::mem::replace(&mut session.ticker_armed, true),
                JobStatus::Completed => {
                    session.stage = SessionStage::Completing;
                    false
                }
                JobStatus::Idle | JobStatus::Error => false,
            }
        };

        match state.status {
            JobStatus::Running => {
                self.job = Some(state.clamped());
                if arm_ticker {
                    vec![Effect::ArmTicker {
                        token,
                        period: self.policy.interval,
                    }]
                } else {
                    Vec::new()
                }
            }
            JobStatus::Completed => {
                pw_info!("Session {} observed job completion", token);
                let mut job = state.clamped();
                job.current_item = COMPLETION_MARKER.to_string();
                self.job = Some(job);
                self.phase = TrackerPhase::Completing;
                vec![
                    Effect::CancelTimers { token },
                    Effect::ScheduleGrace {
                        token,
                        delay: self.policy.grace,
                    },
                ]
            }
            JobStatus::Idle => {
                pw_info!("Session {}: no scrape job is running", token);
                self.reset_affordances();
                vec![Effect::CancelTimers { token }]
            }
            JobStatus::Error => {
                pw_error!("Session {}: scrape job reported an error", token);
                self.reset_affordances();
                let message = if state.current_item.is_empty() {
                    "Scraper reported an error".to_string()
                } else {
                    format!("Scraper reported an error: {}", state.current_item)
                };
                vec![
                    Effect::CancelTimers { token },
                    Effect::notify(NoticeLevel::Error, message),
                ]
            }
        }
    }

    /// Transport failure on a single poll. Absorbed unless the policy caps it.
    pub fn on_poll_failed(&mut self, token: SessionToken, message: &str) -> Vec<Effect> {
        let (failures, arm_ticker) = {
            let Some(session) = self.polling_session_mut(token) else {
                pw_debug!("Dropping stale poll failure for session {}", token);
                return Vec::new();
            };
            session.in_flight = false;
            session.consecutive_failures += 1;
            (
                session.consecutive_failures,
                !std::mem::replace(&mut session.ticker_armed, true),
            )
        };
        pw_warn!(
            "Status poll for session {} failed ({} in a row): {}",
            token,
            failures,
            message
        );

        // Some(0) behaves like None.
        let limit = self.policy.max_consecutive_failures.filter(|max| *max > 0);
        if let Some(limit) = limit {
            if failures >= limit {
                pw_error!(
                    "Giving up on session {} after {} failed polls",
                    token,
                    failures
                );
                self.reset_affordances();
                return vec![
                    Effect::CancelTimers { token },
                    Effect::notify(
                        NoticeLevel::Error,
                        format!("Lost contact with the scraper after {failures} failed status checks"),
                    ),
                ];
            }
        }

        if arm_ticker {
            vec![Effect::ArmTicker {
                token,
                period: self.policy.interval,
            }]
        } else {
            Vec::new()
        }
    }

    /// Grace period after completion ran out. Returns `true` when this closed
    /// the live session, i.e. the job-completed notification should fire.
    pub fn on_grace_elapsed(&mut self, token: SessionToken) -> bool {
        match &self.session {
            Some(session) if session.token == token && session.stage == SessionStage::Completing => {
                pw_info!("Session {} finished", token);
                self.reset_affordances();
                true
            }
            _ => {
                pw_debug!("Dropping stale grace timer for session {}", token);
                false
            }
        }
    }

    fn polling_session_mut(&mut self, token: SessionToken) -> Option<&mut PollingSession> {
        self.session
            .as_mut()
            .filter(|session| session.token == token && session.stage == SessionStage::Polling)
    }

    fn reset_affordances(&mut self) {
        self.session = None;
        self.job = None;
        self.phase = TrackerPhase::Detached;
    }
}
