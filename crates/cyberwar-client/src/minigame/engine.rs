use rand::rngs::StdRng;

use cyberwar_core::net::messages::{MinigameResultMsg, StartMinigameMsg};

use super::challenge::{CLIENT_ERROR_REASON, Challenge, ChallengeInput};
use super::registry::ChallengeRegistry;
use super::session::{Session, SessionCtx, SessionId, dispatch_timer};
use crate::context::ClientContext;
use crate::render::{RenderSink, Screen, ViewUpdate, present};
use crate::scheduler::{Scheduler, TimerSet, TimerTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    /// A challenge is accepting input.
    Running,
    /// The terminal message is showing; the outcome has not been sent yet.
    Feedback,
}

struct ActiveSession {
    session: Session,
    challenge: Box<dyn Challenge>,
    return_to: Screen,
}

struct PendingResult {
    session: SessionId,
    node: String,
    success: bool,
    duration: f64,
    return_to: Screen,
    _timer: TimerSet,
}

impl PendingResult {
    fn into_result(self, ctx: &ClientContext) -> MinigameResultMsg {
        if !ctx.is_logged_in() {
            tracing::warn!(node = %self.node, "Reporting challenge outcome without a player id");
        }
        MinigameResultMsg {
            node: self.node,
            success: self.success,
            duration: self.duration,
            player_id: ctx.player_id.clone().unwrap_or_default(),
        }
    }
}

/// Runs at most one challenge at a time and turns its terminal state into
/// exactly one `minigame_result`.
pub struct MinigameEngine {
    registry: ChallengeRegistry,
    scheduler: Scheduler,
    rng: StdRng,
    feedback_ms: u64,
    active: Option<ActiveSession>,
    feedback: Option<PendingResult>,
}

impl MinigameEngine {
    pub fn new(
        registry: ChallengeRegistry,
        scheduler: &Scheduler,
        rng: StdRng,
        feedback_ms: u64,
    ) -> Self {
        Self {
            registry,
            scheduler: scheduler.clone(),
            rng,
            feedback_ms,
            active: None,
            feedback: None,
        }
    }

    pub fn registry(&self) -> &ChallengeRegistry {
        &self.registry
    }

    pub fn phase(&self) -> EnginePhase {
        if self.active.is_some() {
            EnginePhase::Running
        } else if self.feedback.is_some() {
            EnginePhase::Feedback
        } else {
            EnginePhase::Idle
        }
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Start the challenge named by `msg`, replacing whatever is running.
    ///
    /// A running session is cancelled without an outcome. A session already
    /// showing feedback has its outcome returned here instead of after the
    /// feedback window.
    pub fn begin(
        &mut self,
        msg: &StartMinigameMsg,
        now_ms: u64,
        ctx: &mut ClientContext,
        sink: &mut dyn RenderSink,
    ) -> Option<MinigameResultMsg> {
        let mut return_to = match ctx.screen {
            Screen::Challenge => Screen::Dashboard,
            other => other,
        };

        let mut flushed = None;
        if let Some(pending) = self.feedback.take() {
            tracing::debug!(session = %pending.session, "Flushing outcome ahead of new challenge");
            return_to = pending.return_to;
            flushed = Some(pending.into_result(ctx));
        }
        if let Some(mut previous) = self.active.take() {
            previous.session.terminate();
            tracing::info!(
                session = %previous.session.id(),
                kind = previous.session.kind(),
                "Force-terminated active challenge"
            );
            return_to = previous.return_to;
        }

        let requested = msg.game_type.as_str();
        let (kind, factory) = match self.registry.resolve(requested) {
            Some((kind, factory)) => (kind, Some(factory)),
            None => ("unregistered", None),
        };
        if kind != requested {
            tracing::warn!(requested, fallback = kind, "Unknown challenge type");
        }

        let mut session = Session::new(kind, &msg.node, now_ms, &self.scheduler);
        tracing::info!(session = %session.id(), kind, node = %msg.node, "Challenge started");
        ctx.screen = Screen::Challenge;
        present(
            &mut *sink,
            ViewUpdate::Screen {
                screen: Screen::Challenge,
            },
        );

        let mut challenge = match factory.map(|f| f()) {
            Some(Ok(challenge)) => Some(challenge),
            Some(Err(e)) => {
                tracing::warn!(kind, error = %e, "Challenge construction failed");
                None
            },
            None => None,
        };

        {
            let mut sctx = SessionCtx::new(&mut session, now_ms, &mut self.rng, &mut *sink);
            match challenge.as_mut() {
                Some(c) => {
                    if let Err(e) = c.start(&mut sctx) {
                        tracing::warn!(kind, error = %e, "Challenge failed to start");
                        sctx.finish(false, CLIENT_ERROR_REASON);
                    }
                },
                None => {
                    sctx.finish(false, CLIENT_ERROR_REASON);
                },
            }
        }

        match challenge {
            Some(challenge) if !session.is_finished() => {
                self.active = Some(ActiveSession {
                    session,
                    challenge,
                    return_to,
                });
            },
            _ => self.enter_feedback(session, return_to, now_ms, sink),
        }
        flushed
    }

    /// Forward player input to the running challenge.
    pub fn handle_input(&mut self, input: &ChallengeInput, now_ms: u64, sink: &mut dyn RenderSink) {
        let Some(active) = self.active.as_mut() else {
            tracing::debug!(?input, "Input with no running challenge");
            return;
        };
        let mut sctx = SessionCtx::new(&mut active.session, now_ms, &mut self.rng, &mut *sink);
        if let Err(e) = active.challenge.handle_input(input, &mut sctx) {
            tracing::warn!(kind = active.challenge.kind(), error = %e, "Challenge input fault");
            sctx.finish(false, CLIENT_ERROR_REASON);
        }
        self.settle(now_ms, sink);
    }

    /// Handle a fired session or feedback timer. Returns the outcome once
    /// the feedback window closes.
    pub fn on_timer(
        &mut self,
        task: TimerTask,
        now_ms: u64,
        ctx: &mut ClientContext,
        sink: &mut dyn RenderSink,
    ) -> Option<MinigameResultMsg> {
        match task {
            TimerTask::Challenge { session, timer } => {
                let Some(active) = self
                    .active
                    .as_mut()
                    .filter(|a| a.session.id() == session)
                else {
                    tracing::trace!(%session, "Timer for inactive session ignored");
                    return None;
                };
                let mut sctx =
                    SessionCtx::new(&mut active.session, now_ms, &mut self.rng, &mut *sink);
                if let Err(e) = dispatch_timer(active.challenge.as_mut(), timer, &mut sctx) {
                    tracing::warn!(kind = active.challenge.kind(), error = %e, "Challenge timer fault");
                    sctx.finish(false, CLIENT_ERROR_REASON);
                }
                self.settle(now_ms, sink);
                None
            },
            TimerTask::FeedbackDone { session } => {
                if self.feedback.as_ref().map(|p| p.session) != Some(session) {
                    return None;
                }
                let pending = self.feedback.take()?;
                ctx.screen = pending.return_to;
                present(
                    sink,
                    ViewUpdate::Screen {
                        screen: pending.return_to,
                    },
                );
                Some(pending.into_result(ctx))
            },
            _ => None,
        }
    }

    /// Hand back the outcome still sitting in its feedback window, if any.
    /// A session that has not finished yet has no outcome to give.
    pub fn flush(&mut self, ctx: &ClientContext) -> Option<MinigameResultMsg> {
        let pending = self.feedback.take()?;
        tracing::debug!(session = %pending.session, "Flushing pending outcome");
        Some(pending.into_result(ctx))
    }

    /// Drop every session and pending outcome without reporting anything.
    pub fn teardown(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.session.terminate();
        }
        self.feedback = None;
    }

    fn settle(&mut self, now_ms: u64, sink: &mut dyn RenderSink) {
        if !self
            .active
            .as_ref()
            .is_some_and(|a| a.session.is_finished())
        {
            return;
        }
        if let Some(active) = self.active.take() {
            self.enter_feedback(active.session, active.return_to, now_ms, sink);
        }
    }

    fn enter_feedback(
        &mut self,
        session: Session,
        return_to: Screen,
        now_ms: u64,
        sink: &mut dyn RenderSink,
    ) {
        let Some(outcome) = session.outcome().cloned() else {
            return;
        };
        let duration = session.duration_secs().unwrap_or_default();
        tracing::info!(
            session = %session.id(),
            kind = session.kind(),
            node = session.node(),
            success = outcome.success,
            reason = %outcome.reason,
            duration,
            "Challenge ended"
        );
        present(
            sink,
            ViewUpdate::ChallengeFeedback {
                success: outcome.success,
                message: outcome.reason,
            },
        );
        let mut timer = TimerSet::new(&self.scheduler);
        timer.once(
            now_ms + self.feedback_ms,
            TimerTask::FeedbackDone {
                session: session.id(),
            },
        );
        self.feedback = Some(PendingResult {
            session: session.id(),
            node: session.node().to_string(),
            success: outcome.success,
            duration,
            return_to,
            _timer: timer,
        });
    }
}
