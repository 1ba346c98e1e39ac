use rand::rngs::StdRng;
use serde::Serialize;
use uuid::Uuid;

use super::challenge::{Challenge, ChallengeError, ChallengeView};
use crate::render::{RenderSink, ViewUpdate, present};
use crate::scheduler::{ChallengeTimer, Scheduler, TaskId, TimerSet, TimerTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal result of a session. Only the first `finish` produces one.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub success: bool,
    pub reason: String,
    pub finished_at_ms: u64,
}

#[derive(Debug)]
struct Countdown {
    ends_at_ms: u64,
    fail_reason: String,
    task: TaskId,
}

/// One in-progress run of a challenge.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    kind: &'static str,
    node: String,
    started_at_ms: u64,
    timers: TimerSet,
    countdown: Option<Countdown>,
    outcome: Option<Outcome>,
}

impl Session {
    pub fn new(kind: &'static str, node: &str, started_at_ms: u64, scheduler: &Scheduler) -> Self {
        Self {
            id: SessionId::new(),
            kind,
            node: node.to_string(),
            started_at_ms,
            timers: TimerSet::new(scheduler),
            countdown: None,
            outcome: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Seconds from start to the terminal state, once there is one.
    pub fn duration_secs(&self) -> Option<f64> {
        self.outcome
            .as_ref()
            .map(|o| o.finished_at_ms.saturating_sub(self.started_at_ms) as f64 / 1000.0)
    }

    /// Timers this session still has queued.
    pub fn live_timers(&self) -> usize {
        self.timers.live()
    }

    /// Cancel everything without producing an outcome.
    pub fn terminate(&mut self) {
        self.timers.cancel_all();
        self.countdown = None;
    }
}

/// Everything a challenge may touch while handling one callback.
pub struct SessionCtx<'a> {
    session: &'a mut Session,
    now_ms: u64,
    rng: &'a mut StdRng,
    sink: &'a mut dyn RenderSink,
}

impl<'a> SessionCtx<'a> {
    pub fn new(
        session: &'a mut Session,
        now_ms: u64,
        rng: &'a mut StdRng,
        sink: &'a mut dyn RenderSink,
    ) -> Self {
        Self {
            session,
            now_ms,
            rng,
            sink,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Milliseconds since the session started.
    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.session.started_at_ms)
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    /// Draw onto the challenge surface. Ignored once the session has finished.
    pub fn render(&mut self, challenge: ChallengeView) {
        if self.session.is_finished() {
            return;
        }
        present(&mut *self.sink, ViewUpdate::Challenge { challenge });
    }

    /// Request `on_timer(tag)` after `delay_ms`. Refused after `finish`.
    pub fn set_timeout(&mut self, delay_ms: u64, tag: u32) -> Option<TaskId> {
        if self.session.is_finished() {
            return None;
        }
        let task = TimerTask::Challenge {
            session: self.session.id,
            timer: ChallengeTimer::Custom(tag),
        };
        Some(self.session.timers.once(self.now_ms + delay_ms, task))
    }

    pub fn cancel_timeout(&mut self, id: TaskId) {
        self.session.timers.cancel(id);
    }

    /// Show a live countdown and fail with `fail_reason` when it reaches zero.
    ///
    /// Replaces any countdown already running for this session.
    pub fn start_countdown(&mut self, secs: u32, fail_reason: &str) {
        if self.session.is_finished() {
            return;
        }
        if let Some(old) = self.session.countdown.take() {
            self.session.timers.cancel(old.task);
        }
        present(&mut *self.sink, ViewUpdate::ChallengeCountdown { secs });
        if secs == 0 {
            self.finish(false, fail_reason);
            return;
        }
        let task = self.session.timers.every(
            self.now_ms + 1000,
            1000,
            TimerTask::Challenge {
                session: self.session.id,
                timer: ChallengeTimer::Countdown,
            },
        );
        self.session.countdown = Some(Countdown {
            ends_at_ms: self.now_ms + u64::from(secs) * 1000,
            fail_reason: fail_reason.to_string(),
            task,
        });
    }

    /// Record the terminal result. The first call wins; later calls return false.
    ///
    /// Every timer the session owns is cancelled before this returns.
    pub fn finish(&mut self, success: bool, reason: &str) -> bool {
        if self.session.is_finished() {
            tracing::trace!(session = %self.session.id, reason, "Ignoring repeated finish");
            return false;
        }
        self.session.terminate();
        self.session.outcome = Some(Outcome {
            success,
            reason: reason.to_string(),
            finished_at_ms: self.now_ms,
        });
        tracing::debug!(
            session = %self.session.id,
            kind = self.session.kind,
            success,
            reason,
            "Challenge finished"
        );
        true
    }

    fn countdown_step(&mut self) {
        let Some(countdown) = &self.session.countdown else {
            return;
        };
        let remaining_ms = countdown.ends_at_ms.saturating_sub(self.now_ms);
        let secs = remaining_ms.div_ceil(1000) as u32;
        present(&mut *self.sink, ViewUpdate::ChallengeCountdown { secs });
        if remaining_ms == 0 {
            let reason = countdown.fail_reason.clone();
            self.finish(false, &reason);
        }
    }
}

/// Route a fired session timer to the countdown or the challenge.
pub(crate) fn dispatch_timer(
    challenge: &mut dyn Challenge,
    timer: ChallengeTimer,
    ctx: &mut SessionCtx<'_>,
) -> Result<(), ChallengeError> {
    if ctx.is_finished() {
        return Ok(());
    }
    match timer {
        ChallengeTimer::Countdown => {
            ctx.countdown_step();
            Ok(())
        },
        ChallengeTimer::Custom(tag) => challenge.on_timer(tag, ctx),
    }
}
