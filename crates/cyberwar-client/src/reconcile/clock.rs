use cyberwar_core::snapshot::{Snapshot, secs_to_millis};

use super::SnapshotUnit;
use crate::context::ClientContext;
use crate::render::{RenderSink, ViewUpdate, present};
use crate::scheduler::{Scheduler, TimerSet, TimerTask};

/// Text shown while no match is running.
pub const IDLE_TEXT: &str = "00:00";

/// Elapsed match time as `MM:SS`. Minutes are not wrapped.
pub fn format_elapsed(elapsed_ms: i64) -> String {
    let secs = elapsed_ms.max(0) / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Match clock that free-runs between snapshots.
///
/// Each active snapshot yields a candidate match start (`now - game_duration`).
/// The candidate only replaces the current anchor when it is further away than
/// the drift tolerance, so network jitter never makes the display jump.
pub struct MatchClock {
    tolerance_ms: i64,
    anchor_ms: Option<i64>,
    force_resync: bool,
    text: Option<String>,
    timers: TimerSet,
}

impl MatchClock {
    pub fn new(scheduler: &Scheduler, now_ms: u64, tick_ms: u64, tolerance_ms: u64) -> Self {
        let mut timers = TimerSet::new(scheduler);
        timers.every(now_ms + tick_ms, tick_ms, TimerTask::ClockTick);
        Self {
            tolerance_ms: tolerance_ms as i64,
            anchor_ms: None,
            force_resync: false,
            text: None,
            timers,
        }
    }

    /// Epoch milliseconds the match is considered to have started at.
    pub fn anchor_ms(&self) -> Option<i64> {
        self.anchor_ms
    }

    /// Last text rendered.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Hard reset on `game_restarted`.
    pub fn restart(&mut self, sink: &mut dyn RenderSink) {
        self.anchor_ms = None;
        self.force_resync = false;
        self.show(IDLE_TEXT.to_string(), sink);
    }

    pub fn tick(&mut self, now_ms: u64, sink: &mut dyn RenderSink) {
        let Some(anchor) = self.anchor_ms else {
            return;
        };
        self.show(format_elapsed(now_ms as i64 - anchor), sink);
    }

    pub fn teardown(&mut self) {
        self.timers.cancel_all();
    }

    fn show(&mut self, text: String, sink: &mut dyn RenderSink) {
        if self.text.as_deref() == Some(text.as_str()) {
            return;
        }
        self.text = Some(text.clone());
        present(sink, ViewUpdate::ClockText { text });
    }
}

impl SnapshotUnit for MatchClock {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn apply(
        &mut self,
        snapshot: &Snapshot,
        now_ms: u64,
        _ctx: &ClientContext,
        sink: &mut dyn RenderSink,
    ) {
        if !snapshot.game_active {
            self.anchor_ms = None;
            self.force_resync = false;
            self.show(IDLE_TEXT.to_string(), sink);
            return;
        }
        let Some(duration) = snapshot.game_duration else {
            return;
        };
        let candidate = now_ms as i64 - secs_to_millis(duration);
        match self.anchor_ms {
            Some(anchor) if !self.force_resync => {
                let drift = candidate - anchor;
                if drift.abs() > self.tolerance_ms {
                    tracing::debug!(drift_ms = drift, "Clock drift beyond tolerance, re-anchoring");
                    self.anchor_ms = Some(candidate);
                }
            },
            _ => self.anchor_ms = Some(candidate),
        }
        self.force_resync = false;
        self.tick(now_ms, sink);
    }

    fn resync(&mut self) {
        self.force_resync = true;
        self.text = None;
    }
}
