//! Snapshot reconcilers: one unit per derived view.

pub mod abilities;
pub mod battery;
pub mod clock;
pub mod modifiers;
pub mod scoreboard;
pub mod shields;

use cyberwar_core::snapshot::Snapshot;

use crate::config::ClientConfig;
use crate::context::ClientContext;
use crate::render::RenderSink;
use crate::scheduler::{Scheduler, TimerTask};

pub use abilities::{AbilityPanel, CastError};
pub use battery::BatteryGauge;
pub use clock::MatchClock;
pub use modifiers::ModifierBoard;
pub use scoreboard::Scoreboard;
pub use shields::ShieldBoard;

/// A view derived from the snapshot stream.
///
/// Units read the snapshot, diff what they care about against their own
/// cache and render only what changed.
pub trait SnapshotUnit {
    fn name(&self) -> &'static str;

    fn apply(
        &mut self,
        snapshot: &Snapshot,
        now_ms: u64,
        ctx: &ClientContext,
        sink: &mut dyn RenderSink,
    );

    /// Forget rendered state so the next snapshot is drawn in full.
    fn resync(&mut self);
}

/// Every reconciler, plus the event-driven battery gauge.
pub struct Reconciler {
    pub clock: MatchClock,
    pub shields: ShieldBoard,
    pub scores: Scoreboard,
    pub abilities: AbilityPanel,
    pub modifiers: ModifierBoard,
    pub battery: BatteryGauge,
}

impl Reconciler {
    /// Build every unit and start the clock and shield tick loops.
    pub fn new(scheduler: &Scheduler, now_ms: u64, config: &ClientConfig) -> Self {
        Self {
            clock: MatchClock::new(
                scheduler,
                now_ms,
                config.timing.clock_tick_ms,
                config.timing.drift_tolerance_ms,
            ),
            shields: ShieldBoard::new(
                scheduler,
                now_ms,
                config.timing.shield_tick_ms,
                config.hud.shield_expiring_secs,
            ),
            scores: Scoreboard::new(scheduler, config.hud.capture_annotation_ms),
            abilities: AbilityPanel::new(),
            modifiers: ModifierBoard::new(),
            battery: BatteryGauge::new(
                scheduler,
                config.hud.battery_animation_ms,
                config.hud.battery_flash_ms,
            ),
        }
    }

    fn units_mut(&mut self) -> [&mut dyn SnapshotUnit; 5] {
        [
            &mut self.clock,
            &mut self.shields,
            &mut self.scores,
            &mut self.abilities,
            &mut self.modifiers,
        ]
    }

    pub fn apply_snapshot(
        &mut self,
        snapshot: &Snapshot,
        now_ms: u64,
        ctx: &ClientContext,
        sink: &mut dyn RenderSink,
    ) {
        for unit in self.units_mut() {
            tracing::trace!(unit = unit.name(), "Applying snapshot");
            unit.apply(snapshot, now_ms, ctx, &mut *sink);
        }
    }

    /// Mark every unit for a full redraw from the next snapshot.
    pub fn resync(&mut self) {
        for unit in self.units_mut() {
            unit.resync();
        }
        tracing::debug!("Reconcilers marked for full resync");
    }

    /// Handle a fired reconciler timer. Returns false for tasks owned elsewhere.
    pub fn on_timer(&mut self, task: TimerTask, now_ms: u64, sink: &mut dyn RenderSink) -> bool {
        match task {
            TimerTask::ClockTick => self.clock.tick(now_ms, sink),
            TimerTask::ShieldTick => self.shields.tick(now_ms, sink),
            TimerTask::AnnotationExpiry { team } => self.scores.annotation_expired(team, sink),
            TimerTask::BatteryRestore | TimerTask::BatteryFlashEnd => self.battery.settle(sink),
            TimerTask::Challenge { .. } | TimerTask::FeedbackDone { .. } => return false,
        }
        true
    }

    /// Cancel every tick loop and transient timer.
    pub fn teardown(&mut self) {
        self.clock.teardown();
        self.shields.teardown();
        self.scores.teardown();
        self.battery.teardown();
    }
}
