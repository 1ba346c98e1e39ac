use cyberwar_core::net::messages::{EnergyChargedMsg, SpeedCategory};

use crate::render::{BatteryStyle, RenderSink, ViewUpdate, present};
use crate::scheduler::{Scheduler, TaskId, TimerSet, TimerTask};

pub const FULL: f64 = 100.0;

/// Style of a battery that is not animating.
pub fn resting_style(percent: f64) -> BatteryStyle {
    if percent <= 20.0 {
        BatteryStyle::Critical
    } else if percent <= 50.0 {
        BatteryStyle::Low
    } else {
        BatteryStyle::Normal
    }
}

/// Capture battery gauge driven by energy events.
pub struct BatteryGauge {
    percent: f64,
    style: BatteryStyle,
    animation_ms: u64,
    flash_ms: u64,
    pending: Option<TaskId>,
    timers: TimerSet,
}

impl BatteryGauge {
    pub fn new(scheduler: &Scheduler, animation_ms: u64, flash_ms: u64) -> Self {
        Self {
            percent: FULL,
            style: BatteryStyle::Normal,
            animation_ms,
            flash_ms,
            pending: None,
            timers: TimerSet::new(scheduler),
        }
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn style(&self) -> BatteryStyle {
        self.style
    }

    /// `energy_update`: the server reports the battery full or drained.
    pub fn on_energy_update(&mut self, charged: bool, sink: &mut dyn RenderSink) {
        self.cancel_pending();
        self.percent = if charged { FULL } else { 0.0 };
        self.show(resting_style(self.percent), sink);
    }

    /// `energy_charged`: animate the gain, or flash on a failed capture.
    ///
    /// Failure is read from the speed category; `charged` is not reliable.
    pub fn on_energy_charged(
        &mut self,
        msg: &EnergyChargedMsg,
        now_ms: u64,
        sink: &mut dyn RenderSink,
    ) {
        self.cancel_pending();
        let (style, deadline, task) = match msg.speed_category {
            SpeedCategory::Failed => (
                BatteryStyle::FailedFlash,
                now_ms + self.flash_ms,
                TimerTask::BatteryFlashEnd,
            ),
            speed => {
                self.percent = (self.percent + msg.energy_gain.max(0.0)).min(FULL);
                (
                    BatteryStyle::Charging(speed),
                    now_ms + self.animation_ms,
                    TimerTask::BatteryRestore,
                )
            },
        };
        self.show(style, sink);
        self.pending = Some(self.timers.once(deadline, task));
    }

    /// Animation or flash window closed.
    pub fn settle(&mut self, sink: &mut dyn RenderSink) {
        if self.pending.take().is_none() {
            return;
        }
        self.show(resting_style(self.percent), sink);
    }

    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.pending = None;
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            self.timers.cancel(task);
        }
    }

    fn show(&mut self, style: BatteryStyle, sink: &mut dyn RenderSink) {
        self.style = style;
        present(
            sink,
            ViewUpdate::Battery {
                percent: self.percent,
                style,
            },
        );
    }
}
