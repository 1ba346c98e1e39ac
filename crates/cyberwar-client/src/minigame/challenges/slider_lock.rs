use rand::Rng;

use crate::minigame::challenge::{
    Challenge, ChallengeError, ChallengeInput, ChallengeView, TIMEOUT_REASON,
};
use crate::minigame::session::SessionCtx;

const TIME_LIMIT_SECS: u32 = 8;
const ZONE_WIDTH: f64 = 20.0;
/// One full left-right-left pass of the marker.
const SWEEP_MS: u64 = 2_000;

/// Stop a sweeping marker inside the highlighted zone.
#[derive(Debug, Default)]
pub struct SliderLock {
    zone_start: Option<f64>,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(SliderLock::default()))
}

/// Marker position in percent of the track after `elapsed_ms` of sweeping.
fn marker_position(elapsed_ms: u64) -> f64 {
    let phase = (elapsed_ms % SWEEP_MS) as f64 / SWEEP_MS as f64;
    if phase < 0.5 {
        phase * 200.0
    } else {
        (1.0 - phase) * 200.0
    }
}

impl Challenge for SliderLock {
    fn kind(&self) -> &'static str {
        "slider_lock"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        let zone_start = ctx.rng().random_range(20.0..80.0);
        self.zone_start = Some(zone_start);
        ctx.render(ChallengeView::Slider {
            zone_start,
            zone_width: ZONE_WIDTH,
            sweep_ms: SWEEP_MS,
        });
        ctx.start_countdown(TIME_LIMIT_SECS, TIMEOUT_REASON);
        Ok(())
    }

    fn handle_input(
        &mut self,
        input: &ChallengeInput,
        ctx: &mut SessionCtx<'_>,
    ) -> Result<(), ChallengeError> {
        let zone_start = self.zone_start.ok_or(ChallengeError::NotStarted)?;
        if *input == ChallengeInput::Submit {
            let position = marker_position(ctx.elapsed_ms());
            if (zone_start..=zone_start + ZONE_WIDTH).contains(&position) {
                ctx.finish(true, "LOCKED");
            } else {
                ctx.finish(false, "MISSED");
            }
        }
        Ok(())
    }
}
