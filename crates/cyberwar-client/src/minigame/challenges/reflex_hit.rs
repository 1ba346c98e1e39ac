use rand::Rng;

use crate::minigame::challenge::{Challenge, ChallengeError, ChallengeInput, ChallengeView};
use crate::minigame::session::SessionCtx;

const TIME_LIMIT_SECS: u32 = 8;
const ATTEMPTS: u32 = 2;
const EARLY_FLASH_MS: u64 = 300;

const ARM: u32 = 1;
const CLEAR_EARLY: u32 = 2;

/// Tap as soon as the target lights up, which happens 2 to 5 seconds in.
/// Tapping before that costs an attempt.
#[derive(Debug, Default)]
pub struct ReflexHit {
    started: bool,
    armed: bool,
    early: bool,
    attempts_left: u32,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(ReflexHit::default()))
}

impl ReflexHit {
    fn view(&self) -> ChallengeView {
        ChallengeView::Reflex {
            armed: self.armed,
            attempts_left: self.attempts_left,
            early: self.early,
        }
    }
}

impl Challenge for ReflexHit {
    fn kind(&self) -> &'static str {
        "reflex_hit"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        self.started = true;
        self.attempts_left = ATTEMPTS;
        ctx.render(self.view());
        ctx.start_countdown(TIME_LIMIT_SECS, "TOO SLOW");
        let delay = ctx.rng().random_range(2000..5000);
        ctx.set_timeout(delay, ARM);
        Ok(())
    }

    fn handle_input(
        &mut self,
        input: &ChallengeInput,
        ctx: &mut SessionCtx<'_>,
    ) -> Result<(), ChallengeError> {
        if !self.started {
            return Err(ChallengeError::NotStarted);
        }
        if *input != ChallengeInput::Tap {
            return Ok(());
        }
        if self.armed {
            ctx.finish(true, "EXCELLENT");
            return Ok(());
        }
        self.attempts_left = self.attempts_left.saturating_sub(1);
        self.early = true;
        ctx.render(self.view());
        ctx.set_timeout(EARLY_FLASH_MS, CLEAR_EARLY);
        if self.attempts_left == 0 {
            ctx.finish(false, "FAILED");
        }
        Ok(())
    }

    fn on_timer(&mut self, tag: u32, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        match tag {
            ARM => self.armed = true,
            CLEAR_EARLY => self.early = false,
            other => return Err(ChallengeError::UnknownTimer(other)),
        }
        ctx.render(self.view());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::harness::Harness;

    #[test]
    fn tap_after_flash_succeeds() {
        let mut h = Harness::new("reflex_hit");
        let mut game = ReflexHit::default();
        h.start(&mut game);
        h.advance(&mut game, 1_999);
        assert!(!game.armed);
        h.advance(&mut game, 3_001);
        assert!(game.armed);
        h.input(&mut game, ChallengeInput::Tap);
        assert_eq!(h.outcome().unwrap().reason, "EXCELLENT");
    }

    #[test]
    fn two_early_taps_fail() {
        let mut h = Harness::new("reflex_hit");
        let mut game = ReflexHit::default();
        h.start(&mut game);
        h.input(&mut game, ChallengeInput::Tap);
        assert_eq!(game.attempts_left, 1);
        assert!(h.outcome().is_none());
        h.input(&mut game, ChallengeInput::Tap);
        assert_eq!(h.outcome().unwrap().reason, "FAILED");
        assert_eq!(h.session.live_timers(), 0);
    }

    #[test]
    fn no_tap_is_too_slow() {
        let mut h = Harness::new("reflex_hit");
        let mut game = ReflexHit::default();
        h.start(&mut game);
        h.advance(&mut game, 8_000);
        assert_eq!(h.outcome().unwrap().reason, "TOO SLOW");
    }
}
