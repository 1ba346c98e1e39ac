use rand::Rng;

use crate::minigame::challenge::{
    Challenge, ChallengeError, ChallengeInput, ChallengeView, TIMEOUT_REASON,
};
use crate::minigame::session::SessionCtx;

const BITS: usize = 5;
const TIME_LIMIT_SECS: u32 = 10;

/// Flip the switches until they match the target bit pattern, then check.
#[derive(Debug, Default)]
pub struct BinarySwitches {
    target: Vec<bool>,
    current: Vec<bool>,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(BinarySwitches::default()))
}

impl BinarySwitches {
    fn view(&self) -> ChallengeView {
        ChallengeView::Switches {
            target: self.target.clone(),
            current: self.current.clone(),
        }
    }
}

impl Challenge for BinarySwitches {
    fn kind(&self) -> &'static str {
        "binary_switches"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        self.target = (0..BITS).map(|_| ctx.rng().random_bool(0.5)).collect();
        self.current = vec![false; BITS];
        ctx.render(self.view());
        ctx.start_countdown(TIME_LIMIT_SECS, TIMEOUT_REASON);
        Ok(())
    }

    fn handle_input(
        &mut self,
        input: &ChallengeInput,
        ctx: &mut SessionCtx<'_>,
    ) -> Result<(), ChallengeError> {
        if self.target.is_empty() {
            return Err(ChallengeError::NotStarted);
        }
        match input {
            ChallengeInput::Pick { index } => {
                if let Some(bit) = self.current.get_mut(*index) {
                    *bit = !*bit;
                    ctx.render(self.view());
                }
            },
            ChallengeInput::Submit => {
                if self.current == self.target {
                    ctx.finish(true, "SYNCED");
                } else {
                    ctx.finish(false, "MISMATCH");
                }
            },
            _ => {},
        }
        Ok(())
    }
}
