use rand::Rng;

use crate::minigame::challenge::{Challenge, ChallengeError, ChallengeInput, ChallengeView};
use crate::minigame::session::SessionCtx;

const TIME_LIMIT_SECS: u32 = 10;
const START_VALUE: u32 = 50;
const MAX_VALUE: u32 = 100;
const TOLERANCE: u32 = 3;

/// Tune a dial to within three units of the target frequency and lock it.
#[derive(Debug, Default)]
pub struct FrequencyMatch {
    target: Option<u32>,
    current: u32,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(FrequencyMatch::default()))
}

impl Challenge for FrequencyMatch {
    fn kind(&self) -> &'static str {
        "frequency_match"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        let target = ctx.rng().random_range(10..90);
        self.target = Some(target);
        self.current = START_VALUE;
        ctx.render(ChallengeView::Frequency {
            target,
            current: self.current,
        });
        ctx.start_countdown(TIME_LIMIT_SECS, "SIGNAL LOST");
        Ok(())
    }

    fn handle_input(
        &mut self,
        input: &ChallengeInput,
        ctx: &mut SessionCtx<'_>,
    ) -> Result<(), ChallengeError> {
        let target = self.target.ok_or(ChallengeError::NotStarted)?;
        match input {
            ChallengeInput::Slide { value } => {
                self.current = (*value).min(MAX_VALUE);
                ctx.render(ChallengeView::Frequency {
                    target,
                    current: self.current,
                });
            },
            ChallengeInput::Submit => {
                if self.current.abs_diff(target) <= TOLERANCE {
                    ctx.finish(true, "LOCKED");
                } else {
                    ctx.finish(false, "NOISY SIGNAL");
                }
            },
            _ => {},
        }
        Ok(())
    }
}
