use crate::minigame::challenge::{Challenge, ChallengeError, ChallengeInput, ChallengeView};
use crate::minigame::session::SessionCtx;

const GOAL: u32 = 25;
const TIME_LIMIT_SECS: u32 = 7;

#[derive(Debug, Default)]
pub struct BruteForce {
    started: bool,
    taps: u32,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(BruteForce::default()))
}

impl Challenge for BruteForce {
    fn kind(&self) -> &'static str {
        "brute_force"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        self.started = true;
        ctx.render(ChallengeView::BruteForce {
            taps: 0,
            goal: GOAL,
        });
        ctx.start_countdown(TIME_LIMIT_SECS, "WALL INTACT");
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
        if *input == ChallengeInput::Tap {
            self.taps += 1;
            ctx.render(ChallengeView::BruteForce {
                taps: self.taps,
                goal: GOAL,
            });
            if self.taps >= GOAL {
                ctx.finish(true, "BREACHED");
            }
        }
        Ok(())
    }
}
