use rand::seq::index;

use crate::minigame::challenge::{
    Challenge, ChallengeError, ChallengeInput, ChallengeView, TIMEOUT_REASON,
};
use crate::minigame::session::SessionCtx;

const GRID_CELLS: usize = 9;
const PATTERN_LEN: usize = 5;
const TIME_LIMIT_SECS: u32 = 8;
const FIRST_LIGHT_MS: u64 = 500;
const LIGHT_STEP_MS: u64 = 600;
const LIGHT_ON_MS: u64 = 400;

// Timer tags: 2i lights step i, 2i+1 turns it off, INPUT_PHASE opens input.
const INPUT_PHASE: u32 = 100;

/// Watch five cells light up in turn, then repeat the order.
#[derive(Debug, Default)]
pub struct MemoryMatrix {
    pattern: Vec<usize>,
    lit: Option<usize>,
    accepting: bool,
    matched: usize,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(MemoryMatrix::default()))
}

impl MemoryMatrix {
    fn view(&self) -> ChallengeView {
        ChallengeView::MemoryGrid {
            cells: GRID_CELLS,
            lit: self.lit,
            accepting: self.accepting,
            matched: self.matched,
            goal: PATTERN_LEN,
        }
    }
}

impl Challenge for MemoryMatrix {
    fn kind(&self) -> &'static str {
        "memory_matrix"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        self.pattern = index::sample(ctx.rng(), GRID_CELLS, PATTERN_LEN).into_vec();
        ctx.render(self.view());
        let mut delay = FIRST_LIGHT_MS;
        for step in 0..PATTERN_LEN as u32 {
            ctx.set_timeout(delay, step * 2);
            ctx.set_timeout(delay + LIGHT_ON_MS, step * 2 + 1);
            delay += LIGHT_STEP_MS;
        }
        // The countdown only starts once the pattern has played.
        ctx.set_timeout(delay, INPUT_PHASE);
        Ok(())
    }

    fn handle_input(
        &mut self,
        input: &ChallengeInput,
        ctx: &mut SessionCtx<'_>,
    ) -> Result<(), ChallengeError> {
        if self.pattern.is_empty() {
            return Err(ChallengeError::NotStarted);
        }
        let ChallengeInput::Pick { index } = input else {
            return Ok(());
        };
        if !self.accepting {
            return Ok(());
        }
        if self.pattern.get(self.matched) == Some(index) {
            self.matched += 1;
            ctx.render(self.view());
            if self.matched == PATTERN_LEN {
                ctx.finish(true, "MEMORY MATCH");
            }
        } else {
            ctx.finish(false, "CORRUPTED");
        }
        Ok(())
    }

    fn on_timer(&mut self, tag: u32, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        match tag {
            INPUT_PHASE => {
                self.lit = None;
                self.accepting = true;
                ctx.render(self.view());
                ctx.start_countdown(TIME_LIMIT_SECS, TIMEOUT_REASON);
            },
            t if (t as usize) < PATTERN_LEN * 2 => {
                let step = t as usize / 2;
                self.lit = if t % 2 == 0 {
                    Some(self.pattern[step])
                } else {
                    None
                };
                ctx.render(self.view());
            },
            other => return Err(ChallengeError::UnknownTimer(other)),
        }
        Ok(())
    }
}
