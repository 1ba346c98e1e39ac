use rand::seq::index;

use crate::minigame::challenge::{
    Challenge, ChallengeError, ChallengeInput, ChallengeView, TIMEOUT_REASON,
};
use crate::minigame::session::SessionCtx;

const SLOTS: usize = 9;
const COUNT: u8 = 5;
const TIME_LIMIT_SECS: u32 = 8;

/// Numbers 1 to 5 are scattered over a 3x3 grid; pick them in ascending order.
#[derive(Debug, Default)]
pub struct SequenceOrder {
    slots: Vec<Option<u8>>,
    next: u8,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(SequenceOrder::default()))
}

impl SequenceOrder {
    fn view(&self) -> ChallengeView {
        ChallengeView::Sequence {
            slots: self.slots.clone(),
            next: self.next,
        }
    }
}

impl Challenge for SequenceOrder {
    fn kind(&self) -> &'static str {
        "sequence_order"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        self.slots = vec![None; SLOTS];
        let positions = index::sample(ctx.rng(), SLOTS, usize::from(COUNT));
        for (value, slot) in (1..=COUNT).zip(positions.iter()) {
            self.slots[slot] = Some(value);
        }
        self.next = 1;
        ctx.render(self.view());
        ctx.start_countdown(TIME_LIMIT_SECS, TIMEOUT_REASON);
        Ok(())
    }

    fn handle_input(
        &mut self,
        input: &ChallengeInput,
        ctx: &mut SessionCtx<'_>,
    ) -> Result<(), ChallengeError> {
        if self.slots.is_empty() {
            return Err(ChallengeError::NotStarted);
        }
        let ChallengeInput::Pick { index } = input else {
            return Ok(());
        };
        // Empty cells are inert.
        let Some(Some(value)) = self.slots.get(*index).copied() else {
            return Ok(());
        };
        if value != self.next {
            ctx.finish(false, "WRONG ORDER");
            return Ok(());
        }
        self.next += 1;
        ctx.render(self.view());
        if self.next > COUNT {
            ctx.finish(true, "SORTED");
        }
        Ok(())
    }
}
