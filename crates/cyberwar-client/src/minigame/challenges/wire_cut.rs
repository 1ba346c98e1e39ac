use rand::seq::IndexedRandom;

use crate::minigame::challenge::{
    Challenge, ChallengeError, ChallengeInput, ChallengeView, WireColor,
};
use crate::minigame::session::SessionCtx;

const TIME_LIMIT_SECS: u32 = 10;

/// Cut the wire of the named color.
#[derive(Debug, Default)]
pub struct WireCut {
    target: Option<WireColor>,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(WireCut::default()))
}

impl Challenge for WireCut {
    fn kind(&self) -> &'static str {
        "wire_cut"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        let target = *WireColor::ALL
            .choose(ctx.rng())
            .ok_or_else(|| ChallengeError::Internal("no wire colors".to_string()))?;
        self.target = Some(target);
        ctx.render(ChallengeView::Wires {
            wires: WireColor::ALL.to_vec(),
            target,
        });
        ctx.start_countdown(TIME_LIMIT_SECS, "BOOM!");
        Ok(())
    }

    fn handle_input(
        &mut self,
        input: &ChallengeInput,
        ctx: &mut SessionCtx<'_>,
    ) -> Result<(), ChallengeError> {
        let target = self.target.ok_or(ChallengeError::NotStarted)?;
        if let ChallengeInput::Pick { index } = input
            && let Some(color) = WireColor::ALL.get(*index)
        {
            if *color == target {
                ctx.finish(true, "DEFUSED");
            } else {
                ctx.finish(false, "WRONG WIRE");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::harness::Harness;

    fn index_of(color: WireColor) -> usize {
        WireColor::ALL.iter().position(|c| *c == color).unwrap()
    }

    #[test]
    fn cutting_target_defuses() {
        let mut h = Harness::new("wire_cut");
        let mut game = WireCut::default();
        h.start(&mut game);
        let index = index_of(game.target.unwrap());
        h.input(&mut game, ChallengeInput::Pick { index });
        assert_eq!(h.outcome().unwrap().reason, "DEFUSED");
    }

    #[test]
    fn cutting_other_wire_fails() {
        let mut h = Harness::new("wire_cut");
        let mut game = WireCut::default();
        h.start(&mut game);
        let index = (index_of(game.target.unwrap()) + 1) % WireColor::ALL.len();
        h.input(&mut game, ChallengeInput::Pick { index });
        assert_eq!(h.outcome().unwrap().reason, "WRONG WIRE");
    }

    #[test]
    fn out_of_range_pick_is_ignored() {
        let mut h = Harness::new("wire_cut");
        let mut game = WireCut::default();
        h.start(&mut game);
        h.input(&mut game, ChallengeInput::Pick { index: 9 });
        assert!(h.outcome().is_none());
    }

    #[test]
    fn timeout_explodes() {
        let mut h = Harness::new("wire_cut");
        let mut game = WireCut::default();
        h.start(&mut game);
        h.advance(&mut game, 10_000);
        assert_eq!(h.outcome().unwrap().reason, "BOOM!");
    }
}
