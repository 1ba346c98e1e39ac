use rand::Rng;

use crate::minigame::challenge::{
    Challenge, ChallengeError, ChallengeInput, ChallengeView, TIMEOUT_REASON,
};
use crate::minigame::session::SessionCtx;

const TIME_LIMIT_SECS: u32 = 12;
const MAX_DIGITS: usize = 5;

/// Key in the sum of two small numbers. One submission only.
#[derive(Debug, Default)]
pub struct MathHack {
    a: u32,
    b: u32,
    entry: String,
    started: bool,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(MathHack::default()))
}

impl MathHack {
    fn view(&self) -> ChallengeView {
        ChallengeView::Sum {
            a: self.a,
            b: self.b,
            entry: self.entry.clone(),
        }
    }
}

impl Challenge for MathHack {
    fn kind(&self) -> &'static str {
        "math_hack"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        self.a = ctx.rng().random_range(5..25);
        self.b = ctx.rng().random_range(2..17);
        self.started = true;
        ctx.render(self.view());
        ctx.start_countdown(TIME_LIMIT_SECS, TIMEOUT_REASON);
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
        match input {
            ChallengeInput::Key { key } if key.is_ascii_digit() => {
                if self.entry.len() < MAX_DIGITS {
                    self.entry.push(*key);
                    ctx.render(self.view());
                }
            },
            ChallengeInput::Clear => {
                self.entry.clear();
                ctx.render(self.view());
            },
            ChallengeInput::Submit => {
                if self.entry.parse::<u32>().ok() == Some(self.a + self.b) {
                    ctx.finish(true, "VERIFIED");
                } else {
                    ctx.finish(false, "ERROR");
                }
            },
            _ => {},
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::harness::Harness;

    fn enter(h: &mut Harness, game: &mut MathHack, digits: &str) {
        for key in digits.chars() {
            h.input(&mut *game, ChallengeInput::Key { key });
        }
        h.input(&mut *game, ChallengeInput::Submit);
    }

    #[test]
    fn operands_within_range() {
        for _ in 0..20 {
            let mut h = Harness::new("math_hack");
            let mut game = MathHack::default();
            h.start(&mut game);
            assert!((5..25).contains(&game.a));
            assert!((2..17).contains(&game.b));
        }
    }

    #[test]
    fn correct_sum_verifies() {
        let mut h = Harness::new("math_hack");
        let mut game = MathHack::default();
        h.start(&mut game);
        let answer = (game.a + game.b).to_string();
        enter(&mut h, &mut game, &answer);
        assert_eq!(h.outcome().unwrap().reason, "VERIFIED");
    }

    #[test]
    fn wrong_or_empty_sum_errors() {
        let mut h = Harness::new("math_hack");
        let mut game = MathHack::default();
        h.start(&mut game);
        enter(&mut h, &mut game, "");
        let outcome = h.outcome().unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reason, "ERROR");
    }

    #[test]
    fn only_digits_accepted_up_to_five() {
        let mut h = Harness::new("math_hack");
        let mut game = MathHack::default();
        h.start(&mut game);
        for key in "12x3456".chars() {
            h.input(&mut game, ChallengeInput::Key { key });
        }
        assert_eq!(game.entry, "12345");
        h.input(&mut game, ChallengeInput::Clear);
        assert_eq!(game.entry, "");
    }
}
