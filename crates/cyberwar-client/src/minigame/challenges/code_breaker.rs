use rand::seq::IndexedRandom;

use crate::minigame::challenge::{
    Challenge, ChallengeError, ChallengeInput, ChallengeView, TIMEOUT_REASON,
};
use crate::minigame::session::SessionCtx;

const CODES: [&str; 7] = ["A7X9", "B3TA", "R00T", "HACK", "N30N", "CYBER", "SHELL"];
const ATTEMPTS: u32 = 3;
const TIME_LIMIT_SECS: u32 = 15;
const MAX_ENTRY_LEN: usize = 6;
const REJECT_FLASH_MS: u64 = 300;

const CLEAR_REJECT: u32 = 1;

/// Retype the displayed code. Three wrong submissions lock the node out.
#[derive(Debug, Default)]
pub struct CodeBreaker {
    target: String,
    entry: String,
    attempts_left: u32,
    rejected: bool,
}

pub fn create() -> Result<Box<dyn Challenge>, ChallengeError> {
    Ok(Box::new(CodeBreaker::default()))
}

impl CodeBreaker {
    fn view(&self) -> ChallengeView {
        ChallengeView::CodeEntry {
            target: self.target.clone(),
            entry: self.entry.clone(),
            attempts_left: self.attempts_left,
            rejected: self.rejected,
        }
    }

    fn submit(&mut self, ctx: &mut SessionCtx<'_>) {
        if self.entry.eq_ignore_ascii_case(&self.target) {
            ctx.finish(true, "ACCESS GRANTED");
            return;
        }
        self.attempts_left = self.attempts_left.saturating_sub(1);
        self.entry.clear();
        self.rejected = true;
        ctx.render(self.view());
        ctx.set_timeout(REJECT_FLASH_MS, CLEAR_REJECT);
        if self.attempts_left == 0 {
            ctx.finish(false, "LOCKOUT");
        }
    }
}

impl Challenge for CodeBreaker {
    fn kind(&self) -> &'static str {
        "code_breaker"
    }

    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        let code = CODES
            .choose(ctx.rng())
            .ok_or_else(|| ChallengeError::Internal("empty code list".to_string()))?;
        self.target = (*code).to_string();
        self.attempts_left = ATTEMPTS;
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
            ChallengeInput::Key { key } if key.is_ascii_alphanumeric() => {
                if self.entry.len() < MAX_ENTRY_LEN {
                    self.entry.push(key.to_ascii_uppercase());
                    ctx.render(self.view());
                }
            },
            ChallengeInput::Backspace => {
                self.entry.pop();
                ctx.render(self.view());
            },
            ChallengeInput::Clear => {
                self.entry.clear();
                ctx.render(self.view());
            },
            ChallengeInput::Submit => self.submit(ctx),
            _ => {},
        }
        Ok(())
    }

    fn on_timer(&mut self, tag: u32, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        match tag {
            CLEAR_REJECT => {
                self.rejected = false;
                ctx.render(self.view());
                Ok(())
            },
            other => Err(ChallengeError::UnknownTimer(other)),
        }
    }
}
