use serde::{Deserialize, Serialize};

use super::session::SessionCtx;

/// Failure reason reported when the shared countdown runs out.
pub const TIMEOUT_REASON: &str = "TIMEOUT";

/// Failure reason reported when a challenge faults.
pub const CLIENT_ERROR_REASON: &str = "CLIENT ERROR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    /// Input or timer arrived before `start`.
    NotStarted,
    UnknownTimer(u32),
    Construction(String),
    Internal(String),
}

impl std::fmt::Display for ChallengeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "challenge not started"),
            Self::UnknownTimer(tag) => write!(f, "unknown challenge timer: {tag}"),
            Self::Construction(e) => write!(f, "challenge construction failed: {e}"),
            Self::Internal(e) => write!(f, "challenge fault: {e}"),
        }
    }
}

impl std::error::Error for ChallengeError {}

/// A single player action on the challenge surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChallengeInput {
    /// A typed character or keypad digit.
    Key { key: char },
    Backspace,
    Clear,
    /// Submit, check, stop or lock, depending on the challenge.
    Submit,
    Pick { index: usize },
    Tap,
    Slide { value: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl WireColor {
    pub const ALL: [WireColor; 4] = [
        WireColor::Red,
        WireColor::Blue,
        WireColor::Green,
        WireColor::Yellow,
    ];
}

/// What a challenge currently shows on the challenge surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeView {
    CodeEntry {
        target: String,
        entry: String,
        attempts_left: u32,
        rejected: bool,
    },
    Sum {
        a: u32,
        b: u32,
        entry: String,
    },
    Wires {
        wires: Vec<WireColor>,
        target: WireColor,
    },
    Reflex {
        armed: bool,
        attempts_left: u32,
        early: bool,
    },
    Slider {
        zone_start: f64,
        zone_width: f64,
        sweep_ms: u64,
    },
    MemoryGrid {
        cells: usize,
        lit: Option<usize>,
        accepting: bool,
        matched: usize,
        goal: usize,
    },
    BruteForce {
        taps: u32,
        goal: u32,
    },
    Switches {
        target: Vec<bool>,
        current: Vec<bool>,
    },
    Sequence {
        slots: Vec<Option<u8>>,
        next: u8,
    },
    Frequency {
        target: u32,
        current: u32,
    },
}

/// A timed, input-driven task gating a capture attempt.
///
/// Implementations never own timers directly: they request them through
/// [`SessionCtx`], which releases all of them when the session finishes.
pub trait Challenge {
    fn kind(&self) -> &'static str;

    /// Roll the puzzle, render it and start any countdown.
    fn start(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError>;

    fn handle_input(
        &mut self,
        input: &ChallengeInput,
        ctx: &mut SessionCtx<'_>,
    ) -> Result<(), ChallengeError>;

    /// A timer requested with [`SessionCtx::set_timeout`] fired.
    fn on_timer(&mut self, tag: u32, _ctx: &mut SessionCtx<'_>) -> Result<(), ChallengeError> {
        Err(ChallengeError::UnknownTimer(tag))
    }
}

/// Factory function type: creates a new, unstarted challenge.
pub type ChallengeFactory = fn() -> Result<Box<dyn Challenge>, ChallengeError>;
