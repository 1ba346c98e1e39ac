pub mod challenge;
pub mod challenges;
pub mod engine;
pub mod registry;
pub mod session;

pub use challenge::{Challenge, ChallengeError, ChallengeInput, ChallengeView};
pub use engine::MinigameEngine;
pub use registry::ChallengeRegistry;
