//! Built-in challenge variants. Each module exposes a `create` factory.

pub mod binary_switches;
pub mod brute_force;
pub mod code_breaker;
pub mod frequency_match;
pub mod math_hack;
pub mod memory_matrix;
pub mod reflex_hit;
pub mod sequence_order;
pub mod slider_lock;
pub mod wire_cut;
