use std::collections::HashMap;

use super::challenge::ChallengeFactory;
use super::challenges;

/// Challenge used when the server names a type this client does not know.
pub const DEFAULT_CHALLENGE: &str = "code_breaker";

/// Registry mapping challenge type ids to factory functions.
pub struct ChallengeRegistry {
    factories: HashMap<&'static str, ChallengeFactory>,
    default_kind: &'static str,
}

impl Default for ChallengeRegistry {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
            default_kind: DEFAULT_CHALLENGE,
        }
    }
}

impl ChallengeRegistry {
    /// Registry populated with every built-in challenge.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register("code_breaker", challenges::code_breaker::create);
        registry.register("math_hack", challenges::math_hack::create);
        registry.register("wire_cut", challenges::wire_cut::create);
        registry.register("reflex_hit", challenges::reflex_hit::create);
        registry.register("slider_lock", challenges::slider_lock::create);
        registry.register("memory_matrix", challenges::memory_matrix::create);
        registry.register("brute_force", challenges::brute_force::create);
        registry.register("binary_switches", challenges::binary_switches::create);
        registry.register("sequence_order", challenges::sequence_order::create);
        registry.register("frequency_match", challenges::frequency_match::create);
        registry
    }

    pub fn register(&mut self, kind: &'static str, factory: ChallengeFactory) {
        self.factories.insert(kind, factory);
    }

    /// Change the fallback type. Returns false if `kind` is not registered.
    pub fn set_default(&mut self, kind: &str) -> bool {
        match self.factories.get_key_value(kind) {
            Some((registered, _)) => {
                self.default_kind = *registered;
                true
            },
            None => false,
        }
    }

    pub fn default_kind(&self) -> &'static str {
        self.default_kind
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Factory for `kind`, falling back to the default challenge.
    pub fn resolve(&self, kind: &str) -> Option<(&'static str, ChallengeFactory)> {
        self.factories
            .get_key_value(kind)
            .or_else(|| self.factories.get_key_value(self.default_kind))
            .map(|(k, f)| (*k, *f))
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.factories.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}
