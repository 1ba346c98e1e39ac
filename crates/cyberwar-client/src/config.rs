use std::path::Path;

use serde::Deserialize;

use crate::minigame::registry::DEFAULT_CHALLENGE;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "cyberwar.toml";

/// Top-level client configuration, loaded from `cyberwar.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub timing: TimingConfig,
    pub minigame: MinigameConfig,
    pub hud: HudConfig,
}

/// Local tick periods and snapshot drift handling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub clock_tick_ms: u64,
    pub shield_tick_ms: u64,
    /// Clock anchors closer than this to the current one are ignored.
    pub drift_tolerance_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            clock_tick_ms: 1000,
            shield_tick_ms: 100,
            drift_tolerance_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MinigameConfig {
    /// How long the terminal message stays up before the outcome is sent.
    pub feedback_ms: u64,
    pub default_challenge: String,
    /// Fixed seed for puzzle generation. Random when unset.
    pub rng_seed: Option<u64>,
}

impl Default for MinigameConfig {
    fn default() -> Self {
        Self {
            feedback_ms: 1000,
            default_challenge: DEFAULT_CHALLENGE.to_string(),
            rng_seed: None,
        }
    }
}

/// Transient HUD effect durations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub capture_annotation_ms: u64,
    pub shield_expiring_secs: u64,
    pub battery_animation_ms: u64,
    pub battery_flash_ms: u64,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            capture_annotation_ms: 3000,
            shield_expiring_secs: 5,
            battery_animation_ms: 2000,
            battery_flash_ms: 500,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config read error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Invalid(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ClientConfig {
    /// Load config from `cyberwar.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match Self::from_file(Path::new(CONFIG_FILE)) {
            Ok(cfg) => {
                tracing::info!("Loaded configuration from {CONFIG_FILE}");
                cfg
            },
            Err(ConfigError::Io(_)) => {
                tracing::info!("No {CONFIG_FILE} found, using defaults");
                Self::default()
            },
            Err(e) => {
                tracing::warn!("{e}, using defaults");
                Self::default()
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Apply `CYBERWAR_*` overrides. Unparseable and empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("CYBERWAR_CLOCK_TICK_MS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.timing.clock_tick_ms = n;
        }
        if let Some(val) = lookup("CYBERWAR_SHIELD_TICK_MS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.timing.shield_tick_ms = n;
        }
        if let Some(val) = lookup("CYBERWAR_DRIFT_TOLERANCE_MS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.timing.drift_tolerance_ms = n;
        }
        if let Some(val) = lookup("CYBERWAR_FEEDBACK_MS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.minigame.feedback_ms = n;
        }
        if let Some(kind) = lookup("CYBERWAR_DEFAULT_CHALLENGE")
            && !kind.is_empty()
        {
            self.minigame.default_challenge = kind;
        }
        if let Some(val) = lookup("CYBERWAR_RNG_SEED")
            && let Ok(n) = val.parse::<u64>()
        {
            self.minigame.rng_seed = Some(n);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.clock_tick_ms == 0 {
            return Err(ConfigError::Invalid("timing.clock_tick_ms must be > 0".into()));
        }
        if self.timing.shield_tick_ms == 0 {
            return Err(ConfigError::Invalid("timing.shield_tick_ms must be > 0".into()));
        }
        if self.timing.shield_tick_ms > 1000 {
            return Err(ConfigError::Invalid(
                "timing.shield_tick_ms must be at most 1000".into(),
            ));
        }
        if self.minigame.default_challenge.is_empty() {
            return Err(ConfigError::Invalid(
                "minigame.default_challenge must not be empty".into(),
            ));
        }
        if self.hud.capture_annotation_ms == 0 {
            tracing::warn!("hud.capture_annotation_ms is 0, capture annotations will not show");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.timing.clock_tick_ms, 1000);
        assert_eq!(cfg.timing.shield_tick_ms, 100);
        assert_eq!(cfg.timing.drift_tolerance_ms, 2000);
        assert_eq!(cfg.minigame.feedback_ms, 1000);
        assert_eq!(cfg.minigame.default_challenge, "code_breaker");
        assert!(cfg.minigame.rng_seed.is_none());
        assert_eq!(cfg.hud.capture_annotation_ms, 3000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[timing]
drift_tolerance_ms = 500

[minigame]
rng_seed = 42
"#;
        let cfg: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.timing.drift_tolerance_ms, 500);
        assert_eq!(cfg.timing.clock_tick_ms, 1000);
        assert_eq!(cfg.minigame.rng_seed, Some(42));
        assert_eq!(cfg.hud, HudConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("CYBERWAR_DRIFT_TOLERANCE_MS", "3000"),
            ("CYBERWAR_DEFAULT_CHALLENGE", "wire_cut"),
            ("CYBERWAR_RNG_SEED", "not-a-number"),
            ("CYBERWAR_FEEDBACK_MS", ""),
        ]
        .into_iter()
        .collect();
        let mut cfg = ClientConfig::default();
        cfg.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(cfg.timing.drift_tolerance_ms, 3000);
        assert_eq!(cfg.minigame.default_challenge, "wire_cut");
        assert!(cfg.minigame.rng_seed.is_none());
        assert_eq!(cfg.minigame.feedback_ms, 1000);
    }

    #[test]
    fn validate_rejects_zero_ticks() {
        let mut cfg = ClientConfig::default();
        cfg.timing.shield_tick_ms = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ClientConfig::from_file(Path::new("/nonexistent/cyberwar.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(toml::from_str::<ClientConfig>("[timing\nclock_tick_ms = 1").is_err());
    }
}
