use serde::{Deserialize, Serialize};

/// Team abilities purchasable with ability points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityId {
    InstantCharge,
    ShieldBreak,
    GlobalShield,
    Boost,
    Freeze,
}

impl AbilityId {
    /// Catalog order, cheapest first.
    pub const ALL: [AbilityId; 5] = [
        AbilityId::InstantCharge,
        AbilityId::ShieldBreak,
        AbilityId::GlobalShield,
        AbilityId::Boost,
        AbilityId::Freeze,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InstantCharge => "instant_charge",
            Self::ShieldBreak => "shield_break",
            Self::GlobalShield => "global_shield",
            Self::Boost => "boost",
            Self::Freeze => "freeze",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == id)
    }

    /// Cost before the configured multiplier is applied.
    pub fn base_cost(self) -> u32 {
        match self {
            Self::InstantCharge => 150,
            Self::ShieldBreak => 200,
            Self::GlobalShield => 250,
            Self::Boost => 300,
            Self::Freeze => 400,
        }
    }

    /// Menu title.
    pub fn label(self) -> &'static str {
        match self {
            Self::InstantCharge => "INSTANT CHARGE",
            Self::ShieldBreak => "EMP BLAST",
            Self::GlobalShield => "GLOBAL SHIELD",
            Self::Boost => "OVERCLOCK (2x)",
            Self::Freeze => "JAMMER",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::InstantCharge => "Refill your capture battery",
            Self::ShieldBreak => "Strip every enemy shield",
            Self::GlobalShield => "Shield all nodes your team holds",
            Self::Boost => "Double team scoring for a while",
            Self::Freeze => "Lock the enemy team out of captures",
        }
    }
}

impl std::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective cost: `min(floor(base * multiplier), max_ap)`.
///
/// Negative and NaN multipliers count as zero.
pub fn ability_cost(base: u32, multiplier: f64, max_ap: u32) -> u32 {
    let scaled = (f64::from(base) * multiplier.max(0.0)).floor();
    // `as` saturates, so an infinite multiplier lands on u32::MAX before the cap.
    (scaled as u32).min(max_ap)
}
