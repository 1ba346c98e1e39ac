use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One of the two competing teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Blue => "BLUE",
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current owner of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Owner {
    #[default]
    Neutral,
    Red,
    Blue,
}

impl Owner {
    pub fn team(self) -> Option<Team> {
        match self {
            Self::Neutral => None,
            Self::Red => Some(Team::Red),
            Self::Blue => Some(Team::Blue),
        }
    }
}

impl From<Team> for Owner {
    fn from(team: Team) -> Self {
        match team {
            Team::Red => Self::Red,
            Team::Blue => Self::Blue,
        }
    }
}

/// How quickly the owning team completed its last capture of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaptureSpeed {
    Fast,
    Normal,
    Slow,
}

impl CaptureSpeed {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "FAST",
            Self::Normal => "NORMAL",
            Self::Slow => "SLOW",
        }
    }
}

/// Server view of a single node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    #[serde(default)]
    pub owner: Owner,
    /// Absolute shield expiry in epoch seconds, `0` when unshielded.
    #[serde(default)]
    pub shield_end: f64,
    #[serde(default)]
    pub capture_speed: Option<CaptureSpeed>,
}

impl NodeState {
    /// Human-readable status line for the node card.
    pub fn status_label(&self) -> String {
        match (self.owner.team(), self.capture_speed) {
            (None, _) => "NEUTRAL".to_string(),
            (Some(team), None) => format!("{team} TEAM"),
            (Some(team), Some(speed)) => format!("{team} TEAM | {}", speed.as_str()),
        }
    }
}

/// A value kept once per team. Missing keys on the wire read as the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPair<T> {
    #[serde(rename = "RED", default)]
    pub red: T,
    #[serde(rename = "BLUE", default)]
    pub blue: T,
}

impl<T> TeamPair<T> {
    pub fn new(red: T, blue: T) -> Self {
        Self { red, blue }
    }

    pub fn get(&self, team: Team) -> &T {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> &mut T {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }
}

/// Timed team-wide effects, both as absolute epoch seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamModifiers {
    #[serde(default)]
    pub score_boost_end: f64,
    #[serde(default)]
    pub frozen_end: f64,
}

/// Tunable rule values broadcast by the game master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub max_score: f64,
    pub max_ap: u32,
    pub battery_drain_enabled: bool,
    pub ability_cost_multiplier: f64,
    pub shield_duration_fast: u32,
    pub shield_duration_normal: u32,
    pub hack_bonus_fast: u32,
    pub hack_bonus_normal: u32,
    /// Ability ids hidden from selection. Unrecognized ids are kept and never match.
    pub excluded_abilities: BTreeSet<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            max_score: 1000.0,
            max_ap: 400,
            battery_drain_enabled: true,
            ability_cost_multiplier: 1.0,
            shield_duration_fast: 45,
            shield_duration_normal: 15,
            hack_bonus_fast: 10,
            hack_bonus_normal: 5,
            excluded_abilities: BTreeSet::new(),
        }
    }
}

impl RuleConfig {
    pub fn is_excluded(&self, ability_id: &str) -> bool {
        self.excluded_abilities.contains(ability_id)
    }
}

/// Team assignment of a player, including non-playing observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerTeam {
    Red,
    Blue,
    #[default]
    Spectator,
}

impl From<Team> for PlayerTeam {
    fn from(team: Team) -> Self {
        match team {
            Team::Red => Self::Red,
            Team::Blue => Self::Blue,
        }
    }
}

impl PlayerTeam {
    pub fn team(self) -> Option<Team> {
        match self {
            Self::Red => Some(Team::Red),
            Self::Blue => Some(Team::Blue),
            Self::Spectator => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team: PlayerTeam,
    #[serde(default)]
    pub ability_points: u32,
    #[serde(default)]
    pub charged: bool,
    #[serde(default)]
    pub is_gm: bool,
    #[serde(default)]
    pub is_team_lead: bool,
}

/// Complete server-authored description of current game truth.
///
/// Every field is optional on the wire. An absent field carries no
/// information; a present field replaces whatever the client knew before.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<BTreeMap<String, NodeState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<TeamPair<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_scores: Option<TeamPair<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<TeamPair<TeamModifiers>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RuleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<BTreeMap<String, PlayerState>>,
    #[serde(default)]
    pub game_active: bool,
    /// Seconds elapsed since match start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ap: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue_team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_multiplier: Option<f64>,
}

impl Snapshot {
    pub fn player(&self, player_id: &str) -> Option<&PlayerState> {
        self.players.as_ref()?.get(player_id)
    }

    /// Score ceiling, preferring the top-level value over the one inside `config`.
    pub fn max_score(&self) -> Option<f64> {
        self.max_score
            .or_else(|| self.config.as_ref().map(|c| c.max_score))
    }
}

/// Convert an epoch-seconds wire timestamp into epoch milliseconds.
pub fn secs_to_millis(secs: f64) -> i64 {
    (secs * 1000.0).round() as i64
}
