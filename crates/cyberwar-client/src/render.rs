use std::collections::HashSet;

use serde::Serialize;

use cyberwar_core::abilities::AbilityId;
use cyberwar_core::net::messages::SpeedCategory;
use cyberwar_core::snapshot::{Owner, Team};

use crate::minigame::challenge::ChallengeView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Dashboard,
    Challenge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub red: f64,
    pub blue: f64,
    pub red_bonus: f64,
    pub blue_bonus: f64,
    pub max_score: f64,
}

impl ScoreView {
    /// Fill ratio of a team's score bar, capped at 1.
    pub fn fill(&self, team: Team) -> f64 {
        if self.max_score <= 0.0 {
            return 0.0;
        }
        let score = match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
        };
        (score / self.max_score).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbilityCard {
    pub id: AbilityId,
    pub label: &'static str,
    pub description: &'static str,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceView {
    pub ability_points: u32,
    pub max_ap: u32,
    pub fill: f64,
    /// Affordability of each visible ability, in menu order.
    pub affordable: Vec<(AbilityId, bool)>,
    /// At least one visible ability is affordable.
    pub ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStyle {
    Normal,
    Low,
    Critical,
    Charging(SpeedCategory),
    FailedFlash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One visual mutation. The concrete backend decides how to draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewUpdate {
    Screen {
        screen: Screen,
    },
    ClockText {
        text: String,
    },
    NodeStatus {
        node: String,
        owner: Owner,
        label: String,
    },
    ShieldRaised {
        node: String,
    },
    ShieldCountdown {
        node: String,
        secs: u64,
        expiring: bool,
    },
    ShieldLowered {
        node: String,
    },
    Scores(ScoreView),
    CaptureAnnotation {
        team: Team,
        player: String,
        speed: SpeedCategory,
    },
    CaptureAnnotationCleared {
        team: Team,
    },
    AbilityMenu {
        cards: Vec<AbilityCard>,
    },
    ResourceBar(ResourceView),
    BoostBadge {
        team: Team,
        active: bool,
    },
    FrozenState {
        team: Team,
        active: bool,
    },
    JammerOverlay {
        active: bool,
    },
    Challenge {
        challenge: ChallengeView,
    },
    ChallengeCountdown {
        secs: u32,
    },
    ChallengeFeedback {
        success: bool,
        message: String,
    },
    Battery {
        percent: f64,
        style: BatteryStyle,
    },
    Notice {
        level: NoticeLevel,
        message: String,
    },
}

/// Region of the interface an update writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RenderTarget {
    Screens,
    Clock,
    NodeCards,
    Scoreboard,
    AbilityMenu,
    ResourceBar,
    TeamBadges,
    JammerOverlay,
    ChallengeSurface,
    Battery,
    Notices,
}

impl ViewUpdate {
    pub fn target(&self) -> RenderTarget {
        match self {
            Self::Screen { .. } => RenderTarget::Screens,
            Self::ClockText { .. } => RenderTarget::Clock,
            Self::NodeStatus { .. }
            | Self::ShieldRaised { .. }
            | Self::ShieldCountdown { .. }
            | Self::ShieldLowered { .. } => RenderTarget::NodeCards,
            Self::Scores(_)
            | Self::CaptureAnnotation { .. }
            | Self::CaptureAnnotationCleared { .. } => RenderTarget::Scoreboard,
            Self::AbilityMenu { .. } => RenderTarget::AbilityMenu,
            Self::ResourceBar(_) => RenderTarget::ResourceBar,
            Self::BoostBadge { .. } | Self::FrozenState { .. } => RenderTarget::TeamBadges,
            Self::JammerOverlay { .. } => RenderTarget::JammerOverlay,
            Self::Challenge { .. }
            | Self::ChallengeCountdown { .. }
            | Self::ChallengeFeedback { .. } => RenderTarget::ChallengeSurface,
            Self::Battery { .. } => RenderTarget::Battery,
            Self::Notice { .. } => RenderTarget::Notices,
        }
    }
}

#[derive(Debug)]
pub enum RenderError {
    /// The view this update writes into is not present (e.g. spectator layouts).
    MissingTarget(RenderTarget),
    Backend(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTarget(t) => write!(f, "render target missing: {t:?}"),
            Self::Backend(e) => write!(f, "render backend error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Receives view updates from the engine and reconcilers.
pub trait RenderSink {
    fn apply(&mut self, update: ViewUpdate) -> Result<(), RenderError>;
}

/// Apply an update, treating failures as a no-op for this update. Callers
/// still record the update as drawn.
pub fn present(sink: &mut dyn RenderSink, update: ViewUpdate) {
    match sink.apply(update) {
        Ok(()) => {},
        Err(RenderError::MissingTarget(t)) => {
            tracing::trace!(render_target = ?t, "Render target absent, skipping update");
        },
        Err(e) => {
            tracing::warn!(error = %e, "Render update failed");
        },
    }
}

/// Sink that keeps every applied update. Used by tests and the replay tool.
#[derive(Debug, Default)]
pub struct RecordingSink {
    updates: Vec<ViewUpdate>,
    missing: HashSet<RenderTarget>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `target` as absent; updates for it are rejected.
    pub fn without(mut self, target: RenderTarget) -> Self {
        self.missing.insert(target);
        self
    }

    pub fn updates(&self) -> &[ViewUpdate] {
        &self.updates
    }

    pub fn take(&mut self) -> Vec<ViewUpdate> {
        std::mem::take(&mut self.updates)
    }

    pub fn clear(&mut self) {
        self.updates.clear();
    }

    pub fn count(&self, pred: impl Fn(&ViewUpdate) -> bool) -> usize {
        self.updates.iter().filter(|u| pred(u)).count()
    }

    pub fn last_where(&self, pred: impl Fn(&ViewUpdate) -> bool) -> Option<&ViewUpdate> {
        self.updates.iter().rev().find(|u| pred(u))
    }
}

impl RenderSink for RecordingSink {
    fn apply(&mut self, update: ViewUpdate) -> Result<(), RenderError> {
        let target = update.target();
        if self.missing.contains(&target) {
            return Err(RenderError::MissingTarget(target));
        }
        self.updates.push(update);
        Ok(())
    }
}

/// Sink that logs each update as structured JSON.
#[derive(Debug, Default)]
pub struct TracingSink;

impl RenderSink for TracingSink {
    fn apply(&mut self, update: ViewUpdate) -> Result<(), RenderError> {
        let json =
            serde_json::to_string(&update).map_err(|e| RenderError::Backend(e.to_string()))?;
        tracing::info!(render_target = ?update.target(), view = %json, "View update");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_is_swallowed() {
        let mut sink = RecordingSink::new().without(RenderTarget::Clock);
        present(
            &mut sink,
            ViewUpdate::ClockText {
                text: "00:01".to_string(),
            },
        );
        present(
            &mut sink,
            ViewUpdate::JammerOverlay { active: true },
        );
        assert_eq!(sink.updates().len(), 1);
        assert_eq!(sink.updates()[0].target(), RenderTarget::JammerOverlay);
    }

    #[test]
    fn score_fill_is_capped() {
        let view = ScoreView {
            red: 1500.0,
            blue: 250.0,
            red_bonus: 0.0,
            blue_bonus: 0.0,
            max_score: 1000.0,
        };
        assert_eq!(view.fill(Team::Red), 1.0);
        assert_eq!(view.fill(Team::Blue), 0.25);
    }

    #[test]
    fn updates_serialize_with_view_tag() {
        let json = serde_json::to_value(ViewUpdate::ShieldCountdown {
            node: "alpha".to_string(),
            secs: 4,
            expiring: true,
        })
        .unwrap();
        assert_eq!(json["view"], "shield_countdown");
        assert_eq!(json["secs"], 4);
    }
}
