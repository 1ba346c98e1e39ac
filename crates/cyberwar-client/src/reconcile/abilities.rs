use cyberwar_core::abilities::{AbilityId, ability_cost};
use cyberwar_core::net::messages::CastAbilityMsg;
use cyberwar_core::snapshot::{RuleConfig, Snapshot};

use super::SnapshotUnit;
use crate::context::ClientContext;
use crate::render::{AbilityCard, RenderSink, ResourceView, ViewUpdate, present};

/// Why a cast was refused locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastError {
    NotLoggedIn,
    Excluded(AbilityId),
    InsufficientAp {
        ability: AbilityId,
        required: u32,
        current: u32,
    },
}

impl std::fmt::Display for CastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoggedIn => write!(f, "not logged in"),
            Self::Excluded(id) => write!(f, "ability {id} is disabled this match"),
            Self::InsufficientAp {
                ability,
                required,
                current,
            } => write!(f, "{ability} needs {required} AP, have {current}"),
        }
    }
}

impl std::error::Error for CastError {}

/// Ability menu and AP resource bar.
///
/// Rule changes redraw the menu and the bar; an AP change alone redraws
/// only the bar.
pub struct AbilityPanel {
    rules: RuleConfig,
    ability_points: u32,
    menu_drawn: bool,
    bar_drawn: bool,
}

impl Default for AbilityPanel {
    fn default() -> Self {
        Self {
            rules: RuleConfig::default(),
            ability_points: 0,
            menu_drawn: false,
            bar_drawn: false,
        }
    }
}

impl AbilityPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ability_points(&self) -> u32 {
        self.ability_points
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    pub fn cost(&self, ability: AbilityId) -> u32 {
        ability_cost(
            ability.base_cost(),
            self.rules.ability_cost_multiplier,
            self.rules.max_ap,
        )
    }

    /// Abilities offered this match, in menu order.
    pub fn cards(&self) -> Vec<AbilityCard> {
        AbilityId::ALL
            .iter()
            .filter(|id| !self.rules.is_excluded(id.as_str()))
            .map(|&id| AbilityCard {
                id,
                label: id.label(),
                description: id.description(),
                cost: self.cost(id),
            })
            .collect()
    }

    pub fn resource_view(&self) -> ResourceView {
        let max_ap = self.rules.max_ap;
        let fill = if max_ap == 0 {
            0.0
        } else {
            (f64::from(self.ability_points) / f64::from(max_ap)).min(1.0)
        };
        let affordable: Vec<(AbilityId, bool)> = self
            .cards()
            .into_iter()
            .map(|card| (card.id, self.ability_points >= card.cost))
            .collect();
        let ready = affordable.iter().any(|(_, ok)| *ok);
        ResourceView {
            ability_points: self.ability_points,
            max_ap,
            fill,
            affordable,
            ready,
        }
    }

    /// AP reported by a discrete event (`energy_charged`, `ability_success`).
    pub fn set_points(&mut self, ability_points: u32, sink: &mut dyn RenderSink) {
        if self.bar_drawn && ability_points == self.ability_points {
            return;
        }
        self.ability_points = ability_points;
        self.draw_bar(sink);
    }

    /// Validate a cast against local state and build the command.
    pub fn cast(
        &self,
        ability: AbilityId,
        ctx: &ClientContext,
    ) -> Result<CastAbilityMsg, CastError> {
        let Some(player_id) = ctx.player_id.clone() else {
            return Err(CastError::NotLoggedIn);
        };
        if self.rules.is_excluded(ability.as_str()) {
            return Err(CastError::Excluded(ability));
        }
        let required = self.cost(ability);
        if self.ability_points < required {
            return Err(CastError::InsufficientAp {
                ability,
                required,
                current: self.ability_points,
            });
        }
        Ok(CastAbilityMsg { player_id, ability })
    }

    fn draw_menu(&mut self, sink: &mut dyn RenderSink) {
        self.menu_drawn = true;
        present(
            sink,
            ViewUpdate::AbilityMenu {
                cards: self.cards(),
            },
        );
    }

    fn draw_bar(&mut self, sink: &mut dyn RenderSink) {
        self.bar_drawn = true;
        present(sink, ViewUpdate::ResourceBar(self.resource_view()));
    }
}

impl SnapshotUnit for AbilityPanel {
    fn name(&self) -> &'static str {
        "abilities"
    }

    fn apply(
        &mut self,
        snapshot: &Snapshot,
        _now_ms: u64,
        ctx: &ClientContext,
        sink: &mut dyn RenderSink,
    ) {
        let mut rules_changed = false;
        if snapshot.config.is_some() || snapshot.max_ap.is_some() {
            let mut next = snapshot
                .config
                .clone()
                .unwrap_or_else(|| self.rules.clone());
            if let Some(max_ap) = snapshot.max_ap {
                next.max_ap = max_ap;
            }
            if !self.menu_drawn || next != self.rules {
                self.rules = next;
                rules_changed = true;
            }
        }

        let mut points_changed = false;
        if let Some(player) = ctx.player_id.as_deref().and_then(|id| snapshot.player(id))
            && (!self.bar_drawn || player.ability_points != self.ability_points)
        {
            self.ability_points = player.ability_points;
            points_changed = true;
        }

        if rules_changed {
            self.draw_menu(sink);
            self.draw_bar(sink);
        } else if points_changed {
            self.draw_bar(sink);
        }
    }

    fn resync(&mut self) {
        self.menu_drawn = false;
        self.bar_drawn = false;
    }
}
