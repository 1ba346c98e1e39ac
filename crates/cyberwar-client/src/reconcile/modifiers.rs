use cyberwar_core::snapshot::{Snapshot, Team, TeamPair, secs_to_millis};

use super::SnapshotUnit;
use crate::context::ClientContext;
use crate::render::{RenderSink, ViewUpdate, present};

/// Boost and freeze state per team. Only transitions are rendered.
///
/// `None` means the state is unknown, so the next snapshot renders it
/// whatever it is.
pub struct ModifierBoard {
    boost: TeamPair<Option<bool>>,
    frozen: TeamPair<Option<bool>>,
    jammed: Option<bool>,
}

impl Default for ModifierBoard {
    fn default() -> Self {
        Self {
            boost: TeamPair::new(Some(false), Some(false)),
            frozen: TeamPair::new(Some(false), Some(false)),
            jammed: Some(false),
        }
    }
}

impl ModifierBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_boosted(&self, team: Team) -> bool {
        self.boost.get(team).unwrap_or(false)
    }

    pub fn is_frozen(&self, team: Team) -> bool {
        self.frozen.get(team).unwrap_or(false)
    }

    pub fn is_jammed(&self) -> bool {
        self.jammed.unwrap_or(false)
    }
}

/// Store `next` and report whether it differs from what was there.
fn transition(slot: &mut Option<bool>, next: bool) -> bool {
    if *slot == Some(next) {
        return false;
    }
    *slot = Some(next);
    true
}

impl SnapshotUnit for ModifierBoard {
    fn name(&self) -> &'static str {
        "modifiers"
    }

    fn apply(
        &mut self,
        snapshot: &Snapshot,
        now_ms: u64,
        ctx: &ClientContext,
        sink: &mut dyn RenderSink,
    ) {
        let Some(modifiers) = &snapshot.modifiers else {
            return;
        };
        let now = now_ms as i64;
        for team in Team::ALL {
            let m = modifiers.get(team);
            let boosted = secs_to_millis(m.score_boost_end) > now;
            if transition(self.boost.get_mut(team), boosted) {
                tracing::debug!(%team, active = boosted, "Score boost changed");
                present(
                    sink,
                    ViewUpdate::BoostBadge {
                        team,
                        active: boosted,
                    },
                );
            }
            let frozen = secs_to_millis(m.frozen_end) > now;
            if transition(self.frozen.get_mut(team), frozen) {
                tracing::debug!(%team, active = frozen, "Freeze changed");
                present(
                    sink,
                    ViewUpdate::FrozenState {
                        team,
                        active: frozen,
                    },
                );
            }
        }

        let jammed = ctx.team.is_some_and(|team| self.is_frozen(team));
        if transition(&mut self.jammed, jammed) {
            present(sink, ViewUpdate::JammerOverlay { active: jammed });
        }
    }

    fn resync(&mut self) {
        self.boost = TeamPair::default();
        self.frozen = TeamPair::default();
        self.jammed = None;
    }
}

#[cfg(test)]
mod tests {
    use cyberwar_core::snapshot::TeamModifiers;
    use cyberwar_core::test_helpers::{SnapshotBuilder, T0_MS, epoch_secs};

    use super::*;
    use crate::render::RecordingSink;

    fn mods(boost_ms: i64, frozen_ms: i64) -> TeamModifiers {
        TeamModifiers {
            score_boost_end: epoch_secs(boost_ms),
            frozen_end: epoch_secs(frozen_ms),
        }
    }

    fn blue_player() -> ClientContext {
        ClientContext {
            player_id: Some("K7".to_string()),
            team: Some(Team::Blue),
            ..ClientContext::default()
        }
    }

    #[test]
    fn repeated_state_is_noop() {
        let mut board = ModifierBoard::new();
        let mut sink = RecordingSink::new();
        let snap = SnapshotBuilder::new()
            .modifiers(mods(60_000, -1), mods(-1, -1))
            .build();
        board.apply(&snap, T0_MS, &blue_player(), &mut sink);
        board.apply(&snap, T0_MS + 1_000, &blue_player(), &mut sink);
        assert_eq!(
            sink.updates(),
            &[ViewUpdate::BoostBadge {
                team: Team::Red,
                active: true
            }]
        );
        assert!(board.is_boosted(Team::Red));
    }

    #[test]
    fn freeze_on_own_team_raises_jammer() {
        let mut board = ModifierBoard::new();
        let mut sink = RecordingSink::new();
        let frozen = SnapshotBuilder::new()
            .modifiers(mods(0, 0), mods(0, 30_000))
            .build();
        board.apply(&frozen, T0_MS, &blue_player(), &mut sink);
        assert!(board.is_jammed());
        assert!(sink.updates().contains(&ViewUpdate::JammerOverlay { active: true }));

        board.apply(&frozen, T0_MS + 31_000, &blue_player(), &mut sink);
        assert!(!board.is_frozen(Team::Blue));
        assert_eq!(
            sink.last_where(|u| matches!(u, ViewUpdate::JammerOverlay { .. })),
            Some(&ViewUpdate::JammerOverlay { active: false })
        );
    }

    #[test]
    fn freeze_on_other_team_does_not_jam() {
        let mut board = ModifierBoard::new();
        let mut sink = RecordingSink::new();
        let snap = SnapshotBuilder::new()
            .modifiers(mods(0, 30_000), mods(0, 0))
            .build();
        board.apply(&snap, T0_MS, &blue_player(), &mut sink);
        assert!(board.is_frozen(Team::Red));
        assert!(!board.is_jammed());
    }

    #[test]
    fn resync_rerenders_current_state() {
        let mut board = ModifierBoard::new();
        let mut sink = RecordingSink::new();
        let snap = SnapshotBuilder::new()
            .modifiers(mods(0, 0), mods(0, 0))
            .build();
        board.apply(&snap, T0_MS, &blue_player(), &mut sink);
        assert!(sink.updates().is_empty());
        board.resync();
        board.apply(&snap, T0_MS, &blue_player(), &mut sink);
        assert_eq!(sink.updates().len(), 5);
    }

    #[test]
    fn missing_modifiers_change_nothing() {
        let mut board = ModifierBoard::new();
        let mut sink = RecordingSink::new();
        board.apply(&Snapshot::default(), T0_MS, &blue_player(), &mut sink);
        assert!(sink.updates().is_empty());
    }
}
