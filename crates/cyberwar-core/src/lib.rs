pub mod abilities;
pub mod net;
pub mod snapshot;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::cell::Cell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    use crate::snapshot::{
        CaptureSpeed, NodeState, Owner, PlayerState, PlayerTeam, RuleConfig, Snapshot,
        TeamModifiers, TeamPair,
    };
    use crate::time::Clock;

    /// Arbitrary fixed epoch (2023-11-14T22:13:20Z) used as "now" in tests.
    pub const T0_MS: u64 = 1_700_000_000_000;

    /// Hand-driven clock. Clones share the same time.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Rc<Cell<u64>>,
    }

    impl ManualClock {
        pub fn new(start_ms: u64) -> Self {
            Self {
                now: Rc::new(Cell::new(start_ms)),
            }
        }

        pub fn advance(&self, ms: u64) {
            self.now.set(self.now.get() + ms);
        }

        pub fn set(&self, ms: u64) {
            self.now.set(ms);
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new(T0_MS)
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> u64 {
            self.now.get()
        }
    }

    /// Epoch seconds at `offset_ms` from `T0_MS`, as the server would send it.
    pub fn epoch_secs(offset_ms: i64) -> f64 {
        (T0_MS as i64 + offset_ms) as f64 / 1000.0
    }

    /// Chained construction of snapshots for tests.
    #[derive(Debug, Clone, Default)]
    pub struct SnapshotBuilder {
        snapshot: Snapshot,
    }

    impl SnapshotBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        /// An active match that started `duration_secs` ago.
        pub fn active(mut self, duration_secs: f64) -> Self {
            self.snapshot.game_active = true;
            self.snapshot.game_duration = Some(duration_secs);
            self
        }

        pub fn inactive(mut self) -> Self {
            self.snapshot.game_active = false;
            self.snapshot.game_duration = Some(0.0);
            self
        }

        pub fn node(mut self, id: &str, owner: Owner, shield_end: f64) -> Self {
            self.snapshot.nodes.get_or_insert_with(BTreeMap::new).insert(
                id.to_string(),
                NodeState {
                    owner,
                    shield_end,
                    capture_speed: None,
                },
            );
            self
        }

        pub fn node_with_speed(
            mut self,
            id: &str,
            owner: Owner,
            shield_end: f64,
            speed: CaptureSpeed,
        ) -> Self {
            self.snapshot.nodes.get_or_insert_with(BTreeMap::new).insert(
                id.to_string(),
                NodeState {
                    owner,
                    shield_end,
                    capture_speed: Some(speed),
                },
            );
            self
        }

        /// Present but empty node map.
        pub fn no_nodes(mut self) -> Self {
            self.snapshot.nodes = Some(BTreeMap::new());
            self
        }

        pub fn scores(mut self, red: f64, blue: f64) -> Self {
            self.snapshot.scores = Some(TeamPair::new(red, blue));
            self
        }

        pub fn bonus(mut self, red: f64, blue: f64) -> Self {
            self.snapshot.bonus_scores = Some(TeamPair::new(red, blue));
            self
        }

        pub fn max_score(mut self, max_score: f64) -> Self {
            self.snapshot.max_score = Some(max_score);
            self
        }

        pub fn modifiers(mut self, red: TeamModifiers, blue: TeamModifiers) -> Self {
            self.snapshot.modifiers = Some(TeamPair::new(red, blue));
            self
        }

        pub fn config(mut self, config: RuleConfig) -> Self {
            self.snapshot.config = Some(config);
            self
        }

        pub fn player(mut self, id: &str, team: PlayerTeam, ability_points: u32) -> Self {
            self.snapshot.players.get_or_insert_with(BTreeMap::new).insert(
                id.to_string(),
                PlayerState {
                    name: id.to_lowercase(),
                    team,
                    ability_points,
                    ..PlayerState::default()
                },
            );
            self
        }

        pub fn build(self) -> Snapshot {
            self.snapshot
        }
    }
}
