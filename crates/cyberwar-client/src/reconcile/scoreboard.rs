use cyberwar_core::net::messages::SpeedCategory;
use cyberwar_core::snapshot::{RuleConfig, Snapshot, Team, TeamPair};

use super::SnapshotUnit;
use crate::context::ClientContext;
use crate::render::{RenderSink, ScoreView, ViewUpdate, present};
use crate::scheduler::{Scheduler, TaskId, TimerSet, TimerTask};

/// Team scores, bonus scores and the transient "who captured" annotation.
pub struct Scoreboard {
    view: ScoreView,
    rendered: bool,
    annotation_ms: u64,
    annotations: TeamPair<Option<TaskId>>,
    timers: TimerSet,
}

impl Scoreboard {
    pub fn new(scheduler: &Scheduler, annotation_ms: u64) -> Self {
        Self {
            view: ScoreView {
                red: 0.0,
                blue: 0.0,
                red_bonus: 0.0,
                blue_bonus: 0.0,
                max_score: RuleConfig::default().max_score,
            },
            rendered: false,
            annotation_ms,
            annotations: TeamPair::default(),
            timers: TimerSet::new(scheduler),
        }
    }

    pub fn view(&self) -> &ScoreView {
        &self.view
    }

    pub fn annotation_active(&self, team: Team) -> bool {
        self.annotations.get(team).is_some()
    }

    /// Show who captured for `team`. Replaces any annotation already shown
    /// for that team, restarting the window.
    pub fn show_capture(
        &mut self,
        team: Team,
        player: &str,
        speed: SpeedCategory,
        now_ms: u64,
        sink: &mut dyn RenderSink,
    ) {
        if let Some(old) = self.annotations.get_mut(team).take() {
            self.timers.cancel(old);
        }
        present(
            sink,
            ViewUpdate::CaptureAnnotation {
                team,
                player: player.to_string(),
                speed,
            },
        );
        let task = self
            .timers
            .once(now_ms + self.annotation_ms, TimerTask::AnnotationExpiry { team });
        *self.annotations.get_mut(team) = Some(task);
    }

    pub fn annotation_expired(&mut self, team: Team, sink: &mut dyn RenderSink) {
        if self.annotations.get_mut(team).take().is_some() {
            present(sink, ViewUpdate::CaptureAnnotationCleared { team });
        }
    }

    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.annotations = TeamPair::default();
    }
}

impl SnapshotUnit for Scoreboard {
    fn name(&self) -> &'static str {
        "scores"
    }

    fn apply(
        &mut self,
        snapshot: &Snapshot,
        _now_ms: u64,
        _ctx: &ClientContext,
        sink: &mut dyn RenderSink,
    ) {
        let max_score = snapshot.max_score();
        if snapshot.scores.is_none() && snapshot.bonus_scores.is_none() && max_score.is_none() {
            return;
        }

        let mut next = self.view.clone();
        if let Some(scores) = &snapshot.scores {
            next.red = scores.red;
            next.blue = scores.blue;
        }
        if let Some(bonus) = &snapshot.bonus_scores {
            next.red_bonus = bonus.red;
            next.blue_bonus = bonus.blue;
        }
        if let Some(max_score) = max_score {
            next.max_score = max_score;
        }

        if self.rendered && next == self.view {
            return;
        }
        // Committed even when the sink lacks a scoreboard; the next change or
        // resync redraws it.
        self.view = next;
        self.rendered = true;
        present(sink, ViewUpdate::Scores(self.view.clone()));
    }

    fn resync(&mut self) {
        self.rendered = false;
    }
}

#[cfg(test)]
mod tests {
    use cyberwar_core::test_helpers::SnapshotBuilder;

    use super::*;
    use crate::render::{RecordingSink, RenderTarget};

    const NOW: u64 = 100_000;

    fn apply(board: &mut Scoreboard, snap: &Snapshot, sink: &mut RecordingSink) {
        board.apply(snap, NOW, &ClientContext::default(), sink);
    }

    fn score_renders(sink: &RecordingSink) -> usize {
        sink.count(|u| matches!(u, ViewUpdate::Scores(_)))
    }

    #[test]
    fn identical_snapshot_renders_nothing() {
        let mut board = Scoreboard::new(&Scheduler::new(), 3000);
        let mut sink = RecordingSink::new();
        let snap = SnapshotBuilder::new().scores(120.0, 80.0).bonus(10.0, 0.0).build();
        apply(&mut board, &snap, &mut sink);
        apply(&mut board, &snap, &mut sink);
        assert_eq!(score_renders(&sink), 1);
    }

    #[test]
    fn single_field_change_renders_once() {
        let mut board = Scoreboard::new(&Scheduler::new(), 3000);
        let mut sink = RecordingSink::new();
        apply(
            &mut board,
            &SnapshotBuilder::new().scores(120.0, 80.0).build(),
            &mut sink,
        );
        apply(
            &mut board,
            &SnapshotBuilder::new().bonus(0.0, 5.0).build(),
            &mut sink,
        );
        assert_eq!(score_renders(&sink), 2);
        assert_eq!(board.view().red, 120.0);
        assert_eq!(board.view().blue_bonus, 5.0);
    }

    #[test]
    fn snapshot_without_score_fields_is_ignored() {
        let mut board = Scoreboard::new(&Scheduler::new(), 3000);
        let mut sink = RecordingSink::new();
        apply(&mut board, &SnapshotBuilder::new().active(10.0).build(), &mut sink);
        assert_eq!(score_renders(&sink), 0);
    }

    #[test]
    fn max_score_change_rerenders() {
        let mut board = Scoreboard::new(&Scheduler::new(), 3000);
        let mut sink = RecordingSink::new();
        let snap = SnapshotBuilder::new().scores(500.0, 0.0).build();
        apply(&mut board, &snap, &mut sink);
        apply(
            &mut board,
            &SnapshotBuilder::new().scores(500.0, 0.0).max_score(2000.0).build(),
            &mut sink,
        );
        assert_eq!(score_renders(&sink), 2);
        assert_eq!(board.view().fill(Team::Red), 0.25);
    }

    #[test]
    fn resync_forces_render() {
        let mut board = Scoreboard::new(&Scheduler::new(), 3000);
        let mut sink = RecordingSink::new();
        let snap = SnapshotBuilder::new().scores(1.0, 2.0).build();
        apply(&mut board, &snap, &mut sink);
        board.resync();
        apply(&mut board, &snap, &mut sink);
        assert_eq!(score_renders(&sink), 2);
    }

    #[test]
    fn missing_scoreboard_still_commits_view() {
        let mut board = Scoreboard::new(&Scheduler::new(), 3000);
        let mut headless = RecordingSink::new().without(RenderTarget::Scoreboard);
        let snap = SnapshotBuilder::new().scores(70.0, 30.0).build();
        apply(&mut board, &snap, &mut headless);
        assert!(headless.updates().is_empty());
        assert_eq!(board.view().red, 70.0);

        let mut sink = RecordingSink::new();
        apply(&mut board, &snap, &mut sink);
        assert_eq!(score_renders(&sink), 0);
        apply(
            &mut board,
            &SnapshotBuilder::new().scores(71.0, 30.0).build(),
            &mut sink,
        );
        assert_eq!(score_renders(&sink), 1);
        board.resync();
        apply(
            &mut board,
            &SnapshotBuilder::new().scores(71.0, 30.0).build(),
            &mut sink,
        );
        assert_eq!(score_renders(&sink), 2);
    }

    #[test]
    fn newer_annotation_owns_its_window() {
        let scheduler = Scheduler::new();
        let mut board = Scoreboard::new(&scheduler, 3000);
        let mut sink = RecordingSink::new();
        board.show_capture(Team::Red, "alice", SpeedCategory::Fast, NOW, &mut sink);
        board.show_capture(Team::Red, "bob", SpeedCategory::Slow, NOW + 2_000, &mut sink);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.next_deadline(), Some(NOW + 5_000));

        let (_, task) = scheduler.pop_due(NOW + 5_000).unwrap();
        assert_eq!(task, TimerTask::AnnotationExpiry { team: Team::Red });
        board.annotation_expired(Team::Red, &mut sink);
        assert!(!board.annotation_active(Team::Red));
        assert_eq!(
            sink.count(|u| matches!(u, ViewUpdate::CaptureAnnotationCleared { .. })),
            1
        );
    }

    #[test]
    fn teams_have_independent_annotations() {
        let scheduler = Scheduler::new();
        let mut board = Scoreboard::new(&scheduler, 3000);
        let mut sink = RecordingSink::new();
        board.show_capture(Team::Red, "alice", SpeedCategory::Fast, NOW, &mut sink);
        board.show_capture(Team::Blue, "bob", SpeedCategory::Normal, NOW, &mut sink);
        assert_eq!(scheduler.pending(), 2);
        board.annotation_expired(Team::Blue, &mut sink);
        assert!(board.annotation_active(Team::Red));
    }
}
