//! Challenge sessions driven end to end through the client: dispatch,
//! input, timers, feedback and the single outcome message.

#[allow(dead_code)]
mod common;

use common::TestClient;
use cyberwar_client::minigame::engine::EnginePhase;
use cyberwar_client::minigame::{ChallengeInput, ChallengeView};
use cyberwar_client::render::{Screen, ViewUpdate};
use cyberwar_core::snapshot::Team;

const ALL_KINDS: [&str; 10] = [
    "code_breaker",
    "math_hack",
    "wire_cut",
    "reflex_hit",
    "slider_lock",
    "memory_matrix",
    "brute_force",
    "binary_switches",
    "sequence_order",
    "frequency_match",
];

fn last_challenge_view(tc: &TestClient) -> Option<ChallengeView> {
    tc.updates().iter().rev().find_map(|u| match u {
        ViewUpdate::Challenge { challenge } => Some(challenge.clone()),
        _ => None,
    })
}

#[test]
fn unregistered_type_runs_default_challenge() {
    let mut tc = TestClient::new();
    tc.login("K7", Team::Red);
    tc.start("unregistered_type", "alpha");

    assert_eq!(tc.client.engine().phase(), EnginePhase::Running);
    assert_eq!(
        tc.client.engine().active_session().map(|s| s.kind()),
        Some("code_breaker")
    );
    assert!(matches!(
        last_challenge_view(&tc),
        Some(ChallengeView::CodeEntry { .. })
    ));
}

#[test]
fn solved_code_reports_success_once() {
    let mut tc = TestClient::new();
    tc.login("K7", Team::Red);
    tc.start("code_breaker", "alpha");

    let Some(ChallengeView::CodeEntry { target, .. }) = last_challenge_view(&tc) else {
        panic!("code entry not rendered");
    };
    tc.advance(3_200);
    for key in target.chars() {
        tc.client.handle_input(&ChallengeInput::Key { key });
    }
    tc.client.handle_input(&ChallengeInput::Submit);
    // Extra input after the terminal state is ignored.
    tc.client.handle_input(&ChallengeInput::Submit);
    assert_eq!(tc.client.engine().phase(), EnginePhase::Feedback);
    assert!(tc.results().is_empty());

    tc.advance(1_000);
    let results = tc.results();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].node, "alpha");
    assert_eq!(results[0].player_id, "K7");
    assert!((results[0].duration - 3.2).abs() < 1e-9);
    assert_eq!(tc.client.context().screen, Screen::Dashboard);

    tc.advance(60_000);
    assert!(tc.results().is_empty());
}

#[test]
fn every_challenge_times_out_with_one_failure() {
    for kind in ALL_KINDS {
        let mut tc = TestClient::new();
        tc.login("K7", Team::Blue);
        tc.start(kind, "gamma");
        assert_eq!(
            tc.client.engine().active_session().map(|s| s.kind()),
            Some(kind)
        );
        tc.advance(30_000);
        let results = tc.results();
        assert_eq!(results.len(), 1, "{kind} reported {} outcomes", results.len());
        assert!(!results[0].success, "{kind} succeeded without input");
        assert_eq!(tc.client.engine().phase(), EnginePhase::Idle);
    }
}

#[test]
fn replaced_session_never_fires_again() {
    let mut tc = TestClient::new();
    tc.login("K7", Team::Red);
    tc.start("reflex_hit", "alpha");
    tc.advance(500);
    tc.start("brute_force", "beta");
    tc.clear_updates();

    // Well past the reflex arm window and its time limit.
    tc.advance(6_000);
    assert_eq!(
        tc.count(|u| matches!(
            u,
            ViewUpdate::Challenge {
                challenge: ChallengeView::Reflex { .. }
            }
        )),
        0
    );

    tc.advance(10_000);
    let results = tc.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].node, "beta");
}

#[test]
fn new_start_during_feedback_flushes_previous_outcome() {
    let mut tc = TestClient::new();
    tc.login("K7", Team::Red);
    tc.start("brute_force", "alpha");
    for _ in 0..25 {
        tc.client.handle_input(&ChallengeInput::Tap);
    }
    tc.advance(300);
    tc.start("wire_cut", "beta");

    let flushed = tc.results();
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].node, "alpha");
    assert!(flushed[0].success);

    tc.advance(800);
    assert!(tc.results().is_empty());
    assert_eq!(tc.client.engine().phase(), EnginePhase::Running);
}

#[test]
fn screen_restored_after_feedback() {
    let mut tc = TestClient::new();
    tc.login("K7", Team::Red);
    tc.start("binary_switches", "alpha");
    assert_eq!(tc.client.context().screen, Screen::Challenge);
    tc.advance(11_000);
    assert_eq!(tc.client.context().screen, Screen::Dashboard);
    assert_eq!(
        tc.updates()
            .iter()
            .filter(|u| matches!(u, ViewUpdate::Screen { .. }))
            .count(),
        3
    );
}

#[test]
fn outcome_without_login_has_empty_player() {
    let mut tc = TestClient::new();
    tc.start("wire_cut", "alpha");
    tc.advance(12_000);
    let results = tc.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].player_id, "");
}
