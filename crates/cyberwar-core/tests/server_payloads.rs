//! Text frames shaped exactly as the game server emits them, extra keys,
//! nulls and integer-valued floats included.

use cyberwar_core::abilities::AbilityId;
use cyberwar_core::net::messages::{ServerMessage, SpeedCategory};
use cyberwar_core::net::protocol::decode_server_json;
use cyberwar_core::snapshot::{CaptureSpeed, Owner, PlayerTeam, Team};

fn decode(text: &str) -> ServerMessage {
    match decode_server_json(text) {
        Ok(msg) => msg,
        Err(e) => panic!("failed to decode {text}: {e}"),
    }
}

#[test]
fn full_update_state_broadcast() {
    let text = r#"{"event": "update_state", "data": {
        "nodes": {
            "node_alpha": {"owner": "RED", "shield_end": 1700000045.25, "shield_remaining": 44.9, "capture_speed": "FAST"},
            "node_beta": {"owner": "NEUTRAL", "shield_end": 0, "shield_remaining": 0, "capture_speed": null},
            "node_gamma": {"owner": "BLUE", "shield_end": 1699999990.0, "shield_remaining": 0, "capture_speed": "SLOW"}
        },
        "scores": {"RED": 12.5, "BLUE": 0},
        "bonus_scores": {"RED": 50, "BLUE": 0},
        "players": {
            "R1": {"name": "Agent R1", "team": "RED", "charged": false, "ability_points": 100, "is_gm": true, "is_team_lead": true},
            "X1": {"name": "Agent X1", "team": "SPECTATOR", "charged": true, "ability_points": 0, "is_gm": false, "is_team_lead": false}
        },
        "game_active": true,
        "game_master": "R1",
        "red_team_name": "RED TEAM",
        "blue_team_name": "BLUE TEAM",
        "max_score": 1000,
        "max_ap": 400,
        "game_duration": 65.4321,
        "difficulty_multiplier": 1.0,
        "modifiers": {
            "RED": {"score_boost_end": 0, "frozen_end": 1700000100.5},
            "BLUE": {"score_boost_end": 1700000030, "frozen_end": 0}
        },
        "config": {
            "max_score": 1000, "max_ap": 400, "battery_drain_enabled": true,
            "ability_cost_multiplier": 1.5, "shield_duration_fast": 45,
            "shield_duration_normal": 15, "hack_bonus_fast": 10,
            "hack_bonus_normal": 5, "excluded_abilities": ["freeze"]
        }
    }}"#;
    let ServerMessage::UpdateState(snap) = decode(text) else {
        panic!("expected update_state");
    };
    let nodes = snap.nodes.as_ref().unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes["node_alpha"].owner, Owner::Red);
    assert_eq!(nodes["node_alpha"].capture_speed, Some(CaptureSpeed::Fast));
    assert_eq!(nodes["node_beta"].capture_speed, None);
    assert_eq!(nodes["node_beta"].status_label(), "NEUTRAL");
    assert_eq!(nodes["node_gamma"].status_label(), "BLUE TEAM | SLOW");
    assert_eq!(snap.scores.as_ref().unwrap().red, 12.5);
    assert_eq!(snap.bonus_scores.as_ref().unwrap().red, 50.0);
    assert_eq!(snap.player("R1").unwrap().ability_points, 100);
    assert_eq!(snap.player("X1").unwrap().team, PlayerTeam::Spectator);
    assert!(snap.game_active);
    assert_eq!(snap.game_duration, Some(65.4321));
    assert_eq!(snap.max_ap, Some(400));
    assert_eq!(snap.max_score(), Some(1000.0));
    assert_eq!(snap.modifiers.as_ref().unwrap().get(Team::Red).frozen_end, 1700000100.5);
    let config = snap.config.as_ref().unwrap();
    assert_eq!(config.ability_cost_multiplier, 1.5);
    assert!(config.is_excluded("freeze"));
}

#[test]
fn idle_update_state_with_nulls() {
    let text = r#"{"event": "update_state", "data": {
        "nodes": {"node_alpha": {"owner": "NEUTRAL", "shield_end": 0, "shield_remaining": 0, "capture_speed": null}},
        "scores": {"RED": 0, "BLUE": 0},
        "bonus_scores": {"RED": 0, "BLUE": 0},
        "players": {},
        "game_active": false,
        "game_master": null,
        "red_team_name": null,
        "blue_team_name": null,
        "max_score": 1000,
        "max_ap": 400,
        "game_duration": 0,
        "difficulty_multiplier": 1.0,
        "modifiers": {"RED": {"score_boost_end": 0, "frozen_end": 0}, "BLUE": {"score_boost_end": 0, "frozen_end": 0}},
        "config": {"max_score": 1000, "max_ap": 400, "battery_drain_enabled": true,
                   "ability_cost_multiplier": 1.0, "shield_duration_fast": 45,
                   "shield_duration_normal": 15, "hack_bonus_fast": 10,
                   "hack_bonus_normal": 5, "excluded_abilities": []}
    }}"#;
    let ServerMessage::UpdateState(snap) = decode(text) else {
        panic!("expected update_state");
    };
    assert!(!snap.game_active);
    assert_eq!(snap.game_duration, Some(0.0));
    assert_eq!(snap.red_team_name, None);
    assert!(snap.players.as_ref().unwrap().is_empty());
}

#[test]
fn start_minigame_with_difficulty_label() {
    let text = r#"{"event": "start_minigame", "data": {"node": "node_alpha", "gameType": "wire_cut", "difficulty": "normal"}}"#;
    let ServerMessage::StartMinigame(msg) = decode(text) else {
        panic!("expected start_minigame");
    };
    assert_eq!(msg.node, "node_alpha");
    assert_eq!(msg.game_type, "wire_cut");
    assert_eq!(msg.difficulty.as_deref(), Some("normal"));
}

#[test]
fn login_success_for_new_spectator() {
    let text = r#"{"event": "login_success", "data": {"shortCode": "X1", "team": "SPECTATOR",
        "is_gm": true, "is_team_lead": false, "playerName": "Agent X1", "charged": true,
        "has_custom_name": false, "red_name": "RED TEAM", "blue_name": "BLUE TEAM"}}"#;
    let ServerMessage::LoginSuccess(msg) = decode(text) else {
        panic!("expected login_success");
    };
    assert_eq!(msg.short_code, "X1");
    assert_eq!(msg.team, PlayerTeam::Spectator);
    assert_eq!(msg.team.team(), None);
    assert!(msg.is_gm);
}

#[test]
fn login_success_on_reconnect() {
    let text = r#"{"event": "login_success", "data": {"shortCode": "R1", "team": "RED",
        "is_gm": false, "is_team_lead": true, "playerName": "Neo", "charged": false,
        "has_custom_name": true, "red_name": null, "blue_name": null}}"#;
    let ServerMessage::LoginSuccess(msg) = decode(text) else {
        panic!("expected login_success");
    };
    assert_eq!(msg.team.team(), Some(Team::Red));
    assert_eq!(msg.player_name, "Neo");
    assert!(msg.is_team_lead);
}

#[test]
fn energy_charged_success_and_failure() {
    let text = r#"{"event": "energy_charged", "data": {"energy_gain": 100, "current_ap": 250,
        "speed_category": "FAST", "duration": 2.31, "animation_duration": 2.5,
        "charged": false, "team": "BLUE", "points": 50}}"#;
    let ServerMessage::EnergyCharged(msg) = decode(text) else {
        panic!("expected energy_charged");
    };
    assert_eq!(msg.energy_gain, 100.0);
    assert_eq!(msg.team, Some(Team::Blue));
    assert_eq!(msg.points, Some(50.0));

    let text = r#"{"event": "energy_charged", "data": {"energy_gain": 0, "current_ap": 250,
        "speed_category": "FAILED", "duration": 8.0, "animation_duration": 0, "charged": false}}"#;
    let ServerMessage::EnergyCharged(msg) = decode(text) else {
        panic!("expected energy_charged");
    };
    assert_eq!(msg.speed_category, SpeedCategory::Failed);
    assert_eq!(msg.team, None);
}

#[test]
fn ability_events() {
    let ServerMessage::AbilitySuccess(msg) = decode(
        r#"{"event": "ability_success", "data": {"msg": "EMP! 2 SHIELDS BROKEN!", "current_ap": 100}}"#,
    ) else {
        panic!("expected ability_success");
    };
    assert_eq!(msg.current_ap, Some(100));

    let ServerMessage::AbilityAnnouncement(msg) = decode(
        r#"{"event": "ability_announcement", "data": {"team": "RED", "type": "hack_bonus", "msg": "+50 BONUS PTS (Pending)"}}"#,
    ) else {
        panic!("expected ability_announcement");
    };
    assert_eq!(msg.team, Some(PlayerTeam::Red));
    assert_eq!(msg.kind, "hack_bonus");

    // Spectators may still cast instant_charge.
    let ServerMessage::AbilityAnnouncement(msg) = decode(
        r#"{"event": "ability_announcement", "data": {"team": "SPECTATOR", "type": "instant_charge", "msg": "BATTERY RECHARGED!"}}"#,
    ) else {
        panic!("expected ability_announcement");
    };
    assert_eq!(msg.team, Some(PlayerTeam::Spectator));
    assert_eq!(msg.kind, AbilityId::InstantCharge.as_str());
}

#[test]
fn short_status_events() {
    assert!(matches!(
        decode(r#"{"event": "energy_update", "data": {"charged": false}}"#),
        ServerMessage::EnergyUpdate(m) if !m.charged
    ));
    assert!(matches!(
        decode(r#"{"event": "game_restarted", "data": {"message": "Game Started! GO GO GO!"}}"#),
        ServerMessage::GameRestarted(m) if m.message == "Game Started! GO GO GO!"
    ));
    assert!(matches!(
        decode(r#"{"event": "error_msg", "data": {"msg": "BATTERY EMPTY!"}}"#),
        ServerMessage::ErrorMsg(m) if m.msg == "BATTERY EMPTY!"
    ));
    assert!(matches!(
        decode(r#"{"event": "force_logout", "data": {"message": "Session Ended."}}"#),
        ServerMessage::ForceLogout(m) if m.message == "Session Ended."
    ));
}
