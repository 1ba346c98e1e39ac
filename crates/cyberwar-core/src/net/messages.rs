use serde::{Deserialize, Serialize};

use crate::abilities::AbilityId;
use crate::snapshot::{PlayerTeam, Snapshot, Team};

/// Network message type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    // Client -> Server
    PlayerLogin = 0x01,
    MinigameResult = 0x02,
    CastAbility = 0x03,

    // Server -> Client (game state)
    UpdateState = 0x10,
    StartMinigame = 0x11,
    EnergyCharged = 0x12,
    EnergyUpdate = 0x13,
    GameRestarted = 0x14,

    // Server -> Client (abilities)
    AbilitySuccess = 0x20,
    AbilityAnnouncement = 0x21,

    // Server -> Client (session)
    LoginSuccess = 0x30,
    ErrorMsg = 0x31,
    ForceLogout = 0x32,
}

impl MessageType {
    const ALL: [MessageType; 13] = [
        Self::PlayerLogin,
        Self::MinigameResult,
        Self::CastAbility,
        Self::UpdateState,
        Self::StartMinigame,
        Self::EnergyCharged,
        Self::EnergyUpdate,
        Self::GameRestarted,
        Self::AbilitySuccess,
        Self::AbilityAnnouncement,
        Self::LoginSuccess,
        Self::ErrorMsg,
        Self::ForceLogout,
    ];

    pub fn from_byte(b: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| *t as u8 == b)
    }

    /// Event name used by the named-event text transport.
    pub fn name(self) -> &'static str {
        match self {
            Self::PlayerLogin => "player_login",
            Self::MinigameResult => "minigame_result",
            Self::CastAbility => "cast_ability",
            Self::UpdateState => "update_state",
            Self::StartMinigame => "start_minigame",
            Self::EnergyCharged => "energy_charged",
            Self::EnergyUpdate => "energy_update",
            Self::GameRestarted => "game_restarted",
            Self::AbilitySuccess => "ability_success",
            Self::AbilityAnnouncement => "ability_announcement",
            Self::LoginSuccess => "login_success",
            Self::ErrorMsg => "error_msg",
            Self::ForceLogout => "force_logout",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

// ============================================================================
// Client -> Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLoginMsg {
    #[serde(rename = "shortCode")]
    pub short_code: String,
}

/// Terminal outcome of one challenge session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinigameResultMsg {
    pub node: String,
    pub success: bool,
    /// Seconds from session start to its terminal state.
    pub duration: f64,
    #[serde(rename = "shortCode")]
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastAbilityMsg {
    #[serde(rename = "shortCode")]
    pub player_id: String,
    #[serde(rename = "type")]
    pub ability: AbilityId,
}

// ============================================================================
// Server -> Client
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartMinigameMsg {
    pub node: String,
    #[serde(rename = "gameType", default)]
    pub game_type: String,
    /// Difficulty label such as `"normal"`. Challenges do not scale with it yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

/// Capture grade reported with `energy_charged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpeedCategory {
    Fast,
    Normal,
    Slow,
    Failed,
}

impl SpeedCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "FAST",
            Self::Normal => "NORMAL",
            Self::Slow => "SLOW",
            Self::Failed => "FAILED",
        }
    }
}

/// Per-capture result, sent only to the player who attempted the capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyChargedMsg {
    #[serde(default)]
    pub energy_gain: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_ap: Option<u32>,
    pub speed_category: SpeedCategory,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub animation_duration: f64,
    #[serde(default)]
    pub charged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyUpdateMsg {
    pub charged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRestartedMsg {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilitySuccessMsg {
    #[serde(default)]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_ap: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityAnnouncementMsg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<PlayerTeam>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginSuccessMsg {
    #[serde(rename = "shortCode")]
    pub short_code: String,
    /// Codes outside the R/B prefixes log in as spectators.
    #[serde(default)]
    pub team: PlayerTeam,
    #[serde(rename = "playerName", default)]
    pub player_name: String,
    #[serde(default)]
    pub is_gm: bool,
    #[serde(default)]
    pub is_team_lead: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMsg {
    pub msg: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceLogoutMsg {
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Envelopes
// ============================================================================

/// Commands emitted by the client. All are fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    PlayerLogin(PlayerLoginMsg),
    MinigameResult(MinigameResultMsg),
    CastAbility(CastAbilityMsg),
}

impl ClientMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::PlayerLogin(_) => MessageType::PlayerLogin,
            Self::MinigameResult(_) => MessageType::MinigameResult,
            Self::CastAbility(_) => MessageType::CastAbility,
        }
    }
}

/// Everything the server pushes to a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    UpdateState(Box<Snapshot>),
    StartMinigame(StartMinigameMsg),
    EnergyCharged(EnergyChargedMsg),
    EnergyUpdate(EnergyUpdateMsg),
    GameRestarted(GameRestartedMsg),
    AbilitySuccess(AbilitySuccessMsg),
    AbilityAnnouncement(AbilityAnnouncementMsg),
    LoginSuccess(LoginSuccessMsg),
    ErrorMsg(ErrorMsg),
    ForceLogout(ForceLogoutMsg),
}

impl ServerMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::UpdateState(_) => MessageType::UpdateState,
            Self::StartMinigame(_) => MessageType::StartMinigame,
            Self::EnergyCharged(_) => MessageType::EnergyCharged,
            Self::EnergyUpdate(_) => MessageType::EnergyUpdate,
            Self::GameRestarted(_) => MessageType::GameRestarted,
            Self::AbilitySuccess(_) => MessageType::AbilitySuccess,
            Self::AbilityAnnouncement(_) => MessageType::AbilityAnnouncement,
            Self::LoginSuccess(_) => MessageType::LoginSuccess,
            Self::ErrorMsg(_) => MessageType::ErrorMsg,
            Self::ForceLogout(_) => MessageType::ForceLogout,
        }
    }
}
