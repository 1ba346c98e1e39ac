use serde::{Deserialize, Serialize};

use super::messages::{
    AbilityAnnouncementMsg, AbilitySuccessMsg, CastAbilityMsg, ClientMessage, EnergyChargedMsg,
    EnergyUpdateMsg, ErrorMsg, ForceLogoutMsg, GameRestartedMsg, LoginSuccessMsg, MessageType,
    MinigameResultMsg, PlayerLoginMsg, ServerMessage, StartMinigameMsg,
};
use crate::snapshot::Snapshot;

/// Maximum message size in bytes, for both binary and text frames.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

#[derive(Debug)]
pub enum ProtocolError {
    EmptyMessage,
    UnknownMessageType(u8),
    UnknownEvent(String),
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnknownMessageType(b) => write!(f, "unknown message type: 0x{b:02x}"),
            Self::UnknownEvent(name) => write!(f, "unknown event: {name}"),
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})"
                )
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

// ============================================================================
// Binary frames: 1-byte type prefix + MessagePack map payload
// ============================================================================

/// Frame `payload` as `type byte + MessagePack map`.
///
/// Payloads are written as maps so optional fields can be omitted.
pub fn encode_message<T: Serialize>(
    msg_type: MessageType,
    payload: &T,
) -> Result<Vec<u8>, ProtocolError> {
    let payload_bytes = rmp_serde::to_vec_named(payload)
        .map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    let total = 1 + payload_bytes.len();
    if total > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(total));
    }
    let mut buf = Vec::with_capacity(total);
    buf.push(msg_type as u8);
    buf.extend_from_slice(&payload_bytes);
    Ok(buf)
}

pub fn encode_client_message(msg: &ClientMessage) -> Result<Vec<u8>, ProtocolError> {
    match msg {
        ClientMessage::PlayerLogin(m) => encode_message(MessageType::PlayerLogin, m),
        ClientMessage::MinigameResult(m) => encode_message(MessageType::MinigameResult, m),
        ClientMessage::CastAbility(m) => encode_message(MessageType::CastAbility, m),
    }
}

pub fn encode_server_message(msg: &ServerMessage) -> Result<Vec<u8>, ProtocolError> {
    match msg {
        ServerMessage::UpdateState(m) => encode_message(MessageType::UpdateState, m.as_ref()),
        ServerMessage::StartMinigame(m) => encode_message(MessageType::StartMinigame, m),
        ServerMessage::EnergyCharged(m) => encode_message(MessageType::EnergyCharged, m),
        ServerMessage::EnergyUpdate(m) => encode_message(MessageType::EnergyUpdate, m),
        ServerMessage::GameRestarted(m) => encode_message(MessageType::GameRestarted, m),
        ServerMessage::AbilitySuccess(m) => encode_message(MessageType::AbilitySuccess, m),
        ServerMessage::AbilityAnnouncement(m) => {
            encode_message(MessageType::AbilityAnnouncement, m)
        },
        ServerMessage::LoginSuccess(m) => encode_message(MessageType::LoginSuccess, m),
        ServerMessage::ErrorMsg(m) => encode_message(MessageType::ErrorMsg, m),
        ServerMessage::ForceLogout(m) => encode_message(MessageType::ForceLogout, m),
    }
}

/// Read the leading type byte of a frame.
pub fn decode_message_type(data: &[u8]) -> Result<MessageType, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    MessageType::from_byte(data[0]).ok_or(ProtocolError::UnknownMessageType(data[0]))
}

/// Decode the MessagePack body that follows the type byte.
pub fn decode_payload<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(data.len()));
    }
    rmp_serde::from_slice(&data[1..]).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage, ProtocolError> {
    match decode_message_type(data)? {
        MessageType::PlayerLogin => Ok(ClientMessage::PlayerLogin(decode_payload::<
            PlayerLoginMsg,
        >(data)?)),
        MessageType::MinigameResult => Ok(ClientMessage::MinigameResult(decode_payload::<
            MinigameResultMsg,
        >(data)?)),
        MessageType::CastAbility => Ok(ClientMessage::CastAbility(decode_payload::<
            CastAbilityMsg,
        >(data)?)),
        _ => Err(ProtocolError::UnknownMessageType(data[0])),
    }
}

pub fn decode_server_message(data: &[u8]) -> Result<ServerMessage, ProtocolError> {
    match decode_message_type(data)? {
        MessageType::UpdateState => Ok(ServerMessage::UpdateState(Box::new(decode_payload::<
            Snapshot,
        >(data)?))),
        MessageType::StartMinigame => Ok(ServerMessage::StartMinigame(decode_payload::<
            StartMinigameMsg,
        >(data)?)),
        MessageType::EnergyCharged => Ok(ServerMessage::EnergyCharged(decode_payload::<
            EnergyChargedMsg,
        >(data)?)),
        MessageType::EnergyUpdate => Ok(ServerMessage::EnergyUpdate(decode_payload::<
            EnergyUpdateMsg,
        >(data)?)),
        MessageType::GameRestarted => Ok(ServerMessage::GameRestarted(decode_payload::<
            GameRestartedMsg,
        >(data)?)),
        MessageType::AbilitySuccess => Ok(ServerMessage::AbilitySuccess(decode_payload::<
            AbilitySuccessMsg,
        >(data)?)),
        MessageType::AbilityAnnouncement => Ok(ServerMessage::AbilityAnnouncement(
            decode_payload::<AbilityAnnouncementMsg>(data)?,
        )),
        MessageType::LoginSuccess => Ok(ServerMessage::LoginSuccess(decode_payload::<
            LoginSuccessMsg,
        >(data)?)),
        MessageType::ErrorMsg => Ok(ServerMessage::ErrorMsg(decode_payload::<ErrorMsg>(data)?)),
        MessageType::ForceLogout => Ok(ServerMessage::ForceLogout(decode_payload::<
            ForceLogoutMsg,
        >(data)?)),
        _ => Err(ProtocolError::UnknownMessageType(data[0])),
    }
}

// ============================================================================
// Text frames: {"event": "<name>", "data": {...}}
// ============================================================================

#[derive(Deserialize)]
struct RawEnvelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

fn encode_json<T: Serialize>(msg_type: MessageType, payload: &T) -> Result<String, ProtocolError> {
    let data =
        serde_json::to_value(payload).map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    let text = serde_json::json!({ "event": msg_type.name(), "data": data }).to_string();
    if text.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(text.len()));
    }
    Ok(text)
}

fn decode_json_payload<T: for<'de> Deserialize<'de>>(
    data: serde_json::Value,
) -> Result<T, ProtocolError> {
    // Events such as `game_restarted` may be emitted without a body.
    let data = if data.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        data
    };
    serde_json::from_value(data).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

fn parse_envelope(text: &str) -> Result<(MessageType, serde_json::Value), ProtocolError> {
    if text.trim().is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    if text.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(text.len()));
    }
    let raw: RawEnvelope =
        serde_json::from_str(text).map_err(|e| ProtocolError::DeserializeError(e.to_string()))?;
    let msg_type = MessageType::from_name(&raw.event).ok_or(ProtocolError::UnknownEvent(raw.event))?;
    Ok((msg_type, raw.data))
}

pub fn encode_client_json(msg: &ClientMessage) -> Result<String, ProtocolError> {
    match msg {
        ClientMessage::PlayerLogin(m) => encode_json(MessageType::PlayerLogin, m),
        ClientMessage::MinigameResult(m) => encode_json(MessageType::MinigameResult, m),
        ClientMessage::CastAbility(m) => encode_json(MessageType::CastAbility, m),
    }
}

pub fn decode_client_json(text: &str) -> Result<ClientMessage, ProtocolError> {
    let (msg_type, data) = parse_envelope(text)?;
    match msg_type {
        MessageType::PlayerLogin => Ok(ClientMessage::PlayerLogin(decode_json_payload(data)?)),
        MessageType::MinigameResult => {
            Ok(ClientMessage::MinigameResult(decode_json_payload(data)?))
        },
        MessageType::CastAbility => Ok(ClientMessage::CastAbility(decode_json_payload(data)?)),
        other => Err(ProtocolError::UnknownEvent(other.name().to_string())),
    }
}

pub fn encode_server_json(msg: &ServerMessage) -> Result<String, ProtocolError> {
    match msg {
        ServerMessage::UpdateState(m) => encode_json(MessageType::UpdateState, m.as_ref()),
        ServerMessage::StartMinigame(m) => encode_json(MessageType::StartMinigame, m),
        ServerMessage::EnergyCharged(m) => encode_json(MessageType::EnergyCharged, m),
        ServerMessage::EnergyUpdate(m) => encode_json(MessageType::EnergyUpdate, m),
        ServerMessage::GameRestarted(m) => encode_json(MessageType::GameRestarted, m),
        ServerMessage::AbilitySuccess(m) => encode_json(MessageType::AbilitySuccess, m),
        ServerMessage::AbilityAnnouncement(m) => encode_json(MessageType::AbilityAnnouncement, m),
        ServerMessage::LoginSuccess(m) => encode_json(MessageType::LoginSuccess, m),
        ServerMessage::ErrorMsg(m) => encode_json(MessageType::ErrorMsg, m),
        ServerMessage::ForceLogout(m) => encode_json(MessageType::ForceLogout, m),
    }
}

pub fn decode_server_json(text: &str) -> Result<ServerMessage, ProtocolError> {
    let (msg_type, data) = parse_envelope(text)?;
    match msg_type {
        MessageType::UpdateState => Ok(ServerMessage::UpdateState(Box::new(decode_json_payload(
            data,
        )?))),
        MessageType::StartMinigame => Ok(ServerMessage::StartMinigame(decode_json_payload(data)?)),
        MessageType::EnergyCharged => Ok(ServerMessage::EnergyCharged(decode_json_payload(data)?)),
        MessageType::EnergyUpdate => Ok(ServerMessage::EnergyUpdate(decode_json_payload(data)?)),
        MessageType::GameRestarted => Ok(ServerMessage::GameRestarted(decode_json_payload(data)?)),
        MessageType::AbilitySuccess => {
            Ok(ServerMessage::AbilitySuccess(decode_json_payload(data)?))
        },
        MessageType::AbilityAnnouncement => {
            Ok(ServerMessage::AbilityAnnouncement(decode_json_payload(data)?))
        },
        MessageType::LoginSuccess => Ok(ServerMessage::LoginSuccess(decode_json_payload(data)?)),
        MessageType::ErrorMsg => Ok(ServerMessage::ErrorMsg(decode_json_payload(data)?)),
        MessageType::ForceLogout => Ok(ServerMessage::ForceLogout(decode_json_payload(data)?)),
        other => Err(ProtocolError::UnknownEvent(other.name().to_string())),
    }
}
