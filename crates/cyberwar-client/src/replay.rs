//! JSON-lines transcripts of server events and local actions.
//!
//! Each line carries an `at_ms` offset from the start of the replay plus one of:
//! a server envelope (`event` / `data`), a challenge `input`, an ability
//! `cast`, or a `link` change (`connected` / `disconnected`).

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;

use cyberwar_core::abilities::AbilityId;

use crate::minigame::ChallengeInput;
use crate::runtime::TransportEvent;

#[derive(Debug)]
pub struct ReplayEntry {
    pub at_ms: u64,
    pub event: TransportEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Link {
    Connected,
    Disconnected,
}

#[derive(Deserialize)]
struct RawLine {
    #[serde(default)]
    at_ms: u64,
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    input: Option<ChallengeInput>,
    #[serde(default)]
    cast: Option<AbilityId>,
    #[serde(default)]
    link: Option<Link>,
}

#[derive(Debug)]
pub struct ReplayError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "transcript line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ReplayError {}

/// Parse a transcript. Blank lines and lines starting with `#` are skipped.
pub fn parse_transcript(content: &str) -> Result<Vec<ReplayEntry>, ReplayError> {
    let mut entries = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let line_no = index + 1;
        let raw: RawLine = serde_json::from_str(text).map_err(|e| ReplayError {
            line: line_no,
            message: e.to_string(),
        })?;
        // Server lines are passed through whole; the envelope decoder ignores `at_ms`.
        let event = match (raw.event, raw.input, raw.cast, raw.link) {
            (Some(_), None, None, None) => TransportEvent::Text(text.to_string()),
            (None, Some(input), None, None) => TransportEvent::Input(input),
            (None, None, Some(ability), None) => TransportEvent::Cast(ability),
            (None, None, None, Some(Link::Connected)) => TransportEvent::Connected,
            (None, None, None, Some(Link::Disconnected)) => TransportEvent::Disconnected,
            _ => {
                return Err(ReplayError {
                    line: line_no,
                    message: "expected exactly one of event, input, cast, link".to_string(),
                });
            },
        };
        entries.push(ReplayEntry {
            at_ms: raw.at_ms,
            event,
        });
    }
    Ok(entries)
}

/// Send each entry at its offset, wait `linger_ms` for timers to drain, then
/// close the channel.
pub async fn feed(
    entries: Vec<ReplayEntry>,
    tx: mpsc::Sender<TransportEvent>,
    linger_ms: u64,
) {
    let start = tokio::time::Instant::now();
    for entry in entries {
        tokio::time::sleep_until(start + Duration::from_millis(entry.at_ms)).await;
        if tx.send(entry.event).await.is_err() {
            tracing::warn!("Client loop stopped, abandoning replay");
            return;
        }
    }
    tokio::time::sleep(Duration::from_millis(linger_ms)).await;
}
