use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use cyberwar_core::abilities::AbilityId;
use cyberwar_core::net::messages::ServerMessage;
use cyberwar_core::time::{Clock, SystemClock};

use crate::app::Client;
use crate::minigame::ChallengeInput;
use crate::render::RenderSink;

/// Everything the runtime loop reacts to besides its own timers.
#[derive(Debug)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    /// Binary frame from the server.
    Frame(Vec<u8>),
    /// JSON text frame from the server.
    Text(String),
    Message(ServerMessage),
    Input(ChallengeInput),
    Cast(AbilityId),
}

/// Epoch clock driven by tokio time, so paused-time tests stay deterministic.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: Instant,
    origin_epoch_ms: u64,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::starting_at(SystemClock.now_millis())
    }

    /// Clock reading `epoch_ms` right now.
    pub fn starting_at(epoch_ms: u64) -> Self {
        Self {
            origin: Instant::now(),
            origin_epoch_ms: epoch_ms,
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_millis(&self) -> u64 {
        self.origin_epoch_ms + self.origin.elapsed().as_millis() as u64
    }
}

/// Apply one transport event to the client.
pub fn dispatch<S: RenderSink>(client: &mut Client<S>, event: TransportEvent) {
    match event {
        TransportEvent::Connected => client.on_connected(),
        TransportEvent::Disconnected => client.on_disconnected(),
        TransportEvent::Frame(data) => {
            if let Err(e) = client.handle_frame(&data) {
                tracing::warn!(error = %e, len = data.len(), "Dropping undecodable frame");
            }
        },
        TransportEvent::Text(text) => {
            if let Err(e) = client.handle_text(&text) {
                tracing::warn!(error = %e, "Dropping undecodable text frame");
            }
        },
        TransportEvent::Message(msg) => client.handle_message(msg),
        TransportEvent::Input(input) => client.handle_input(&input),
        TransportEvent::Cast(ability) => {
            if let Err(e) = client.cast_ability(ability) {
                tracing::info!(%ability, error = %e, "Cast refused");
            }
        },
    }
}

/// Drive the client until the event channel closes, then shut it down.
///
/// Inbound events are handled in arrival order. Between events the loop
/// sleeps until the scheduler's next deadline and fires what is due.
pub async fn run<S: RenderSink>(
    client: &mut Client<S>,
    mut events: mpsc::Receiver<TransportEvent>,
) {
    loop {
        client.run_due_timers();
        let wait = client
            .next_deadline()
            .map(|deadline| Duration::from_millis(deadline.saturating_sub(client.now())));

        tokio::select! {
            event = events.recv() => match event {
                Some(event) => dispatch(client, event),
                None => break,
            },
            () = sleep_or_forever(wait) => {},
        }
    }
    client.shutdown();
}

async fn sleep_or_forever(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use cyberwar_core::net::messages::{ClientMessage, StartMinigameMsg};

    use super::*;
    use crate::config::ClientConfig;
    use crate::render::{RecordingSink, ViewUpdate};

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_paused_time() {
        let clock = TokioClock::starting_at(5_000);
        tokio::time::advance(Duration::from_millis(1_250)).await;
        assert_eq!(clock.now_millis(), 6_250);
    }

    #[tokio::test(start_paused = true)]
    async fn run_fires_timers_and_emits_outcome() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (tx, rx) = mpsc::channel(16);
        let mut config = ClientConfig::default();
        config.minigame.rng_seed = Some(5);
        let mut client = Client::new(
            &config,
            Box::new(TokioClock::starting_at(1_700_000_000_000)),
            RecordingSink::new(),
            out_tx,
        );

        let producer = async move {
            tx.send(TransportEvent::Message(ServerMessage::StartMinigame(
                StartMinigameMsg {
                    node: "alpha".to_string(),
                    game_type: "brute_force".to_string(),
                    difficulty: None,
                },
            )))
            .await
            .unwrap();
            // Let the 7 s limit run out and the feedback window close.
            tokio::time::sleep(Duration::from_millis(9_000)).await;
            drop(tx);
        };
        tokio::join!(run(&mut client, rx), producer);

        match out_rx.try_recv() {
            Ok(ClientMessage::MinigameResult(result)) => {
                assert!(!result.success);
                assert!((result.duration - 7.0).abs() < 0.01);
            },
            other => panic!("expected minigame result, got {other:?}"),
        }
        assert!(client.sink().updates().contains(&ViewUpdate::ChallengeFeedback {
            success: false,
            message: "WALL INTACT".to_string(),
        }));
        assert!(client.next_deadline().is_none());
    }
}
