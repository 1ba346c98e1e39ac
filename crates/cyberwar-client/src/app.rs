use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use cyberwar_core::abilities::AbilityId;
use cyberwar_core::net::messages::{ClientMessage, PlayerLoginMsg, ServerMessage};
use cyberwar_core::net::protocol::{ProtocolError, decode_server_json, decode_server_message};
use cyberwar_core::time::Clock;

use crate::config::ClientConfig;
use crate::context::ClientContext;
use crate::minigame::engine::EnginePhase;
use crate::minigame::{ChallengeInput, ChallengeRegistry, MinigameEngine};
use crate::reconcile::{CastError, Reconciler};
use crate::render::{NoticeLevel, RenderSink, Screen, ViewUpdate, present};
use crate::scheduler::Scheduler;

/// Root of the client: owns the context, the engine, every reconciler and
/// the scheduler they share.
pub struct Client<S: RenderSink> {
    clock: Box<dyn Clock>,
    scheduler: Scheduler,
    sink: S,
    outbox: mpsc::UnboundedSender<ClientMessage>,
    context: ClientContext,
    engine: MinigameEngine,
    reconciler: Reconciler,
}

impl<S: RenderSink> Client<S> {
    pub fn new(
        config: &ClientConfig,
        clock: Box<dyn Clock>,
        sink: S,
        outbox: mpsc::UnboundedSender<ClientMessage>,
    ) -> Self {
        let scheduler = Scheduler::new();
        let now_ms = clock.now_millis();

        let mut registry = ChallengeRegistry::with_defaults();
        if !registry.set_default(&config.minigame.default_challenge) {
            tracing::warn!(
                kind = %config.minigame.default_challenge,
                fallback = registry.default_kind(),
                "Configured default challenge is not registered"
            );
        }
        let rng = match config.minigame.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let engine = MinigameEngine::new(registry, &scheduler, rng, config.minigame.feedback_ms);
        let reconciler = Reconciler::new(&scheduler, now_ms, config);

        Self {
            clock,
            scheduler,
            sink,
            outbox,
            context: ClientContext::default(),
            engine,
            reconciler,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    pub fn engine(&self) -> &MinigameEngine {
        &self.engine
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    /// Decode and handle a binary frame.
    pub fn handle_frame(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        let msg = decode_server_message(data)?;
        self.handle_message(msg);
        Ok(())
    }

    /// Decode and handle a JSON text frame.
    pub fn handle_text(&mut self, text: &str) -> Result<(), ProtocolError> {
        let msg = decode_server_json(text)?;
        self.handle_message(msg);
        Ok(())
    }

    pub fn handle_message(&mut self, msg: ServerMessage) {
        let now_ms = self.now();
        tracing::trace!(message_type = ?msg.message_type(), "Inbound message");
        match msg {
            ServerMessage::UpdateState(snapshot) => {
                self.reconciler
                    .apply_snapshot(&snapshot, now_ms, &self.context, &mut self.sink);
            },
            ServerMessage::StartMinigame(start) => {
                if let Some(flushed) =
                    self.engine
                        .begin(&start, now_ms, &mut self.context, &mut self.sink)
                {
                    self.send(ClientMessage::MinigameResult(flushed));
                }
            },
            ServerMessage::EnergyCharged(charged) => {
                if let Some(ap) = charged.current_ap {
                    self.reconciler.abilities.set_points(ap, &mut self.sink);
                }
                if let Some(team) = charged.team {
                    self.reconciler.scores.show_capture(
                        team,
                        self.context.display_label(),
                        charged.speed_category,
                        now_ms,
                        &mut self.sink,
                    );
                }
                self.reconciler
                    .battery
                    .on_energy_charged(&charged, now_ms, &mut self.sink);
            },
            ServerMessage::EnergyUpdate(update) => {
                self.reconciler
                    .battery
                    .on_energy_update(update.charged, &mut self.sink);
            },
            ServerMessage::GameRestarted(restart) => {
                tracing::info!("Game restarted");
                self.reconciler.clock.restart(&mut self.sink);
                if !restart.message.is_empty() {
                    self.notice(NoticeLevel::Info, restart.message);
                }
            },
            ServerMessage::AbilitySuccess(success) => {
                if let Some(ap) = success.current_ap {
                    self.reconciler.abilities.set_points(ap, &mut self.sink);
                }
                self.notice(NoticeLevel::Info, success.msg);
            },
            ServerMessage::AbilityAnnouncement(announcement) => {
                self.notice(NoticeLevel::Info, announcement.msg);
            },
            ServerMessage::LoginSuccess(login) => {
                self.context.login(&login);
                tracing::info!(
                    player = %login.short_code,
                    team = ?login.team,
                    is_gm = login.is_gm,
                    "Logged in"
                );
                // Identity drives AP and the jammer; redraw both from the next snapshot.
                self.reconciler.resync();
                if self.engine.phase() == EnginePhase::Idle {
                    self.show_screen(Screen::Dashboard);
                }
            },
            ServerMessage::ErrorMsg(error) => {
                tracing::warn!(msg = %error.msg, "Server error");
                self.notice(NoticeLevel::Error, error.msg);
            },
            ServerMessage::ForceLogout(logout) => {
                tracing::info!(message = %logout.message, "Forced logout");
                // A finished challenge still reports under the outgoing identity.
                if let Some(result) = self.engine.flush(&self.context) {
                    self.send(ClientMessage::MinigameResult(result));
                }
                self.engine.teardown();
                self.context.logout();
                self.show_screen(Screen::Login);
                if !logout.message.is_empty() {
                    self.notice(NoticeLevel::Error, logout.message);
                }
            },
        }
    }

    /// Forward player input to the running challenge.
    pub fn handle_input(&mut self, input: &ChallengeInput) {
        let now_ms = self.now();
        self.engine.handle_input(input, now_ms, &mut self.sink);
    }

    pub fn request_login(&mut self, short_code: &str) {
        self.send(ClientMessage::PlayerLogin(PlayerLoginMsg {
            short_code: short_code.to_string(),
        }));
    }

    /// Validate and send an ability cast.
    pub fn cast_ability(&mut self, ability: AbilityId) -> Result<(), CastError> {
        let msg = self.reconciler.abilities.cast(ability, &self.context)?;
        self.send(ClientMessage::CastAbility(msg));
        Ok(())
    }

    pub fn on_connected(&mut self) {
        tracing::info!("Transport connected, resyncing from next snapshot");
        self.reconciler.resync();
    }

    pub fn on_disconnected(&mut self) {
        tracing::warn!("Transport disconnected");
    }

    /// Fire every timer that is due. Returns how many fired.
    pub fn run_due_timers(&mut self) -> usize {
        let now_ms = self.now();
        let mut fired = 0;
        while let Some((_, task)) = self.scheduler.pop_due(now_ms) {
            fired += 1;
            if self.reconciler.on_timer(task, now_ms, &mut self.sink) {
                continue;
            }
            if let Some(result) =
                self.engine
                    .on_timer(task, now_ms, &mut self.context, &mut self.sink)
            {
                self.send(ClientMessage::MinigameResult(result));
            }
        }
        fired
    }

    /// Cancel every session, tick loop and transient timer.
    pub fn shutdown(&mut self) {
        self.engine.teardown();
        self.reconciler.teardown();
        tracing::debug!(pending = self.scheduler.pending(), "Client shut down");
    }

    fn send(&mut self, msg: ClientMessage) {
        let message_type = msg.message_type();
        if self.outbox.send(msg).is_err() {
            tracing::warn!(?message_type, "Outbound channel closed, dropping command");
        } else {
            tracing::info!(?message_type, "Command sent");
        }
    }

    fn notice(&mut self, level: NoticeLevel, message: String) {
        present(&mut self.sink, ViewUpdate::Notice { level, message });
    }

    fn show_screen(&mut self, screen: Screen) {
        self.context.screen = screen;
        present(&mut self.sink, ViewUpdate::Screen { screen });
    }
}
