use tokio::sync::mpsc;

use cyberwar_client::config::ClientConfig;
use cyberwar_client::render::{RecordingSink, ViewUpdate};
use cyberwar_client::Client;
use cyberwar_core::net::messages::{
    ClientMessage, LoginSuccessMsg, MinigameResultMsg, ServerMessage, StartMinigameMsg,
};
use cyberwar_core::snapshot::{Snapshot, Team};
use cyberwar_core::test_helpers::ManualClock;

/// A client wired to a manual clock, a recording sink and an inspectable outbox.
pub struct TestClient {
    pub client: Client<RecordingSink>,
    pub clock: ManualClock,
    outbox: mpsc::UnboundedReceiver<ClientMessage>,
}

impl TestClient {
    pub fn new() -> Self {
        let mut config = ClientConfig::default();
        config.minigame.rng_seed = Some(1234);
        Self::with_config(config)
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let clock = ManualClock::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Client::new(&config, Box::new(clock.clone()), RecordingSink::new(), tx);
        Self {
            client,
            clock,
            outbox: rx,
        }
    }

    pub fn now(&self) -> u64 {
        self.client.now()
    }

    pub fn login(&mut self, short_code: &str, team: Team) {
        self.client
            .handle_message(ServerMessage::LoginSuccess(LoginSuccessMsg {
                short_code: short_code.to_string(),
                team: team.into(),
                player_name: String::new(),
                is_gm: false,
                is_team_lead: false,
            }));
    }

    pub fn snapshot(&mut self, snapshot: Snapshot) {
        self.client
            .handle_message(ServerMessage::UpdateState(Box::new(snapshot)));
    }

    pub fn start(&mut self, game_type: &str, node: &str) {
        self.client
            .handle_message(ServerMessage::StartMinigame(StartMinigameMsg {
                node: node.to_string(),
                game_type: game_type.to_string(),
                difficulty: None,
            }));
    }

    /// Move time forward, firing each timer at its own deadline.
    pub fn advance(&mut self, ms: u64) {
        let target = self.client.now() + ms;
        while let Some(deadline) = self.client.next_deadline() {
            if deadline > target {
                break;
            }
            self.clock.set(deadline.max(self.client.now()));
            self.client.run_due_timers();
        }
        self.clock.set(target);
        self.client.run_due_timers();
    }

    pub fn sent(&mut self) -> Vec<ClientMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.outbox.try_recv() {
            out.push(msg);
        }
        out
    }

    pub fn results(&mut self) -> Vec<MinigameResultMsg> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                ClientMessage::MinigameResult(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> &[ViewUpdate] {
        self.client.sink().updates()
    }

    pub fn count(&self, pred: impl Fn(&ViewUpdate) -> bool) -> usize {
        self.client.sink().count(pred)
    }

    pub fn clear_updates(&mut self) {
        self.client.sink_mut().clear();
    }
}
