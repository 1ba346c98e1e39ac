use cyberwar_core::net::messages::LoginSuccessMsg;
use cyberwar_core::snapshot::Team;

use crate::render::Screen;

/// Identity and screen state of the local player.
///
/// Owned by [`crate::app::Client`] and handed to each unit that needs it.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub team: Option<Team>,
    pub is_gm: bool,
    pub screen: Screen,
}

impl Default for ClientContext {
    fn default() -> Self {
        Self {
            player_id: None,
            player_name: None,
            team: None,
            is_gm: false,
            screen: Screen::Login,
        }
    }
}

impl ClientContext {
    pub fn login(&mut self, msg: &LoginSuccessMsg) {
        self.player_id = Some(msg.short_code.clone());
        self.player_name = if msg.player_name.is_empty() {
            None
        } else {
            Some(msg.player_name.clone())
        };
        self.team = msg.team.team();
        self.is_gm = msg.is_gm;
    }

    pub fn logout(&mut self) {
        *self = Self {
            screen: self.screen,
            ..Self::default()
        };
    }

    pub fn is_logged_in(&self) -> bool {
        self.player_id.is_some()
    }

    /// Label used when annotating the local player's captures.
    pub fn display_label(&self) -> &str {
        self.player_name
            .as_deref()
            .or(self.player_id.as_deref())
            .unwrap_or("ME")
    }
}
