use serde::{Deserialize, Serialize};

/// Notifications delivered by the host game runtime.
///
/// Events are facts about things that have already happened on the game
/// simulation thread; the stats subsystem only reacts to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    /// A player finished connecting and is addressable by steam id.
    PlayerConnected { steam_id: u64, name: String },

    /// A player died; attacker/assister credit rides along.
    PlayerDeath(DeathEvent),

    /// A player left the server.
    PlayerDisconnected { steam_id: u64 },

    /// A new round started; cached stats are flushed at this boundary.
    RoundStart,

    /// The server is going down; one final best-effort flush.
    Shutdown,
}

impl GameEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::PlayerConnected { .. } => "player_connected",
            GameEvent::PlayerDeath(_) => "player_death",
            GameEvent::PlayerDisconnected { .. } => "player_disconnected",
            GameEvent::RoundStart => "round_start",
            GameEvent::Shutdown => "shutdown",
        }
    }
}

/// Payload of a death event. An id of 0 means "no attributable party" for
/// that role; the bonus flags are independent and may all be set at once.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeathEvent {
    pub attacker: u64,
    pub victim: u64,
    pub assister: u64,
    pub headshot: bool,
    pub no_scope: bool,
    pub incendiary: bool,
    pub he: bool,
}

impl DeathEvent {
    /// A world/environment kill with no attributable party is a no-op.
    pub fn is_attributable(&self) -> bool {
        self.attacker != 0 || self.victim != 0 || self.assister != 0
    }
}
