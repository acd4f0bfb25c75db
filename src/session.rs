//! Session state owned by one peer, and the snapshot handed to renderers.

use core::fmt;
use serde::Serialize;

use crate::board::Board;
use crate::ship::Coord;

/// Lifecycle phase; strictly forward until a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Connecting,
    Placement,
    Playing,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Connecting => "connecting",
            Phase::Placement => "placement",
            Phase::Playing => "playing",
            Phase::GameOver => "gameOver",
        };
        f.write_str(name)
    }
}

/// Which side of the connection we are. The host moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Accepted the incoming connection.
    Host,
    /// Initiated the connection.
    Joiner,
}

impl Role {
    pub fn from_accepted(accepted_incoming: bool) -> Self {
        if accepted_incoming {
            Role::Host
        } else {
            Role::Joiner
        }
    }
}

/// Turn ownership while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Turn {
    /// The local player may fire.
    Local,
    /// Waiting for the opponent's attack.
    Opponent,
    /// Our attack is in flight; waiting for its result.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    #[default]
    Undecided,
    Win,
    Loss,
}

/// Mirror of the transport's connection status signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Everything one peer knows about the game in progress.
///
/// Only [`crate::machine::handle_event`] produces new sessions; readers use
/// the accessors or a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub(crate) phase: Phase,
    pub(crate) role: Option<Role>,
    pub(crate) connection: ConnectionState,
    pub(crate) own_board: Board,
    pub(crate) opponent_view: Board,
    pub(crate) turn: Option<Turn>,
    pub(crate) result: GameResult,
    pub(crate) local_ready: bool,
    pub(crate) opponent_ready: bool,
    pub(crate) pending_target: Option<Coord>,
}

impl Session {
    /// Fresh session in `Connecting` with empty boards.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn own_board(&self) -> &Board {
        &self.own_board
    }

    pub fn opponent_view(&self) -> &Board {
        &self.opponent_view
    }

    pub fn turn(&self) -> Option<Turn> {
        self.turn
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    /// Whether our fleet has been submitted.
    pub fn is_local_ready(&self) -> bool {
        self.local_ready
    }

    /// Whether the opponent announced its fleet.
    pub fn is_opponent_ready(&self) -> bool {
        self.opponent_ready
    }

    /// Target of the attack currently awaiting a result.
    pub fn pending_target(&self) -> Option<Coord> {
        self.pending_target
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            role: self.role,
            connection: self.connection,
            turn: self.turn,
            result: self.result,
            local_ready: self.local_ready,
            own_board: self.own_board.clone(),
            opponent_view: self.opponent_view.clone(),
        }
    }
}

/// Read-only copy of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: Phase,
    pub role: Option<Role>,
    pub connection: ConnectionState,
    pub turn: Option<Turn>,
    pub result: GameResult,
    pub local_ready: bool,
    pub own_board: Board,
    pub opponent_view: Board,
}

impl Snapshot {
    /// One-line status for the player.
    pub fn status_line(&self) -> &'static str {
        match (self.phase, self.turn, self.result) {
            (Phase::Connecting, ..) => "Waiting for connection...",
            (Phase::Placement, ..) if self.local_ready => "Waiting for opponent to place ships...",
            (Phase::Placement, ..) => "Place your ships",
            (Phase::Playing, Some(Turn::Local), _) => "Your turn - fire at the enemy fleet!",
            (Phase::Playing, Some(Turn::Opponent), _) => "Opponent's turn - brace for impact!",
            (Phase::Playing, ..) => "Waiting...",
            (Phase::GameOver, _, GameResult::Win) => "Victory! You sank all enemy ships!",
            (Phase::GameOver, _, GameResult::Loss) => "Defeat! Your fleet has been destroyed!",
            (Phase::GameOver, ..) => "Game over",
        }
    }
}
