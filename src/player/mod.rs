//! Player trait and implementations
//!
//! A Player stands in for the UI collaborator. It is responsible for:
//! - Producing a validated fleet when placement opens
//! - Selecting targets when it is our turn
//! - Observing snapshots to render or learn from them
//!
//! [`drive`] connects a player to a running [`PeerNode`](crate::PeerNode).

use log::debug;
use rand::rngs::SmallRng;

use crate::board::Board;
use crate::common::{GameError, PlacementError};
use crate::node::PeerHandle;
use crate::session::{Phase, Snapshot, Turn};
use crate::ship::Coord;

/// Interface implemented by different player types.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Produce the complete fleet to play with.
    fn place_fleet(&mut self, rng: &mut SmallRng) -> Result<Board, PlacementError>;

    /// Choose the next target given what we know of the opponent board.
    /// `None` means the player wants to leave the game.
    async fn select_target(&mut self, rng: &mut SmallRng, view: &Board) -> Option<Coord>;

    /// Inform the player of a rejected target so it can choose again.
    fn target_rejected(&mut self, _target: Coord, _error: &GameError) {}

    /// Inform the player of every new snapshot.
    fn observe(&mut self, _snapshot: &Snapshot) {}
}

/// Play one game through `handle` until it ends or the node stops.
pub async fn drive<P: Player + ?Sized>(
    player: &mut P,
    handle: &PeerHandle,
    rng: &mut SmallRng,
) -> anyhow::Result<Snapshot> {
    let mut snapshots = handle.subscribe();
    let mut placed = false;

    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        player.observe(&snapshot);

        match (snapshot.phase, snapshot.turn) {
            (Phase::Placement, _) if !placed => {
                let fleet = player
                    .place_fleet(rng)
                    .map_err(|e| anyhow::anyhow!(e))?;
                match handle.submit_placement(fleet).await {
                    Ok(()) => placed = true,
                    Err(GameError::SessionClosed) => return Ok(snapshot),
                    Err(e) => return Err(anyhow::anyhow!("fleet rejected: {}", e)),
                }
            }
            (Phase::Playing, Some(Turn::Local)) => {
                let Some(target) = player.select_target(rng, &snapshot.opponent_view).await else {
                    debug!("player left the game");
                    handle.reset();
                    return Ok(snapshot);
                };
                match handle.attack(target).await {
                    Ok(()) => {}
                    Err(GameError::SessionClosed) => return Ok(snapshot),
                    Err(e) => {
                        player.target_rejected(target, &e);
                        continue;
                    }
                }
            }
            (Phase::GameOver, _) => return Ok(snapshot),
            _ => {}
        }

        if snapshots.changed().await.is_err() {
            // Node finished; report whatever it published last.
            let last = snapshots.borrow().clone();
            player.observe(&last);
            return Ok(last);
        }
    }
}

pub mod ai;
pub use ai::AiPlayer;

pub mod cli;
pub use cli::CliPlayer;
