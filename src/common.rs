//! Error taxonomy shared by the board, codec and state machine.

use core::fmt;
use thiserror::Error;

use crate::session::{Phase, Turn};
use crate::ship::Coord;

/// Why a ship could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// Some segment would leave the 10×10 grid.
    #[error("ship placement is out of bounds")]
    OutOfBounds,
    /// Some segment would cover a cell that is not empty.
    #[error("ship placement overlaps another ship")]
    Overlap,
    #[error("{0} is already placed")]
    AlreadyPlaced(&'static str),
    /// Every catalog ship of this size is already on the board.
    #[error("no ship of size {0} left to place")]
    NoShipOfSize(usize),
    /// A catalog ship has not been placed.
    #[error("fleet is missing its {0}")]
    MissingShip(&'static str),
    /// Ship cells on the grid disagree with the catalog total.
    #[error("fleet is incomplete: {placed} of {expected} ship cells placed")]
    IncompleteFleet { placed: usize, expected: usize },
    /// Some cell has already been attacked.
    #[error("fleet has already been attacked")]
    AlreadyAttacked,
    /// Random placement gave up.
    #[error("unable to place ship")]
    UnableToPlace,
}

/// Reason an attack target was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFault {
    OutOfRange,
    AlreadyResolved,
}

impl fmt::Display for TargetFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFault::OutOfRange => write!(f, "out of range"),
            TargetFault::AlreadyResolved => write!(f, "already attacked"),
        }
    }
}

/// Errors returned by board attack operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid target ({}, {}): {fault}", .target.x, .target.y)]
    InvalidTarget { target: Coord, fault: TargetFault },
}

impl BoardError {
    pub fn out_of_range(target: Coord) -> Self {
        BoardError::InvalidTarget {
            target,
            fault: TargetFault::OutOfRange,
        }
    }

    pub fn already_resolved(target: Coord) -> Self {
        BoardError::InvalidTarget {
            target,
            fault: TargetFault::AlreadyResolved,
        }
    }
}

/// Every way an event can be refused by the session. None of them is fatal:
/// the event is dropped and the session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Inbound text did not decode to a known message.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error(transparent)]
    InvalidTarget(#[from] BoardError),
    #[error("illegal placement: {0}")]
    IllegalPlacement(#[from] PlacementError),
    /// The event does not fit the current phase or turn.
    #[error("{event} is not valid in phase {phase} (turn: {turn:?})")]
    PhaseViolation {
        phase: Phase,
        turn: Option<Turn>,
        event: &'static str,
    },
    #[error("it is not your turn")]
    OutOfTurn,
    /// The event loop owning the session has stopped.
    #[error("session is closed")]
    SessionClosed,
}
