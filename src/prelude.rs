//! Commonly used types and utilities for ease of import.

pub use crate::{
    drive, AiPlayer, Board, Cell, CliPlayer, Coord, Coordinator, GameError, GameResult, Message,
    Orientation, PeerHandle, PeerNode, Phase, Player, Role, Snapshot, Turn, SHIPS,
};

pub use crate::transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
