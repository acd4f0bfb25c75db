mod board;
mod common;
mod config;
pub mod coordinator;
mod logging;
pub mod machine;
pub mod node;
pub mod player;
pub mod prelude;
pub mod protocol;
mod session;
mod ship;
pub mod transport;

pub use board::*;
pub use common::*;
pub use config::*;
pub use coordinator::{Coordinator, Outbox};
pub use logging::init_logging;
pub use machine::{handle_event, Event, Transition};
pub use node::{Command, PeerHandle, PeerNode};
pub use player::{drive, AiPlayer, CliPlayer, Player};
pub use protocol::{decode, encode, Message, Outcome};
pub use session::*;
pub use ship::*;
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
