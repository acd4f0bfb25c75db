//! Event loop for one peer: serializes inbound frames and local commands into
//! a single ordered stream applied to the [`Coordinator`].

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot, watch};

use crate::board::Board;
use crate::common::GameError;
use crate::coordinator::Coordinator;
use crate::session::{Phase, Snapshot};
use crate::ship::Coord;
use crate::transport::Transport;

type Reply = oneshot::Sender<Result<(), GameError>>;

/// Local player actions delivered to the node.
#[derive(Debug)]
pub enum Command {
    PlaceFleet(Board, Reply),
    Attack(Coord, Reply),
    /// "New Game": reset the session and leave the connection.
    Reset,
}

/// Cloneable handle the UI side uses to talk to a running [`PeerNode`].
#[derive(Clone)]
pub struct PeerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl PeerHandle {
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub async fn submit_placement(&self, board: Board) -> Result<(), GameError> {
        self.request(|reply| Command::PlaceFleet(board, reply)).await
    }

    pub async fn attack(&self, target: Coord) -> Result<(), GameError> {
        self.request(|reply| Command::Attack(target, reply)).await
    }

    pub fn reset(&self) {
        let _ = self.commands.send(Command::Reset);
    }

    async fn request(&self, make: impl FnOnce(Reply) -> Command) -> Result<(), GameError> {
        let (reply, verdict) = oneshot::channel();
        self.commands
            .send(make(reply))
            .map_err(|_| GameError::SessionClosed)?;
        verdict.await.map_err(|_| GameError::SessionClosed)?
    }
}

enum Step {
    Frame(anyhow::Result<String>),
    Command(Option<Command>),
}

pub struct PeerNode<T: Transport> {
    transport: T,
    coordinator: Coordinator<mpsc::UnboundedSender<String>>,
    outbound: mpsc::UnboundedReceiver<String>,
    commands: mpsc::UnboundedReceiver<Command>,
    accepted_incoming: bool,
}

impl<T: Transport> PeerNode<T> {
    /// `accepted_incoming` is true on the side that accepted the connection
    /// (the host).
    pub fn new(transport: T, accepted_incoming: bool) -> (Self, PeerHandle) {
        let (outbox, outbound) = mpsc::unbounded_channel();
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let mut coordinator = Coordinator::new(outbox);
        coordinator.on_transport_connecting();
        let handle = PeerHandle {
            commands: commands_tx,
            snapshots: coordinator.subscribe(),
        };
        let node = Self {
            transport,
            coordinator,
            outbound,
            commands,
            accepted_incoming,
        };
        (node, handle)
    }

    /// Run until the game ends, the connection drops, a reset is requested or
    /// every handle is gone. Returns the final snapshot.
    pub async fn run(mut self) -> anyhow::Result<Snapshot> {
        self.coordinator.on_transport_connected(self.accepted_incoming);

        loop {
            if let Err(e) = self.flush().await {
                warn!("send failed: {}", e);
                self.coordinator.on_transport_disconnected();
                break;
            }
            if self.coordinator.session().phase() == Phase::GameOver {
                break;
            }

            let step = tokio::select! {
                frame = self.transport.recv() => Step::Frame(frame),
                command = self.commands.recv() => Step::Command(command),
            };

            match step {
                Step::Frame(Ok(text)) => {
                    debug!("<- {}", text);
                    self.coordinator.on_transport_message(&text);
                }
                Step::Frame(Err(e)) => {
                    info!("transport closed: {}", e);
                    self.coordinator.on_transport_disconnected();
                    break;
                }
                Step::Command(Some(Command::PlaceFleet(board, reply))) => {
                    let _ = reply.send(self.coordinator.submit_placement(board));
                }
                Step::Command(Some(Command::Attack(target, reply))) => {
                    let _ = reply.send(self.coordinator.submit_attack(target.x, target.y));
                }
                Step::Command(Some(Command::Reset)) => {
                    self.coordinator.reset_session();
                    break;
                }
                Step::Command(None) => {
                    debug!("all handles dropped, leaving");
                    break;
                }
            }
        }

        Ok(self.coordinator.snapshot())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        while let Ok(text) = self.outbound.try_recv() {
            debug!("-> {}", text);
            self.transport.send(text).await?;
        }
        Ok(())
    }
}
