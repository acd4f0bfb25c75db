//! Session coordinator: owns the session, feeds events to the state machine,
//! ships outgoing messages to the transport and publishes snapshots.

use log::{debug, error, warn};
use tokio::sync::{mpsc, watch};

use crate::board::Board;
use crate::common::GameError;
use crate::machine::{handle_event, Event};
use crate::protocol::{decode, encode};
use crate::session::{Session, Snapshot};
use crate::ship::Coord;

/// Outbound half of the transport: fire-and-forget text frames.
pub trait Outbox {
    fn send(&mut self, text: String);
}

impl Outbox for mpsc::UnboundedSender<String> {
    fn send(&mut self, text: String) {
        if mpsc::UnboundedSender::send(self, text).is_err() {
            debug!("outbound channel closed, frame dropped");
        }
    }
}

/// Collects frames in memory.
impl Outbox for Vec<String> {
    fn send(&mut self, text: String) {
        self.push(text);
    }
}

pub struct Coordinator<O: Outbox> {
    session: Session,
    outbox: O,
    snapshots: watch::Sender<Snapshot>,
}

impl<O: Outbox> Coordinator<O> {
    pub fn new(outbox: O) -> Self {
        let session = Session::new();
        let (snapshots, _) = watch::channel(session.snapshot());
        Self {
            session,
            outbox,
            snapshots,
        }
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn outbox(&self) -> &O {
        &self.outbox
    }

    pub fn outbox_mut(&mut self) -> &mut O {
        &mut self.outbox
    }

    pub fn on_transport_connecting(&mut self) {
        self.inbound(Event::Connecting);
    }

    pub fn on_transport_connected(&mut self, accepted_incoming: bool) {
        self.inbound(Event::Connected { accepted_incoming });
    }

    /// Decode and apply one inbound frame. Malformed or out-of-phase
    /// messages are logged and dropped.
    pub fn on_transport_message(&mut self, raw: &str) {
        match decode(raw) {
            Ok(message) => self.inbound(Event::Received(message)),
            Err(e) => warn!("discarding inbound frame: {}", e),
        }
    }

    pub fn on_transport_disconnected(&mut self) {
        self.inbound(Event::Disconnected);
    }

    pub fn submit_placement(&mut self, board: Board) -> Result<(), GameError> {
        self.apply(Event::PlacementSubmitted(board))
    }

    pub fn submit_attack(&mut self, x: u8, y: u8) -> Result<(), GameError> {
        self.apply(Event::AttackSubmitted(Coord::new(x, y)))
    }

    pub fn reset_session(&mut self) {
        self.inbound(Event::Reset);
    }

    fn inbound(&mut self, event: Event) {
        let name = event.name();
        if let Err(e) = self.apply(event) {
            debug!("dropped {}: {}", name, e);
        }
    }

    fn apply(&mut self, event: Event) -> Result<(), GameError> {
        let transition = handle_event(&self.session, event)?;
        for message in &transition.outgoing {
            match encode(message) {
                Ok(text) => self.outbox.send(text),
                Err(e) => error!("failed to encode {}: {}", message.kind(), e),
            }
        }
        if transition.session != self.session {
            self.session = transition.session;
            self.snapshots.send_replace(self.session.snapshot());
        }
        Ok(())
    }
}
