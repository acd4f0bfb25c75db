//! Turn state machine: the only place session state changes.
//!
//! [`handle_event`] is a pure transition function. It never mutates the
//! session it is given; on success it returns the next session together with
//! the messages that must be sent to the opponent, in order. An `Err` means
//! the event was refused and nothing changes.

use log::{debug, info, warn};

use crate::board::Board;
use crate::common::{BoardError, GameError};
use crate::protocol::{Message, Outcome};
use crate::session::{ConnectionState, GameResult, Phase, Role, Session, Turn};
use crate::ship::Coord;

/// Everything that can drive a session forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Transport reports it is establishing a connection.
    Connecting,
    /// Transport reports the connection is open.
    Connected { accepted_incoming: bool },
    /// Transport reports the connection dropped.
    Disconnected,
    /// A decoded message from the opponent.
    Received(Message),
    /// The local player finished placing the fleet.
    PlacementSubmitted(Board),
    /// The local player fires at the opponent.
    AttackSubmitted(Coord),
    /// "New Game": discard everything.
    Reset,
}

impl Event {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Connecting => "connecting",
            Event::Connected { .. } => "connected",
            Event::Disconnected => "disconnected",
            Event::Received(message) => message.kind(),
            Event::PlacementSubmitted(_) => "placement",
            Event::AttackSubmitted(_) => "local attack",
            Event::Reset => "reset",
        }
    }
}

/// Result of an accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub outgoing: Vec<Message>,
}

/// Apply `event` to `session`.
pub fn handle_event(session: &Session, event: Event) -> Result<Transition, GameError> {
    let name = event.name();
    let mut next = session.clone();
    let mut outgoing = Vec::new();

    match event {
        Event::Connecting => next.connection = ConnectionState::Connecting,
        Event::Connected { accepted_incoming } => {
            if next.phase != Phase::Connecting {
                return Err(violation(session, name));
            }
            let role = Role::from_accepted(accepted_incoming);
            next.connection = ConnectionState::Connected;
            next.role = Some(role);
            next.phase = Phase::Placement;
            info!("connected as {:?}, entering placement", role);
        }
        Event::Disconnected => {
            next.connection = ConnectionState::Disconnected;
            if next.phase != Phase::GameOver {
                warn!("opponent disconnected during {}", next.phase);
            }
        }
        Event::Reset => next = Session::new(),
        Event::PlacementSubmitted(board) => submit_placement(&mut next, board, &mut outgoing)?,
        Event::AttackSubmitted(target) => fire(&mut next, target, &mut outgoing)?,
        Event::Received(message) => receive(&mut next, message, &mut outgoing)?,
    }

    Ok(Transition {
        session: next,
        outgoing,
    })
}

fn violation(session: &Session, event: &'static str) -> GameError {
    GameError::PhaseViolation {
        phase: session.phase,
        turn: session.turn,
        event,
    }
}

fn submit_placement(
    session: &mut Session,
    board: Board,
    outgoing: &mut Vec<Message>,
) -> Result<(), GameError> {
    if session.phase != Phase::Placement || session.local_ready {
        return Err(violation(session, "placement"));
    }
    board.validate_fleet()?;
    session.own_board = board;
    session.local_ready = true;

    if session.opponent_ready {
        // Our completion is the triggering event: we announce the start.
        start_playing(session);
        outgoing.push(Message::GameStart);
    } else {
        outgoing.push(Message::Ready);
    }
    Ok(())
}

fn start_playing(session: &mut Session) {
    session.phase = Phase::Playing;
    session.turn = Some(match session.role {
        Some(Role::Host) => Turn::Local,
        _ => Turn::Opponent,
    });
    info!("game started, first turn: {:?}", session.turn);
}

fn fire(session: &mut Session, target: Coord, outgoing: &mut Vec<Message>) -> Result<(), GameError> {
    if session.phase != Phase::Playing {
        return Err(violation(session, "local attack"));
    }
    if session.turn != Some(Turn::Local) {
        return Err(GameError::OutOfTurn);
    }
    match session.opponent_view.cell(target) {
        None => return Err(BoardError::out_of_range(target).into()),
        Some(cell) if cell.is_resolved() => {
            return Err(BoardError::already_resolved(target).into())
        }
        Some(_) => {}
    }
    session.turn = Some(Turn::Pending);
    session.pending_target = Some(target);
    outgoing.push(Message::attack(target));
    debug!("firing at {}", target);
    Ok(())
}

fn receive(
    session: &mut Session,
    message: Message,
    outgoing: &mut Vec<Message>,
) -> Result<(), GameError> {
    let kind = message.kind();
    match message {
        Message::Ready => {
            if session.phase != Phase::Placement || session.opponent_ready {
                return Err(violation(session, kind));
            }
            session.opponent_ready = true;
            if session.local_ready {
                // Both Ready messages crossed on the wire. The host alone
                // announces the start so exactly one GameStart exists.
                start_playing(session);
                if session.role == Some(Role::Host) {
                    outgoing.push(Message::GameStart);
                }
            }
        }
        Message::GameStart => {
            if session.phase != Phase::Placement || !session.local_ready {
                return Err(violation(session, kind));
            }
            session.opponent_ready = true;
            start_playing(session);
        }
        Message::Attack { x, y } => {
            if session.phase != Phase::Playing || session.turn != Some(Turn::Opponent) {
                return Err(violation(session, kind));
            }
            let target = Coord::new(x, y);
            let hit = match session.own_board.receive_attack(target) {
                Ok(result) => result.is_hit(),
                Err(e) => {
                    warn!("opponent attack rejected ({}), answering as a miss", e);
                    false
                }
            };
            if hit && session.own_board.is_fleet_destroyed() {
                finish(session, GameResult::Loss);
                outgoing.push(Message::GameOver {
                    result: Outcome::Win,
                });
            } else {
                session.turn = Some(Turn::Local);
                outgoing.push(Message::attack_result(target, hit));
            }
        }
        Message::AttackResult { x, y, hit } => {
            let target = Coord::new(x, y);
            if session.phase != Phase::Playing
                || session.turn != Some(Turn::Pending)
                || session.pending_target != Some(target)
            {
                return Err(violation(session, kind));
            }
            session.opponent_view.record_result(target, hit)?;
            session.pending_target = None;
            session.turn = Some(Turn::Opponent);
        }
        Message::GameOver { result } => {
            if session.phase != Phase::Playing {
                return Err(violation(session, kind));
            }
            if let (Outcome::Win, Some(target)) = (result, session.pending_target.take()) {
                // The winning shot necessarily hit.
                let _ = session.opponent_view.record_result(target, true);
            }
            finish(session, result.into());
        }
    }
    Ok(())
}

/// Set the result, then enter `GameOver`. Only reachable from `Playing`, so
/// the result is written exactly once per game.
fn finish(session: &mut Session, result: GameResult) {
    session.result = result;
    session.phase = Phase::GameOver;
    info!("game over: {:?}", result);
}
