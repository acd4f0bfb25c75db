//! Wire messages exchanged between the two peers and their JSON codec.
//!
//! Each message is one UTF-8 JSON object with a `type` discriminator:
//!
//! ```json
//! {"type":"attack","x":3,"y":4}
//! {"type":"attackResult","x":3,"y":4,"hit":true}
//! {"type":"gameOver","result":"win"}
//! ```
//!
//! There is no version field. Unknown extra fields are ignored.

use serde::{Deserialize, Serialize};

use crate::common::GameError;
use crate::session::GameResult;
use crate::ship::Coord;

/// Final outcome carried by [`Message::GameOver`].
///
/// The value is the outcome *for the receiving peer*: the side whose fleet
/// was destroyed sends `Win`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl From<Outcome> for GameResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => GameResult::Win,
            Outcome::Loss => GameResult::Loss,
        }
    }
}

/// Messages exchanged between peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// Sender has finished placing its fleet.
    Ready,
    /// Both sides are ready; turn order is fixed.
    GameStart,
    /// Sender fires at (x, y) on the receiver's board.
    Attack { x: u8, y: u8 },
    /// Receiver of an `Attack` reports its outcome.
    AttackResult { x: u8, y: u8, hit: bool },
    /// Sender's fleet is destroyed; the game is over.
    GameOver { result: Outcome },
}

impl Message {
    pub fn attack(target: Coord) -> Self {
        Message::Attack {
            x: target.x,
            y: target.y,
        }
    }

    pub fn attack_result(target: Coord, hit: bool) -> Self {
        Message::AttackResult {
            x: target.x,
            y: target.y,
            hit,
        }
    }

    /// Wire name of the message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Ready => "ready",
            Message::GameStart => "gameStart",
            Message::Attack { .. } => "attack",
            Message::AttackResult { .. } => "attackResult",
            Message::GameOver { .. } => "gameOver",
        }
    }
}

/// Serialize a message to its wire text.
pub fn encode(message: &Message) -> Result<String, GameError> {
    serde_json::to_string(message).map_err(|e| GameError::MalformedMessage(e.to_string()))
}

/// Parse wire text. Unknown kinds, missing fields and out-of-range numbers
/// fail with `MalformedMessage`.
pub fn decode(text: &str) -> Result<Message, GameError> {
    serde_json::from_str(text).map_err(|e| GameError::MalformedMessage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_result_uses_camel_case_tag() {
        let text = encode(&Message::attack_result(Coord::new(3, 4), true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "attackResult");
        assert_eq!(value["x"], 3);
        assert_eq!(value["y"], 4);
        assert_eq!(value["hit"], true);
    }
}
