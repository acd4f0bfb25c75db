use std::io::{self, Write};

use rand::rngs::SmallRng;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::board::Board;
use crate::common::{GameError, PlacementError};
use crate::config::BOARD_SIZE;
use crate::session::Snapshot;
use crate::ship::Coord;

use super::Player;

/// Interactive terminal player. The fleet is placed at random; targets are
/// read from stdin as a column letter and row number (e.g. `A5`).
pub struct CliPlayer {
    input: Lines<BufReader<Stdin>>,
    last_seen: Option<Snapshot>,
}

impl CliPlayer {
    pub fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
            last_seen: None,
        }
    }
}

impl Default for CliPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `A5`-style input into a coordinate.
pub fn parse_coord(input: &str) -> Result<Coord, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty input".to_string());
    }
    if input.len() < 2 {
        return Err("Too short - need column letter and row number (e.g., A5)".to_string());
    }
    let mut chars = input.chars();
    let col_ch = chars.next().ok_or("No column letter")?.to_ascii_uppercase();
    if !col_ch.is_ascii_uppercase() {
        return Err(format!("Invalid column '{}' - must be a letter A-J", col_ch));
    }
    let col = (col_ch as u8 - b'A') as usize;
    if col >= BOARD_SIZE as usize {
        return Err(format!("Column '{}' out of bounds - must be A-J", col_ch));
    }
    let row_str: String = chars.collect();
    let row: usize = row_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid row '{}' - must be a number 1-10", row_str))?;
    if row == 0 || row > BOARD_SIZE as usize {
        return Err(format!("Row {} out of bounds - must be 1-10", row));
    }
    Ok(Coord::new(col as u8, (row - 1) as u8))
}

/// Opponent view on top, own fleet below, then the status line.
pub fn render(snapshot: &Snapshot) -> String {
    format!(
        "\nOpponent board:\n{}\nYour board:\n{}\n{}\n",
        snapshot.opponent_view,
        snapshot.own_board,
        snapshot.status_line()
    )
}

#[async_trait::async_trait]
impl Player for CliPlayer {
    fn place_fleet(&mut self, rng: &mut SmallRng) -> Result<Board, PlacementError> {
        let fleet = Board::random_fleet(rng)?;
        println!("\nYour fleet has been placed:\n{}", fleet);
        Ok(fleet)
    }

    async fn select_target(&mut self, _rng: &mut SmallRng, view: &Board) -> Option<Coord> {
        loop {
            print!("Enter target (e.g. A5) or 'quit': ");
            let _ = io::stdout().flush();
            let line = match self.input.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) | Err(_) => return None,
            };
            let line = line.trim();
            if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
                return None;
            }
            match parse_coord(line) {
                Ok(target) if view.cell(target).is_some_and(|c| c.is_resolved()) => {
                    println!("You already fired at {}.", target);
                }
                Ok(target) => return Some(target),
                Err(msg) => println!("{}", msg),
            }
        }
    }

    fn target_rejected(&mut self, target: Coord, error: &GameError) {
        println!("Cannot fire at {}: {}", target, error);
    }

    fn observe(&mut self, snapshot: &Snapshot) {
        if self.last_seen.as_ref() == Some(snapshot) {
            return;
        }
        println!("{}", render(snapshot));
        self.last_seen = Some(snapshot.clone());
    }
}
