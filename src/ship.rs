//! Ship catalog entries, coordinates and placement footprints.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::common::PlacementError;
use crate::config::BOARD_SIZE;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A board coordinate. `x` is the column, `y` the row; both are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Whether the coordinate lies on the 10×10 grid.
    pub fn in_bounds(&self) -> bool {
        self.x < BOARD_SIZE && self.y < BOARD_SIZE
    }

    /// Orthogonal neighbours that stay on the grid.
    pub fn neighbors(&self) -> impl Iterator<Item = Coord> + '_ {
        let (x, y) = (self.x as i16, self.y as i16);
        [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
            .into_iter()
            .filter(|&(nx, ny)| {
                (0..BOARD_SIZE as i16).contains(&nx) && (0..BOARD_SIZE as i16).contains(&ny)
            })
            .map(|(nx, ny)| Coord::new(nx as u8, ny as u8))
    }
}

/// Renders as the column letter and 1-based row, e.g. `D5` for (3, 4).
impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.x) as char, self.y as u16 + 1)
    }
}

/// Type of ship: name and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShipKind {
    name: &'static str,
    size: usize,
}

impl ShipKind {
    /// Create a new ship kind.
    pub const fn new(name: &'static str, size: usize) -> Self {
        Self { name, size }
    }

    /// Ship's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ship's size in cells.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Cells covered by a ship of `size` anchored at `origin`.
///
/// Fails with `OutOfBounds` if any segment would leave the grid.
pub fn footprint(
    origin: Coord,
    size: usize,
    orientation: Orientation,
) -> Result<Vec<Coord>, PlacementError> {
    let n = BOARD_SIZE as usize;
    let (x, y) = (origin.x as usize, origin.y as usize);
    if size == 0 || x >= n || y >= n {
        return Err(PlacementError::OutOfBounds);
    }
    let fits = match orientation {
        Orientation::Horizontal => x + size <= n,
        Orientation::Vertical => y + size <= n,
    };
    if !fits {
        return Err(PlacementError::OutOfBounds);
    }
    Ok((0..size)
        .map(|i| match orientation {
            Orientation::Horizontal => Coord::new((x + i) as u8, y as u8),
            Orientation::Vertical => Coord::new(x as u8, (y + i) as u8),
        })
        .collect())
}

/// Placement record of a catalog ship on the local board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacedShip {
    kind: ShipKind,
    origin: Coord,
    orientation: Orientation,
}

impl PlacedShip {
    pub(crate) fn new(kind: ShipKind, origin: Coord, orientation: Orientation) -> Self {
        Self {
            kind,
            origin,
            orientation,
        }
    }

    pub fn kind(&self) -> ShipKind {
        self.kind
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Cells owned by this ship.
    pub fn cells(&self) -> Vec<Coord> {
        // A recorded ship was validated when placed.
        footprint(self.origin, self.kind.size, self.orientation).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_display_uses_letters_and_one_based_rows() {
        assert_eq!(Coord::new(0, 0).to_string(), "A1");
        assert_eq!(Coord::new(9, 9).to_string(), "J10");
    }

    #[test]
    fn corner_has_two_neighbors() {
        assert_eq!(Coord::new(0, 0).neighbors().count(), 2);
        assert_eq!(Coord::new(5, 5).neighbors().count(), 4);
    }

    #[test]
    fn footprint_rejects_overrun() {
        assert_eq!(
            footprint(Coord::new(7, 0), 4, Orientation::Horizontal),
            Err(PlacementError::OutOfBounds)
        );
        assert_eq!(
            footprint(Coord::new(6, 0), 4, Orientation::Horizontal).map(|c| c.len()),
            Ok(4)
        );
    }
}
