//! Game board: a 10×10 grid of cells plus the placement record of the local fleet.

use core::fmt;
use rand::Rng;
use serde::Serialize;

use crate::common::{BoardError, PlacementError};
use crate::config::{BOARD_SIZE, SHIPS, TOTAL_SHIP_CELLS};
use crate::ship::{footprint, Coord, Orientation, PlacedShip, ShipKind};

const GRID_SIZE: usize = BOARD_SIZE as usize;

/// State of a single grid cell.
///
/// Legal transitions are `Empty → Ship` while placing and `Ship → Hit` or
/// `Empty → Miss` while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    #[default]
    Empty,
    Ship,
    Hit,
    Miss,
}

impl Cell {
    /// Whether the cell has already been attacked.
    pub fn is_resolved(self) -> bool {
        matches!(self, Cell::Hit | Cell::Miss)
    }
}

/// Outcome of an attack on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    Hit,
    Miss,
}

impl HitResult {
    pub fn is_hit(self) -> bool {
        self == HitResult::Hit
    }
}

/// Cell grid, indexed `cells[y][x]`, and the ships placed on it.
///
/// The same type serves as the local fleet board and as the opponent view;
/// the latter only ever contains `Empty`, `Hit` and `Miss`.
#[derive(Clone, PartialEq, Eq, Default, Serialize)]
pub struct Board {
    cells: [[Cell; GRID_SIZE]; GRID_SIZE],
    ships: Vec<PlacedShip>,
}

impl Board {
    /// Create an empty board (no ships placed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell at `target`, or `None` off the grid.
    pub fn cell(&self, target: Coord) -> Option<Cell> {
        if !target.in_bounds() {
            return None;
        }
        Some(self.cells[target.y as usize][target.x as usize])
    }

    /// Rows of the grid, top to bottom.
    pub fn cells(&self) -> &[[Cell; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    /// Ships placed so far, in placement order.
    pub fn ships(&self) -> &[PlacedShip] {
        &self.ships
    }

    /// Number of cells holding `cell`.
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == cell).count()
    }

    /// Put `size` ship segments at `origin`. Validates bounds and overlap
    /// against current cell contents before touching the grid.
    ///
    /// The segments are recorded as the first catalog ship of that size not
    /// yet on the board, so both cruiser-sized slots can be filled this way.
    pub fn place_ship(
        &mut self,
        origin: Coord,
        size: usize,
        orientation: Orientation,
    ) -> Result<(), PlacementError> {
        let cells = self.free_footprint(origin, size, orientation)?;
        let kind = SHIPS
            .iter()
            .find(|kind| kind.size() == size && !self.has_placed(**kind))
            .copied()
            .ok_or(PlacementError::NoShipOfSize(size))?;
        self.put(kind, origin, orientation, cells);
        Ok(())
    }

    /// Place a catalog ship and record it in the fleet.
    pub fn place(
        &mut self,
        kind: ShipKind,
        origin: Coord,
        orientation: Orientation,
    ) -> Result<(), PlacementError> {
        if self.has_placed(kind) {
            return Err(PlacementError::AlreadyPlaced(kind.name()));
        }
        let cells = self.free_footprint(origin, kind.size(), orientation)?;
        self.put(kind, origin, orientation, cells);
        Ok(())
    }

    fn has_placed(&self, kind: ShipKind) -> bool {
        self.ships.iter().any(|s| s.kind() == kind)
    }

    fn free_footprint(
        &self,
        origin: Coord,
        size: usize,
        orientation: Orientation,
    ) -> Result<Vec<Coord>, PlacementError> {
        let cells = footprint(origin, size, orientation)?;
        if cells.iter().any(|&c| self.cell(c) != Some(Cell::Empty)) {
            return Err(PlacementError::Overlap);
        }
        Ok(cells)
    }

    fn put(&mut self, kind: ShipKind, origin: Coord, orientation: Orientation, cells: Vec<Coord>) {
        for c in cells {
            self.cells[c.y as usize][c.x as usize] = Cell::Ship;
        }
        self.ships.push(PlacedShip::new(kind, origin, orientation));
    }

    /// Returns a random legal `(origin, orientation)` for `kind`.
    pub fn random_placement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        kind: ShipKind,
    ) -> Result<(Coord, Orientation), PlacementError> {
        let size = kind.size();
        if size == 0 || size > GRID_SIZE {
            return Err(PlacementError::OutOfBounds);
        }
        for _ in 0..100 {
            let orient = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_x, max_y) = match orient {
                Orientation::Horizontal => (GRID_SIZE - size, GRID_SIZE - 1),
                Orientation::Vertical => (GRID_SIZE - 1, GRID_SIZE - size),
            };
            let origin = Coord::new(
                rng.random_range(0..=max_x) as u8,
                rng.random_range(0..=max_y) as u8,
            );
            let free = footprint(origin, size, orient)?
                .iter()
                .all(|&c| self.cell(c) == Some(Cell::Empty));
            if free {
                return Ok((origin, orient));
            }
        }
        Err(PlacementError::UnableToPlace)
    }

    /// Build a complete random fleet.
    pub fn random_fleet<R: Rng + ?Sized>(rng: &mut R) -> Result<Board, PlacementError> {
        'attempt: for _ in 0..16 {
            let mut board = Board::new();
            for kind in SHIPS {
                match board.random_placement(rng, kind) {
                    Ok((origin, orient)) => board.place(kind, origin, orient)?,
                    Err(PlacementError::UnableToPlace) => continue 'attempt,
                    Err(e) => return Err(e),
                }
            }
            return Ok(board);
        }
        Err(PlacementError::UnableToPlace)
    }

    /// Check that this is a complete, untouched fleet: nothing attacked,
    /// every catalog ship recorded, exactly the catalog's ship cells set.
    pub fn validate_fleet(&self) -> Result<(), PlacementError> {
        if self.cells.iter().flatten().any(|c| c.is_resolved()) {
            return Err(PlacementError::AlreadyAttacked);
        }
        if let Some(missing) = SHIPS.iter().find(|kind| !self.has_placed(**kind)) {
            return Err(PlacementError::MissingShip(missing.name()));
        }
        let placed = self.count(Cell::Ship);
        if placed != TOTAL_SHIP_CELLS {
            return Err(PlacementError::IncompleteFleet {
                placed,
                expected: TOTAL_SHIP_CELLS,
            });
        }
        Ok(())
    }

    /// Resolve an incoming attack, turning `Ship` into `Hit` or `Empty` into `Miss`.
    pub fn receive_attack(&mut self, target: Coord) -> Result<HitResult, BoardError> {
        let cell = self
            .cell(target)
            .ok_or(BoardError::out_of_range(target))?;
        let (next, result) = match cell {
            Cell::Ship => (Cell::Hit, HitResult::Hit),
            Cell::Empty => (Cell::Miss, HitResult::Miss),
            Cell::Hit | Cell::Miss => return Err(BoardError::already_resolved(target)),
        };
        self.cells[target.y as usize][target.x as usize] = next;
        Ok(result)
    }

    /// Record the reported outcome of our own attack on the opponent view.
    pub fn record_result(&mut self, target: Coord, hit: bool) -> Result<(), BoardError> {
        let cell = self
            .cell(target)
            .ok_or(BoardError::out_of_range(target))?;
        if cell.is_resolved() {
            return Err(BoardError::already_resolved(target));
        }
        self.cells[target.y as usize][target.x as usize] =
            if hit { Cell::Hit } else { Cell::Miss };
        Ok(())
    }

    /// True iff no cell still holds an intact ship segment.
    pub fn is_fleet_destroyed(&self) -> bool {
        self.count(Cell::Ship) == 0
    }

    /// Coordinates of every cell holding `cell`, row by row.
    pub fn coords_of(&self, cell: Cell) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().enumerate().flat_map(move |(y, row)| {
            row.iter()
                .enumerate()
                .filter(move |(_, &c)| c == cell)
                .map(move |(x, _)| Coord::new(x as u8, y as u8))
        })
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{ ships: {}, hits: {}, misses: {}, intact: {} }}",
            self.ships.len(),
            self.count(Cell::Hit),
            self.count(Cell::Miss),
            self.count(Cell::Ship)
        )?;
        write!(f, "{}", self)
    }
}

/// Grid with column letters and 1-based row numbers.
/// `S` ship, `X` hit, `o` miss, `.` water.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..GRID_SIZE {
            write!(f, " {}", (b'A' + x as u8) as char)?;
        }
        writeln!(f)?;
        for (y, row) in self.cells.iter().enumerate() {
            write!(f, "{:2} ", y + 1)?;
            for cell in row {
                let ch = match cell {
                    Cell::Empty => '.',
                    Cell::Ship => 'S',
                    Cell::Hit => 'X',
                    Cell::Miss => 'o',
                };
                write!(f, " {}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
