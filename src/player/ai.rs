// Probability-based targeting against the opponent view.
// The opponent never reports sinks, so every catalog ship is assumed afloat.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::board::{Board, Cell};
use crate::common::PlacementError;
use crate::config::{BOARD_SIZE, SHIPS};
use crate::ship::{footprint, Coord, Orientation};

use super::Player;

const GRID_SIZE: usize = BOARD_SIZE as usize;

/// Placements covering more observed hits get dramatically more weight so
/// squares adjacent to confirmed hits stand out.
const HIT_BIAS: f64 = 10.0;

/// Compute a probability density over all unresolved cells of `view`. Each
/// entry sums the relative likelihood of a ship segment occupying that cell.
pub fn calc_pdf(view: &Board) -> [[f64; GRID_SIZE]; GRID_SIZE] {
    let mut matrix = [[0.0f64; GRID_SIZE]; GRID_SIZE];

    for kind in SHIPS {
        for orient in [Orientation::Horizontal, Orientation::Vertical] {
            for y in 0..GRID_SIZE {
                for x in 0..GRID_SIZE {
                    let Ok(cells) = footprint(Coord::new(x as u8, y as u8), kind.size(), orient)
                    else {
                        continue;
                    };
                    if cells.iter().any(|&c| view.cell(c) == Some(Cell::Miss)) {
                        continue;
                    }
                    let n_hits = cells
                        .iter()
                        .filter(|&&c| view.cell(c) == Some(Cell::Hit))
                        .count();
                    let weight = HIT_BIAS.powi(n_hits as i32);
                    for c in cells {
                        if view.cell(c) == Some(Cell::Empty) {
                            matrix[c.y as usize][c.x as usize] += weight;
                        }
                    }
                }
            }
        }
    }

    normalize(matrix)
}

fn normalize(mut matrix: [[f64; GRID_SIZE]; GRID_SIZE]) -> [[f64; GRID_SIZE]; GRID_SIZE] {
    let total: f64 = matrix.iter().flatten().sum();
    if total == 0.0 {
        return matrix;
    }
    for v in matrix.iter_mut().flatten() {
        *v /= total;
    }
    matrix
}

/// Sample a cell from a probability matrix using a temperature parameter.
/// Returns `None` when every cell has zero weight.
pub fn sample_pdf<R: Rng + ?Sized>(
    pdf: &[[f64; GRID_SIZE]; GRID_SIZE],
    temperature: f64,
    rng: &mut R,
) -> Option<Coord> {
    let mut adjusted = [[0.0f64; GRID_SIZE]; GRID_SIZE];
    let mut total = 0.0;
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            let v = pdf[y][x].powf(1.0 / temperature);
            adjusted[y][x] = v;
            total += v;
        }
    }
    if total <= 0.0 {
        return None;
    }
    let threshold: f64 = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last = None;
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            if adjusted[y][x] <= 0.0 {
                continue;
            }
            cumulative += adjusted[y][x];
            let c = Coord::new(x as u8, y as u8);
            if threshold < cumulative {
                return Some(c);
            }
            last = Some(c);
        }
    }
    // Rounding can leave the threshold just past the final weight.
    last
}

/// Simple AI player that uses probability based guessing.
#[derive(Debug, Default)]
pub struct AiPlayer;

impl AiPlayer {
    pub fn new() -> Self {
        Self
    }

    /// Pick a target on `view`: weighted by the density, falling back to any
    /// unresolved cell.
    pub fn choose<R: Rng + ?Sized>(view: &Board, rng: &mut R) -> Option<Coord> {
        let pdf = calc_pdf(view);
        // Lower temperature biases sampling towards likely ship locations.
        sample_pdf(&pdf, 0.5, rng).or_else(|| {
            let open: Vec<Coord> = view.coords_of(Cell::Empty).collect();
            if open.is_empty() {
                None
            } else {
                Some(open[rng.random_range(0..open.len())])
            }
        })
    }
}

#[async_trait::async_trait]
impl Player for AiPlayer {
    fn place_fleet(&mut self, rng: &mut SmallRng) -> Result<Board, PlacementError> {
        Board::random_fleet(rng)
    }

    async fn select_target(&mut self, rng: &mut SmallRng, view: &Board) -> Option<Coord> {
        Self::choose(view, rng)
    }
}
