//! Board state and random fleet placement.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ShipType, BOARD_SIZE};

/// One grid square. `attacked` never reverts to `false` once set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ship: Option<String>,
    pub attacked: bool,
}

/// Ship orientation on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A player's 10x10 grid of ship and attack state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Vec<Cell>>,
}

/// Placement attempts per ship before the whole pass is restarted.
const MAX_PLACE_ATTEMPTS: usize = 1_000;

impl Board {
    /// An empty board: no ships, nothing attacked.
    pub fn empty() -> Self {
        Self {
            cells: vec![vec![Cell::default(); BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Place a fleet at random, rejecting any run that collides with an
    /// already placed ship. The along-axis start is drawn from
    /// `[0, BOARD_SIZE - len]` so runs are in bounds by construction.
    /// If a ship cannot be placed within the attempt budget the whole
    /// pass restarts from an empty board.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, fleet: &[ShipType]) -> Self {
        'pass: loop {
            let mut board = Self::empty();
            for ship in fleet {
                let mut placed = false;
                for _ in 0..MAX_PLACE_ATTEMPTS {
                    let len = ship.length();
                    let cross = rng.random_range(0..BOARD_SIZE);
                    let along = rng.random_range(0..=BOARD_SIZE - len);
                    let (x, y, orientation) = if rng.random() {
                        (cross, along, Orientation::Horizontal)
                    } else {
                        (along, cross, Orientation::Vertical)
                    };
                    if board.place_run(ship.name(), x, y, orientation, len) {
                        placed = true;
                        break;
                    }
                }
                if !placed {
                    // Not expected for a 10x10 board and this fleet, but
                    // must not wedge the caller.
                    continue 'pass;
                }
            }
            return board;
        }
    }

    /// Try to occupy a straight run of `len` cells starting at `(x, y)`.
    /// Returns `false` without modifying the board if the run leaves the
    /// grid or crosses another ship.
    pub fn place_run(
        &mut self,
        name: &str,
        x: usize,
        y: usize,
        orientation: Orientation,
        len: usize,
    ) -> bool {
        let (dx, dy) = match orientation {
            Orientation::Horizontal => (0, 1),
            Orientation::Vertical => (1, 0),
        };
        let mut run = Vec::with_capacity(len);
        for i in 0..len {
            let (cx, cy) = (x + dx * i, y + dy * i);
            if cx >= BOARD_SIZE || cy >= BOARD_SIZE || self.cells[cx][cy].ship.is_some() {
                return false;
            }
            run.push((cx, cy));
        }
        for (cx, cy) in run {
            self.cells[cx][cy].ship = Some(name.to_string());
        }
        true
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get(x).and_then(|row| row.get(y))
    }

    pub fn has_ship(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_some_and(|c| c.ship.is_some())
    }

    pub fn is_attacked(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_some_and(|c| c.attacked)
    }

    /// Record an attack on `(x, y)`. Out-of-range coordinates are ignored.
    pub fn mark_attacked(&mut self, x: usize, y: usize) {
        if let Some(row) = self.cells.get_mut(x) {
            if let Some(cell) = row.get_mut(y) {
                cell.attacked = true;
            }
        }
    }

    /// Coordinates and ship names of every occupied cell. This is what
    /// the opponent is shown instead of the full board.
    pub fn ship_cells(&self) -> Vec<(usize, usize, String)> {
        let mut out = Vec::new();
        for (x, row) in self.cells.iter().enumerate() {
            for (y, cell) in row.iter().enumerate() {
                if let Some(name) = &cell.ship {
                    out.push((x, y, name.clone()));
                }
            }
        }
        out
    }

    /// True once every ship-occupied cell has been attacked.
    pub fn all_ships_hit(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .filter(|c| c.ship.is_some())
            .all(|c| c.attacked)
    }

    /// All cells not yet attacked.
    pub fn unattacked(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (x, row) in self.cells.iter().enumerate() {
            for (y, cell) in row.iter().enumerate() {
                if !cell.attacked {
                    out.push((x, y));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FLEET, TOTAL_SHIP_CELLS};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn generate_places_full_fleet() {
        let mut rng = SmallRng::seed_from_u64(7);
        let board = Board::generate(&mut rng, &FLEET);
        assert_eq!(board.ship_cells().len(), TOTAL_SHIP_CELLS);
        assert!(board.unattacked().len() == BOARD_SIZE * BOARD_SIZE);
    }

    #[test]
    fn place_run_rejects_overlap_and_out_of_bounds() {
        let mut board = Board::empty();
        assert!(board.place_run("Cruiser", 0, 0, Orientation::Horizontal, 3));
        assert!(!board.place_run("Destroyer", 0, 2, Orientation::Vertical, 2));
        assert!(!board.place_run("Carrier", 0, 6, Orientation::Horizontal, 5));
        assert_eq!(board.ship_cells().len(), 3);
    }

    #[test]
    fn attacked_is_sticky() {
        let mut board = Board::empty();
        board.mark_attacked(3, 4);
        board.mark_attacked(3, 4);
        assert!(board.is_attacked(3, 4));
        // out of range is a no-op
        board.mark_attacked(42, 0);
    }
}
