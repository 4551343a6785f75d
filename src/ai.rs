//! Hunt/target attack heuristic for the local single-player opponent.

use std::collections::VecDeque;

use rand::Rng;

use crate::board::Board;
use crate::config::BOARD_SIZE;

/// Neighbor probe order after a hit: down, up, right, left.
const NEIGHBORS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Stateful random-then-hunt targeting: fire at random until something
/// is hit, then work through the hit's axis neighbors before going back
/// to random search. One instance per game.
#[derive(Debug, Default)]
pub struct Hunter {
    targets: VecDeque<(usize, usize)>,
}

impl Hunter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the next cell to attack on `board`. Queued candidates that
    /// were attacked in the meantime are discarded. The caller is
    /// responsible for marking the returned cell attacked. Returns
    /// `(0, 0)` if every cell has already been attacked.
    pub fn choose_move<R: Rng + ?Sized>(&mut self, rng: &mut R, board: &Board) -> (usize, usize) {
        let mut choice = None;
        while let Some((tx, ty)) = self.targets.pop_front() {
            if tx < BOARD_SIZE && ty < BOARD_SIZE && !board.is_attacked(tx, ty) {
                choice = Some((tx, ty));
                break;
            }
        }
        let (x, y) = match choice {
            Some(c) => c,
            None => {
                let unseen = board.unattacked();
                if unseen.is_empty() {
                    return (0, 0);
                }
                unseen[rng.random_range(0..unseen.len())]
            }
        };

        if board.has_ship(x, y) {
            for (dx, dy) in NEIGHBORS {
                let (nx, ny) = (x as isize + dx, y as isize + dy);
                if nx >= 0 && ny >= 0 {
                    let (nx, ny) = (nx as usize, ny as usize);
                    if nx < BOARD_SIZE && ny < BOARD_SIZE && !board.is_attacked(nx, ny) {
                        self.targets.push_back((nx, ny));
                    }
                }
            }
        }
        (x, y)
    }
}
