use armada::{Board, Hunter, Orientation, BOARD_SIZE, FLEET};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn axis_neighbors(x: usize, y: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (dx, dy) in [(1isize, 0isize), (-1, 0), (0, 1), (0, -1)] {
        let (nx, ny) = (x as isize + dx, y as isize + dy);
        if nx >= 0 && ny >= 0 && (nx as usize) < BOARD_SIZE && (ny as usize) < BOARD_SIZE {
            out.push((nx as usize, ny as usize));
        }
    }
    out
}

#[test]
fn never_repeats_a_cell_across_a_full_game() {
    for seed in 0..20u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::generate(&mut rng, &FLEET);
        let mut hunter = Hunter::new();

        for _ in 0..BOARD_SIZE * BOARD_SIZE {
            let (x, y) = hunter.choose_move(&mut rng, &board);
            assert!(!board.is_attacked(x, y), "repeated cell ({x}, {y})");
            board.mark_attacked(x, y);
        }
        assert!(board.all_ships_hit());
        // degenerate fallback once everything has been attacked
        assert_eq!(hunter.choose_move(&mut rng, &board), (0, 0));
    }
}

#[test]
fn probes_neighbors_after_hitting_a_lone_ship_cell() {
    // Single ship cell at (4, 4): after the hit lands, the very next
    // move must come from the hit's unattacked axis neighbors.
    for seed in 0..50u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::empty();
        assert!(board.place_run("Buoy", 4, 4, Orientation::Horizontal, 1));
        let mut hunter = Hunter::new();

        loop {
            let (x, y) = hunter.choose_move(&mut rng, &board);
            board.mark_attacked(x, y);
            if (x, y) == (4, 4) {
                break;
            }
        }
        let open: Vec<_> = axis_neighbors(4, 4)
            .into_iter()
            .filter(|&(x, y)| !board.is_attacked(x, y))
            .collect();
        if !open.is_empty() {
            let next = hunter.choose_move(&mut rng, &board);
            assert!(
                open.contains(&next),
                "seed {seed}: expected a neighbor of (4, 4), got {next:?}"
            );
        }
    }
}

#[test]
fn stale_queue_entries_are_skipped() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut board = Board::empty();
    assert!(board.place_run("Buoy", 4, 4, Orientation::Horizontal, 1));
    let mut hunter = Hunter::new();

    loop {
        let (x, y) = hunter.choose_move(&mut rng, &board);
        board.mark_attacked(x, y);
        if (x, y) == (4, 4) {
            break;
        }
    }
    // attack every neighbor out from under the queue; the hunter must
    // fall back to random search instead of returning a stale candidate
    for (x, y) in axis_neighbors(4, 4) {
        board.mark_attacked(x, y);
    }
    let next = hunter.choose_move(&mut rng, &board);
    assert!(!board.is_attacked(next.0, next.1));
}
