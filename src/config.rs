//! Board, fleet and server configuration.

use std::env;

/// Side length of the square board.
pub const BOARD_SIZE: usize = 10;

/// Length of a room code (lowercase ASCII letters).
pub const ROOM_CODE_LEN: usize = 6;

/// Name and length of a ship class in the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipType {
    name: &'static str,
    length: usize,
}

impl ShipType {
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

pub const NUM_SHIPS: usize = 5;

/// The fixed fleet placed on every board.
pub const FLEET: [ShipType; NUM_SHIPS] = [
    ShipType::new("Carrier", 5),
    ShipType::new("Battleship", 4),
    ShipType::new("Cruiser", 3),
    ShipType::new("Submarine", 3),
    ShipType::new("Destroyer", 2),
];

/// Total number of ship-occupied cells on a full board.
pub const TOTAL_SHIP_CELLS: usize = 17;

/// Default bind address, overridable via `SERVER_HOST`/`SERVER_PORT`.
pub fn default_bind() -> (String, u16) {
    let host = env::var("SERVER_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1234);
    (host, port)
}
