mod ai;
mod board;
mod config;
mod logging;
pub mod protocol;
mod room;
mod session;
pub mod wire;

pub use ai::Hunter;
pub use board::{Board, Cell, Orientation};
pub use config::{default_bind, ShipType, BOARD_SIZE, FLEET, NUM_SHIPS, ROOM_CODE_LEN, TOTAL_SHIP_CELLS};
pub use logging::init_logging;
pub use protocol::{BoardPayload, Frame, Message, Signal};
pub use room::{Room, RoomState};
pub use session::{serve, SessionRegistry};
pub use wire::{read_frame, write_frame, FrameReceiver, FrameSender, WireError, MAX_FRAME_LEN};
