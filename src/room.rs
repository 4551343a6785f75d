//! Room lifecycle: pairing, turn synchronization, game over, rematch.

use log::{debug, warn};
use rand::Rng;

use crate::board::Board;
use crate::config::FLEET;
use crate::protocol::{BoardPayload, Frame, Message, Signal};
use crate::wire::FrameSender;

/// Lifecycle of a room. Transitions:
/// `Waiting -> Playing` (second player joins), `Playing -> Over` (a
/// fleet is fully hit, or a forfeit/acknowledged win), `Over -> Playing`
/// (both players vote rematch). Teardown can happen from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Waiting,
    Playing,
    Over,
}

/// One paired player. The room owns both seats; the opposing seat index
/// is the only back-reference.
pub struct Seat {
    pub name: String,
    pub avatar: u8,
    turn: bool,
    board: Board,
    tx: FrameSender,
}

/// A two-player session keyed by a short room code. All mutating
/// operations run under the per-room lock held by the registry, so the
/// two connection workers never interleave inside one room.
pub struct Room {
    code: String,
    state: RoomState,
    seats: Vec<Seat>,
    rematch_votes: [bool; 2],
    closed: bool,
}

impl Room {
    pub fn new(code: String, name: String, avatar: u8, tx: FrameSender) -> Self {
        Self {
            code,
            state: RoomState::Waiting,
            seats: vec![Seat {
                name,
                avatar,
                turn: false,
                board: Board::empty(),
                tx,
            }],
            rematch_votes: [false; 2],
            closed: false,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() == 2
    }

    /// Set once the room has been torn down; a join racing against the
    /// registry removal must treat the room as gone.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Seat the second player and start play. Caller must have checked
    /// [`Room::is_full`] under this room's lock.
    pub async fn join<R: Rng + ?Sized>(
        &mut self,
        name: String,
        avatar: u8,
        tx: FrameSender,
        rng: &mut R,
    ) -> usize {
        debug_assert!(!self.is_full());
        self.seats.push(Seat {
            name,
            avatar,
            turn: false,
            board: Board::empty(),
            tx,
        });
        self.start(rng).await;
        self.seats.len() - 1
    }

    /// Generate fresh boards, pick the opening player at random and push
    /// each seat its own board plus the opponent's ship cells. Runs on
    /// first pairing and again on every rematch.
    async fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        debug_assert!(self.is_full());
        for seat in &mut self.seats {
            seat.board = Board::generate(rng, &FLEET);
        }
        let first: bool = rng.random();
        self.seats[0].turn = first;
        self.seats[1].turn = !first;
        self.rematch_votes = [false; 2];
        self.state = RoomState::Playing;

        for me in 0..2 {
            let them = 1 - me;
            let payload = BoardPayload(
                self.seats[me].turn,
                self.seats[me].board.clone(),
                self.seats[them].board.ship_cells(),
                self.seats[them].name.clone(),
                self.seats[them].avatar,
            );
            self.send_to(me, Message::Board(payload).into()).await;
        }
    }

    /// Relay an attack to the opponent and flip turn ownership. Ignored
    /// unless the game is running and it is the attacker's turn. The
    /// server does not resolve hit/miss (each client reads that off its
    /// own board), but it does track attacked cells so a fully hit fleet
    /// ends the game authoritatively.
    pub async fn attack(&mut self, seat: usize, x: u8, y: u8) {
        if self.state != RoomState::Playing || !self.seats[seat].turn {
            warn!(
                "room {}: dropping out-of-turn attack from {}",
                self.code, self.seats[seat].name
            );
            return;
        }
        let them = 1 - seat;
        self.seats[them].board.mark_attacked(x as usize, y as usize);
        self.send_to(them, Message::Position(x, y).into()).await;
        self.seats[seat].turn = false;
        self.seats[them].turn = true;

        if self.seats[them].board.all_ships_hit() {
            self.declare_over(seat, None).await;
        }
    }

    /// Relay a chat line to the opponent, if one is seated.
    pub async fn chat(&mut self, seat: usize, text: String) {
        if self.is_full() {
            self.send_to(1 - seat, Message::Chat(text).into()).await;
        }
    }

    /// Transition to `Over` and announce the winner. Idempotent: only a
    /// running game can end, so repeated surrenders or a late `OVER`
    /// after an authoritative finish produce no second broadcast.
    pub async fn declare_over(&mut self, winner: usize, reason: Option<&str>) {
        if self.state != RoomState::Playing {
            debug!("room {}: ignoring game-over while {:?}", self.code, self.state);
            return;
        }
        self.state = RoomState::Over;
        let notice = Message::GameOver {
            by: Some(self.seats[winner].name.clone()),
            reason: reason.map(str::to_string),
        };
        self.broadcast(notice.into()).await;
    }

    /// Record a rematch vote. Votes only count while the game is over;
    /// when both seats have voted the room restarts with fresh boards
    /// and a newly randomized opening turn.
    pub async fn vote_rematch<R: Rng + ?Sized>(&mut self, seat: usize, rng: &mut R) {
        if self.state != RoomState::Over || !self.is_full() {
            warn!("room {}: dropping rematch vote while {:?}", self.code, self.state);
            return;
        }
        self.rematch_votes[seat] = true;
        let offers = self
            .seats
            .iter()
            .zip(self.rematch_votes)
            .filter(|(_, voted)| *voted)
            .map(|(s, _)| s.name.clone())
            .collect();
        self.broadcast(Message::RematchStatus { offers }.into()).await;

        if self.rematch_votes == [true; 2] {
            self.broadcast(Message::RematchStart {}.into()).await;
            self.start(rng).await;
        }
    }

    /// Tear the room down after `seat`'s connection went away: tell the
    /// other player and latch the room closed. Registry removal is the
    /// caller's job.
    pub async fn hangup(&mut self, seat: usize) {
        self.closed = true;
        if self.is_full() {
            self.send_to(1 - seat, Signal::End.into()).await;
        }
    }

    /// Best-effort send; the peer may already be gone.
    async fn send_to(&self, seat: usize, frame: Frame) {
        if let Err(e) = self.seats[seat].tx.send(&frame).await {
            debug!(
                "room {}: send to {} failed: {}",
                self.code, self.seats[seat].name, e
            );
        }
    }

    async fn broadcast(&self, frame: Frame) {
        for seat in 0..self.seats.len() {
            self.send_to(seat, frame.clone()).await;
        }
    }
}
