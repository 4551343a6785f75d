//! Session registry and the per-connection worker loop.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::config::ROOM_CODE_LEN;
use crate::protocol::{Frame, Message, Signal};
use crate::room::Room;
use crate::wire::{self, FrameReceiver, FrameSender, WireError};

type SharedRoom = Arc<Mutex<Room>>;

/// Process-scoped map of room code to room. Structural mutations
/// (create, lookup, remove) all go through the map lock; gameplay goes
/// through the per-room lock, so two rooms never contend with each
/// other. Constructed per server instance, never a global.
pub struct SessionRegistry {
    rooms: Mutex<HashMap<String, SharedRoom>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Create a room for its first player under a freshly minted code.
    /// Codes are resampled on collision; at 26^6 against a handful of
    /// live rooms this terminates almost immediately.
    pub async fn create<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        name: String,
        avatar: u8,
        tx: FrameSender,
    ) -> (String, SharedRoom) {
        let mut rooms = self.rooms.lock().await;
        let code = loop {
            let candidate = mint_code(rng);
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let room = Arc::new(Mutex::new(Room::new(code.clone(), name, avatar, tx)));
        rooms.insert(code.clone(), Arc::clone(&room));
        (code, room)
    }

    pub async fn lookup(&self, code: &str) -> Option<SharedRoom> {
        self.rooms.lock().await.get(code).cloned()
    }

    pub async fn remove(&self, code: &str) {
        self.rooms.lock().await.remove(code);
    }

    /// Number of live rooms, for diagnostics only.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn mint_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| (b'a' + rng.random_range(0..26u8)) as char)
        .collect()
}

/// Accept connections forever, spawning one worker task per socket. A
/// worker failing or a peer vanishing never takes down the loop.
pub async fn serve(listener: TcpListener, registry: Arc<SessionRegistry>) -> anyhow::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        info!("connection from {addr}");
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            let rng = SmallRng::from_rng(&mut rand::rng());
            Connection::new(stream, registry, rng).run().await;
        });
    }
}

struct Membership {
    code: String,
    room: SharedRoom,
    seat: usize,
}

/// One worker per connection: receives frames in arrival order and
/// dispatches them against the registry and the worker's room.
struct Connection {
    rx: FrameReceiver,
    tx: FrameSender,
    registry: Arc<SessionRegistry>,
    rng: SmallRng,
    membership: Option<Membership>,
}

impl Connection {
    fn new(stream: TcpStream, registry: Arc<SessionRegistry>, rng: SmallRng) -> Self {
        let (tx, rx) = wire::split(stream);
        Self {
            rx,
            tx,
            registry,
            rng,
            membership: None,
        }
    }

    async fn run(mut self) {
        loop {
            match self.rx.recv().await {
                Ok(Frame::Message(msg)) => self.dispatch(msg).await,
                Ok(Frame::Signal(sig)) => {
                    warn!("client sent bare {sig:?}, ignoring");
                }
                Err(WireError::Closed) => {
                    debug!("peer hung up");
                    break;
                }
                Err(e) => {
                    // Malformed frames get the same treatment as a lost
                    // peer: this connection only.
                    warn!("receive failed: {e}");
                    break;
                }
            }
        }
        self.hangup().await;
    }

    async fn dispatch(&mut self, msg: Message) {
        match msg {
            Message::Create { name, avatar } => {
                if self.membership.is_some() {
                    warn!("CREATE from a player already in a room, ignoring");
                    return;
                }
                let (code, room) = self
                    .registry
                    .create(&mut self.rng, name, avatar, self.tx.clone())
                    .await;
                info!("room {code} created");
                self.membership = Some(Membership {
                    code: code.clone(),
                    room,
                    seat: 0,
                });
                self.send(Message::Id(code).into()).await;
            }
            Message::Join { code, name, avatar } => {
                if self.membership.is_some() {
                    warn!("JOIN from a player already in a room, ignoring");
                    return;
                }
                let Some(shared) = self.registry.lookup(&code).await else {
                    self.send(Signal::Invalid.into()).await;
                    return;
                };
                let mut room = shared.lock().await;
                if room.is_closed() {
                    self.send(Signal::Invalid.into()).await;
                } else if room.is_full() {
                    self.send(Signal::Taken.into()).await;
                } else {
                    let seat = room.join(name, avatar, self.tx.clone(), &mut self.rng).await;
                    drop(room);
                    info!("room {code} is now playing");
                    self.membership = Some(Membership {
                        code,
                        room: shared,
                        seat,
                    });
                }
            }
            Message::Position(x, y) => {
                if let Some(m) = self.membership.as_ref() {
                    m.room.lock().await.attack(m.seat, x, y).await;
                }
            }
            Message::Chat(text) => {
                if let Some(m) = self.membership.as_ref() {
                    m.room.lock().await.chat(m.seat, text).await;
                }
            }
            Message::Over => {
                // Self-reported win: the sender is the winner.
                if let Some(m) = self.membership.as_ref() {
                    m.room.lock().await.declare_over(m.seat, None).await;
                }
            }
            Message::Surrender | Message::Forfeit => {
                // Concession: the sender's opponent is the winner.
                if let Some(m) = self.membership.as_ref() {
                    let mut room = m.room.lock().await;
                    if room.is_full() {
                        room.declare_over(1 - m.seat, Some("surrender")).await;
                    }
                }
            }
            Message::RematchOffer => {
                if let Some(m) = self.membership.as_ref() {
                    m.room
                        .lock()
                        .await
                        .vote_rematch(m.seat, &mut self.rng)
                        .await;
                }
            }
            // Server-to-client categories arriving from a client.
            other => warn!("unexpected client message {other:?}, ignoring"),
        }
    }

    /// Exit path for every worker: notify the paired opponent, drop the
    /// room from the registry, release the socket.
    async fn hangup(&mut self) {
        if let Some(m) = self.membership.take() {
            m.room.lock().await.hangup(m.seat).await;
            self.registry.remove(&m.code).await;
            info!(
                "room {} torn down ({} live rooms)",
                m.code,
                self.registry.room_count().await
            );
        }
    }

    async fn send(&self, frame: Frame) {
        if let Err(e) = self.tx.send(&frame).await {
            debug!("send failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn minted_codes_are_six_lowercase_letters() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            let code = mint_code(&mut rng);
            assert_eq!(code.len(), ROOM_CODE_LEN);
            assert!(code.bytes().all(|b| b.is_ascii_lowercase()));
        }
    }
}
