//! Wire message model.
//!
//! Structured messages travel as `{"category": ..., "payload": ...}`
//! objects; a few terminal notices are bare strings. Both directions use
//! the same frame envelope (see [`crate::wire`]).

use serde::{Deserialize, Serialize};

use crate::board::Board;

/// Game-start push, sent to each player individually:
/// `[isYourTurn, yourBoard, opponentShipCells, opponentName, opponentAvatar]`.
///
/// The opponent's board is never sent whole; only its ship-occupied
/// cells, so each client can resolve hits locally without seeing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardPayload(
    pub bool,
    pub Board,
    pub Vec<(usize, usize, String)>,
    pub String,
    pub u8,
);

/// Structured messages, discriminated by `category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Open a new room. Server replies with `Id`.
    Create { name: String, avatar: u8 },
    /// Join an existing room by code.
    Join { code: String, name: String, avatar: u8 },
    /// Freshly minted room code.
    Id(String),
    /// Game-start state push.
    Board(BoardPayload),
    /// Attack coordinate, relayed to the opponent.
    Position(u8, u8),
    /// Chat line, relayed to the opponent.
    Chat(String),
    /// Sender concedes; the opponent wins.
    Surrender,
    /// Alias for `Surrender` kept as a distinct category.
    Forfeit,
    /// Sender reports the game finished in their favor.
    Over,
    /// Winner announcement.
    GameOver {
        by: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Sender votes for a rematch.
    RematchOffer,
    /// Names of everyone who has voted so far.
    RematchStatus { offers: Vec<String> },
    /// Both voted; a fresh `Board` follows.
    RematchStart {},
}

/// Bare-string notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// Opponent's connection is gone; the room is dead.
    #[serde(rename = "END")]
    End,
    /// Join refused: the room already has two players.
    #[serde(rename = "TAKEN")]
    Taken,
    /// Join refused: no such room.
    #[serde(rename = "INVALID")]
    Invalid,
}

/// One framed value: either a structured message or a bare signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Frame {
    Message(Message),
    Signal(Signal),
}

impl From<Message> for Frame {
    fn from(m: Message) -> Self {
        Frame::Message(m)
    }
}

impl From<Signal> for Frame {
    fn from(s: Signal) -> Self {
        Frame::Signal(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_use_wire_names() {
        let json = serde_json::to_value(Message::Create {
            name: "ada".into(),
            avatar: 2,
        })
        .unwrap();
        assert_eq!(json["category"], "CREATE");
        assert_eq!(json["payload"]["name"], "ada");
        assert_eq!(json["payload"]["avatar"], 2);

        let json = serde_json::to_value(Message::GameOver {
            by: Some("ada".into()),
            reason: Some("surrender".into()),
        })
        .unwrap();
        assert_eq!(json["category"], "GAME_OVER");
        assert_eq!(json["payload"]["by"], "ada");

        let json = serde_json::to_value(Message::RematchOffer).unwrap();
        assert_eq!(json["category"], "REMATCH_OFFER");
    }

    #[test]
    fn position_payload_is_a_pair() {
        let json = serde_json::to_string(&Message::Position(3, 7)).unwrap();
        assert_eq!(json, r#"{"category":"POSITION","payload":[3,7]}"#);
    }

    #[test]
    fn signals_are_bare_strings() {
        assert_eq!(serde_json::to_string(&Frame::Signal(Signal::End)).unwrap(), r#""END""#);
        let frame: Frame = serde_json::from_str(r#""TAKEN""#).unwrap();
        assert_eq!(frame, Frame::Signal(Signal::Taken));
    }

    #[test]
    fn frame_roundtrip_picks_the_right_arm() {
        let frame = Frame::Message(Message::Chat("gg".into()));
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, back);
    }
}
