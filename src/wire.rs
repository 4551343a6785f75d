//! Length-prefixed frame transport.
//!
//! Every frame is `[4-byte big-endian length][UTF-8 JSON payload]`, one
//! logical value per frame, identical in both directions.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::protocol::Frame;

/// Upper bound on a declared frame length, to keep a hostile peer from
/// forcing a huge allocation.
pub const MAX_FRAME_LEN: u32 = 1 << 20;

#[derive(Debug, Error)]
pub enum WireError {
    /// Peer closed the stream, possibly mid-frame.
    #[error("connection closed by peer")]
    Closed,
    /// Declared length of zero or beyond [`MAX_FRAME_LEN`].
    #[error("invalid frame length: {0}")]
    BadLength(u32),
    /// Payload was not a recognized value.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(io::Error),
}

fn map_io(e: io::Error) -> WireError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe => WireError::Closed,
        _ => WireError::Io(e),
    }
}

/// Read one complete frame, blocking until the declared length has
/// arrived in full.
pub async fn read_frame<R: AsyncRead + Unpin>(r: &mut R) -> Result<Frame, WireError> {
    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf).await.map_err(map_io)?;
    let len = u32::from_be_bytes(len_buf);
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(WireError::BadLength(len));
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf).await.map_err(map_io)?;
    Ok(serde_json::from_slice(&buf)?)
}

/// Serialize `frame` and write it as a single envelope.
pub async fn write_frame<W: AsyncWrite + Unpin>(w: &mut W, frame: &Frame) -> Result<(), WireError> {
    let data = serde_json::to_vec(frame)?;
    if data.len() as u64 > u64::from(MAX_FRAME_LEN) {
        return Err(WireError::BadLength(data.len() as u32));
    }
    w.write_all(&(data.len() as u32).to_be_bytes())
        .await
        .map_err(map_io)?;
    w.write_all(&data).await.map_err(map_io)?;
    w.flush().await.map_err(map_io)?;
    Ok(())
}

/// Cloneable write handle for one connection. Rooms hold one per seat so
/// either player's worker can push frames to either socket; the lock
/// keeps concurrent envelopes from interleaving.
#[derive(Clone)]
pub struct FrameSender {
    half: Arc<Mutex<OwnedWriteHalf>>,
}

impl FrameSender {
    pub async fn send(&self, frame: &Frame) -> Result<(), WireError> {
        let mut half = self.half.lock().await;
        write_frame(&mut *half, frame).await
    }
}

/// Read half of a connection, owned by its single worker.
pub struct FrameReceiver {
    half: OwnedReadHalf,
}

impl FrameReceiver {
    pub async fn recv(&mut self) -> Result<Frame, WireError> {
        read_frame(&mut self.half).await
    }
}

/// Split a stream into the server's send/receive handles.
pub fn split(stream: TcpStream) -> (FrameSender, FrameReceiver) {
    let (r, w) = stream.into_split();
    (
        FrameSender {
            half: Arc::new(Mutex::new(w)),
        },
        FrameReceiver { half: r },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Message, Signal};

    #[tokio::test]
    async fn frame_roundtrip() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        let frame = Frame::Message(Message::Position(4, 9));
        write_frame(&mut a, &frame).await.unwrap();
        let got = read_frame(&mut b).await.unwrap();
        assert_eq!(got, frame);
    }

    #[tokio::test]
    async fn signal_is_length_prefixed_json_string() {
        let (mut a, mut b) = tokio::io::duplex(64);
        write_frame(&mut a, &Frame::Signal(Signal::End)).await.unwrap();
        let mut raw = [0u8; 9];
        b.read_exact(&mut raw).await.unwrap();
        assert_eq!(&raw[..4], &5u32.to_be_bytes());
        assert_eq!(&raw[4..], br#""END""#);
    }

    #[tokio::test]
    async fn short_read_is_connection_closed() {
        let (mut a, mut b) = tokio::io::duplex(64);
        // declared 100 bytes, deliver 3, then hang up
        a.write_all(&100u32.to_be_bytes()).await.unwrap();
        a.write_all(b"abc").await.unwrap();
        drop(a);
        assert!(matches!(read_frame(&mut b).await, Err(WireError::Closed)));
    }

    #[tokio::test]
    async fn zero_and_oversize_lengths_are_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&0u32.to_be_bytes()).await.unwrap();
        assert!(matches!(read_frame(&mut b).await, Err(WireError::BadLength(0))));
        a.write_all(&(MAX_FRAME_LEN + 1).to_be_bytes()).await.unwrap();
        assert!(matches!(read_frame(&mut b).await, Err(WireError::BadLength(_))));
    }

    #[tokio::test]
    async fn garbage_payload_is_malformed() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&4u32.to_be_bytes()).await.unwrap();
        a.write_all(b"{{{{").await.unwrap();
        assert!(matches!(read_frame(&mut b).await, Err(WireError::Malformed(_))));
    }
}
