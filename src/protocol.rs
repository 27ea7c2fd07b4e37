//! Messages exchanged with a client and the channels carrying them.
//!
//! On a byte stream every message is a frame: its postcard encoding,
//! preceded by the encoded length as a little-endian `u32`.
use std::{
    collections::VecDeque,
    io::{self, Read, Write},
};

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Acknowledgement text.
pub const OK: &str = "OK";
/// Text announcing that a branch list follows and a choice is awaited.
pub const QUERY: &str = "QUERY";
/// Largest accepted frame payload.
pub const MAX_FRAME_SIZE: usize = 16 << 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Int(i32),
    Text(String),
    Number(f64),
}

impl Message {
    fn kind(&self) -> &'static str {
        match self {
            Message::Int(_) => "an integer",
            Message::Text(_) => "a text",
            Message::Number(_) => "a number",
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_owned())
    }
}

/// Half-duplex message channel with a client.
pub trait Channel {
    fn send(&mut self, message: Message) -> Result<(), ProtocolError>;

    /// Blocks until the next message arrives.
    fn receive(&mut self) -> Result<Message, ProtocolError>;

    fn send_text(&mut self, text: &str) -> Result<(), ProtocolError> {
        self.send(Message::from(text))
    }

    fn receive_int(&mut self) -> Result<i32, ProtocolError> {
        match self.receive()? {
            Message::Int(value) => Ok(value),
            other => Err(unexpected("an integer", &other)),
        }
    }

    fn receive_text(&mut self) -> Result<String, ProtocolError> {
        match self.receive()? {
            Message::Text(text) => Ok(text),
            other => Err(unexpected("a text", &other)),
        }
    }
}

fn unexpected(expected: &'static str, got: &Message) -> ProtocolError {
    ProtocolError::UnexpectedMessage {
        expected,
        got: got.kind().to_owned(),
    }
}

/// Length-prefixed frames over a byte stream, typically a `TcpStream`.
#[derive(Debug)]
pub struct FramedChannel<S> {
    stream: S,
}

impl<S: Read + Write> FramedChannel<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Channel for FramedChannel<S> {
    fn send(&mut self, message: Message) -> Result<(), ProtocolError> {
        let payload = postcard::to_stdvec(&message)?;
        if payload.len() > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size: payload.len(),
                max: MAX_FRAME_SIZE,
            });
        }
        let mut frame = Vec::with_capacity(4 + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&payload);
        self.stream.write_all(&frame)?;
        self.stream.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Message, ProtocolError> {
        let mut length = [0u8; 4];
        read_exact(&mut self.stream, &mut length)?;
        let size = u32::from_le_bytes(length) as usize;
        if size > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size,
                max: MAX_FRAME_SIZE,
            });
        }
        let mut payload = vec![0u8; size];
        read_exact(&mut self.stream, &mut payload)?;
        Ok(postcard::from_bytes(&payload)?)
    }
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), ProtocolError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ProtocolError::Disconnected,
        _ => ProtocolError::Io(e),
    })
}

/// Scripted channel: hands out queued client messages and records what is
/// sent back. Once the queue is empty the client counts as gone.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    incoming: VecDeque<Message>,
    outgoing: Vec<Message>,
}

impl MemoryChannel {
    pub fn new(incoming: impl IntoIterator<Item = Message>) -> Self {
        Self {
            incoming: incoming.into_iter().collect(),
            outgoing: Vec::new(),
        }
    }

    /// Messages sent so far.
    pub fn sent(&self) -> &[Message] {
        &self.outgoing
    }

    pub fn into_sent(self) -> Vec<Message> {
        self.outgoing
    }
}

impl Channel for MemoryChannel {
    fn send(&mut self, message: Message) -> Result<(), ProtocolError> {
        self.outgoing.push(message);
        Ok(())
    }

    fn receive(&mut self) -> Result<Message, ProtocolError> {
        self.incoming.pop_front().ok_or(ProtocolError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn frames_on_a_stream() {
        let mut channel = FramedChannel::new(Cursor::new(Vec::new()));
        channel.send(Message::Int(3)).unwrap();
        channel.send_text("servo").unwrap();
        channel.send(Message::Number(0.25)).unwrap();

        let bytes = channel.into_inner().into_inner();
        let size = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert_eq!(
            postcard::from_bytes::<Message>(&bytes[4..4 + size]).unwrap(),
            Message::Int(3)
        );

        let mut channel = FramedChannel::new(Cursor::new(bytes));
        assert_eq!(channel.receive_int().unwrap(), 3);
        assert_eq!(channel.receive_text().unwrap(), "servo");
        assert_eq!(channel.receive().unwrap(), Message::Number(0.25));
        assert!(matches!(channel.receive(), Err(ProtocolError::Disconnected)));
    }

    #[test]
    fn rejects_bad_frames() {
        let mut channel = FramedChannel::new(Cursor::new(u32::MAX.to_le_bytes().to_vec()));
        assert!(matches!(
            channel.receive(),
            Err(ProtocolError::FrameTooLarge { .. })
        ));

        // length announces more bytes than the stream holds
        let mut channel = FramedChannel::new(Cursor::new(vec![8, 0, 0, 0, 1]));
        assert!(matches!(channel.receive(), Err(ProtocolError::Disconnected)));
    }

    #[test]
    fn typed_receive_checks_kind() {
        let mut channel = MemoryChannel::new([Message::from("3"), Message::Int(0)]);
        assert!(matches!(
            channel.receive_int(),
            Err(ProtocolError::UnexpectedMessage {
                expected: "an integer",
                ..
            })
        ));
        assert!(matches!(
            channel.receive_text(),
            Err(ProtocolError::UnexpectedMessage { .. })
        ));
        assert!(matches!(channel.receive(), Err(ProtocolError::Disconnected)));
        channel.send_text(OK).unwrap();
        assert_eq!(channel.sent(), [Message::from(OK)]);
    }
}
