//! Length-prefixed codec for bus framing
//!
//! All messages are framed as:
//! ```text
//! [ 4 bytes: length (u32, big-endian) ][ N bytes: protobuf WireMessage ]
//! ```
//!
//! This ensures message boundaries are preserved over TCP streams.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::Message;
use thiserror::Error;

use crate::{Address, MessageError, PlatformMessage};

/// Maximum message size (1 MB) to prevent memory exhaustion
pub const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;

/// On-the-wire form of a [`PlatformMessage`]
#[derive(Clone, PartialEq, Message)]
pub struct WireMessage {
    #[prost(string, tag = "1")]
    pub source: String,

    #[prost(string, tag = "2")]
    pub message_type: String,

    #[prost(string, tag = "3")]
    pub place_id: String,
}

impl From<&PlatformMessage> for WireMessage {
    fn from(msg: &PlatformMessage) -> Self {
        Self {
            source: msg.source().representation(),
            message_type: msg.message_type().to_string(),
            place_id: msg.place_id().unwrap_or_default().to_string(),
        }
    }
}

impl TryFrom<WireMessage> for PlatformMessage {
    type Error = MessageError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let source = Address::parse(&wire.source)?;
        if wire.message_type.is_empty() {
            return Err(MessageError::MissingMessageType(wire.source));
        }
        Ok(PlatformMessage::new(source, wire.message_type).with_place_id(wire.place_id))
    }
}

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Message too large: {0} bytes (max: {MAX_MESSAGE_SIZE})")]
    MessageTooLarge(usize),

    #[error("Invalid message length prefix: {0}")]
    InvalidLength(u32),

    #[error("Protobuf decode error: {0}")]
    DecodeError(#[from] prost::DecodeError),

    #[error("Protobuf encode error: {0}")]
    EncodeError(#[from] prost::EncodeError),

    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] MessageError),
}

/// Encode a message into a length-prefixed byte buffer
pub fn encode(msg: &PlatformMessage) -> Result<Bytes, CodecError> {
    let mut buf = BytesMut::new();
    encode_into(msg, &mut buf)?;
    Ok(buf.freeze())
}

/// Encode a message directly into a provided buffer
pub fn encode_into(msg: &PlatformMessage, buf: &mut BytesMut) -> Result<(), CodecError> {
    let wire = WireMessage::from(msg);
    let msg_len = wire.encoded_len();

    if msg_len > MAX_MESSAGE_SIZE as usize {
        return Err(CodecError::MessageTooLarge(msg_len));
    }

    buf.reserve(4 + msg_len);
    buf.put_u32(msg_len as u32);
    wire.encode(buf)?;

    Ok(())
}

/// Try to decode a length-prefixed message from a buffer
///
/// Returns:
/// - `Ok(Some(msg))` if a complete message was decoded
/// - `Ok(None)` if more data is needed
/// - `Err(...)` if the data is invalid
pub fn decode(buf: &mut BytesMut) -> Result<Option<PlatformMessage>, CodecError> {
    // Need at least 4 bytes for the length prefix
    if buf.len() < 4 {
        return Ok(None);
    }

    // Peek at the length prefix without consuming
    let msg_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);

    if msg_len > MAX_MESSAGE_SIZE {
        return Err(CodecError::InvalidLength(msg_len));
    }

    let total_len = 4 + msg_len as usize;
    if buf.len() < total_len {
        return Ok(None);
    }

    buf.advance(4);
    let msg_bytes = buf.split_to(msg_len as usize);

    // The frame is consumed even when its contents are bad
    let wire = WireMessage::decode(msg_bytes)?;
    Ok(Some(PlatformMessage::try_from(wire)?))
}

/// Decoder state machine for streaming decoding
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next frame from the buffer
    ///
    /// Call this repeatedly until it returns `Ok(None)` to drain all complete frames
    pub fn decode_next(&mut self) -> Result<Option<PlatformMessage>, CodecError> {
        decode(&mut self.buffer)
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

/// Encoder for building frames
#[derive(Debug, Default)]
pub struct FrameEncoder {
    buffer: BytesMut,
}

impl FrameEncoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Encode a message and add it to the output buffer
    pub fn encode(&mut self, msg: &PlatformMessage) -> Result<(), CodecError> {
        encode_into(msg, &mut self.buffer)
    }

    /// Take the encoded bytes, leaving an empty buffer
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
