//! Websocket frame codec.
//!
//! Reading is split in two steps. A raw frame (head and unmasked payload)
//! is pulled off the source first, then it is interpreted against the
//! [`ConnectionState`]: fragments are accumulated, control frames are
//! checked, and text goes through the configured [`Envelope`](crate::config::Envelope).
//! The sync and async readers share the second step.
//!
//! [`decode_step`](Codec::decode_step) yields a fragment marker whenever a
//! partial message was consumed, [`read_frame`](Codec::read_frame) loops
//! until a whole frame is available.

pub mod source;

mod decode;
mod encode;

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        mod async_decode;
    }
}

use std::marker::PhantomData;

use bytes::Bytes;

use crate::config::CodecConfig;
use crate::error::{FrameError, Result};
use crate::frame::model::{CLOSE_NO_STATUS, CLOSE_PROTOCOL_ERROR};
use crate::frame::{Frame, FrameHead, OpCode};
use crate::role::RoleHelper;
use crate::sockjs::classify_with;
use crate::state::ConnectionState;

/// Largest payload of a control frame.
pub const MAX_CONTROL_PAYLOAD: usize = 125;

/// Close codes a peer must never send.
const INVALID_STATUS: [u16; 7] = [1004, 1005, 1006, 1012, 1013, 1014, 1015];

/// Outcome of one decode step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A complete frame.
    Frame(Frame),
    /// A fragment was consumed, nothing to hand out yet.
    Fragment,
    /// The stream ended between frames.
    Closed,
}

/// Frame head with its unmasked payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub head: FrameHead,
    pub payload: Bytes,
}

/// Websocket codec, as a client or server.
#[derive(Debug, Clone, Copy)]
pub struct Codec<Role> {
    config: CodecConfig,
    _marker: PhantomData<Role>,
}

impl<Role> Codec<Role> {
    #[inline]
    pub const fn new(config: CodecConfig) -> Self {
        Self {
            config,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn config(&self) -> &CodecConfig { &self.config }
}

impl<Role> Default for Codec<Role> {
    fn default() -> Self { Self::new(CodecConfig::default()) }
}

/// Whether a peer may send this close status.
#[inline]
pub fn is_valid_close_status(status: u16) -> bool {
    matches!(status, 1000..=1015 | 3000..=4999) && !INVALID_STATUS.contains(&status)
}

impl<Role: RoleHelper> Codec<Role> {
    /// Interpret a raw frame against the connection state.
    pub fn interpret(&self, raw: RawFrame, state: &mut ConnectionState) -> Result<Step> {
        let RawFrame { head, payload } = raw;
        let fin = head.fin.is_final();
        log::debug!(
            "connection {}: opcode {:?}, fin {}, {} bytes",
            state.id(),
            head.opcode,
            fin,
            payload.len()
        );

        if head.opcode.is_control() && !fin {
            return Err(FrameError::FragmentedControl.into());
        }

        let step = match head.opcode {
            OpCode::Close => Step::Frame(self.close(&payload, state)),
            OpCode::Ping | OpCode::Pong if payload.len() > MAX_CONTROL_PAYLOAD => {
                return Err(FrameError::ControlFrameTooLong(payload.len()).into())
            }
            OpCode::Ping => Step::Frame(Frame::ping(String::from_utf8_lossy(&payload))),
            OpCode::Pong => Step::Frame(Frame::pong(String::from_utf8_lossy(&payload))),
            OpCode::Text | OpCode::Binary => {
                if state.fragment_opcode().is_some() {
                    return Err(FrameError::ExpectedContinuation.into());
                }
                if fin {
                    Step::Frame(self.message(head.opcode, payload)?)
                } else {
                    state.begin_fragment(head.opcode);
                    state.append_fragment(&payload);
                    Step::Fragment
                }
            }
            OpCode::Continue => {
                let opcode = state.fragment_opcode().ok_or(FrameError::UnexpectedContinuation)?;
                self.check_len((state.fragment().len() + payload.len()) as u64)?;
                state.append_fragment(&payload);
                if fin {
                    let data = state.take_fragment();
                    Step::Frame(self.message(opcode, data)?)
                } else {
                    Step::Fragment
                }
            }
        };
        Ok(step)
    }

    /// Refuse a frame or message longer than `max_payload_len`.
    #[inline]
    pub(crate) fn check_len(&self, len: u64) -> Result<()> {
        if len > self.config.max_payload_len {
            return Err(FrameError::MaxLengthExceeded(len).into());
        }
        Ok(())
    }

    /// A complete text or binary message.
    fn message(&self, opcode: OpCode, data: Bytes) -> Result<Frame> {
        if opcode == OpCode::Binary {
            return Ok(Frame::binary(data));
        }
        let text = match String::from_utf8(data.to_vec()) {
            Ok(text) => text,
            Err(_) if self.config.strict_utf8 => return Err(FrameError::InvalidUtf8.into()),
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        Ok(classify_with(self.config.envelope, &text))
    }

    /// Parse a close payload. A malformed close is still returned,
    /// but marks the connection as closed without reply.
    fn close(&self, payload: &[u8], state: &mut ConnectionState) -> Frame {
        let (status, reason) = match payload.len() {
            0 => (CLOSE_NO_STATUS, &payload[..0]),
            1 => (CLOSE_PROTOCOL_ERROR, &payload[..0]),
            _ => (u16::from_be_bytes([payload[0], payload[1]]), &payload[2..]),
        };
        let text = std::str::from_utf8(reason);

        let valid = payload.is_empty()
            || (payload.len() != 1
                && payload.len() <= MAX_CONTROL_PAYLOAD
                && text.is_ok()
                && is_valid_close_status(status));

        if !valid {
            log::warn!("connection {}: invalid close, status {}", state.id(), status);
            state.set_close_initiated();
        }

        match text {
            Ok(text) => Frame::close(status, text),
            Err(_) => Frame::close(status, String::from_utf8_lossy(reason)),
        }
    }
}
