//! Websocket data frame.
//!
//! [RFC-6455 Section5](https://datatracker.ietf.org/doc/html/rfc6455#section-5)
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+ - - - - - - - - - - - - - - - +
//! |     Extended payload length continued, if payload len == 127  |
//! + - - - - - - - - - - - - - - - +-------------------------------+
//! |                               |Masking-key, if MASK set to 1  |
//! +-------------------------------+-------------------------------+
//! | Masking-key (continued)       |          Payload Data         |
//! +-------------------------------- - - - - - - - - - - - - - - - +
//! :                     Payload Data continued ...                :
//! + - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - +
//! |                     Payload Data continued ...                |
//! +---------------------------------------------------------------+
//! ```
//!
//! [`FrameHead`] is the wire head, [`Frame`] is the decoded value handed
//! to callers.

pub mod flag;
pub mod length;
pub mod mask;
pub mod model;

pub use flag::{Fin, OpCode};
pub use length::PayloadLen;
pub use mask::Mask;
pub use model::{Frame, FrameKind};

use crate::error::FrameError;

/// Websocket frame head.
#[allow(clippy::len_without_is_empty)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHead {
    pub fin: Fin,
    pub opcode: OpCode,
    pub mask: Mask,
    pub length: PayloadLen,
}

impl FrameHead {
    /// Constructor.
    #[inline]
    pub const fn new(fin: Fin, opcode: OpCode, mask: Mask, length: PayloadLen) -> Self {
        Self {
            fin,
            opcode,
            mask,
            length,
        }
    }

    /// Encoded length of this head.
    #[inline]
    pub const fn len(&self) -> usize { 2 + self.length.ext_len() + self.mask.key_len() }

    /// Encode to provided buffer, returns the count of written bytes.
    /// The caller should ensure the buffer is large enough,
    /// otherwise a [`FrameError::NotEnoughCapacity`] error will be returned.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        let n = self.len();
        if buf.len() < n {
            return Err(FrameError::NotEnoughCapacity);
        }

        // fin, opcode
        buf[0] = self.fin as u8 | self.opcode as u8;

        // mask, payload length
        buf[1] = self.mask.to_flag() | self.length.to_flag();

        let mut pos = 2;

        // extended payload length
        match &self.length {
            PayloadLen::Standard(_) => {}
            PayloadLen::Extended1(v) => buf[pos..pos + 2].copy_from_slice(&v.to_be_bytes()),
            PayloadLen::Extended2(v) => buf[pos..pos + 8].copy_from_slice(&v.to_be_bytes()),
        };
        pos += self.length.ext_len();

        // mask key
        if let Mask::Key(k) = &self.mask {
            buf[pos..pos + 4].copy_from_slice(k);
        }

        Ok(n)
    }
}
