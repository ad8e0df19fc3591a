//! Per-connection decode state.
//!
//! Both decoders read and update the same [`ConnectionState`]:
//! the websocket codec keeps its partial message here, the xhr-streaming
//! decoder keeps its partial text, gzip stream and cookies here.
//!
//! States live in a [`ConnectionStateStore`], keyed by [`ConnectionId`].

mod store;

pub use store::{ConnectionStateStore, StateLease};

use std::fmt::{Display, Formatter};

use bytes::{Bytes, BytesMut};

use crate::frame::OpCode;
use crate::sockjs::Inflater;

/// Prefix of an accumulated cookie jar.
pub const COOKIE_PREFIX: &str = "Cookie: ";

/// Connection identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    #[inline]
    pub const fn new(id: u64) -> Self { Self(id) }

    #[inline]
    pub const fn get(self) -> u64 { self.0 }
}

impl Display for ConnectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "#{}", self.0) }
}

/// Decode state of one connection.
#[derive(Debug)]
pub struct ConnectionState {
    id: ConnectionId,
    gzip_enabled: bool,
    inflater: Option<Inflater>,
    fragment: BytesMut,
    fragment_opcode: Option<OpCode>,
    cookie_jar: String,
    upgraded: bool,
    close_initiated: bool,
    stream_ended: bool,
}

impl ConnectionState {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            gzip_enabled: false,
            inflater: None,
            fragment: BytesMut::new(),
            fragment_opcode: None,
            cookie_jar: String::new(),
            upgraded: false,
            close_initiated: false,
            stream_ended: false,
        }
    }

    #[inline]
    pub const fn id(&self) -> ConnectionId { self.id }

    /// The peer announced a gzip content encoding.
    #[inline]
    pub const fn gzip_enabled(&self) -> bool { self.gzip_enabled }

    /// Turn gzip on. There is no way back.
    #[inline]
    pub fn enable_gzip(&mut self) { self.gzip_enabled = true }

    /// Inflater of this connection, built on first use.
    ///
    /// `None` if gzip is not enabled.
    pub fn inflater(&mut self, capacity: usize) -> Option<&mut Inflater> {
        if !self.gzip_enabled {
            return None;
        }
        Some(self.inflater.get_or_insert_with(|| Inflater::new(capacity)))
    }

    #[inline]
    pub fn has_inflater(&self) -> bool { self.inflater.is_some() }

    /// Bytes of the message being assembled.
    #[inline]
    pub fn fragment(&self) -> &[u8] { &self.fragment }

    #[inline]
    pub fn has_fragment(&self) -> bool { !self.fragment.is_empty() || self.fragment_opcode.is_some() }

    /// Opcode of the message being reassembled, if any.
    #[inline]
    pub const fn fragment_opcode(&self) -> Option<OpCode> { self.fragment_opcode }

    /// Start a fragmented message.
    #[inline]
    pub fn begin_fragment(&mut self, opcode: OpCode) { self.fragment_opcode = Some(opcode) }

    #[inline]
    pub fn append_fragment(&mut self, data: &[u8]) { self.fragment.extend_from_slice(data) }

    /// Take the assembled bytes and reset the buffer.
    #[inline]
    pub fn take_fragment(&mut self) -> Bytes {
        self.fragment_opcode = None;
        self.fragment.split().freeze()
    }

    /// Accumulated `Cookie:` header, empty if no cookie was seen.
    #[inline]
    pub fn cookie_jar(&self) -> &str { &self.cookie_jar }

    /// Append one `Set-Cookie` value to the jar.
    pub fn add_cookie(&mut self, value: &str) {
        if self.cookie_jar.is_empty() {
            self.cookie_jar.push_str(COOKIE_PREFIX);
        }
        self.cookie_jar.push_str(value);
        self.cookie_jar.push_str("; ");
    }

    /// Whether the http preamble has been consumed.
    #[inline]
    pub const fn upgraded(&self) -> bool { self.upgraded }

    #[inline]
    pub fn set_upgraded(&mut self) { self.upgraded = true }

    /// A malformed close was received, the peer must not get a close reply.
    #[inline]
    pub const fn close_initiated(&self) -> bool { self.close_initiated }

    #[inline]
    pub fn set_close_initiated(&mut self) { self.close_initiated = true }

    /// The xhr response signalled end of body.
    #[inline]
    pub const fn stream_ended(&self) -> bool { self.stream_ended }

    #[inline]
    pub fn set_stream_ended(&mut self) { self.stream_ended = true }
}
