//! Connection owners.
//!
//! A [`Stream`] owns a websocket connection: its IO source, a [`Codec`] and
//! a [`StateLease`] on the connection's decode state. An [`XhrStream`] does
//! the same for an xhr-streaming response body.
//!
//! Dropping either removes the state from its store.
//!
//! Reads go to the IO source a few bytes at a time, wrap it in a buffered
//! reader if the source is a raw socket.

mod read;
mod write;
mod upgrade;
mod xhr;

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        mod async_read;
        mod async_write;
    }
}

pub use xhr::XhrStream;

use parking_lot::MutexGuard;

use crate::codec::Codec;
use crate::frame::Frame;
use crate::state::{ConnectionId, ConnectionState, StateLease};

/// Websocket stream.
pub struct Stream<IO, Role> {
    io: IO,
    codec: Codec<Role>,
    lease: StateLease,
}

impl<IO, Role> AsRef<IO> for Stream<IO, Role> {
    #[inline]
    fn as_ref(&self) -> &IO { &self.io }
}

impl<IO, Role> AsMut<IO> for Stream<IO, Role> {
    #[inline]
    fn as_mut(&mut self) -> &mut IO { &mut self.io }
}

impl<IO, Role> std::fmt::Debug for Stream<IO, Role> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("id", &self.lease.id())
            .field("config", self.codec.config())
            .finish()
    }
}

impl<IO, Role> Stream<IO, Role> {
    /// Wrap an IO source directly, without a handshake.
    #[inline]
    pub const fn new(io: IO, codec: Codec<Role>, lease: StateLease) -> Self { Stream { io, codec, lease } }

    #[inline]
    pub const fn id(&self) -> ConnectionId { self.lease.id() }

    #[inline]
    pub const fn codec(&self) -> &Codec<Role> { &self.codec }

    /// Lock the decode state.
    #[inline]
    pub fn state(&self) -> MutexGuard<'_, ConnectionState> { self.lease.lock() }

    /// Give back the IO source. The connection state is removed.
    #[inline]
    pub fn into_inner(self) -> IO { self.io }
}

/// Frame to send in response to `frame`, if any.
///
/// Pings are answered with a pong carrying the same payload. A close is
/// echoed, unless it was malformed.
pub(crate) fn reply_to(frame: &Frame, state: &ConnectionState) -> Option<Frame> {
    use crate::frame::FrameKind;
    match frame.kind() {
        FrameKind::Ping => Some(Frame::pong(frame.text_payload().unwrap_or_default())),
        FrameKind::Close if !state.close_initiated() => frame
            .close_status()
            .map(|status| Frame::close(status, frame.text_payload().unwrap_or_default())),
        _ => None,
    }
}
