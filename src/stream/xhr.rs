use std::collections::VecDeque;
use std::io::Read;

use parking_lot::MutexGuard;

use crate::config::StreamingConfig;
use crate::error::Result;
use crate::frame::Frame;
use crate::sockjs::ChunkDecoder;
use crate::state::{ConnectionId, ConnectionState, StateLease};

/// Xhr-streaming response reader.
///
/// The first read consumes the response head and yields its `Headers` (and
/// `Cookies`) frames, later reads yield the SockJS frames of the body one
/// at a time.
pub struct XhrStream<IO> {
    io: IO,
    decoder: ChunkDecoder,
    lease: StateLease,
    pending: VecDeque<Frame>,
}

impl<IO> std::fmt::Debug for XhrStream<IO> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XhrStream")
            .field("id", &self.lease.id())
            .field("decoder", &self.decoder)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<IO> AsRef<IO> for XhrStream<IO> {
    #[inline]
    fn as_ref(&self) -> &IO { &self.io }
}

impl<IO> AsMut<IO> for XhrStream<IO> {
    #[inline]
    fn as_mut(&mut self) -> &mut IO { &mut self.io }
}

impl<IO> XhrStream<IO> {
    /// Wrap a response stream, positioned at the status line.
    pub fn new(io: IO, config: StreamingConfig, lease: StateLease) -> Self {
        Self {
            io,
            decoder: ChunkDecoder::new(config),
            lease,
            pending: VecDeque::new(),
        }
    }

    #[inline]
    pub const fn id(&self) -> ConnectionId { self.lease.id() }

    #[inline]
    pub fn state(&self) -> MutexGuard<'_, ConnectionState> { self.lease.lock() }

    #[inline]
    pub fn into_inner(self) -> IO { self.io }

    /// Queue decoded frames, returns the first one.
    fn queue(&mut self, frames: Option<Vec<Frame>>) -> Option<Option<Frame>> {
        match frames {
            Some(frames) => {
                self.pending.extend(frames);
                self.pending.pop_front().map(Some)
            }
            None => Some(None),
        }
    }
}

impl<IO: Read> XhrStream<IO> {
    /// Next frame, or `None` once the body ended.
    ///
    /// This function will block until a frame is read or an error occurs.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(Some(frame));
            }

            let mut state = self.lease.lock();
            let frames = if state.upgraded() {
                self.decoder.decode(&mut self.io, &mut state)?
            } else {
                self.decoder.read_response_head(&mut self.io, &mut state)?
            };
            drop(state);

            // a chunk may hold nothing but empty lines
            if let Some(next) = self.queue(frames) {
                return Ok(next);
            }
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        use tokio::io::AsyncRead;

        impl<IO: AsyncRead + Unpin> XhrStream<IO> {
            /// Async version of [`read_frame`](Self::read_frame).
            pub async fn read_frame_async(&mut self) -> Result<Option<Frame>> {
                loop {
                    if let Some(frame) = self.pending.pop_front() {
                        return Ok(Some(frame));
                    }

                    let upgraded = self.lease.lock().upgraded();
                    let frames = if upgraded {
                        self.decoder.decode_async(&mut self.io, self.lease.shared()).await?
                    } else {
                        self.decoder.read_response_head_async(&mut self.io, self.lease.shared()).await?
                    };

                    if let Some(next) = self.queue(frames) {
                        return Ok(next);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use crate::error::{ChunkError, Error};
    use crate::frame::FrameKind;
    use crate::state::ConnectionStateStore;

    const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
        Set-Cookie: JSESSIONID=abc\r\n\
        Transfer-Encoding: chunked\r\n\r\n\
        2\r\no\n\r\n\
        1\r\n\n\r\n\
        b\r\na[\"x\",\"y\"]\n\r\n\
        0\r\n\r\n";

    #[test]
    fn frames_in_order() {
        let store = Arc::new(ConnectionStateStore::new());
        let mut xhr = XhrStream::new(Cursor::new(RESPONSE.to_vec()), StreamingConfig::default(), store.lease());

        let mut kinds = Vec::new();
        let mut last = None;
        // the terminal chunk follows an emitted frame, nothing is pending
        let err = loop {
            match xhr.read_frame() {
                Ok(Some(frame)) => {
                    kinds.push(frame.kind());
                    last = Some(frame);
                }
                Ok(None) => break None,
                Err(e) => break Some(e),
            }
        };

        assert_eq!(
            kinds,
            [FrameKind::Headers, FrameKind::Cookies, FrameKind::Open, FrameKind::Data]
        );
        assert_eq!(last.unwrap().text_payload(), Some("[\"x\",\"y\"]"));
        let err = err.unwrap();
        assert!(matches!(err.root(), Error::Chunk(ChunkError::ZeroLengthChunk)));
        assert_eq!(xhr.state().cookie_jar(), "Cookie: JSESSIONID=abc; ");
    }
}
