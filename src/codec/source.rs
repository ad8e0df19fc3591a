//! Byte sources.
//!
//! Decoders pull bytes one at a time or in exact runs, and read CRLF
//! terminated lines for http framing. Any [`Read`] is a [`ByteSource`].
//! Reading single bytes from a socket is slow, wrap it in a
//! [`BufReader`](std::io::BufReader) first.

use std::io::{self, Read};

use bytes::{Bytes, BytesMut};

use crate::error::{ChunkError, Error, Phase, Result};

/// Bytes read per step. A declared length is never allocated up front,
/// the buffer only grows as data arrives.
const READ_STEP: usize = 8192;

/// Blocking byte source.
pub trait ByteSource {
    /// Next byte, `None` at end of stream.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Exactly `n` bytes. End of stream before that is
    /// [`io::ErrorKind::UnexpectedEof`].
    fn read_bytes(&mut self, n: usize) -> io::Result<Bytes>;
}

impl<R: Read + ?Sized> ByteSource for R {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut b = [0u8; 1];
        loop {
            match self.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(b[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn read_bytes(&mut self, n: usize) -> io::Result<Bytes> {
        let mut buf = BytesMut::with_capacity(n.min(READ_STEP));
        let mut step = [0u8; READ_STEP];
        while buf.len() < n {
            let want = (n - buf.len()).min(READ_STEP);
            match self.read(&mut step[..want]) {
                Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
                Ok(k) => buf.extend_from_slice(&step[..k]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(buf.freeze())
    }
}

/// Accumulates one line, shared by the sync and async readers.
#[derive(Debug)]
pub(crate) struct LineBuf {
    buf: Vec<u8>,
    max: usize,
}

impl LineBuf {
    pub(crate) fn new(max: usize) -> Self { Self { buf: Vec::new(), max } }

    /// Feed one byte, returns `true` once the line is complete.
    pub(crate) fn push(&mut self, b: u8) -> Result<bool> {
        if b == b'\n' {
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
            return Ok(true);
        }
        if self.buf.len() >= self.max {
            return Err(ChunkError::LineTooLong(self.max).into());
        }
        self.buf.push(b);
        Ok(false)
    }

    pub(crate) fn into_string(self) -> Result<String> {
        String::from_utf8(self.buf).map_err(|_| ChunkError::InvalidUtf8.into())
    }
}

/// Read one line terminated by LF, an optional CR before it is dropped.
///
/// Returns `None` if the stream ends before the first byte. Ending later
/// is an abrupt closure in `phase`.
pub fn read_line<S>(src: &mut S, max: usize, phase: Phase) -> Result<Option<String>>
where
    S: ByteSource + ?Sized,
{
    let mut line = LineBuf::new(max);
    let mut started = false;
    loop {
        match src.read_byte().map_err(|e| Error::from_io(e, phase))? {
            Some(b) => {
                started = true;
                if line.push(b)? {
                    return line.into_string().map(Some);
                }
            }
            None if !started => return Ok(None),
            None => return Err(Error::AbruptClosure(phase)),
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        use tokio::io::{AsyncRead, AsyncReadExt};

        /// Async twin of [`ByteSource::read_byte`].
        pub async fn read_byte_async<S>(src: &mut S) -> io::Result<Option<u8>>
        where
            S: AsyncRead + Unpin + ?Sized,
        {
            let mut b = [0u8; 1];
            match src.read(&mut b).await? {
                0 => Ok(None),
                _ => Ok(Some(b[0])),
            }
        }

        /// Async twin of [`ByteSource::read_bytes`].
        pub async fn read_bytes_async<S>(src: &mut S, n: usize) -> io::Result<Bytes>
        where
            S: AsyncRead + Unpin + ?Sized,
        {
            let mut buf = BytesMut::with_capacity(n.min(READ_STEP));
            let mut step = [0u8; READ_STEP];
            while buf.len() < n {
                let want = (n - buf.len()).min(READ_STEP);
                match src.read(&mut step[..want]).await? {
                    0 => return Err(io::ErrorKind::UnexpectedEof.into()),
                    k => buf.extend_from_slice(&step[..k]),
                }
            }
            Ok(buf.freeze())
        }

        /// Async twin of [`read_line`].
        pub async fn read_line_async<S>(src: &mut S, max: usize, phase: Phase) -> Result<Option<String>>
        where
            S: AsyncRead + Unpin + ?Sized,
        {
            let mut line = LineBuf::new(max);
            let mut started = false;
            loop {
                match read_byte_async(src).await.map_err(|e| Error::from_io(e, phase))? {
                    Some(b) => {
                        started = true;
                        if line.push(b)? {
                            return line.into_string().map(Some);
                        }
                    }
                    None if !started => return Ok(None),
                    None => return Err(Error::AbruptClosure(phase)),
                }
            }
        }
    }
}
