//! Http chunked body decoder.
//!
//! ```text
//! 5\r\n          chunk size in hex, extensions after ';' are ignored
//! a[1]\n\r\n     chunk data, then CRLF
//! 0\r\n\r\n      terminal chunk and an empty trailer
//! ```
//!
//! Chunk data is accumulated (inflated first if the response is gzip
//! encoded) until the accumulated text ends with `\n`. The text is then
//! split into lines, each line being one SockJS envelope.

use bytes::Bytes;

use crate::codec::source::{read_line, ByteSource};
use crate::config::StreamingConfig;
use crate::error::{ChunkError, Error, Phase, Result};
use crate::frame::length::MAX_PAYLOAD_LEN;
use crate::frame::Frame;
use crate::state::ConnectionState;

use super::classify_with;
use super::headers::{extract, read_header_block};

/// One chunk as read off the wire.
#[derive(Debug)]
enum Chunk {
    /// End of stream in front of a size line.
    Eof,
    /// Empty size line.
    Blank,
    /// Size zero, trailer already consumed.
    Zero,
    Data(Bytes),
}

/// What to do after a chunk.
#[derive(Debug)]
enum Progress {
    Done(Option<Vec<Frame>>),
    More,
}

/// Xhr-streaming decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkDecoder {
    config: StreamingConfig,
}

/// Parse a chunk size line. Sizes above [`MAX_PAYLOAD_LEN`] are refused.
fn parse_size(line: &str) -> Result<usize> {
    let hex = line.split(';').next().unwrap_or_default().trim();
    match u64::from_str_radix(hex, 16) {
        Ok(n) if n <= MAX_PAYLOAD_LEN => Ok(n as usize),
        _ => Err(ChunkError::InvalidChunkSize(line.to_string()).into()),
    }
}

impl ChunkDecoder {
    #[inline]
    pub const fn new(config: StreamingConfig) -> Self { Self { config } }

    #[inline]
    pub const fn config(&self) -> &StreamingConfig { &self.config }

    /// Consume the status line and header block of the response.
    ///
    /// Returns `Headers`, followed by `Cookies` if the response set any.
    /// `None` if the stream ends before the first byte.
    pub fn read_response_head<S>(&self, src: &mut S, state: &mut ConnectionState) -> Result<Option<Vec<Frame>>>
    where
        S: ByteSource + ?Sized,
    {
        let block = read_header_block(src, self.config.max_line_len).map_err(|e| e.on(state.id()))?;
        Ok(block.map(|block| self.accept_head(&block, state)))
    }

    /// Read chunks until at least one complete line is assembled.
    ///
    /// Returns the classified lines in order, or `None` once the body
    /// ended cleanly.
    pub fn decode<S>(&self, src: &mut S, state: &mut ConnectionState) -> Result<Option<Vec<Frame>>>
    where
        S: ByteSource + ?Sized,
    {
        if state.stream_ended() {
            return Ok(None);
        }
        loop {
            let chunk = self.read_chunk(src).map_err(|e| e.on(state.id()))?;
            match self.accept(chunk, state).map_err(|e| e.on(state.id()))? {
                Progress::Done(frames) => return Ok(frames),
                Progress::More => continue,
            }
        }
    }

    fn read_chunk<S>(&self, src: &mut S) -> Result<Chunk>
    where
        S: ByteSource + ?Sized,
    {
        let max = self.config.max_line_len;
        let size = match read_line(src, max, Phase::ChunkSize)? {
            None => return Ok(Chunk::Eof),
            Some(line) if line.is_empty() => return Ok(Chunk::Blank),
            Some(line) => parse_size(&line)?,
        };
        log::trace!("chunk size {}", size);

        if size == 0 {
            // trailer section, up to an empty line or the end of stream
            while let Some(line) = read_line(src, max, Phase::ChunkTrailer)? {
                if line.is_empty() {
                    break;
                }
            }
            return Ok(Chunk::Zero);
        }

        let data = src.read_bytes(size).map_err(|e| Error::from_io(e, Phase::ChunkData))?;
        let crlf = src.read_bytes(2).map_err(|e| Error::from_io(e, Phase::ChunkTrailer))?;
        if &crlf[..] != b"\r\n" {
            return Err(ChunkError::MissingCrlf.into());
        }
        Ok(Chunk::Data(data))
    }

    fn accept_head(&self, block: &str, state: &mut ConnectionState) -> Vec<Frame> {
        state.set_upgraded();
        extract(block, state)
    }

    fn accept(&self, chunk: Chunk, state: &mut ConnectionState) -> Result<Progress> {
        match chunk {
            Chunk::Eof if state.has_fragment() => Err(Error::AbruptClosure(Phase::ChunkSize)),
            Chunk::Eof => Ok(Progress::Done(None)),
            Chunk::Blank => {
                state.set_stream_ended();
                self.flush_remaining(state)
            }
            Chunk::Zero if !state.has_fragment() => Err(ChunkError::ZeroLengthChunk.into()),
            Chunk::Zero => {
                state.set_stream_ended();
                self.flush_remaining(state)
            }
            Chunk::Data(data) => {
                let inflated = match state.inflater(self.config.inflate_buffer) {
                    Some(inflater) => {
                        let mut out = Vec::with_capacity(data.len() * 2);
                        inflater.inflate(&data, &mut out)?;
                        Some(out)
                    }
                    None => None,
                };
                state.append_fragment(inflated.as_deref().unwrap_or(&data[..]));

                if state.fragment().last() == Some(&b'\n') {
                    self.flush(state).map(|frames| Progress::Done(Some(frames)))
                } else {
                    Ok(Progress::More)
                }
            }
        }
    }

    fn flush_remaining(&self, state: &mut ConnectionState) -> Result<Progress> {
        if state.has_fragment() {
            self.flush(state).map(|frames| Progress::Done(Some(frames)))
        } else {
            Ok(Progress::Done(None))
        }
    }

    /// Classify every non-empty line of the accumulated text.
    fn flush(&self, state: &mut ConnectionState) -> Result<Vec<Frame>> {
        let data = state.take_fragment();
        let text = match std::str::from_utf8(&data) {
            Ok(text) => std::borrow::Cow::Borrowed(text),
            Err(_) if self.config.strict_utf8 => return Err(ChunkError::InvalidUtf8.into()),
            Err(_) => String::from_utf8_lossy(&data),
        };

        let frames: Vec<Frame> = text
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(|line| classify_with(self.config.envelope, line))
            .collect();
        log::debug!("connection {}: {} frames assembled", state.id(), frames.len());
        Ok(frames)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        use parking_lot::Mutex;
        use tokio::io::AsyncRead;

        use crate::codec::source::{read_bytes_async, read_line_async};
        use super::headers::read_header_block_async;

        impl ChunkDecoder {
            /// Async twin of [`read_response_head`](Self::read_response_head).
            ///
            /// The state is only locked once the block has been read.
            pub async fn read_response_head_async<S>(
                &self,
                src: &mut S,
                state: &Mutex<ConnectionState>,
            ) -> Result<Option<Vec<Frame>>>
            where
                S: AsyncRead + Unpin + ?Sized,
            {
                match read_header_block_async(src, self.config.max_line_len).await {
                    Ok(block) => {
                        let mut state = state.lock();
                        Ok(block.map(|block| self.accept_head(&block, &mut state)))
                    }
                    Err(e) => Err(e.on(state.lock().id())),
                }
            }

            /// Async twin of [`decode`](Self::decode).
            pub async fn decode_async<S>(
                &self,
                src: &mut S,
                state: &Mutex<ConnectionState>,
            ) -> Result<Option<Vec<Frame>>>
            where
                S: AsyncRead + Unpin + ?Sized,
            {
                if state.lock().stream_ended() {
                    return Ok(None);
                }
                loop {
                    let chunk = self.read_chunk_async(src).await;
                    let mut state = state.lock();
                    let id = state.id();
                    let progress = chunk.and_then(|chunk| self.accept(chunk, &mut state));
                    match progress.map_err(|e| e.on(id))? {
                        Progress::Done(frames) => return Ok(frames),
                        Progress::More => continue,
                    }
                }
            }

            async fn read_chunk_async<S>(&self, src: &mut S) -> Result<Chunk>
            where
                S: AsyncRead + Unpin + ?Sized,
            {
                let max = self.config.max_line_len;
                let size = match read_line_async(src, max, Phase::ChunkSize).await? {
                    None => return Ok(Chunk::Eof),
                    Some(line) if line.is_empty() => return Ok(Chunk::Blank),
                    Some(line) => parse_size(&line)?,
                };
                log::trace!("chunk size {}", size);

                if size == 0 {
                    while let Some(line) = read_line_async(src, max, Phase::ChunkTrailer).await? {
                        if line.is_empty() {
                            break;
                        }
                    }
                    return Ok(Chunk::Zero);
                }

                let data = read_bytes_async(src, size)
                    .await
                    .map_err(|e| Error::from_io(e, Phase::ChunkData))?;
                let crlf = read_bytes_async(src, 2)
                    .await
                    .map_err(|e| Error::from_io(e, Phase::ChunkTrailer))?;
                if &crlf[..] != b"\r\n" {
                    return Err(ChunkError::MissingCrlf.into());
                }
                Ok(Chunk::Data(data))
            }
        }
    }
}
