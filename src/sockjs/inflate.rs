//! Gzip across chunk boundaries.
//!
//! A gzip body is split into http chunks at arbitrary byte positions, so the
//! decoder must outlive a single chunk. [`Inflater`] keeps one
//! [`GzDecoder`] per connection and feeds it through a bounded [`Ring`]:
//! compressed bytes are pushed in, and the decoder pulls them out until the
//! ring runs dry, which it reports as [`io::ErrorKind::WouldBlock`].

use std::fmt::{Debug, Formatter};
use std::io::{self, Read};

use flate2::read::GzDecoder;

use crate::error::{Error, Result};

/// Bounded byte ring.
pub struct Ring {
    rd: usize,
    wr: usize,
    buf: Box<[u8]>,
}

impl Ring {
    pub fn new(capacity: usize) -> Self {
        Self {
            rd: 0,
            wr: 0,
            buf: vec![0; capacity.max(1)].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize { self.buf.len() }

    #[inline]
    pub const fn rd_left(&self) -> usize { self.wr - self.rd }

    #[inline]
    pub fn wr_left(&self) -> usize { self.buf.len() - self.rd_left() }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.rd == self.wr }

    #[inline]
    pub fn reset(&mut self) {
        self.rd = 0;
        self.wr = 0;
    }

    /// Push as much of `data` as fits, returns the count of pushed bytes.
    pub fn push(&mut self, data: &[u8]) -> usize {
        if self.buf.len() - self.wr < data.len() && self.rd > 0 {
            self.buf.copy_within(self.rd..self.wr, 0);
            self.wr -= self.rd;
            self.rd = 0;
        }
        let n = data.len().min(self.buf.len() - self.wr);
        self.buf[self.wr..self.wr + n].copy_from_slice(&data[..n]);
        self.wr += n;
        n
    }
}

impl Read for Ring {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let n = buf.len().min(self.rd_left());
        buf[..n].copy_from_slice(&self.buf[self.rd..self.rd + n]);
        self.rd += n;
        if self.is_empty() {
            self.reset();
        }
        Ok(n)
    }
}

impl Debug for Ring {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("rd", &self.rd)
            .field("wr", &self.wr)
            .field("capacity", &self.buf.len())
            .finish()
    }
}

/// Persistent gzip decoder of one connection.
pub struct Inflater {
    decoder: GzDecoder<Ring>,
    finished: bool,
    total_in: u64,
    total_out: u64,
}

impl Inflater {
    /// `capacity` bounds the compressed bytes buffered at a time.
    pub fn new(capacity: usize) -> Self {
        Self {
            decoder: GzDecoder::new(Ring::new(capacity)),
            finished: false,
            total_in: 0,
            total_out: 0,
        }
    }

    /// The gzip member has ended, later input is discarded.
    #[inline]
    pub const fn is_finished(&self) -> bool { self.finished }

    #[inline]
    pub const fn total_in(&self) -> u64 { self.total_in }

    #[inline]
    pub const fn total_out(&self) -> u64 { self.total_out }

    /// Inflate `input`, appending whatever is decodable so far to `out`.
    ///
    /// Returns the count of appended bytes. Bytes that cannot be decoded yet
    /// stay inside the decoder until the next call.
    pub fn inflate(&mut self, mut input: &[u8], out: &mut Vec<u8>) -> Result<usize> {
        let start = out.len();

        while !input.is_empty() {
            if self.finished {
                log::warn!("discarded {} bytes after the end of the gzip stream", input.len());
                break;
            }

            let n = self.decoder.get_mut().push(input);
            input = &input[n..];
            self.total_in += n as u64;

            self.drain(out)?;
        }

        let produced = out.len() - start;
        self.total_out += produced as u64;
        log::trace!("inflated {} bytes", produced);
        Ok(produced)
    }

    fn drain(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let mut buf = [0u8; 4096];
        loop {
            match self.decoder.read(&mut buf) {
                Ok(0) => {
                    self.finished = true;
                    let ring = self.decoder.get_mut();
                    if !ring.is_empty() {
                        log::warn!(
                            "discarded {} bytes after the end of the gzip stream",
                            ring.rd_left()
                        );
                        ring.reset();
                    }
                    return Ok(());
                }
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Inflate(e)),
            }
        }
    }
}

impl Debug for Inflater {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inflater")
            .field("finished", &self.finished)
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .finish()
    }
}
