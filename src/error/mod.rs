#![allow(missing_docs)]
//! Errors
//!
//! Leaf errors describe one layer each: [`FrameError`] for websocket
//! framing, [`ChunkError`] for http chunked transfer and [`HandshakeError`]
//! for the upgrade. [`Error`] joins them with closure and io failures,
//! and [`Error::class`] tells the caller how to treat any of them.

mod chunk;
mod frame;
mod handshake;

pub use chunk::ChunkError;
pub use frame::FrameError;
pub use handshake::HandshakeError;

use std::fmt::{Display, Formatter};
use std::io;

use thiserror::Error;

use crate::state::ConnectionId;

/// Where a decoder was when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Opcode,
    Length,
    ExtendedLength,
    MaskKey,
    Payload,
    ChunkSize,
    ChunkData,
    ChunkTrailer,
    Preamble,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Phase::*;
        let s = match self {
            Opcode => "opcode",
            Length => "length",
            ExtendedLength => "extended length",
            MaskKey => "mask key",
            Payload => "payload",
            ChunkSize => "chunk size",
            ChunkData => "chunk data",
            ChunkTrailer => "chunk trailer",
            Preamble => "http preamble",
        };
        f.write_str(s)
    }
}

/// Broad error categories. All of them are fatal to the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    ProtocolViolation,
    AbruptClosure,
    ChunkFraming,
    Handshake,
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Chunk error: {0}")]
    Chunk(#[from] ChunkError),

    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    #[error("Gzip error: {0}")]
    Inflate(#[source] io::Error),

    #[error("Socket closed during message assembly, while reading {0}")]
    AbruptClosure(Phase),

    #[error("Io error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection {conn}: {source}")]
    Connection {
        conn: ConnectionId,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Map an io error raised in `phase`, an unexpected EOF
    /// becomes an abrupt closure.
    pub fn from_io(e: io::Error, phase: Phase) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::AbruptClosure(phase)
        } else {
            Error::Io(e)
        }
    }

    /// Attach the connection identity, once.
    pub fn on(self, conn: ConnectionId) -> Self {
        match self {
            e @ Error::Connection { .. } => e,
            e => Error::Connection {
                conn,
                source: Box::new(e),
            },
        }
    }

    pub fn class(&self) -> ErrorClass {
        use Error::*;
        match self {
            Frame(_) | Inflate(_) => ErrorClass::ProtocolViolation,
            Chunk(_) => ErrorClass::ChunkFraming,
            Handshake(_) => ErrorClass::Handshake,
            AbruptClosure(_) => ErrorClass::AbruptClosure,
            Io(_) => ErrorClass::Io,
            Connection { source, .. } => source.class(),
        }
    }

    /// Phase of an abrupt closure.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::AbruptClosure(p) => Some(*p),
            Error::Connection { source, .. } => source.phase(),
            _ => None,
        }
    }

    /// Innermost error, without connection context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Connection { source, .. } => source.root(),
            e => e,
        }
    }

    /// Connection identity, if attached.
    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            Error::Connection { conn, .. } => Some(*conn),
            _ => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        use io::ErrorKind;
        let kind = match e.class() {
            ErrorClass::AbruptClosure => ErrorKind::UnexpectedEof,
            ErrorClass::Io => ErrorKind::Other,
            _ => ErrorKind::InvalidData,
        };
        io::Error::new(kind, e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classify() {
        let e = Error::from(FrameError::ExpectedMaskedData);
        assert_eq!(e.class(), ErrorClass::ProtocolViolation);

        let e = Error::from(ChunkError::ZeroLengthChunk);
        assert_eq!(e.class(), ErrorClass::ChunkFraming);

        let e = Error::from_io(io::ErrorKind::UnexpectedEof.into(), Phase::Payload);
        assert_eq!(e.class(), ErrorClass::AbruptClosure);
        assert_eq!(e.phase(), Some(Phase::Payload));

        let e = Error::from_io(io::ErrorKind::ConnectionReset.into(), Phase::Payload);
        assert_eq!(e.class(), ErrorClass::Io);

        let e = Error::Inflate(io::ErrorKind::InvalidInput.into());
        assert_eq!(e.class(), ErrorClass::ProtocolViolation);
    }

    #[test]
    fn connection_context() {
        let id = ConnectionId::new(7);
        let e = Error::AbruptClosure(Phase::MaskKey).on(id).on(ConnectionId::new(8));
        assert_eq!(e.connection(), Some(id));
        assert_eq!(e.class(), ErrorClass::AbruptClosure);
        assert_eq!(e.phase(), Some(Phase::MaskKey));
        assert!(matches!(e.root(), Error::AbruptClosure(Phase::MaskKey)));
        assert_eq!(
            e.to_string(),
            "Connection #7: Socket closed during message assembly, while reading mask key"
        );
    }
}
