//! Decoded frame.
//!
//! A [`Frame`] is what callers exchange with the codecs: websocket messages,
//! control frames, SockJS envelope markers and HTTP preamble data all share
//! this one value type.

use bytes::Bytes;

/// Close status used when a close frame carries no status.
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Normal closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// Protocol error.
pub const CLOSE_PROTOCOL_ERROR: u16 = 1002;

/// Frame kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Data,
    DataBinary,
    Ping,
    Pong,
    Close,
    Heartbeat,
    Open,
    Prelude,
    Cookies,
    Headers,
    Unexpected,
}

impl FrameKind {
    /// Human readable name.
    pub const fn as_str(self) -> &'static str {
        use FrameKind::*;
        match self {
            Data => "Data",
            DataBinary => "DataBinary",
            Ping => "Ping",
            Pong => "Pong",
            Close => "Close",
            Heartbeat => "Heartbeat",
            Open => "Open",
            Prelude => "Prelude",
            Cookies => "Cookies",
            Headers => "Headers",
            Unexpected => "Unexpected",
        }
    }
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// One classified unit of protocol data.
///
/// Binary frames carry only `binary`, close frames always carry a status,
/// every other kind carries only `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: FrameKind,
    text: Option<String>,
    binary: Option<Bytes>,
    close_status: Option<u16>,
}

impl Frame {
    /// Text-bearing frame.
    ///
    /// `DataBinary` carries the text as bytes, `Close` gets status 1000
    /// with the text as reason, so the payload rules always hold.
    pub fn text(kind: FrameKind, text: impl Into<String>) -> Self {
        match kind {
            FrameKind::DataBinary => return Self::binary(Into::<String>::into(text).into_bytes()),
            FrameKind::Close => return Self::close(CLOSE_NORMAL, text),
            _ => {}
        }
        Self {
            kind,
            text: Some(text.into()),
            binary: None,
            close_status: None,
        }
    }

    /// Binary data frame.
    pub fn binary(data: impl Into<Bytes>) -> Self {
        Self {
            kind: FrameKind::DataBinary,
            text: None,
            binary: Some(data.into()),
            close_status: None,
        }
    }

    /// Close frame with a status and a (possibly empty) reason.
    pub fn close(status: u16, reason: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Close,
            text: Some(reason.into()),
            binary: None,
            close_status: Some(status),
        }
    }

    #[inline]
    pub fn data(text: impl Into<String>) -> Self { Self::text(FrameKind::Data, text) }

    #[inline]
    pub fn ping(text: impl Into<String>) -> Self { Self::text(FrameKind::Ping, text) }

    #[inline]
    pub fn pong(text: impl Into<String>) -> Self { Self::text(FrameKind::Pong, text) }

    #[inline]
    pub const fn kind(&self) -> FrameKind { self.kind }

    #[inline]
    pub fn text_payload(&self) -> Option<&str> { self.text.as_deref() }

    #[inline]
    pub fn binary_payload(&self) -> Option<&Bytes> { self.binary.as_ref() }

    #[inline]
    pub const fn close_status(&self) -> Option<u16> { self.close_status }

    /// Payload bytes regardless of kind.
    pub fn payload_bytes(&self) -> &[u8] {
        match (&self.text, &self.binary) {
            (_, Some(b)) => b,
            (Some(t), None) => t.as_bytes(),
            (None, None) => &[],
        }
    }

    /// Consume the frame, returning its text payload.
    #[inline]
    pub fn into_text(self) -> Option<String> { self.text }

    /// Consume the frame, returning its binary payload.
    #[inline]
    pub fn into_binary(self) -> Option<Bytes> { self.binary }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(status) = self.close_status {
            write!(f, "({})", status)?;
        }
        match (&self.text, &self.binary) {
            (Some(t), _) if t.len() > 100 => {
                let end = (0..=100).rev().find(|&i| t.is_char_boundary(i)).unwrap_or(0);
                write!(f, " {}...", &t[..end])
            }
            (Some(t), _) => write!(f, " {}", t),
            (None, Some(b)) => write!(f, " <{} bytes>", b.len()),
            (None, None) => Ok(()),
        }
    }
}
