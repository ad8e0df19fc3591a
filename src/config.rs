//! Codec options.
//!
//! Everything here is fixed when a codec is built and stays the same
//! for the lifetime of the connection it decodes.

use crate::frame::length::MAX_PAYLOAD_LEN;

/// Same as the largest SockJS frame a peer is expected to send in one line.
pub const DEFAULT_MAX_LINE_LEN: usize = 2048;

/// Largest frame payload or reassembled message accepted by default.
pub const DEFAULT_MAX_PAYLOAD_LEN: u64 = MAX_PAYLOAD_LEN;

/// Capacity of the ring feeding the gzip decoder.
pub const DEFAULT_INFLATE_BUFFER: usize = 8192;

/// How assembled text is turned into a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// Every text message is [`Data`](crate::frame::FrameKind::Data).
    Raw,
    /// Text is a SockJS envelope, see [`classify`](crate::sockjs::classify).
    SockJs,
}

/// Websocket codec options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub envelope: Envelope,
    /// Reject text frames that are not valid UTF-8,
    /// otherwise decode them lossily.
    pub strict_utf8: bool,
    /// The connection starts with an http header block,
    /// returned as a `Headers` frame by the first read.
    pub http_preamble: bool,
    /// Longest header line accepted in the preamble.
    pub max_line_len: usize,
    /// Largest payload of one frame, and of a message reassembled
    /// from fragments.
    pub max_payload_len: u64,
}

impl CodecConfig {
    #[inline]
    pub const fn new() -> Self {
        Self {
            envelope: Envelope::Raw,
            strict_utf8: true,
            http_preamble: false,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }

    #[inline]
    pub const fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    #[inline]
    pub const fn with_strict_utf8(mut self, strict: bool) -> Self {
        self.strict_utf8 = strict;
        self
    }

    #[inline]
    pub const fn with_http_preamble(mut self, preamble: bool) -> Self {
        self.http_preamble = preamble;
        self
    }

    #[inline]
    pub const fn with_max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len;
        self
    }

    /// Values above [`MAX_PAYLOAD_LEN`] are clamped.
    #[inline]
    pub const fn with_max_payload_len(mut self, len: u64) -> Self {
        self.max_payload_len = if len > MAX_PAYLOAD_LEN { MAX_PAYLOAD_LEN } else { len };
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self { Self::new() }
}

/// Xhr-streaming decoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingConfig {
    pub envelope: Envelope,
    pub strict_utf8: bool,
    /// Longest chunk-size or header line accepted.
    pub max_line_len: usize,
    /// Bytes buffered in front of the gzip decoder at a time.
    pub inflate_buffer: usize,
}

impl StreamingConfig {
    #[inline]
    pub const fn new() -> Self {
        Self {
            envelope: Envelope::SockJs,
            strict_utf8: true,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            inflate_buffer: DEFAULT_INFLATE_BUFFER,
        }
    }

    #[inline]
    pub const fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    #[inline]
    pub const fn with_strict_utf8(mut self, strict: bool) -> Self {
        self.strict_utf8 = strict;
        self
    }

    #[inline]
    pub const fn with_max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len;
        self
    }

    #[inline]
    pub const fn with_inflate_buffer(mut self, len: usize) -> Self {
        self.inflate_buffer = len;
        self
    }
}

impl Default for StreamingConfig {
    fn default() -> Self { Self::new() }
}
