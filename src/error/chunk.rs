use thiserror::Error;

/// Http chunked-transfer framing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Invalid chunk size line {0:?}")]
    InvalidChunkSize(String),

    #[error("Zero length chunk received mid-stream")]
    ZeroLengthChunk,

    #[error("Expected CRLF after chunk data")]
    MissingCrlf,

    #[error("Line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("Invalid UTF-8 in streamed text")]
    InvalidUtf8,
}
