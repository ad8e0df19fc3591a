use thiserror::Error;

use crate::frame::FrameKind;

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("Expected a headers frame, got {0}")]
    NotHeaders(FrameKind),

    #[error("Missing http status code")]
    HttpStatusCode,

    #[error("Missing sec-websocket-key header")]
    SecWebSocketKey,

    #[error("Missing or illegal sec-websocket-accept header")]
    SecWebSocketAccept,

    #[error("Missing or illegal sec-websocket-version {0:?}")]
    SecWebSocketVersion(Option<String>),

    #[error("Not enough data to parse")]
    NotEnoughData,

    #[error("Http parse error: {0}")]
    Httparse(#[from] httparse::Error),
}

impl HandshakeError {
    /// Http response rejecting the upgrade, if this error
    /// should be answered rather than silently dropped.
    pub fn rejection(&self) -> Option<String> {
        use HandshakeError::*;
        match self {
            SecWebSocketKey => Some(String::from(
                "HTTP/1.1 400 Bad Request\r\n\
                 content-length: 0\r\n\r\n",
            )),
            SecWebSocketVersion(_) => Some(String::from(
                "HTTP/1.1 426 Upgrade Required\r\n\
                 sec-websocket-version: 13\r\n\
                 content-length: 0\r\n\r\n",
            )),
            _ => None,
        }
    }
}
