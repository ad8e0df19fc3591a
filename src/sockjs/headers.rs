//! Http header block.
//!
//! The block is kept as text, terminated by an empty line, and scanned
//! for the two headers that change how the body is decoded: `Set-Cookie`
//! and `Content-Encoding`.

use crate::codec::source::{read_line, ByteSource};
use crate::error::{Error, Phase, Result};
use crate::frame::{Frame, FrameKind};
use crate::state::{ConnectionState, COOKIE_PREFIX};

/// Read lines up to and including the empty line.
///
/// Returns the block with every line CRLF terminated, so the text ends
/// with an empty line too. `None` if the stream ends before the first byte.
pub fn read_header_block<S>(src: &mut S, max_line_len: usize) -> Result<Option<String>>
where
    S: ByteSource + ?Sized,
{
    let mut block = String::new();
    loop {
        match read_line(src, max_line_len, Phase::Preamble)? {
            None if block.is_empty() => return Ok(None),
            None => return Err(Error::AbruptClosure(Phase::Preamble)),
            Some(line) => {
                block.push_str(&line);
                block.push_str("\r\n");
                if line.is_empty() {
                    return Ok(Some(block));
                }
            }
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        use tokio::io::AsyncRead;
        use crate::codec::source::read_line_async;

        /// Async twin of [`read_header_block`].
        pub async fn read_header_block_async<S>(src: &mut S, max_line_len: usize) -> Result<Option<String>>
        where
            S: AsyncRead + Unpin + ?Sized,
        {
            let mut block = String::new();
            loop {
                match read_line_async(src, max_line_len, Phase::Preamble).await? {
                    None if block.is_empty() => return Ok(None),
                    None => return Err(Error::AbruptClosure(Phase::Preamble)),
                    Some(line) => {
                        block.push_str(&line);
                        block.push_str("\r\n");
                        if line.is_empty() {
                            return Ok(Some(block));
                        }
                    }
                }
            }
        }
    }
}

/// Split a header line into a trimmed name and value.
fn split_header(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    Some((name.trim(), value.trim()))
}

/// Scan a header block, updating cookies and gzip on `state`.
///
/// Returns a `Headers` frame with the block, followed by a `Cookies`
/// frame if any cookie has been collected.
pub fn extract(block: &str, state: &mut ConnectionState) -> Vec<Frame> {
    for (name, value) in block.lines().filter_map(split_header) {
        if name.eq_ignore_ascii_case("set-cookie") {
            log::debug!("connection {}: cookie {}", state.id(), value);
            state.add_cookie(value);
        } else if name.eq_ignore_ascii_case("content-encoding")
            && value.to_ascii_lowercase().contains("gzip")
        {
            log::debug!("connection {}: gzip enabled", state.id());
            state.enable_gzip();
        }
    }

    let mut frames = vec![Frame::text(FrameKind::Headers, block)];
    if state.cookie_jar().len() > COOKIE_PREFIX.len() {
        frames.push(Frame::text(FrameKind::Cookies, state.cookie_jar()));
    }
    frames
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;
    use crate::state::ConnectionId;

    const RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
        Content-Type: application/javascript;charset=UTF-8\r\n\
        set-cookie: JSESSIONID=dummy;path=/\r\n\
        Content-Encoding: gzip\r\n\
        Transfer-Encoding: chunked\r\n\
        \r\n";

    #[test]
    fn block() {
        let mut src = Cursor::new(format!("{}5\r\nhello\r\n", RESPONSE).into_bytes());
        let block = read_header_block(&mut src, 2048).unwrap().unwrap();
        assert_eq!(block, RESPONSE);

        // the body is left in place
        assert_eq!(read_line(&mut src, 16, Phase::ChunkSize).unwrap().as_deref(), Some("5"));
    }

    #[test]
    fn block_truncated() {
        let mut src = Cursor::new(b"HTTP/1.1 200 OK\r\nHost: x\r\n".to_vec());
        assert!(matches!(
            read_header_block(&mut src, 2048),
            Err(Error::AbruptClosure(Phase::Preamble))
        ));

        let mut src = Cursor::new(Vec::new());
        assert!(read_header_block(&mut src, 2048).unwrap().is_none());
    }

    #[test]
    fn cookies_and_gzip() {
        let mut state = ConnectionState::new(ConnectionId::new(3));
        let frames = extract(RESPONSE, &mut state);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].kind(), FrameKind::Headers);
        assert_eq!(frames[0].text_payload(), Some(RESPONSE));
        assert_eq!(frames[1].kind(), FrameKind::Cookies);
        assert_eq!(frames[1].text_payload(), Some("Cookie: JSESSIONID=dummy;path=/; "));
        assert!(state.gzip_enabled());
    }

    #[test]
    fn no_cookies() {
        let mut state = ConnectionState::new(ConnectionId::new(3));
        let frames = extract("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n", &mut state);
        assert_eq!(frames.len(), 1);
        assert!(!state.gzip_enabled());
    }
}
