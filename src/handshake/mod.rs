//! Websocket handshake.
//!
//! The server side takes the `Headers` frame produced by the codec's http
//! preamble and answers it, the client side builds the upgrade request and
//! checks the answer.
//!
//! [RFC-6455 Section4](https://datatracker.ietf.org/doc/html/rfc6455#section-4)

pub mod key;

pub use key::{derive_accept_key, new_sec_key};

use crate::error::{HandshakeError, Result};
use crate::frame::{Frame, FrameKind};

/// Max headers parsed from a handshake.
pub const MAX_ALLOW_HEADERS: usize = 32;

/// 258EAFA5-E914-47DA-95CA-C5AB0DC85B11
pub const GUID: &[u8] = b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// HTTP/1.1 101 Switching Protocols
pub const HTTP_STATUS_LINE: &str = "HTTP/1.1 101 Switching Protocols";

/// The only version spoken.
pub const WEBSOCKET_VERSION: &str = "13";

/// Header names.
pub mod names {
    pub const HOST: &str = "host";
    pub const UPGRADE: &str = "upgrade";
    pub const CONNECTION: &str = "connection";
    pub const SEC_WEBSOCKET_KEY: &str = "sec-websocket-key";
    pub const SEC_WEBSOCKET_ACCEPT: &str = "sec-websocket-accept";
    pub const SEC_WEBSOCKET_VERSION: &str = "sec-websocket-version";
}

/// Value of the first header named `name`, case insensitive.
fn find<'h>(headers: &[httparse::Header<'h>], name: &str) -> Option<&'h [u8]> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value)
}

fn trim(v: &[u8]) -> &[u8] {
    let start = v.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(v.len());
    let end = v.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &v[start..end]
}

fn headers_text(frame: &Frame) -> Result<&str> {
    match (frame.kind(), frame.text_payload()) {
        (FrameKind::Headers, Some(text)) => Ok(text),
        (kind, _) => Err(HandshakeError::NotHeaders(kind).into()),
    }
}

/// Answer an upgrade request.
///
/// Returns a `Headers` frame holding the `101` response. A missing key or an
/// unsupported version fails with an error whose
/// [`rejection`](HandshakeError::rejection) is the response to send instead.
pub fn accept_response(request: &Frame) -> Result<Frame> {
    let text = headers_text(request)?;

    let mut storage = [httparse::EMPTY_HEADER; MAX_ALLOW_HEADERS];
    let mut req = httparse::Request::new(&mut storage);
    if req.parse(text.as_bytes()).map_err(HandshakeError::from)?.is_partial() {
        return Err(HandshakeError::NotEnoughData.into());
    }

    let key = find(req.headers, names::SEC_WEBSOCKET_KEY)
        .map(trim)
        .filter(|k| !k.is_empty())
        .ok_or(HandshakeError::SecWebSocketKey)?;

    let version = find(req.headers, names::SEC_WEBSOCKET_VERSION)
        .map(|v| String::from_utf8_lossy(trim(v)).into_owned());
    if version.as_deref() != Some(WEBSOCKET_VERSION) {
        return Err(HandshakeError::SecWebSocketVersion(version).into());
    }

    let accept = derive_accept_key(key);
    log::debug!("upgrade accepted, {}: {}", names::SEC_WEBSOCKET_ACCEPT, accept);

    let response = format!(
        "{}\r\n{}: websocket\r\n{}: upgrade\r\n{}: {}\r\n\r\n",
        HTTP_STATUS_LINE,
        names::UPGRADE,
        names::CONNECTION,
        names::SEC_WEBSOCKET_ACCEPT,
        accept
    );
    Ok(Frame::text(FrameKind::Headers, response))
}

/// Build a client upgrade request.
///
/// Returns the `Headers` frame to send and the key it carries.
pub fn upgrade_request(host: &str, path: &str) -> (Frame, String) {
    let key = new_sec_key();
    let request = format!(
        "GET {} HTTP/1.1\r\n{}: {}\r\n{}: websocket\r\n{}: upgrade\r\n{}: {}\r\n{}: {}\r\n\r\n",
        path,
        names::HOST,
        host,
        names::UPGRADE,
        names::CONNECTION,
        names::SEC_WEBSOCKET_KEY,
        key,
        names::SEC_WEBSOCKET_VERSION,
        WEBSOCKET_VERSION
    );
    (Frame::text(FrameKind::Headers, request), key)
}

/// Check a server's answer to the request made with `key`.
pub fn verify_accept(response: &Frame, key: &str) -> Result<()> {
    let text = headers_text(response)?;

    let mut storage = [httparse::EMPTY_HEADER; MAX_ALLOW_HEADERS];
    let mut resp = httparse::Response::new(&mut storage);
    if resp.parse(text.as_bytes()).map_err(HandshakeError::from)?.is_partial() {
        return Err(HandshakeError::NotEnoughData.into());
    }

    if resp.code != Some(101) {
        return Err(HandshakeError::HttpStatusCode.into());
    }

    let expected = derive_accept_key(key.as_bytes());
    match find(resp.headers, names::SEC_WEBSOCKET_ACCEPT) {
        Some(accept) if trim(accept) == expected.as_bytes() => Ok(()),
        _ => Err(HandshakeError::SecWebSocketAccept.into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    const REQUEST: &str = "GET /chat HTTP/1.1\r\n\
        Host: server.example.com\r\n\
        Upgrade: websocket\r\n\
        Connection: Upgrade\r\n\
        Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
        Origin: http://example.com\r\n\
        Sec-WebSocket-Version: 13\r\n\r\n";

    fn headers(text: &str) -> Frame { Frame::text(FrameKind::Headers, text) }

    #[test]
    fn accept() {
        let resp = accept_response(&headers(REQUEST)).unwrap();
        assert_eq!(resp.kind(), FrameKind::Headers);
        let text = resp.text_payload().unwrap();
        assert!(text.starts_with("HTTP/1.1 101 "));
        assert!(text.contains("sec-websocket-accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn reject() {
        let no_key = REQUEST.replace("Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n", "");
        let e = accept_response(&headers(&no_key)).unwrap_err();
        let e = match e {
            Error::Handshake(e) => e,
            e => panic!("{}", e),
        };
        assert!(matches!(e, HandshakeError::SecWebSocketKey));
        assert!(e.rejection().unwrap().starts_with("HTTP/1.1 400"));

        let old = REQUEST.replace("Version: 13", "Version: 8");
        let e = accept_response(&headers(&old)).unwrap_err();
        let e = match e {
            Error::Handshake(e) => e,
            e => panic!("{}", e),
        };
        assert!(matches!(&e, HandshakeError::SecWebSocketVersion(Some(v)) if v == "8"));
        let rejection = e.rejection().unwrap();
        assert!(rejection.starts_with("HTTP/1.1 426"));
        assert!(rejection.contains("sec-websocket-version: 13\r\n"));

        let e = accept_response(&Frame::data(REQUEST)).unwrap_err();
        assert!(matches!(e, Error::Handshake(HandshakeError::NotHeaders(FrameKind::Data))));

        let e = accept_response(&headers("GET / HTTP/1.1\r\nHost: x\r\n")).unwrap_err();
        assert!(matches!(e, Error::Handshake(HandshakeError::NotEnoughData)));
    }

    #[test]
    fn client_side() {
        let (req, key) = upgrade_request("www.example.com", "/ws");
        let text = req.text_payload().unwrap();
        assert!(text.starts_with("GET /ws HTTP/1.1\r\n"));

        let resp = accept_response(&req).unwrap();
        verify_accept(&resp, &key).unwrap();

        let e = verify_accept(&resp, "dGhlIHNhbXBsZSBub25jZQ==").unwrap_err();
        assert!(matches!(e, Error::Handshake(HandshakeError::SecWebSocketAccept)));

        let e = verify_accept(&headers("HTTP/1.1 200 OK\r\n\r\n"), &key).unwrap_err();
        assert!(matches!(e, Error::Handshake(HandshakeError::HttpStatusCode)));
    }
}
