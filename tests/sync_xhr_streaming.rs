use std::io::{Cursor, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;

use sockwire::config::{Envelope, StreamingConfig};
use sockwire::frame::{Frame, FrameKind};
use sockwire::sockjs::{ChunkDecoder, PRELUDE_LEN};
use sockwire::state::{ConnectionId, ConnectionState, ConnectionStateStore};
use sockwire::stream::XhrStream;

use log::debug;

const HEAD: &str = "HTTP/1.1 200 OK\r\n\
    Content-Type: application/javascript;charset=UTF-8\r\n\
    Set-Cookie: JSESSIONID=dummy; Path=/\r\n\
    Content-Encoding: gzip\r\n\
    Transfer-Encoding: chunked\r\n\r\n";

fn gzip(text: &str) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(text.as_bytes()).unwrap();
    enc.finish().unwrap()
}

fn chunk(data: &[u8]) -> Vec<u8> {
    let mut out = format!("{:x}\r\n", data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
    out
}

fn body() -> String {
    let mut text = "h".repeat(PRELUDE_LEN);
    text.push('\n');
    text.push_str("o\n");
    for i in 0..10 {
        text.push_str(&format!("a[\"message {}\"]\n", i));
    }
    text.push_str("h\n");
    text.push_str("c[3000,\"Go away!\"]\n");
    text
}

#[test]
fn sync_xhr_streaming() {
    let _ = env_logger::try_init();

    let lis = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = lis.local_addr().unwrap();

    let t1 = thread::spawn(move || {
        let (mut tcp, _) = lis.accept().unwrap();
        debug!("server: tcp accepted!");
        tcp.write_all(HEAD.as_bytes()).unwrap();

        let gz = gzip(&body());
        for piece in gz.chunks(7) {
            tcp.write_all(&chunk(piece)).unwrap();
            tcp.flush().unwrap();
        }
        thread::sleep(Duration::from_millis(20));
        debug!("server: close");
    });

    let store = Arc::new(ConnectionStateStore::new());
    let tcp = TcpStream::connect(addr).unwrap();
    let mut xhr = XhrStream::new(tcp, StreamingConfig::default(), store.lease());

    let mut frames = Vec::new();
    while let Some(frame) = xhr.read_frame().unwrap() {
        debug!("client: receive {}", frame);
        frames.push(frame);
    }
    t1.join().unwrap();

    let kinds: Vec<_> = frames.iter().map(Frame::kind).collect();
    let mut expected = vec![FrameKind::Headers, FrameKind::Cookies, FrameKind::Prelude, FrameKind::Open];
    expected.extend([FrameKind::Data; 10]);
    expected.extend([FrameKind::Heartbeat, FrameKind::Close]);
    assert_eq!(kinds, expected);

    assert_eq!(frames[4].text_payload(), Some("[\"message 0\"]"));
    assert_eq!(frames[13].text_payload(), Some("[\"message 9\"]"));
    assert_eq!(frames[15].close_status(), Some(1000));
    assert_eq!(frames[1].text_payload(), Some("Cookie: JSESSIONID=dummy; Path=/; "));

    assert!(xhr.state().gzip_enabled());
    drop(xhr);
    assert!(store.is_empty());
}

#[test]
fn terminal_chunk() {
    let _ = env_logger::try_init();

    let store = Arc::new(ConnectionStateStore::new());
    let response = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n".to_vec();
    let config = StreamingConfig::new().with_envelope(Envelope::Raw);
    let mut xhr = XhrStream::new(Cursor::new(response), config, store.lease());

    assert_eq!(xhr.read_frame().unwrap().map(|f| f.kind()), Some(FrameKind::Headers));
    assert_eq!(xhr.read_frame().unwrap(), Some(Frame::data("hello")));
    assert!(xhr.state().stream_ended());
    assert_eq!(xhr.read_frame().unwrap(), None);
}

#[test]
fn gzip_split_anywhere() {
    let _ = env_logger::try_init();

    let text = "o\na[\"one\",\"two\"]\nh\nc[1000,\"bye\"]\n";
    let gz = gzip(text);
    let decoder = ChunkDecoder::default();

    let decode_all = |body: Vec<u8>| {
        let mut state = ConnectionState::new(ConnectionId::new(1));
        state.enable_gzip();
        let mut src = Cursor::new(body);
        let mut frames = Vec::new();
        while let Some(more) = decoder.decode(&mut src, &mut state).unwrap() {
            frames.extend(more);
        }
        frames
    };

    let whole = decode_all(chunk(&gz));
    assert_eq!(whole.len(), 4);

    for at in 1..gz.len() {
        let (a, b) = gz.split_at(at);
        let mut body = chunk(a);
        body.extend(chunk(b));
        debug!("split at {}", at);
        assert_eq!(decode_all(body), whole, "split at {}", at);
    }
}
