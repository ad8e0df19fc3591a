use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use sockwire::config::{CodecConfig, Envelope};
use sockwire::frame::{Frame, FrameKind};
use sockwire::role::{Client, Server};
use sockwire::state::ConnectionStateStore;
use sockwire::stream::Stream;

use log::debug;

const HOST: &str = "www.example.com";
const PATH: &str = "/ws";

#[tokio::test]
async fn async_echo() {
    let _ = env_logger::try_init();

    let store = Arc::new(ConnectionStateStore::new());
    let lis = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = lis.local_addr().unwrap();

    let server_store = store.clone();
    let t1 = tokio::spawn(async move {
        let (tcp, _) = lis.accept().await.unwrap();
        debug!("server: tcp accepted!");
        let mut ws = Stream::<_, Server>::accept_async(BufReader::new(tcp), CodecConfig::default(), server_store.lease())
            .await
            .unwrap();
        debug!("server: websocket accepted!");

        while let Some(frame) = ws.read_frame_async().await.unwrap() {
            debug!("server: receive {}", frame);
            if frame.kind() == FrameKind::Close {
                ws.respond_async(&frame).await.unwrap();
                break;
            }
            ws.write_frame_async(&frame).await.unwrap();
        }
        debug!("server: close");
    });

    let client_store = store.clone();
    let t2 = tokio::spawn(async move {
        let tcp = TcpStream::connect(addr).await.unwrap();
        debug!("client: tcp connected!");
        let config = CodecConfig::new().with_envelope(Envelope::SockJs);
        let mut ws = Stream::<_, Client>::connect_async(BufReader::new(tcp), HOST, PATH, config, client_store.lease())
            .await
            .unwrap();
        debug!("client: websocket connected!");

        // echoed text is classified as a SockJS envelope on this side
        ws.write_frame_async(&Frame::data("o")).await.unwrap();
        let frame = ws.read_frame_async().await.unwrap().unwrap();
        assert_eq!(frame.kind(), FrameKind::Open);

        ws.write_frame_async(&Frame::data("a[\"hello\"]")).await.unwrap();
        let frame = ws.read_frame_async().await.unwrap().unwrap();
        assert_eq!(frame, Frame::data("[\"hello\"]"));

        let payload = "x".repeat(65536);
        ws.write_frame_async(&Frame::data(format!("a{}", payload))).await.unwrap();
        let frame = ws.read_frame_async().await.unwrap().unwrap();
        assert_eq!(frame.text_payload(), Some(payload.as_str()));

        ws.write_frame_async(&Frame::close(1001, "")).await.unwrap();
        let frame = ws.read_frame_async().await.unwrap().unwrap();
        assert_eq!(frame.close_status(), Some(1001));
        debug!("client: close");
    });

    t1.await.unwrap();
    t2.await.unwrap();

    // both leases dropped with their streams
    assert!(store.is_empty());
}
