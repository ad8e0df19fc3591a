//! Websocket framing and SockJS xhr-streaming codecs.
//!
//! ## Features
//! - RFC 6455 frames: masking, fragmentation, control frames, close validation.
//! - SockJS envelopes (`o`, `h`, `a[...]`, `c[...]`, prelude).
//! - Http chunked bodies, inflating gzip across chunk boundaries.
//! - Per-connection decode state in a concurrent store.
//! - Blocking and tokio based IO (feature `async`, on by default).
//!
//! ## High-level API
//!
//! - [`stream`]
//!
//! ```ignore
//! {
//!     let store = Arc::new(ConnectionStateStore::new());
//!     // handshake
//!     let mut stream = Stream::<_, Client>::connect(tcp, host, path, CodecConfig::default(), store.lease())?;
//!     // write a frame
//!     stream.write_frame(&Frame::data("hello"))?;
//!     // read a frame
//!     while let Some(frame) = stream.read_frame()? {
//!         stream.respond(&frame)?;
//!     }
//! }
//! ```
//!
//! ## Low-level API
//!
//! - [`frame`]
//! - [`codec`]
//! - [`sockjs`]
//! - [`handshake`]
//! - [`state`]
//!
//! Codec:
//!
//! ```ignore
//! {
//!     let codec = Codec::<Server>::default();
//!     let mut state = ConnectionState::new(ConnectionId::new(0));
//!     let frame = codec.read_frame(&mut io, &mut state)?;
//!     codec.write_frame(&Frame::pong("x"), &mut io)?;
//! }
//! ```
//!
//! Xhr-streaming:
//!
//! ```ignore
//! {
//!     let decoder = ChunkDecoder::default();
//!     let head = decoder.read_response_head(&mut io, &mut state)?;
//!     while let Some(frames) = decoder.decode(&mut io, &mut state)? {
//!         // ...
//!     }
//! }
//! ```

pub mod role;
pub mod error;
pub mod frame;
pub mod config;
pub mod state;
pub mod codec;
pub mod sockjs;
pub mod stream;
pub mod handshake;

pub use error::{Error, Result};
