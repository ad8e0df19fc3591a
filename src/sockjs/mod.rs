//! SockJS xhr-streaming.
//!
//! An xhr-streaming response is a chunked (and possibly gzip encoded) http
//! body carrying one SockJS envelope per line:
//!
//! - `o` opens the session
//! - `h` is a heartbeat
//! - `a[...]` carries a json array of messages
//! - `c[code,"reason"]` closes the session
//!
//! The server may also send a 2048 byte prelude of `h`s to defeat proxy
//! buffering. [`ChunkDecoder`] turns the body into [`Frame`](crate::frame::Frame)s,
//! [`classify`] maps a single envelope.

mod classify;
mod chunked;
mod headers;
mod inflate;

pub use classify::{classify, classify_with, PRELUDE_LEN};
pub use chunked::ChunkDecoder;
pub use headers::{extract, read_header_block};
pub use inflate::{Inflater, Ring};

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        pub use headers::read_header_block_async;
    }
}
