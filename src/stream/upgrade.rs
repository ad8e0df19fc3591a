//! Handshake over a stream.

use std::io::{Read, Write};

use super::Stream;
use crate::codec::Codec;
use crate::config::CodecConfig;
use crate::error::{Error, Phase, Result};
use crate::frame::{Frame, FrameKind};
use crate::handshake::{accept_response, upgrade_request, verify_accept};
use crate::role::{ClientRole, ServerRole};
use crate::sockjs::read_header_block;
use crate::state::StateLease;

/// Text to send back for a request block, and whether the upgrade succeeded.
fn answer(block: Option<String>) -> (Option<String>, Result<()>) {
    let block = match block {
        Some(block) => block,
        None => return (None, Err(Error::AbruptClosure(Phase::Preamble))),
    };
    match accept_response(&Frame::text(FrameKind::Headers, block)) {
        Ok(response) => (response.into_text(), Ok(())),
        Err(Error::Handshake(e)) => {
            let rejection = e.rejection();
            log::warn!("upgrade rejected: {}", e);
            (rejection, Err(e.into()))
        }
        Err(e) => (None, Err(e)),
    }
}

/// Check the response block to a request made with `key`.
fn check(block: Option<String>, key: &str) -> Result<()> {
    let block = block.ok_or(Error::AbruptClosure(Phase::Preamble))?;
    verify_accept(&Frame::text(FrameKind::Headers, block), key)
}

impl<IO: Read + Write, Role: ServerRole> Stream<IO, Role> {
    /// Perform a server handshake, return a new websocket stream.
    ///
    /// A request without a key, or with an unsupported version, is answered
    /// with `400` or `426` before the error is returned.
    /// This function will block until the handshake completes or an error occurs.
    pub fn accept(mut io: IO, config: CodecConfig, lease: StateLease) -> Result<Self> {
        let id = lease.id();
        let block = read_header_block(&mut io, config.max_line_len).map_err(|e| e.on(id))?;
        let (reply, outcome) = answer(block);

        if let Some(reply) = reply {
            io.write_all(reply.as_bytes()).map_err(|e| Error::from(e).on(id))?;
            io.flush().map_err(|e| Error::from(e).on(id))?;
        }
        outcome.map_err(|e| e.on(id))?;

        lease.lock().set_upgraded();
        Ok(Stream::new(io, Codec::new(config), lease))
    }
}

impl<IO: Read + Write, Role: ClientRole> Stream<IO, Role> {
    /// Perform a client handshake, return a new websocket stream.
    ///
    /// This function will block until the handshake completes or an error occurs.
    pub fn connect(mut io: IO, host: &str, path: &str, config: CodecConfig, lease: StateLease) -> Result<Self> {
        let id = lease.id();
        let (request, key) = upgrade_request(host, path);

        io.write_all(request.payload_bytes()).map_err(|e| Error::from(e).on(id))?;
        io.flush().map_err(|e| Error::from(e).on(id))?;

        let block = read_header_block(&mut io, config.max_line_len).map_err(|e| e.on(id))?;
        check(block, &key).map_err(|e| e.on(id))?;

        lease.lock().set_upgraded();
        Ok(Stream::new(io, Codec::new(config), lease))
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
        use crate::sockjs::read_header_block_async;

        impl<IO, Role> Stream<IO, Role>
        where
            IO: AsyncRead + AsyncWrite + Unpin,
            Role: ServerRole,
        {
            /// Async version of [`accept`](Self::accept).
            pub async fn accept_async(mut io: IO, config: CodecConfig, lease: StateLease) -> Result<Self> {
                let id = lease.id();
                let block = read_header_block_async(&mut io, config.max_line_len)
                    .await
                    .map_err(|e| e.on(id))?;
                let (reply, outcome) = answer(block);

                if let Some(reply) = reply {
                    io.write_all(reply.as_bytes()).await.map_err(|e| Error::from(e).on(id))?;
                    io.flush().await.map_err(|e| Error::from(e).on(id))?;
                }
                outcome.map_err(|e| e.on(id))?;

                lease.lock().set_upgraded();
                Ok(Stream::new(io, Codec::new(config), lease))
            }
        }

        impl<IO, Role> Stream<IO, Role>
        where
            IO: AsyncRead + AsyncWrite + Unpin,
            Role: ClientRole,
        {
            /// Async version of [`connect`](Self::connect).
            pub async fn connect_async(
                mut io: IO,
                host: &str,
                path: &str,
                config: CodecConfig,
                lease: StateLease,
            ) -> Result<Self> {
                let id = lease.id();
                let (request, key) = upgrade_request(host, path);

                io.write_all(request.payload_bytes()).await.map_err(|e| Error::from(e).on(id))?;
                io.flush().await.map_err(|e| Error::from(e).on(id))?;

                let block = read_header_block_async(&mut io, config.max_line_len)
                    .await
                    .map_err(|e| e.on(id))?;
                check(block, &key).map_err(|e| e.on(id))?;

                lease.lock().set_upgraded();
                Ok(Stream::new(io, Codec::new(config), lease))
            }
        }
    }
}
