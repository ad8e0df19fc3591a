use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use super::{Codec, MAX_CONTROL_PAYLOAD};
use crate::error::{FrameError, Result};
use crate::frame::length::MAX_PAYLOAD_LEN;
use crate::frame::mask::apply_mask4;
use crate::frame::model::{CLOSE_NORMAL, CLOSE_NO_STATUS};
use crate::frame::{Fin, Frame, FrameHead, FrameKind, Mask, OpCode, PayloadLen};
use crate::role::RoleHelper;

/// Opcode a frame kind is written with.
#[inline]
pub const fn opcode_of(kind: FrameKind) -> OpCode {
    match kind {
        FrameKind::Pong => OpCode::Pong,
        FrameKind::Close => OpCode::Close,
        FrameKind::DataBinary => OpCode::Binary,
        FrameKind::Ping => OpCode::Ping,
        _ => OpCode::Text,
    }
}

/// Wire payload of a frame, before masking.
fn payload_of(frame: &Frame) -> Bytes {
    match frame.kind() {
        FrameKind::Close => {
            let status = frame.close_status().unwrap_or(CLOSE_NORMAL);
            let reason = frame.text_payload().unwrap_or_default();
            // 1005 only exists on the receiving side, it is sent as an empty close
            if status == CLOSE_NO_STATUS && reason.is_empty() {
                return Bytes::new();
            }
            let mut buf = BytesMut::with_capacity(2 + reason.len());
            buf.put_u16(status);
            buf.put_slice(reason.as_bytes());
            buf.freeze()
        }
        FrameKind::DataBinary => frame.binary_payload().cloned().unwrap_or_default(),
        _ => Bytes::copy_from_slice(frame.payload_bytes()),
    }
}

impl<Role: RoleHelper> Codec<Role> {
    /// Encode a frame.
    ///
    /// `Headers` frames are raw http text and are returned verbatim.
    pub fn encode(&self, frame: &Frame) -> Result<Bytes> {
        if frame.kind() == FrameKind::Headers {
            return Ok(Bytes::copy_from_slice(frame.payload_bytes()));
        }

        let opcode = opcode_of(frame.kind());
        let payload = payload_of(frame);
        let len = payload.len();

        if opcode.is_control() && len > MAX_CONTROL_PAYLOAD {
            return Err(FrameError::ControlFrameTooLong(len).into());
        }
        if len as u64 > MAX_PAYLOAD_LEN {
            return Err(FrameError::MaxLengthExceeded(len as u64).into());
        }

        let mask = Role::write_mask();
        let head = FrameHead::new(Fin::Y, opcode, mask, PayloadLen::from_num(len as u64));

        let mut buf = BytesMut::zeroed(head.len());
        head.encode(&mut buf)?;
        buf.put_slice(&payload);

        if let Mask::Key(key) = mask {
            apply_mask4(key, &mut buf[head.len()..]);
        }
        Ok(buf.freeze())
    }

    /// Encode and write a frame.
    pub fn write_frame<W>(&self, frame: &Frame, dst: &mut W) -> Result<()>
    where
        W: Write + ?Sized,
    {
        let buf = self.encode(frame)?;
        dst.write_all(&buf)?;
        dst.flush()?;
        Ok(())
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        use tokio::io::{AsyncWrite, AsyncWriteExt};

        impl<Role: RoleHelper> Codec<Role> {
            /// Async twin of [`write_frame`](Self::write_frame).
            pub async fn write_frame_async<W>(&self, frame: &Frame, dst: &mut W) -> Result<()>
            where
                W: AsyncWrite + Unpin + ?Sized,
            {
                let buf = self.encode(frame)?;
                dst.write_all(&buf).await?;
                dst.flush().await?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;
    use crate::role::{Client, Server};
    use crate::state::{ConnectionId, ConnectionState};

    #[test]
    fn first_byte() {
        let codec = Codec::<Server>::default();
        let cases = [
            (Frame::data("x"), 0x81),
            (Frame::text(FrameKind::Heartbeat, "h"), 0x81),
            (Frame::binary(vec![1u8]), 0x82),
            (Frame::close(1000, ""), 0x88),
            (Frame::ping("p"), 0x89),
            (Frame::pong("p"), 0x8a),
        ];
        for (frame, b) in cases {
            assert_eq!(codec.encode(&frame).unwrap()[0], b, "{}", frame);
        }
    }

    #[test]
    fn lengths() {
        let codec = Codec::<Server>::default();
        for (n, head) in [(0, 2), (125, 2), (126, 4), (65535, 4), (65536, 10)] {
            let buf = codec.encode(&Frame::binary(vec![7u8; n])).unwrap();
            assert_eq!(buf.len(), head + n, "{}", n);
            match head {
                2 => assert_eq!(buf[1] as usize, n),
                4 => assert_eq!(buf[1], 126),
                _ => assert_eq!(buf[1], 127),
            }
        }
    }

    #[test]
    fn close_payload() {
        let codec = Codec::<Server>::default();
        let buf = codec.encode(&Frame::close(1001, "bye")).unwrap();
        assert_eq!(&buf[..], b"\x88\x05\x03\xe9bye");

        let buf = codec.encode(&Frame::close(CLOSE_NO_STATUS, "")).unwrap();
        assert_eq!(&buf[..], b"\x88\x00");
    }

    #[test]
    fn client_masks_everything() {
        let codec = Codec::<Client>::default();
        let buf = codec.encode(&Frame::close(1000, "")).unwrap();
        assert_eq!(buf[1], 0x82);
        let key = [buf[2], buf[3], buf[4], buf[5]];
        assert_eq!([buf[6] ^ key[0], buf[7] ^ key[1]], [0x03, 0xe8]);
    }

    #[test]
    fn control_too_long() {
        let codec = Codec::<Client>::default();
        let e = codec.encode(&Frame::ping("x".repeat(126))).unwrap_err();
        assert!(matches!(e, crate::Error::Frame(FrameError::ControlFrameTooLong(126))));
    }

    #[test]
    fn headers_verbatim() {
        let codec = Codec::<Client>::default();
        let text = "HTTP/1.1 101 Switching Protocols\r\n\r\n";
        let buf = codec.encode(&Frame::text(FrameKind::Headers, text)).unwrap();
        assert_eq!(&buf[..], text.as_bytes());
    }

    #[test]
    fn swapped_roles() {
        let frames = [
            Frame::data("hello"),
            Frame::binary(vec![0u8, 1, 2, 255]),
            Frame::ping("ping"),
            Frame::pong("pong"),
            Frame::close(1000, "done"),
            Frame::close(4000, ""),
            Frame::close(CLOSE_NO_STATUS, ""),
        ];
        let client = Codec::<Client>::default();
        let server = Codec::<Server>::default();
        let mut state = ConnectionState::new(ConnectionId::new(0));

        for frame in frames {
            let mut wire = Vec::new();
            client.write_frame(&frame, &mut wire).unwrap();
            let back = server.read_frame(&mut Cursor::new(wire), &mut state).unwrap();
            assert_eq!(back.as_ref(), Some(&frame));

            let mut wire = Vec::new();
            server.write_frame(&frame, &mut wire).unwrap();
            let back = client.read_frame(&mut Cursor::new(wire), &mut state).unwrap();
            assert_eq!(back, Some(frame));
        }
    }
}
