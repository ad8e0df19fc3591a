use bytes::{Bytes, BytesMut};

use super::{Codec, RawFrame, Step};
use super::source::ByteSource;
use crate::error::{Error, Phase, Result};
use crate::frame::mask::apply_mask4;
use crate::frame::{Fin, Frame, FrameHead, FrameKind, Mask, OpCode, PayloadLen};
use crate::role::RoleHelper;
use crate::sockjs::read_header_block;
use crate::state::ConnectionState;

/// Read exactly `N` bytes.
fn read_array<const N: usize, S>(src: &mut S, phase: Phase) -> Result<[u8; N]>
where
    S: ByteSource + ?Sized,
{
    let bytes = src.read_bytes(N).map_err(|e| Error::from_io(e, phase))?;
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes);
    Ok(buf)
}

/// Unmask in place, copying only if the payload is masked.
pub(super) fn unmask(mask: Mask, payload: Bytes) -> Bytes {
    match mask {
        Mask::Key(key) => {
            let mut buf = BytesMut::from(&payload[..]);
            apply_mask4(key, &mut buf);
            buf.freeze()
        }
        Mask::None => payload,
    }
}

impl<Role: RoleHelper> Codec<Role> {
    /// Read one frame off the wire, without looking at its meaning.
    ///
    /// Returns `None` if the stream ends before the first byte.
    pub fn read_raw<S>(&self, src: &mut S) -> Result<Option<RawFrame>>
    where
        S: ByteSource + ?Sized,
    {
        // fin, opcode
        let b1 = match src.read_byte().map_err(|e| Error::from_io(e, Phase::Opcode))? {
            Some(b) => b,
            None => return Ok(None),
        };
        let fin = Fin::from_flag(b1)?;
        let opcode = OpCode::from_flag(b1)?;

        // mask, payload length
        let [b2] = read_array::<1, _>(src, Phase::Length)?;
        let mut mask = Mask::from_flag(b2);
        Role::check_read_mask(mask)?;

        // extended payload length
        let length = match PayloadLen::from_flag(b2) {
            PayloadLen::Extended1(_) => PayloadLen::from_byte2(read_array(src, Phase::ExtendedLength)?),
            PayloadLen::Extended2(_) => PayloadLen::from_byte8(read_array(src, Phase::ExtendedLength)?)?,
            standard => standard,
        };
        self.check_len(length.to_num())?;

        // mask key
        if mask.is_masked() {
            mask = Mask::Key(read_array(src, Phase::MaskKey)?);
        }

        let payload = src
            .read_bytes(length.to_num() as usize)
            .map_err(|e| Error::from_io(e, Phase::Payload))?;

        Ok(Some(RawFrame {
            head: FrameHead::new(fin, opcode, mask, length),
            payload: unmask(mask, payload),
        }))
    }

    /// Read and interpret one frame, or the http preamble.
    pub fn decode_step<S>(&self, src: &mut S, state: &mut ConnectionState) -> Result<Step>
    where
        S: ByteSource + ?Sized,
    {
        self.step(src, state).map_err(|e| e.on(state.id()))
    }

    /// Read until a complete frame is available.
    ///
    /// Returns `None` once the peer closed the stream between frames.
    pub fn read_frame<S>(&self, src: &mut S, state: &mut ConnectionState) -> Result<Option<Frame>>
    where
        S: ByteSource + ?Sized,
    {
        loop {
            match self.decode_step(src, state)? {
                Step::Frame(frame) => return Ok(Some(frame)),
                Step::Fragment => continue,
                Step::Closed => return Ok(None),
            }
        }
    }

    fn step<S>(&self, src: &mut S, state: &mut ConnectionState) -> Result<Step>
    where
        S: ByteSource + ?Sized,
    {
        if self.config.http_preamble && !state.upgraded() {
            let block = read_header_block(src, self.config.max_line_len)?;
            return Ok(self.accept_preamble(block, state));
        }

        match self.read_raw(src)? {
            Some(raw) => self.interpret(raw, state),
            None => self.accept_end(state),
        }
    }

    pub(super) fn accept_preamble(&self, block: Option<String>, state: &mut ConnectionState) -> Step {
        match block {
            Some(block) => {
                log::debug!("connection {}: http preamble consumed", state.id());
                state.set_upgraded();
                Step::Frame(Frame::text(FrameKind::Headers, block))
            }
            None => Step::Closed,
        }
    }

    /// End of stream in front of a frame.
    pub(super) fn accept_end(&self, state: &ConnectionState) -> Result<Step> {
        if state.has_fragment() {
            Err(Error::AbruptClosure(Phase::Opcode))
        } else {
            Ok(Step::Closed)
        }
    }
}
