//! Async reader.
//!
//! The raw frame is read without holding the state lock, the state is only
//! locked to interpret it. No lock guard lives across an `.await`.

use parking_lot::Mutex;
use tokio::io::AsyncRead;

use super::decode::unmask;
use super::source::{read_byte_async, read_bytes_async};
use super::{Codec, RawFrame, Step};
use crate::error::{Error, Phase, Result};
use crate::frame::{Fin, Frame, FrameHead, Mask, OpCode, PayloadLen};
use crate::role::RoleHelper;
use crate::sockjs::read_header_block_async;
use crate::state::ConnectionState;

async fn read_array_async<const N: usize, S>(src: &mut S, phase: Phase) -> Result<[u8; N]>
where
    S: AsyncRead + Unpin + ?Sized,
{
    let bytes = read_bytes_async(src, N).await.map_err(|e| Error::from_io(e, phase))?;
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes);
    Ok(buf)
}

impl<Role: RoleHelper> Codec<Role> {
    /// Async twin of [`read_raw`](Self::read_raw).
    pub async fn read_raw_async<S>(&self, src: &mut S) -> Result<Option<RawFrame>>
    where
        S: AsyncRead + Unpin + ?Sized,
    {
        let b1 = match read_byte_async(src).await.map_err(|e| Error::from_io(e, Phase::Opcode))? {
            Some(b) => b,
            None => return Ok(None),
        };
        let fin = Fin::from_flag(b1)?;
        let opcode = OpCode::from_flag(b1)?;

        let [b2] = read_array_async::<1, _>(src, Phase::Length).await?;
        let mut mask = Mask::from_flag(b2);
        Role::check_read_mask(mask)?;

        let length = match PayloadLen::from_flag(b2) {
            PayloadLen::Extended1(_) => {
                PayloadLen::from_byte2(read_array_async(src, Phase::ExtendedLength).await?)
            }
            PayloadLen::Extended2(_) => {
                PayloadLen::from_byte8(read_array_async(src, Phase::ExtendedLength).await?)?
            }
            standard => standard,
        };
        self.check_len(length.to_num())?;

        if mask.is_masked() {
            mask = Mask::Key(read_array_async(src, Phase::MaskKey).await?);
        }

        let payload = read_bytes_async(src, length.to_num() as usize)
            .await
            .map_err(|e| Error::from_io(e, Phase::Payload))?;

        Ok(Some(RawFrame {
            head: FrameHead::new(fin, opcode, mask, length),
            payload: unmask(mask, payload),
        }))
    }

    /// Async twin of [`decode_step`](Self::decode_step).
    pub async fn decode_step_async<S>(&self, src: &mut S, state: &Mutex<ConnectionState>) -> Result<Step>
    where
        S: AsyncRead + Unpin + ?Sized,
    {
        let (id, preamble) = {
            let state = state.lock();
            (state.id(), self.config.http_preamble && !state.upgraded())
        };

        let step = if preamble {
            match read_header_block_async(src, self.config.max_line_len).await {
                Ok(block) => Ok(self.accept_preamble(block, &mut state.lock())),
                Err(e) => Err(e),
            }
        } else {
            match self.read_raw_async(src).await {
                Ok(Some(raw)) => self.interpret(raw, &mut state.lock()),
                Ok(None) => self.accept_end(&state.lock()),
                Err(e) => Err(e),
            }
        };
        step.map_err(|e| e.on(id))
    }

    /// Async twin of [`read_frame`](Self::read_frame).
    pub async fn read_frame_async<S>(&self, src: &mut S, state: &Mutex<ConnectionState>) -> Result<Option<Frame>>
    where
        S: AsyncRead + Unpin + ?Sized,
    {
        loop {
            match self.decode_step_async(src, state).await? {
                Step::Frame(frame) => return Ok(Some(frame)),
                Step::Fragment => continue,
                Step::Closed => return Ok(None),
            }
        }
    }
}
