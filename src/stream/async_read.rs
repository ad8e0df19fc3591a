use tokio::io::AsyncRead;

use super::Stream;
use crate::codec::Step;
use crate::error::Result;
use crate::frame::Frame;
use crate::role::RoleHelper;

impl<IO, Role> Stream<IO, Role>
where
    IO: AsyncRead + Unpin,
    Role: RoleHelper,
{
    /// Async version of [`decode_step`](Self::decode_step).
    pub async fn decode_step_async(&mut self) -> Result<Step> {
        self.codec.decode_step_async(&mut self.io, self.lease.shared()).await
    }

    /// Async version of [`read_frame`](Self::read_frame).
    pub async fn read_frame_async(&mut self) -> Result<Option<Frame>> {
        self.codec.read_frame_async(&mut self.io, self.lease.shared()).await
    }
}
