use tokio::io::AsyncWrite;

use super::{reply_to, Stream};
use crate::error::Result;
use crate::frame::Frame;
use crate::role::RoleHelper;

impl<IO, Role> Stream<IO, Role>
where
    IO: AsyncWrite + Unpin,
    Role: RoleHelper,
{
    /// Async version of [`write_frame`](Self::write_frame).
    pub async fn write_frame_async(&mut self, frame: &Frame) -> Result<()> {
        let id = self.lease.id();
        self.codec
            .write_frame_async(frame, &mut self.io)
            .await
            .map_err(|e| e.on(id))
    }

    /// Async version of [`respond`](Self::respond).
    pub async fn respond_async(&mut self, frame: &Frame) -> Result<bool> {
        let reply = reply_to(frame, &self.lease.lock());
        match reply {
            Some(reply) => self.write_frame_async(&reply).await.map(|_| true),
            None => Ok(false),
        }
    }
}
