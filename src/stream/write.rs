use std::io::Write;

use super::{reply_to, Stream};
use crate::error::Result;
use crate::frame::Frame;
use crate::role::RoleHelper;

impl<IO: Write, Role: RoleHelper> Stream<IO, Role> {
    /// Encode and write a frame, then flush.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.codec
            .write_frame(frame, &mut self.io)
            .map_err(|e| e.on(self.lease.id()))
    }

    /// Answer a ping with a pong, or echo a close.
    ///
    /// Returns `true` if a reply was sent. A malformed close gets no reply.
    pub fn respond(&mut self, frame: &Frame) -> Result<bool> {
        let reply = reply_to(frame, &self.lease.lock());
        match reply {
            Some(reply) => self.write_frame(&reply).map(|_| true),
            None => Ok(false),
        }
    }
}
