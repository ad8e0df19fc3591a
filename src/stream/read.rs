use std::io::Read;

use super::Stream;
use crate::codec::Step;
use crate::error::Result;
use crate::frame::Frame;
use crate::role::RoleHelper;

impl<IO: Read, Role: RoleHelper> Stream<IO, Role> {
    /// Read one step, see [`Codec::decode_step`](crate::codec::Codec::decode_step).
    pub fn decode_step(&mut self) -> Result<Step> {
        let mut state = self.lease.lock();
        self.codec.decode_step(&mut self.io, &mut state)
    }

    /// Read until a complete frame is available.
    /// Returns `None` once the peer closed the connection.
    ///
    /// This function will block until a frame is read or an error occurs.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let mut state = self.lease.lock();
        self.codec.read_frame(&mut self.io, &mut state)
    }
}
