use super::{RoleHelper, ServerRole};
use crate::frame::Mask;

/// Standard server.
#[derive(Debug, Clone, Copy)]
pub struct Server;

impl RoleHelper for Server {
    const SERVER: bool = true;

    /// Server should not mask the payload.
    #[inline]
    fn write_mask() -> Mask { Mask::None }
}

impl ServerRole for Server {}
