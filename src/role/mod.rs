//! Markers.
//!
//! Markers are used to apply different strategies as a client or server.
//!
//! For example, `Codec<Client>` masks every frame it writes and refuses
//! masked frames from the server, while `Codec<Server>` writes frames
//! as-is and insists on masked frames from the client.
//!
//! Both client and server meet [`RoleHelper`], which decides how to mask
//! outgoing payload and which mask flag is legal on incoming frames.
//! Only client meets [`ClientRole`], and only server meets [`ServerRole`].
//!
//! Any type implements these traits will be treated as a `client` or `server`.

mod client;
mod server;

pub use client::Client;
pub use server::Server;

use crate::frame::Mask;
use crate::error::FrameError;

/// Client or Server marker.
pub trait RoleHelper {
    /// Incoming frames are masked and must be unmasked.
    const SERVER: bool;

    /// Mask used by the next outgoing frame.
    fn write_mask() -> Mask;

    /// Check the mask flag of an incoming frame.
    #[inline]
    fn check_read_mask(mask: Mask) -> Result<(), FrameError> {
        match (Self::SERVER, mask.is_masked()) {
            (true, false) => Err(FrameError::ExpectedMaskedData),
            (false, true) => Err(FrameError::ReceivedMaskedFromServer),
            _ => Ok(()),
        }
    }
}

/// Client marker.
pub trait ClientRole: RoleHelper {}

/// Server marker.
pub trait ServerRole: RoleHelper {}
