use super::{RoleHelper, ClientRole};
use crate::frame::Mask;
use crate::frame::mask::new_rand_key;

/// Standard client using random mask key.
///
/// A fresh key is drawn for every frame it writes.
#[derive(Debug, Clone, Copy)]
pub struct Client;

impl RoleHelper for Client {
    const SERVER: bool = false;

    #[inline]
    fn write_mask() -> Mask { Mask::Key(new_rand_key()) }
}

impl ClientRole for Client {}
