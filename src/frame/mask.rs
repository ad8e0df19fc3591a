//!  Mask flag and key.

/// Payload mask with a 32-bit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mask {
    Key([u8; 4]),
    None,
}

impl Mask {
    /// Read the flag which indicates whether mask is used.
    ///
    /// The key itself follows the extended length,
    /// a zero key is a placeholder until it is read.
    #[inline]
    pub const fn from_flag(b: u8) -> Self {
        match b & 0x80 {
            0x80 => Mask::Key([0; 4]),
            _ => Mask::None,
        }
    }

    /// Get the flag byte.
    #[inline]
    pub const fn to_flag(&self) -> u8 {
        match self {
            Mask::Key(_) => 0x80,
            Mask::None => 0x00,
        }
    }

    /// Check if the mask flag is set.
    #[inline]
    pub const fn is_masked(&self) -> bool { matches!(self, Mask::Key(_)) }

    /// Number of key bytes on the wire.
    #[inline]
    pub const fn key_len(&self) -> usize {
        match self {
            Mask::Key(_) => 4,
            Mask::None => 0,
        }
    }
}

/// Generate a new random key.
#[inline]
pub fn new_rand_key() -> [u8; 4] { rand::random::<[u8; 4]>() }

/// Mask the buffer, byte by byte.
#[inline]
pub fn apply_mask(key: [u8; 4], buf: &mut [u8]) {
    for (i, b) in buf.iter_mut().enumerate() {
        *b ^= key[i & 0x03];
    }
}

/// Mask the buffer, 4 bytes at a time.
#[inline]
pub fn apply_mask4(key: [u8; 4], buf: &mut [u8]) {
    let key4 = u32::from_ne_bytes(key);
    let mut chunks = buf.chunks_exact_mut(4);

    for b4 in chunks.by_ref() {
        let x = u32::from_ne_bytes([b4[0], b4[1], b4[2], b4[3]]) ^ key4;
        b4.copy_from_slice(&x.to_ne_bytes());
    }

    // the tail starts at a multiple of 4, so the key is not rotated
    apply_mask(key, chunks.into_remainder());
}
