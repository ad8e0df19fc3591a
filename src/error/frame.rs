use thiserror::Error;

/// Websocket protocol violations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("Unexpected opcode {0:#x}")]
    UnexpectedOpcode(u8),

    #[error("Reserved bits {0:#05b} set without an extension")]
    ReservedBits(u8),

    #[error("Illegal: expected masked data from client")]
    ExpectedMaskedData,

    #[error("Illegal: received masked data from server")]
    ReceivedMaskedFromServer,

    #[error("Max supported length exceeded: {0}")]
    MaxLengthExceeded(u64),

    #[error("Fragmented control frame")]
    FragmentedControl,

    #[error("Control frame payload of {0} bytes exceeds 125")]
    ControlFrameTooLong(usize),

    #[error("Unexpected continuation frame")]
    UnexpectedContinuation,

    #[error("Expected continuation frame")]
    ExpectedContinuation,

    #[error("Invalid UTF-8 in text payload")]
    InvalidUtf8,

    #[error("Not enough space to write to")]
    NotEnoughCapacity,
}
