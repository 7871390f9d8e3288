use crate::cpu::m6805::Variant;
use crate::cpu::InputLine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmuError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed S-record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("S-record checksum mismatch on line {line}: expected {expected:02X}, found {found:02X}")]
    ChecksumMismatch { line: usize, expected: u8, found: u8 },

    #[error("image data at {address:#06X} does not fit a {width}-bit address space")]
    AddressOutOfRange { address: u32, width: u32 },

    #[error("unknown CPU variant '{0}'")]
    UnknownVariant(String),

    #[error("{variant} has no {line:?} input line")]
    UnsupportedInputLine { variant: Variant, line: InputLine },

    #[error("unknown register '{0}'")]
    UnknownRegister(String),

    #[error("save state was taken on {found}, this CPU is {expected}")]
    StateMismatch { expected: Variant, found: Variant },

    #[error("instruction at {pc:#06X} needs {needed} bytes, only {available} available")]
    TruncatedInstruction {
        pc: u16,
        needed: usize,
        available: usize,
    },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EmuError>;
