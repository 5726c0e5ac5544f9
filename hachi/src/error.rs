//! Error handling for the hachi virtual machine
//!
//! Every fallible operation of the machine reports one of these kinds
//! synchronously. None of them are retried internally: the host decides
//! whether to abort the session.

use thiserror::Error;

/// Main machine error type, covering loading, execution and disassembly
#[derive(Error, Debug)]
pub enum Chip8Error {
    #[error("Not enough memory (program size: {program_size}, free memory: {free_memory})")]
    OutOfMemory {
        program_size: usize,
        free_memory: usize,
    },

    /// Raised both for a CALL with a full stack and a RET with an empty one.
    #[error("Stack overflow")]
    StackOverflow,

    #[error("Tried to execute invalid code: {opcode:#06X} at {address:#06X}")]
    InvalidInstruction { opcode: u16, address: u16 },

    #[error("Overflow: {length} bytes from {address:#06X} exceed the 16-bit address space")]
    ArithmeticOverflow { address: u16, length: u16 },

    #[error("Tried to access invalid or protected memory: {length} bytes at {address:#06X}")]
    InvalidMemoryAccess { address: u16, length: u16 },

    #[error("Odd-aligned opcodes are not supported (input is {length} bytes)")]
    UnsupportedAlignment { length: usize },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a platform's custom data side-channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("This platform has no settable data")]
    NoSettableData,

    #[error("Unknown data key '{0}'")]
    UnknownKey(String),

    #[error("Invalid type for '{key}', expected {expected}")]
    WrongType { key: String, expected: &'static str },
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
